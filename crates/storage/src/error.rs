//! Mapping of `redb` errors onto the burrowdb taxonomy

use burrow_core::Error;

pub(crate) fn storage(e: redb::StorageError) -> Error {
    Error::storage(e)
}

pub(crate) fn transaction(e: redb::TransactionError) -> Error {
    Error::storage(e)
}

pub(crate) fn commit(e: redb::CommitError) -> Error {
    Error::CommitFailure(e.to_string())
}

pub(crate) fn table(namespace: &str, e: redb::TableError) -> Error {
    match e {
        redb::TableError::TableDoesNotExist(_) => Error::NamespaceMissing(namespace.to_string()),
        other => Error::storage(other),
    }
}

//! Scoped transactions and per-namespace access
//!
//! Values handed out by the engine are only valid while their transaction
//! is open, so every read here copies bytes into owned `Vec<u8>` before
//! returning.

use crate::cursor::KvCursor;
use crate::error;
use burrow_core::{validate_namespace, Error, Result};
use redb::{ReadableTable, ReadableTableMetadata, TableDefinition, TableHandle};
use std::ops::Bound;

pub(crate) type Bytes = &'static [u8];

/// Reserved table holding one persisted counter per namespace
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("__sequences");

pub(crate) fn namespace_table(name: &str) -> TableDefinition<'_, Bytes, Bytes> {
    TableDefinition::new(name)
}

/// The process-wide write transaction
pub struct WriteTxn {
    inner: redb::WriteTransaction,
}

impl WriteTxn {
    pub(crate) fn new(inner: redb::WriteTransaction) -> Self {
        Self { inner }
    }

    /// True if `name` has been created
    pub fn namespace_exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .inner
            .list_tables()
            .map_err(error::storage)?
            .any(|handle| handle.name() == name))
    }

    /// Open an existing namespace for writing
    ///
    /// Never creates the namespace; a missing one is `NamespaceMissing`.
    pub fn namespace(&self, name: &str) -> Result<NamespaceMut<'_>> {
        if !self.namespace_exists(name)? {
            return Err(Error::NamespaceMissing(name.to_string()));
        }
        let table = self
            .inner
            .open_table(namespace_table(name))
            .map_err(|e| error::table(name, e))?;
        Ok(NamespaceMut {
            name: name.to_string(),
            table,
            txn: &self.inner,
        })
    }

    /// Create `name` if absent; returns true if it was created
    pub fn create_namespace(&self, name: &str) -> Result<bool> {
        validate_namespace(name)?;
        if self.namespace_exists(name)? {
            return Ok(false);
        }
        self.inner
            .open_table(namespace_table(name))
            .map_err(|e| error::table(name, e))?;
        Ok(true)
    }

    /// Delete `name`, its records and its sequence counter
    ///
    /// A missing namespace is `NamespaceMissing`.
    pub fn delete_namespace(&self, name: &str) -> Result<()> {
        let existed = self
            .inner
            .delete_table(namespace_table(name))
            .map_err(|e| error::table(name, e))?;
        if !existed {
            return Err(Error::NamespaceMissing(name.to_string()));
        }
        let mut sequences = self
            .inner
            .open_table(SEQUENCES)
            .map_err(|e| error::table(SEQUENCES.name(), e))?;
        sequences.remove(name).map_err(error::storage)?;
        Ok(())
    }

    /// Make every write of this transaction visible atomically
    pub fn commit(self) -> Result<()> {
        self.inner.commit().map_err(error::commit)
    }

    /// Discard every write of this transaction
    pub fn abort(self) {
        if let Err(e) = self.inner.abort() {
            tracing::warn!(target: "burrow::storage", error = %e, "Abort reported an error");
        }
    }
}

/// Write access to one namespace inside a `WriteTxn`
pub struct NamespaceMut<'txn> {
    name: String,
    table: redb::Table<'txn, Bytes, Bytes>,
    txn: &'txn redb::WriteTransaction,
}

impl NamespaceMut<'_> {
    /// Namespace name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read a value as of this transaction's own writes
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self
            .table
            .get(key)
            .map_err(error::storage)?
            .map(|guard| guard.value().to_vec()))
    }

    /// Insert or overwrite `key`
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.table.insert(key, value).map_err(error::storage)?;
        Ok(())
    }

    /// Remove `key`; returns whether it was present
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        Ok(self.table.remove(key).map_err(error::storage)?.is_some())
    }

    /// Increment and return this namespace's persisted sequence
    ///
    /// The first value is 1. Values are never reused, even after deletes;
    /// the counter is only reset when the namespace is deleted.
    pub fn next_sequence(&mut self) -> Result<u64> {
        let mut sequences = self
            .txn
            .open_table(SEQUENCES)
            .map_err(|e| error::table(SEQUENCES.name(), e))?;
        let current = sequences
            .get(self.name.as_str())
            .map_err(error::storage)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current.checked_add(1).ok_or_else(|| {
            Error::Storage(format!("sequence for {} is exhausted", self.name))
        })?;
        sequences
            .insert(self.name.as_str(), next)
            .map_err(error::storage)?;
        Ok(next)
    }
}

/// A snapshot read transaction
pub struct ReadTxn {
    inner: redb::ReadTransaction,
}

impl ReadTxn {
    pub(crate) fn new(inner: redb::ReadTransaction) -> Self {
        Self { inner }
    }

    /// Open an existing namespace for reading
    pub fn namespace(&self, name: &str) -> Result<NamespaceView> {
        let table = self
            .inner
            .open_table(namespace_table(name))
            .map_err(|e| error::table(name, e))?;
        Ok(NamespaceView {
            name: name.to_string(),
            table,
        })
    }

    /// Last sequence value handed out for `name`, 0 if none
    pub fn current_sequence(&self, name: &str) -> Result<u64> {
        let sequences = match self.inner.open_table(SEQUENCES) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(0),
            Err(e) => return Err(error::table(SEQUENCES.name(), e)),
        };
        Ok(sequences
            .get(name)
            .map_err(error::storage)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    /// Turn this transaction into a forward cursor over `name`
    ///
    /// The cursor keeps the snapshot open until it is dropped.
    pub fn into_cursor(
        self,
        name: &str,
        lower: Bound<Vec<u8>>,
        upper: Bound<Vec<u8>>,
    ) -> Result<KvCursor> {
        let view = self.namespace(name)?;
        Ok(KvCursor::new(self, view, lower, upper))
    }
}

/// Read access to one namespace inside a `ReadTxn`
pub struct NamespaceView {
    name: String,
    pub(crate) table: redb::ReadOnlyTable<Bytes, Bytes>,
}

impl NamespaceView {
    /// Namespace name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy the value stored at `key`
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self
            .table
            .get(key)
            .map_err(error::storage)?
            .map(|guard| guard.value().to_vec()))
    }

    /// Number of records
    pub fn len(&self) -> Result<u64> {
        self.table.len().map_err(error::storage)
    }

    /// True if the namespace holds no records
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Visit every pair in key order, stopping at the first error
    pub fn for_each(&self, mut f: impl FnMut(&[u8], &[u8]) -> Result<()>) -> Result<()> {
        for entry in self.table.iter().map_err(error::storage)? {
            let (key, value) = entry.map_err(error::storage)?;
            f(key.value(), value.value())?;
        }
        Ok(())
    }
}

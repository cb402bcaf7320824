//! Repository: create/get/list/update/delete for one record kind
//!
//! ## Design
//!
//! `Repository<R>` is a stateless facade over the store. It holds no
//! in-memory state beyond an `Arc<Store>` reference; the sequence counter
//! lives in the store and is only touched inside write transactions, so
//! concurrent creators never need a lock of their own.
//!
//! ## Thread Safety
//!
//! `Repository` is `Send + Sync` and cheap to clone. Multiple repositories
//! over the same store are safe.
//!
//! ## API
//!
//! - **Single-transaction path**: `create`, `update`, `delete`
//!   Each call runs in its own write transaction.
//! - **Coalesced path**: `create_batched`, `update_batched`
//!   The call shares a transaction with concurrent callers through a
//!   [`BatchCoalescer`].
//! - **Reads**: `get`, `find`, `list`, `count`
//!   Snapshot reads; never block writers.
//!
//! ## Update semantics
//!
//! `update` is an upsert: writing a record whose key is absent creates it.
//! A record whose key is built from mutable fields (an `Event`'s `time`)
//! must be rewritten with `update_at`, which removes the entry at the
//! previous key in the same transaction.

use crate::iter::RecordIter;
use burrow_concurrency::BatchCoalescer;
use burrow_core::{decode_record, encode_record, Error, Record, RecordKey, Result};
use burrow_storage::{Store, WriteTxn};
use std::marker::PhantomData;
use std::ops::Bound;
use std::sync::Arc;

/// Record store bound to the namespace of `R`
///
/// # Example
///
/// ```ignore
/// use burrow_primitives::{Repository, User};
///
/// let users: Repository<User> = Repository::new(store);
/// let key = users.create(user)?;
/// let stored = users.get(&key)?;
/// users.delete(&key)?;
/// ```
pub struct Repository<R: Record> {
    store: Arc<Store>,
    _kind: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _kind: PhantomData,
        }
    }
}

impl<R: Record> Repository<R> {
    /// Create a repository over `store`
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }

    /// Namespace this repository reads and writes
    pub fn namespace(&self) -> &'static str {
        R::NAMESPACE
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Assign the next sequence to `record` and write it in its own transaction
    ///
    /// Returns the key the record was stored under. On any failure nothing
    /// is written and the sequence value is not consumed.
    pub fn create(&self, record: R) -> Result<R::Key> {
        self.store.update(|txn| insert_new(txn, record))
    }

    /// Like `create`, but through a shared coalesced transaction
    ///
    /// If any request in the same group fails, this call fails with the
    /// group's `CommitFailure` and the record is not stored.
    pub fn create_batched(&self, coalescer: &BatchCoalescer, record: R) -> Result<R::Key> {
        coalescer.submit(move |txn| insert_new(txn, record))
    }

    /// Read the record stored at `key`
    ///
    /// # Errors
    ///
    /// `NotFound` if no record is stored at `key`.
    pub fn get(&self, key: &R::Key) -> Result<R> {
        self.find(key)?
            .ok_or_else(|| Error::not_found(R::NAMESPACE, key))
    }

    /// Read the record stored at `key`, `None` if absent
    pub fn find(&self, key: &R::Key) -> Result<Option<R>> {
        let bytes = self
            .store
            .view(|txn| txn.namespace(R::NAMESPACE)?.get(&key.encode()))?;
        bytes
            .map(|bytes| decode_record(R::NAMESPACE, &bytes))
            .transpose()
    }

    /// Every record in key order
    ///
    /// Opens a fresh read transaction per call; the returned sequence sees
    /// that snapshot only.
    pub fn list(&self) -> Result<RecordIter<R>> {
        let cursor = self.store.begin_read()?.into_cursor(
            R::NAMESPACE,
            Bound::Unbounded,
            Bound::Unbounded,
        )?;
        Ok(RecordIter::new(cursor))
    }

    /// Number of stored records
    pub fn count(&self) -> Result<u64> {
        self.store.view(|txn| txn.namespace(R::NAMESPACE)?.len())
    }

    /// Overwrite the record at `record.key()`, creating it if absent
    ///
    /// The key is derived from the record as passed. If a field the key is
    /// built from was edited, use `update_at` instead.
    pub fn update(&self, record: &R) -> Result<()> {
        self.store.update(|txn| upsert(txn, record))
    }

    /// Overwrite the record stored at `previous`
    ///
    /// When `record.key()` differs from `previous`, the entry at `previous`
    /// is removed and the record written at its new key in one transaction,
    /// so the record is never visible under both keys.
    pub fn update_at(&self, previous: &R::Key, record: &R) -> Result<()> {
        self.store.update(|txn| {
            if record.key() != *previous {
                txn.namespace(R::NAMESPACE)?.delete(&previous.encode())?;
            }
            upsert(txn, record)
        })
    }

    /// Like `update`, but through a shared coalesced transaction
    pub fn update_batched(&self, coalescer: &BatchCoalescer, record: R) -> Result<()> {
        coalescer.submit(move |txn| upsert(txn, &record))
    }

    /// Remove the record at `key`; removing an absent key is not an error
    pub fn delete(&self, key: &R::Key) -> Result<()> {
        self.store.update(|txn| {
            txn.namespace(R::NAMESPACE)?.delete(&key.encode())?;
            Ok(())
        })
    }
}

fn insert_new<R: Record>(txn: &WriteTxn, mut record: R) -> Result<R::Key> {
    let mut ns = txn.namespace(R::NAMESPACE)?;
    let seq = ns.next_sequence()?;
    record.assign_sequence(seq);
    let payload = encode_record(&record)?;
    let key = record.key();
    ns.put(&key.encode(), &payload)?;
    Ok(key)
}

fn upsert<R: Record>(txn: &WriteTxn, record: &R) -> Result<()> {
    let payload = encode_record(record)?;
    txn.namespace(R::NAMESPACE)?
        .put(&record.key().encode(), &payload)
}

//! Storage layer for burrowdb
//!
//! This crate wraps the embedded `redb` engine behind the primitives the
//! rest of the system consumes:
//! - Store: file handle with lock-wait timeout and read-only mode
//! - WriteTxn / ReadTxn: scoped single-writer and snapshot transactions
//! - NamespaceMut / NamespaceView: per-namespace get/put/delete
//! - Persisted per-namespace sequence counters
//! - KvCursor: chunked forward cursor that owns its snapshot
//!
//! # Buffer ownership
//!
//! Engine buffers never escape a transaction. Reads copy into `Vec<u8>`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor;
mod error;
pub mod store;
pub mod txn;

pub use cursor::KvCursor;
pub use store::{Store, StoreOptions};
pub use txn::{NamespaceMut, NamespaceView, ReadTxn, WriteTxn};

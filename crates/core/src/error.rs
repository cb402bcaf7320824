//! Error types for burrowdb
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for burrowdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for burrowdb
#[derive(Debug, Error)]
pub enum Error {
    /// Operation targeted a namespace that has not been created
    #[error("Namespace not found: {0}")]
    NamespaceMissing(String),

    /// Read by key found no record
    #[error("Record not found in {namespace}: {key}")]
    NotFound {
        /// Namespace that was searched
        namespace: String,
        /// Debug rendering of the missing key
        key: String,
    },

    /// Stored key bytes could not be decoded
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    /// Stored value bytes could not be decoded
    #[error("Malformed value in {namespace}: {reason}")]
    MalformedValue {
        /// Namespace holding the bad value
        namespace: String,
        /// Decoder message
        reason: String,
    },

    /// A record could not be serialized for storage
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The file lock could not be acquired within the configured timeout
    #[error("Timed out after {waited:?} waiting for the lock on {}", path.display())]
    LockTimeout {
        /// Store file that is locked
        path: PathBuf,
        /// How long the open waited
        waited: Duration,
    },

    /// Write attempted on a store opened read-only
    #[error("Store is open read-only")]
    ReadOnly,

    /// The write transaction failed; none of its writes took effect
    #[error("Commit failed: {0}")]
    CommitFailure(String),

    /// Submission to a batch coalescer that has been shut down
    #[error("Batch coalescer is shut down")]
    CoalescerClosed,

    /// Invalid argument supplied by the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage engine error
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a `NotFound` error for a namespace and key
    pub fn not_found(namespace: &str, key: impl std::fmt::Debug) -> Self {
        Error::NotFound {
            namespace: namespace.to_string(),
            key: format!("{:?}", key),
        }
    }

    /// Build a `MalformedValue` error for a namespace
    pub fn malformed_value(namespace: &str, reason: impl ToString) -> Self {
        Error::MalformedValue {
            namespace: namespace.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build a `Storage` error from any displayable engine error
    pub fn storage(e: impl std::fmt::Display) -> Self {
        Error::Storage(e.to_string())
    }

    /// True for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True for `NamespaceMissing`
    pub fn is_namespace_missing(&self) -> bool {
        matches!(self, Error::NamespaceMissing(_))
    }

    /// True when the same operation may succeed if retried later.
    ///
    /// Retry policy itself belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::LockTimeout { .. } | Error::CommitFailure(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

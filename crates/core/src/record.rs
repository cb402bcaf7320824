//! Record traits and payload encoding
//!
//! A record kind is bound to exactly one namespace and one key layout.
//! Payloads are stored as JSON documents.

use crate::error::{Error, Result};
use crate::key::{RecordKey, TimeKey};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// An entity kind stored in its own namespace
///
/// # Example
///
/// ```
/// use burrow_core::{Record, SequenceKey};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Note {
///     id: u64,
///     body: String,
/// }
///
/// impl Record for Note {
///     const NAMESPACE: &'static str = "Notes";
///     type Key = SequenceKey;
///
///     fn key(&self) -> SequenceKey {
///         SequenceKey(self.id)
///     }
///
///     fn assign_sequence(&mut self, seq: u64) {
///         self.id = seq;
///     }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned + Send + 'static {
    /// Namespace holding every record of this kind
    const NAMESPACE: &'static str;

    /// Primary key layout
    type Key: RecordKey;

    /// Primary key of this record
    fn key(&self) -> Self::Key;

    /// Store the sequence number assigned at creation
    fn assign_sequence(&mut self, seq: u64);
}

/// A record kind whose key is ordered by timestamp
pub trait TimeOrdered: Record<Key = TimeKey> {
    /// Unix timestamp in seconds used as the leading key component
    fn timestamp(&self) -> i64;
}

/// Serialize a record payload
pub fn encode_record<R: Serialize>(record: &R) -> Result<Vec<u8>> {
    serde_json::to_vec(record).map_err(Error::from)
}

/// Deserialize a stored payload from `namespace`
pub fn decode_record<R: DeserializeOwned>(namespace: &str, bytes: &[u8]) -> Result<R> {
    serde_json::from_slice(bytes).map_err(|e| Error::malformed_value(namespace, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: u64,
        name: String,
        active: bool,
    }

    #[test]
    fn test_decode_reads_encoded_payload() {
        let sample = Sample {
            id: 3,
            name: "alice".to_string(),
            active: true,
        };
        let bytes = encode_record(&sample).unwrap();
        let decoded: Sample = decode_record("Samples", &bytes).unwrap();
        assert_eq!(decoded, sample);
    }

    #[test]
    fn test_decode_garbage_is_malformed_value() {
        let err = decode_record::<Sample>("Samples", b"\xff\x00not json").unwrap_err();
        match err {
            Error::MalformedValue { namespace, .. } => assert_eq!(namespace, "Samples"),
            other => panic!("expected MalformedValue, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_wrong_shape_is_malformed_value() {
        let err = decode_record::<Sample>("Samples", br#"{"id":"x"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedValue { .. }));
    }
}

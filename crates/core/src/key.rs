//! Order-preserving key encoding
//!
//! Every key is a fixed-width big-endian byte string, so byte-lexicographic
//! order equals numeric order and the engine's cursor can walk records in
//! logical order.
//!
//! ## Layouts
//!
//! - Sequence key: 8 bytes, `u64` big-endian.
//! - Time-ordered key: 16 bytes, timestamp followed by a sequence tie-break.
//!   The timestamp has its sign bit flipped before encoding so negative and
//!   positive timestamps sort together in signed order.

use crate::error::{Error, Result};
use std::fmt;

/// Width of an encoded sequence key
pub const SEQUENCE_KEY_LEN: usize = 8;

/// Width of an encoded time-ordered key
pub const TIME_KEY_LEN: usize = 16;

const SIGN_BIT: u64 = 1 << 63;

/// Encode a sequence number as an 8-byte big-endian key
#[inline]
pub fn encode_sequence(n: u64) -> [u8; SEQUENCE_KEY_LEN] {
    n.to_be_bytes()
}

/// Decode an 8-byte sequence key
pub fn decode_sequence(key: &[u8]) -> Result<u64> {
    let bytes: [u8; SEQUENCE_KEY_LEN] = key.try_into().map_err(|_| {
        Error::MalformedKey(format!(
            "sequence key must be {} bytes, got {}",
            SEQUENCE_KEY_LEN,
            key.len()
        ))
    })?;
    Ok(u64::from_be_bytes(bytes))
}

/// Encode `(timestamp, tie_break)` as a 16-byte composite key
///
/// ```
/// use burrow_core::key::{decode_time_ordered, encode_time_ordered};
///
/// let key = encode_time_ordered(1_700_000_000, 7);
/// assert_eq!(decode_time_ordered(&key).unwrap(), (1_700_000_000, 7));
/// assert!(encode_time_ordered(-1, u64::MAX) < encode_time_ordered(0, 0));
/// ```
pub fn encode_time_ordered(timestamp: i64, tie_break: u64) -> [u8; TIME_KEY_LEN] {
    let mut key = [0u8; TIME_KEY_LEN];
    key[..8].copy_from_slice(&((timestamp as u64) ^ SIGN_BIT).to_be_bytes());
    key[8..].copy_from_slice(&tie_break.to_be_bytes());
    key
}

/// Decode a 16-byte composite key back into `(timestamp, tie_break)`
pub fn decode_time_ordered(key: &[u8]) -> Result<(i64, u64)> {
    if key.len() != TIME_KEY_LEN {
        return Err(Error::MalformedKey(format!(
            "time-ordered key must be {} bytes, got {}",
            TIME_KEY_LEN,
            key.len()
        )));
    }
    let mut ts = [0u8; 8];
    let mut seq = [0u8; 8];
    ts.copy_from_slice(&key[..8]);
    seq.copy_from_slice(&key[8..]);
    Ok((
        (u64::from_be_bytes(ts) ^ SIGN_BIT) as i64,
        u64::from_be_bytes(seq),
    ))
}

/// Inclusive key bounds covering every record with `lower <= timestamp <= upper`
pub fn time_range_bounds(lower: i64, upper: i64) -> ([u8; TIME_KEY_LEN], [u8; TIME_KEY_LEN]) {
    (
        encode_time_ordered(lower, 0),
        encode_time_ordered(upper, u64::MAX),
    )
}

/// A typed primary key with a fixed byte encoding
pub trait RecordKey: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Encode to the stored byte form
    fn encode(&self) -> Vec<u8>;

    /// Decode from the stored byte form
    fn decode(bytes: &[u8]) -> Result<Self>;
}

/// Primary key assigned from a namespace sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceKey(pub u64);

impl RecordKey for SequenceKey {
    fn encode(&self) -> Vec<u8> {
        encode_sequence(self.0).to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        decode_sequence(bytes).map(SequenceKey)
    }
}

impl From<u64> for SequenceKey {
    fn from(n: u64) -> Self {
        SequenceKey(n)
    }
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite key ordered by timestamp, then by sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeKey {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    /// Sequence number disambiguating equal timestamps
    pub seq: u64,
}

impl TimeKey {
    /// Create a time key
    pub fn new(timestamp: i64, seq: u64) -> Self {
        Self { timestamp, seq }
    }
}

impl RecordKey for TimeKey {
    fn encode(&self) -> Vec<u8> {
        encode_time_ordered(self.timestamp, self.seq).to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let (timestamp, seq) = decode_time_ordered(bytes)?;
        Ok(Self { timestamp, seq })
    }
}

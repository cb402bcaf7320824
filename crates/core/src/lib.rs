//! Core types and traits for burrowdb
//!
//! This crate defines the foundational types used throughout the system:
//! - Error: Error taxonomy and `Result` alias
//! - Key codec: order-preserving sequence and time-ordered keys
//! - Namespace: name validation and the reserved internal prefix
//! - Record: entity-kind traits and JSON payload encoding
//! - Config: `burrow.toml` loading

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod key;
pub mod namespace;
pub mod record;

pub use config::{BatchConfig, BurrowConfig, DurabilityLevel, CONFIG_FILE_NAME};
pub use error::{Error, Result};
pub use key::{
    decode_sequence, decode_time_ordered, encode_sequence, encode_time_ordered,
    time_range_bounds, RecordKey, SequenceKey, TimeKey,
};
pub use namespace::validate_namespace;
pub use record::{decode_record, encode_record, Record, TimeOrdered};

//! Concurrency layer for burrowdb
//!
//! The storage engine admits exactly one write transaction at a time, and
//! every commit pays a fixed durability cost. This crate amortizes that
//! cost across concurrent writers:
//! - BatchCoalescer: collector thread that groups concurrent write requests
//!   into shared transactions and fans the outcome back to each caller
//! - CoalescerConfig: grouping bounds (max group size, max wait)
//! - CoalescerStats: committed/failed group counters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coalescer;

pub use coalescer::{BatchCoalescer, CoalescerConfig, CoalescerStats};

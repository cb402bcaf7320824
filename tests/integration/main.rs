//! End-to-end tests through the `Burrow` facade
//!
//! - batching: coalesced creation from many writers
//! - visibility: atomic group commits under concurrent readers
//! - persistence: reopen, lock waits, read-only handles
//! - ranges: timestamp scans over generated events

#[path = "../common/mod.rs"]
mod common;

mod batching;
mod persistence;
mod ranges;
mod visibility;

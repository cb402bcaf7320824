//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use burrowdb::{Burrow, BurrowConfig, CoalescerConfig, Event, Store, User};
use std::path::PathBuf;
use std::sync::{Arc, Once};
use std::time::Duration;
use tempfile::TempDir;

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output to the test harness; set `RUST_LOG` to see it
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Coalescer bounds that keep tests fast
pub fn test_coalescer() -> CoalescerConfig {
    CoalescerConfig {
        max_batch_size: 64,
        max_wait: Duration::from_millis(5),
    }
}

/// On-disk deployment that lives as long as the value
pub struct TestDb {
    pub db: Burrow,
    pub dir: TempDir,
}

impl TestDb {
    /// Fresh store file with both namespaces created
    pub fn new() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = Burrow::open(dir.path().join("burrow.redb"), &BurrowConfig::default())
            .expect("Failed to open test store");
        db.ensure_namespaces().expect("Failed to create namespaces");
        TestDb { db, dir }
    }

    /// In-memory deployment with both namespaces created
    pub fn ephemeral() -> Burrow {
        init_tracing();
        let store = Arc::new(Store::ephemeral().expect("Failed to create store"));
        let db = Burrow::from_store(store, test_coalescer()).expect("Failed to start coalescer");
        db.ensure_namespaces().expect("Failed to create namespaces");
        db
    }

    /// Path of the store file
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("burrow.redb")
    }
}

/// A user with every field set from `n`
pub fn user(n: u64) -> User {
    User {
        id: 0,
        name: format!("user-{}", n),
        gender: (n % 2) as u8,
        age: (n % 100) as u8,
        phone: format!("555-{:04}", n % 10_000),
        email: format!("user{}@example.com", n),
        created_at: 1_700_000_000 + n as i64,
    }
}

/// An event at `time`
pub fn event(time: i64, name: &str) -> Event {
    Event {
        id: 0,
        time,
        name: name.to_string(),
        kind: 3,
        cancel: false,
    }
}

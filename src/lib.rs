//! burrowdb - write batching and ordered range queries over an embedded store
//!
//! burrowdb layers typed record storage over a transactional, ordered,
//! single-writer key-value engine. Records live in named namespaces; each
//! namespace hands out monotonically increasing sequence numbers; time-ordered
//! records can be range-scanned by timestamp; and concurrent writers can share
//! commits through a batch coalescer.
//!
//! # Quick Start
//!
//! ```ignore
//! use burrowdb::{Burrow, BurrowConfig};
//!
//! let db = Burrow::open("/var/data/app.redb", &BurrowConfig::default())?;
//! db.ensure_namespaces()?;
//!
//! let key = db.users().create(user)?;
//! let recent = db.event_range().scan_collect(now - 3600, now)?;
//! ```
//!
//! # Architecture
//!
//! - `burrow-core`: errors, key codec, record traits, configuration
//! - `burrow-storage`: the engine handle, transactions, namespaces, sequences
//! - `burrow-concurrency`: the batch coalescer
//! - `burrow-primitives`: repositories, range scans, namespace lifecycle
//!
//! [`Burrow`] bundles one of each over a shared store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod workload;

pub use burrow_concurrency::{BatchCoalescer, CoalescerConfig, CoalescerStats};
pub use burrow_core::{
    decode_sequence, decode_time_ordered, encode_sequence, encode_time_ordered,
    time_range_bounds, BatchConfig, BurrowConfig, DurabilityLevel, Error, Record, RecordKey,
    Result, SequenceKey, TimeKey, TimeOrdered, CONFIG_FILE_NAME,
};
pub use burrow_primitives::{
    Event, NamespaceManager, RangeScanner, RecordIter, Repository, User, EVENTS, USERS,
};
pub use burrow_storage::{Store, StoreOptions};

use rand::thread_rng;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tracing::info;
use workload::{fake_event, fake_user, split_work, unix_now};

/// Store file name used by [`Burrow::open_dir`]
pub const DATA_FILE_NAME: &str = "burrow.redb";

/// A deployment's repositories over one shared store
///
/// `Burrow` is `Send + Sync`. Dropping it shuts the coalescer down, which
/// commits any queued writes first.
pub struct Burrow {
    store: Arc<Store>,
    coalescer: BatchCoalescer,
    users: Repository<User>,
    events: Repository<Event>,
    event_range: RangeScanner<Event>,
    namespaces: NamespaceManager,
}

impl Burrow {
    /// Open the store file at `path` with explicit settings
    ///
    /// # Errors
    ///
    /// - `Config` if `config` is invalid
    /// - `LockTimeout` if another handle holds the file past `lock_timeout_ms`
    pub fn open(path: impl AsRef<Path>, config: &BurrowConfig) -> Result<Self> {
        config.validate()?;
        let options = StoreOptions::from_config(config)?;
        let store = Arc::new(Store::open(path, &options)?);
        Self::from_store(store, CoalescerConfig::from(&config.batch))
    }

    /// Open `dir/burrow.redb` with settings from `dir/burrow.toml`
    ///
    /// Creates the directory and a default config file when they are missing.
    pub fn open_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let config_path = dir.join(CONFIG_FILE_NAME);
        BurrowConfig::write_default_if_missing(&config_path)?;
        let config = BurrowConfig::from_file(&config_path)?;
        Self::open(dir.join(DATA_FILE_NAME), &config)
    }

    /// An in-memory deployment with default settings
    pub fn ephemeral() -> Result<Self> {
        Self::from_store(Arc::new(Store::ephemeral()?), CoalescerConfig::default())
    }

    /// Wrap an already open store
    pub fn from_store(store: Arc<Store>, coalescer: CoalescerConfig) -> Result<Self> {
        let coalescer = BatchCoalescer::new(Arc::clone(&store), coalescer)?;
        Ok(Self {
            users: Repository::new(Arc::clone(&store)),
            events: Repository::new(Arc::clone(&store)),
            event_range: RangeScanner::new(Arc::clone(&store)),
            namespaces: NamespaceManager::standard(Arc::clone(&store)),
            coalescer,
            store,
        })
    }

    /// The shared store
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// The shared write coalescer
    pub fn coalescer(&self) -> &BatchCoalescer {
        &self.coalescer
    }

    /// User profiles
    pub fn users(&self) -> &Repository<User> {
        &self.users
    }

    /// Timed events
    pub fn events(&self) -> &Repository<Event> {
        &self.events
    }

    /// Timestamp range scans over events
    pub fn event_range(&self) -> &RangeScanner<Event> {
        &self.event_range
    }

    /// Lifecycle of the `Users` and `Events` namespaces
    pub fn namespaces(&self) -> &NamespaceManager {
        &self.namespaces
    }

    /// Create any missing namespace
    pub fn ensure_namespaces(&self) -> Result<()> {
        self.namespaces.ensure_all().map(|_| ())
    }

    /// Drop every namespace with all its records
    ///
    /// Fails with `NamespaceMissing` and drops nothing if any is absent.
    pub fn cleanup_namespaces(&self) -> Result<()> {
        self.namespaces.drop_all()
    }

    /// Create `n` fake users, one write transaction each
    pub fn generate_users(&self, n: usize) -> Result<()> {
        let mut rng = thread_rng();
        let now = unix_now();
        for _ in 0..n {
            self.users.create(fake_user(&mut rng, now))?;
        }
        Ok(())
    }

    /// Create `n` fake events, one write transaction each
    pub fn generate_events(&self, n: usize) -> Result<()> {
        let mut rng = thread_rng();
        let now = unix_now();
        for _ in 0..n {
            self.events.create(fake_event(&mut rng, now))?;
        }
        Ok(())
    }

    /// Create `n` fake users from `workers` threads through the coalescer
    ///
    /// Returns the first error any worker hit; workers that did not fail
    /// keep their writes.
    pub fn generate_users_concurrently(&self, n: usize, workers: usize) -> Result<()> {
        self.run_workers(n, workers, |count| {
            let mut rng = thread_rng();
            let now = unix_now();
            for _ in 0..count {
                self.users
                    .create_batched(&self.coalescer, fake_user(&mut rng, now))?;
            }
            Ok(())
        })
    }

    /// Create `n` fake events from `workers` threads through the coalescer
    pub fn generate_events_concurrently(&self, n: usize, workers: usize) -> Result<()> {
        self.run_workers(n, workers, |count| {
            let mut rng = thread_rng();
            let now = unix_now();
            for _ in 0..count {
                self.events
                    .create_batched(&self.coalescer, fake_event(&mut rng, now))?;
            }
            Ok(())
        })
    }

    fn run_workers<F>(&self, n: usize, workers: usize, work: F) -> Result<()>
    where
        F: Fn(usize) -> Result<()> + Sync,
    {
        if workers == 0 {
            return Err(Error::InvalidInput("workers must be at least 1".to_string()));
        }
        info!(target: "burrow::coalescer", n, workers, "Starting concurrent workload");

        let work = &work;
        thread::scope(|scope| {
            let handles: Vec<_> = split_work(n, workers)
                .into_iter()
                .map(|count| scope.spawn(move || work(count)))
                .collect();

            let mut first_error = None;
            for handle in handles {
                let outcome = handle
                    .join()
                    .unwrap_or_else(|_| Err(Error::Storage("workload thread panicked".to_string())));
                if let Err(e) = outcome {
                    first_error.get_or_insert(e);
                }
            }
            first_error.map_or(Ok(()), Err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ephemeral_round_trip() {
        let db = Burrow::ephemeral().unwrap();
        db.ensure_namespaces().unwrap();
        db.generate_users(5).unwrap();
        db.generate_events(5).unwrap();
        assert_eq!(db.users().count().unwrap(), 5);
        assert_eq!(db.events().count().unwrap(), 5);
    }

    #[test]
    fn test_generate_without_namespaces_fails() {
        let db = Burrow::ephemeral().unwrap();
        assert!(db.generate_users(1).unwrap_err().is_namespace_missing());
    }

    #[test]
    fn test_concurrent_generation_propagates_errors() {
        let db = Burrow::ephemeral().unwrap();
        let err = db.generate_events_concurrently(10, 2).unwrap_err();
        assert!(matches!(err, Error::CommitFailure(_)));
        assert!(db.generate_users_concurrently(10, 0).is_err());
    }

    #[test]
    fn test_cleanup_then_ensure() {
        let db = Burrow::ephemeral().unwrap();
        db.ensure_namespaces().unwrap();
        db.generate_users(3).unwrap();
        db.cleanup_namespaces().unwrap();
        assert!(db.cleanup_namespaces().unwrap_err().is_namespace_missing());
        db.ensure_namespaces().unwrap();
        assert_eq!(db.users().count().unwrap(), 0);
    }

    #[test]
    fn test_burrow_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Burrow>();
    }
}

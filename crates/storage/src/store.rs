//! Store handle and open logic
//!
//! A `Store` owns one `redb` database file. It is opened once per process
//! and shared read-only (`Arc<Store>`) by every repository afterwards.
//!
//! ## Transaction API
//!
//! 1. **Closure API** (recommended): `store.update(|txn| { ... })`
//!    - Commit on `Ok`, abort on `Err`; nothing partial is ever visible
//!    - `store.view(|txn| { ... })` for snapshot reads
//!
//! 2. **Manual API**: `begin_write()` / `begin_read()`
//!    - For callers that control commit timing themselves (the coalescer)
//!
//! ## Locking
//!
//! The engine takes an exclusive file lock on open. A second open of the
//! same file, from this or another process, retries with backoff until the
//! lock is released or `lock_timeout` elapses.

use crate::error;
use crate::txn::{ReadTxn, WriteTxn};
use burrow_core::namespace::is_reserved;
use burrow_core::{BurrowConfig, DurabilityLevel, Error, Result};
use redb::{Database, TableHandle};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const LOCK_RETRY_INITIAL: Duration = Duration::from_millis(5);
const LOCK_RETRY_MAX: Duration = Duration::from_millis(200);

/// Options applied when opening a store file
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Bound on the wait for another holder's file lock; `None` waits indefinitely
    pub lock_timeout: Option<Duration>,
    /// Refuse every write transaction
    pub read_only: bool,
    /// Commit durability for every write transaction
    pub durability: DurabilityLevel,
    /// Engine page cache size in bytes
    pub cache_size: Option<usize>,
}

impl StoreOptions {
    /// Options derived from a loaded `burrow.toml`
    pub fn from_config(config: &BurrowConfig) -> Result<Self> {
        Ok(Self {
            lock_timeout: config.lock_timeout(),
            read_only: config.read_only,
            durability: config.durability_level()?,
            cache_size: config.cache_size_bytes,
        })
    }

    /// Set the lock wait bound
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Open read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Set commit durability
    pub fn durability(mut self, durability: DurabilityLevel) -> Self {
        self.durability = durability;
        self
    }
}

/// An open store file
///
/// Single-writer, multi-reader: the engine serializes write transactions
/// process-wide, readers see the last committed snapshot and never block.
pub struct Store {
    db: Database,
    path: Option<PathBuf>,
    read_only: bool,
    durability: redb::Durability,
}

impl Store {
    /// Create or open the store file at `path`
    ///
    /// Read-only handles never create the file.
    ///
    /// # Errors
    ///
    /// - `LockTimeout` if another handle holds the file longer than `lock_timeout`
    /// - `Storage` for any other engine failure (corrupt file, permissions)
    pub fn open(path: impl AsRef<Path>, options: &StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let started = Instant::now();
        let mut backoff = LOCK_RETRY_INITIAL;

        let db = loop {
            let mut builder = Database::builder();
            if let Some(bytes) = options.cache_size {
                builder.set_cache_size(bytes);
            }
            let attempt = if options.read_only {
                builder.open(&path)
            } else {
                builder.create(&path)
            };

            match attempt {
                Ok(db) => break db,
                Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                    let waited = started.elapsed();
                    let pause = match options.lock_timeout {
                        Some(timeout) if waited >= timeout => {
                            return Err(Error::LockTimeout { path, waited });
                        }
                        Some(timeout) => backoff.min(timeout - waited),
                        None => backoff,
                    };
                    debug!(target: "burrow::storage", path = ?path, ?waited, "Store file is locked, retrying");
                    thread::sleep(pause);
                    backoff = (backoff * 2).min(LOCK_RETRY_MAX);
                }
                Err(e) => return Err(Error::storage(e)),
            }
        };

        info!(
            target: "burrow::storage",
            path = ?path,
            read_only = options.read_only,
            durability = ?options.durability,
            "Opened store"
        );

        Ok(Self {
            db,
            path: Some(path),
            read_only: options.read_only,
            durability: engine_durability(options.durability),
        })
    }

    /// Create an in-memory store (tests, benchmarks)
    pub fn ephemeral() -> Result<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(Error::storage)?;
        Ok(Self {
            db,
            path: None,
            read_only: false,
            durability: redb::Durability::Immediate,
        })
    }

    /// Path of the store file, `None` for ephemeral stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True if writes are refused
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Begin the single write transaction
    ///
    /// Blocks while another write transaction is open.
    pub fn begin_write(&self) -> Result<WriteTxn> {
        if self.read_only {
            return Err(Error::ReadOnly);
        }
        let mut txn = self.db.begin_write().map_err(error::transaction)?;
        txn.set_durability(self.durability);
        Ok(WriteTxn::new(txn))
    }

    /// Begin a snapshot read transaction
    pub fn begin_read(&self) -> Result<ReadTxn> {
        let txn = self.db.begin_read().map_err(error::transaction)?;
        Ok(ReadTxn::new(txn))
    }

    /// Run `f` in one write transaction
    ///
    /// Commits if `f` returns `Ok`; aborts otherwise, so none of its
    /// writes become visible.
    pub fn update<T>(&self, f: impl FnOnce(&WriteTxn) -> Result<T>) -> Result<T> {
        let txn = self.begin_write()?;
        match f(&txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(e) => {
                txn.abort();
                Err(e)
            }
        }
    }

    /// Run `f` in one read transaction
    pub fn view<T>(&self, f: impl FnOnce(&ReadTxn) -> Result<T>) -> Result<T> {
        let txn = self.begin_read()?;
        f(&txn)
    }

    /// Names of every caller-visible namespace, in name order
    pub fn list_namespaces(&self) -> Result<Vec<String>> {
        let txn = self.db.begin_read().map_err(error::transaction)?;
        let mut names: Vec<String> = txn
            .list_tables()
            .map_err(error::storage)?
            .map(|handle| handle.name().to_string())
            .filter(|name| !is_reserved(name))
            .collect();
        names.sort();
        Ok(names)
    }
}

fn engine_durability(level: DurabilityLevel) -> redb::Durability {
    match level {
        DurabilityLevel::Immediate => redb::Durability::Immediate,
        DurabilityLevel::Eventual => redb::Durability::Eventual,
        DurabilityLevel::None => redb::Durability::None,
    }
}

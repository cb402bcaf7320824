//! Write coalescing over the single-writer store
//!
//! Every write transaction pays the same fixed commit cost (ordering plus
//! durability sync), whether it carries one logical write or a thousand.
//! `BatchCoalescer` lets many concurrent callers share that cost: callers
//! submit write closures over a channel, a single collector thread groups
//! them and commits each group in one transaction, then fans the outcome
//! back to every caller.
//!
//! # Grouping policy
//!
//! A group starts with the first queued request and closes when it holds
//! `max_batch_size` requests or `max_wait` has elapsed since it started,
//! whichever comes first. Requests run in arrival order.
//!
//! # Failure semantics
//!
//! A group commits atomically or not at all. If any member fails, or the
//! commit itself fails, every member receives the same `CommitFailure` and
//! nothing from the group is visible. The coalescer never retries; a caller
//! that retries must tolerate at-least-once application of its write.
//!
//! # Thread Lifecycle
//!
//! - The collector thread is spawned by `new` and named `burrow-coalescer`
//! - `shutdown` closes the queue, commits what is already queued, then joins
//! - `Drop` performs the same shutdown

use burrow_core::{BatchConfig, Error, Result};
use burrow_storage::{Store, WriteTxn};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

type WriteOp = Box<dyn FnOnce(&WriteTxn) -> Result<()> + Send>;

struct Request {
    op: WriteOp,
    reply: SyncSender<Result<()>>,
}

/// Grouping bounds for a `BatchCoalescer`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalescerConfig {
    /// Maximum requests per physical commit
    pub max_batch_size: usize,
    /// Maximum time a partial group waits for more requests
    pub max_wait: Duration,
}

impl Default for CoalescerConfig {
    fn default() -> Self {
        Self::from(&BatchConfig::default())
    }
}

impl From<&BatchConfig> for CoalescerConfig {
    fn from(config: &BatchConfig) -> Self {
        Self {
            max_batch_size: config.max_size,
            max_wait: config.max_wait(),
        }
    }
}

/// Counters describing the groups committed so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoalescerStats {
    /// Groups whose transaction committed
    pub groups_committed: u64,
    /// Groups that were aborted
    pub groups_failed: u64,
    /// Requests that were part of a committed group
    pub requests_committed: u64,
    /// Requests that were part of an aborted group
    pub requests_failed: u64,
    /// Size of the largest group seen
    pub largest_group: usize,
}

/// Groups concurrent write requests into shared transactions
///
/// `BatchCoalescer` is `Send + Sync`; share it behind an `Arc` and call
/// `submit` from any number of threads.
pub struct BatchCoalescer {
    config: CoalescerConfig,
    sender: Mutex<Option<Sender<Request>>>,
    collector: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<Mutex<CoalescerStats>>,
}

impl BatchCoalescer {
    /// Start a coalescer committing into `store`
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `max_batch_size` is 0, `Io` if the collector
    /// thread cannot be spawned.
    pub fn new(store: Arc<Store>, config: CoalescerConfig) -> Result<Self> {
        if config.max_batch_size == 0 {
            return Err(Error::InvalidInput(
                "max_batch_size must be at least 1".to_string(),
            ));
        }

        let (sender, receiver) = mpsc::channel();
        let stats = Arc::new(Mutex::new(CoalescerStats::default()));
        let collector_stats = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name("burrow-coalescer".to_string())
            .spawn(move || collect_loop(&store, receiver, config, &collector_stats))?;

        Ok(Self {
            config,
            sender: Mutex::new(Some(sender)),
            collector: Mutex::new(Some(handle)),
            stats,
        })
    }

    /// Grouping bounds in effect
    pub fn config(&self) -> CoalescerConfig {
        self.config
    }

    /// Run `op` inside a shared write transaction and wait for the commit
    ///
    /// Returns `op`'s value once its group has committed. If the group is
    /// aborted, returns the group's `CommitFailure` even when `op` itself
    /// succeeded.
    ///
    /// # Errors
    ///
    /// - `CommitFailure` if any member of the group failed or the commit failed
    /// - `ReadOnly` if the store refuses writes
    /// - `CoalescerClosed` after `shutdown`
    pub fn submit<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&WriteTxn) -> Result<T> + Send + 'static,
    {
        let slot = Arc::new(Mutex::new(None));
        let out = Arc::clone(&slot);
        let op: WriteOp = Box::new(move |txn| {
            let value = op(txn)?;
            *out.lock() = Some(value);
            Ok(())
        });

        let (reply, outcome) = mpsc::sync_channel(1);
        let sender = self.sender.lock().clone().ok_or(Error::CoalescerClosed)?;
        sender
            .send(Request { op, reply })
            .map_err(|_| Error::CoalescerClosed)?;
        drop(sender);

        outcome.recv().map_err(|_| Error::CoalescerClosed)??;
        let value = slot.lock().take();
        value.ok_or_else(|| Error::Storage("committed request produced no value".to_string()))
    }

    /// Snapshot of the group counters
    pub fn stats(&self) -> CoalescerStats {
        self.stats.lock().clone()
    }

    /// Stop accepting requests, commit what is queued, join the collector
    ///
    /// Idempotent.
    pub fn shutdown(&self) {
        self.sender.lock().take();
        let handle = self.collector.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(target: "burrow::coalescer", "Collector thread panicked");
            }
        }
    }
}

impl Drop for BatchCoalescer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn collect_loop(
    store: &Store,
    receiver: Receiver<Request>,
    config: CoalescerConfig,
    stats: &Mutex<CoalescerStats>,
) {
    // Exits once every sender is gone and the queue is empty
    while let Ok(first) = receiver.recv() {
        let deadline = Instant::now() + config.max_wait;
        let mut group = vec![first];

        while group.len() < config.max_batch_size {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let next = if remaining.is_zero() {
                receiver.try_recv().ok()
            } else {
                receiver.recv_timeout(remaining).ok()
            };
            match next {
                Some(request) => group.push(request),
                None => break,
            }
        }

        commit_group(store, group, stats);
    }
    debug!(target: "burrow::coalescer", "Collector stopped");
}

fn commit_group(store: &Store, group: Vec<Request>, stats: &Mutex<CoalescerStats>) {
    let size = group.len();
    let (ops, replies): (Vec<WriteOp>, Vec<SyncSender<Result<()>>>) =
        group.into_iter().map(|r| (r.op, r.reply)).unzip();

    let started = Instant::now();
    let outcome = run_group(store, ops);

    {
        let mut stats = stats.lock();
        stats.largest_group = stats.largest_group.max(size);
        match &outcome {
            Ok(()) => {
                stats.groups_committed += 1;
                stats.requests_committed += size as u64;
            }
            Err(_) => {
                stats.groups_failed += 1;
                stats.requests_failed += size as u64;
            }
        }
    }

    match &outcome {
        Ok(()) => debug!(
            target: "burrow::coalescer",
            size,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Committed group"
        ),
        Err(e) => warn!(target: "burrow::coalescer", size, error = %e, "Group aborted"),
    }

    for reply in replies {
        let result = match &outcome {
            Ok(()) => Ok(()),
            Err(e) => Err(replicate(e)),
        };
        // The caller may have stopped waiting
        let _ = reply.send(result);
    }
}

fn run_group(store: &Store, ops: Vec<WriteOp>) -> Result<()> {
    let txn = store.begin_write()?;
    for (index, op) in ops.into_iter().enumerate() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| op(&txn)));
        let failure = match result {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => format!("request {} failed: {}", index, e),
            Err(_) => format!("request {} panicked", index),
        };
        txn.abort();
        return Err(Error::CommitFailure(failure));
    }
    txn.commit()
}

/// One copy of a group failure per member
fn replicate(e: &Error) -> Error {
    match e {
        Error::ReadOnly => Error::ReadOnly,
        Error::CommitFailure(msg) => Error::CommitFailure(msg.clone()),
        other => Error::CommitFailure(other.to_string()),
    }
}

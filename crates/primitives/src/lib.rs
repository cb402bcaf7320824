//! Primitives layer for burrowdb
//!
//! Provides typed record access as stateless facades over a `Store`:
//! - **Repository**: create/get/list/update/delete for one record kind
//! - **RangeScanner**: inclusive timestamp range scans over time-ordered kinds
//! - **NamespaceManager**: create and drop the well-known namespaces
//! - **User** / **Event**: the built-in record kinds
//!
//! ## Design Principle: Stateless Facades
//!
//! Every primitive holds only an `Arc<Store>` reference and delegates to
//! the transactional layer below. This means:
//!
//! - Multiple primitive instances on the same store are safe
//! - No warm-up or cache invalidation concerns
//! - Sequence counters live in the store, never in memory
//!
//! ## Coalesced writes
//!
//! Creating records one write transaction at a time pays a full commit per
//! record. Passing a `BatchCoalescer` to `Repository::create_batched` lets
//! concurrent creators share commits:
//!
//! ```rust,ignore
//! use burrow_primitives::{Repository, User};
//!
//! let users: Repository<User> = Repository::new(store.clone());
//! let key = users.create_batched(&coalescer, user)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event;
pub mod iter;
pub mod lifecycle;
pub mod range;
pub mod repository;
pub mod user;

pub use event::{Event, EVENTS};
pub use iter::RecordIter;
pub use lifecycle::NamespaceManager;
pub use range::RangeScanner;
pub use repository::Repository;
pub use user::{User, USERS};

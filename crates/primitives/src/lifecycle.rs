//! Namespace lifecycle: create the well-known namespaces, drop them again
//!
//! ## Semantics
//!
//! - `ensure_all` is idempotent and creates every missing namespace in one
//!   write transaction.
//! - `drop_all` deletes every namespace in one write transaction. If any is
//!   missing the whole drop aborts with `NamespaceMissing` and nothing is
//!   deleted.
//! - `drop_all_if_present` deletes whichever namespaces exist and never
//!   fails on absence.

use crate::event::EVENTS;
use crate::user::USERS;
use burrow_core::{validate_namespace, Result};
use burrow_storage::Store;
use std::sync::Arc;
use tracing::info;

/// Creates and drops a fixed set of namespaces
#[derive(Clone)]
pub struct NamespaceManager {
    store: Arc<Store>,
    names: Vec<String>,
}

impl NamespaceManager {
    /// Manage `names` on `store`
    ///
    /// # Errors
    ///
    /// `InvalidInput` if any name is empty, too long or reserved.
    pub fn new<I, S>(store: Arc<Store>, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut managed: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            validate_namespace(&name)?;
            if !managed.contains(&name) {
                managed.push(name);
            }
        }
        Ok(Self {
            store,
            names: managed,
        })
    }

    /// Manager for the built-in `Users` and `Events` namespaces
    pub fn standard(store: Arc<Store>) -> Self {
        Self {
            store,
            names: vec![USERS.to_string(), EVENTS.to_string()],
        }
    }

    /// Managed names, in the order given
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Create every managed namespace that does not exist yet
    ///
    /// Returns how many were created.
    pub fn ensure_all(&self) -> Result<usize> {
        let created = self.store.update(|txn| {
            let mut created = 0;
            for name in &self.names {
                if txn.create_namespace(name)? {
                    created += 1;
                }
            }
            Ok(created)
        })?;
        if created > 0 {
            info!(target: "burrow::storage", created, "Created namespaces");
        }
        Ok(created)
    }

    /// Delete every managed namespace and all records in it
    ///
    /// # Errors
    ///
    /// `NamespaceMissing` naming the first absent namespace; in that case
    /// none of the namespaces are deleted.
    pub fn drop_all(&self) -> Result<()> {
        self.store.update(|txn| {
            for name in &self.names {
                txn.delete_namespace(name)?;
            }
            Ok(())
        })?;
        info!(target: "burrow::storage", names = ?self.names, "Dropped namespaces");
        Ok(())
    }

    /// Delete whichever managed namespaces exist; returns how many were deleted
    pub fn drop_all_if_present(&self) -> Result<usize> {
        let dropped = self.store.update(|txn| {
            let mut dropped = 0;
            for name in &self.names {
                if txn.namespace_exists(name)? {
                    txn.delete_namespace(name)?;
                    dropped += 1;
                }
            }
            Ok(dropped)
        })?;
        if dropped > 0 {
            info!(target: "burrow::storage", dropped, "Dropped namespaces");
        }
        Ok(dropped)
    }
}

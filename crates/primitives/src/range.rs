//! Inclusive timestamp range scans over time-ordered records

use crate::iter::RecordIter;
use burrow_core::{time_range_bounds, Result, TimeOrdered};
use burrow_storage::Store;
use std::marker::PhantomData;
use std::ops::Bound;
use std::sync::Arc;
use tracing::trace;

/// Range queries over the namespace of a time-ordered record kind
///
/// A scan covers every record with `lower <= timestamp <= upper`, in key
/// order: ascending timestamp, then ascending tie-break sequence.
pub struct RangeScanner<R: TimeOrdered> {
    store: Arc<Store>,
    _kind: PhantomData<fn() -> R>,
}

impl<R: TimeOrdered> Clone for RangeScanner<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _kind: PhantomData,
        }
    }
}

impl<R: TimeOrdered> RangeScanner<R> {
    /// Create a scanner over `store`
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }

    /// Lazily yield every record with a timestamp in `[lower, upper]`
    ///
    /// The sequence reads one snapshot; writes committed after this call
    /// are not observed. `lower > upper` yields nothing. A malformed entry
    /// is yielded as an error and ends the sequence.
    ///
    /// # Errors
    ///
    /// `NamespaceMissing` if the namespace has not been created.
    pub fn scan(&self, lower: i64, upper: i64) -> Result<RecordIter<R>> {
        let txn = self.store.begin_read()?;
        if lower > upper {
            // Missing namespace still reported
            txn.namespace(R::NAMESPACE)?;
            return Ok(RecordIter::empty());
        }

        trace!(target: "burrow::storage", namespace = R::NAMESPACE, lower, upper, "Range scan");
        let (from, to) = time_range_bounds(lower, upper);
        let cursor = txn.into_cursor(
            R::NAMESPACE,
            Bound::Included(from.to_vec()),
            Bound::Included(to.to_vec()),
        )?;
        Ok(RecordIter::new(cursor))
    }

    /// Collect a whole scan, failing on the first malformed entry
    pub fn scan_collect(&self, lower: i64, upper: i64) -> Result<Vec<R>> {
        self.scan(lower, upper)?.collect()
    }
}

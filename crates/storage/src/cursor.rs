//! Forward cursor over one namespace
//!
//! `KvCursor` owns its read transaction, so the snapshot it walks stays
//! pinned until the cursor is dropped. Pairs are fetched from the engine in
//! fixed-size chunks and copied out, which keeps every engine-owned buffer
//! inside the scope that produced it.

use crate::error;
use crate::txn::{NamespaceView, ReadTxn};
use burrow_core::Result;
use std::collections::VecDeque;
use std::ops::Bound;

/// Pairs fetched per engine seek
const CHUNK_SIZE: usize = 256;

/// Lazy, finite, non-restartable iterator of `(key, value)` pairs
///
/// Yields pairs in ascending key order within `[lower, upper]` as given by
/// the bounds. After the first error the cursor is exhausted.
pub struct KvCursor {
    view: NamespaceView,
    _txn: ReadTxn,
    lower: Bound<Vec<u8>>,
    upper: Bound<Vec<u8>>,
    buffer: VecDeque<(Vec<u8>, Vec<u8>)>,
    done: bool,
}

impl KvCursor {
    pub(crate) fn new(
        txn: ReadTxn,
        view: NamespaceView,
        lower: Bound<Vec<u8>>,
        upper: Bound<Vec<u8>>,
    ) -> Self {
        Self {
            view,
            _txn: txn,
            lower,
            upper,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// Namespace being walked
    pub fn namespace(&self) -> &str {
        self.view.name()
    }

    fn refill(&mut self) -> Result<()> {
        let lower = as_slice_bound(&self.lower);
        let upper = as_slice_bound(&self.upper);
        let range = self
            .view
            .table
            .range::<&[u8]>((lower, upper))
            .map_err(error::storage)?;

        for entry in range.take(CHUNK_SIZE) {
            let (key, value) = entry.map_err(error::storage)?;
            self.buffer
                .push_back((key.value().to_vec(), value.value().to_vec()));
        }

        match self.buffer.back() {
            Some((last, _)) if self.buffer.len() == CHUNK_SIZE => {
                self.lower = Bound::Excluded(last.clone());
            }
            _ => self.done = true,
        }
        Ok(())
    }
}

fn as_slice_bound(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(key) => Bound::Included(key.as_slice()),
        Bound::Excluded(key) => Bound::Excluded(key.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

impl Iterator for KvCursor {
    type Item = Result<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.done {
            if let Err(e) = self.refill() {
                self.done = true;
                self.buffer.clear();
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

impl std::iter::FusedIterator for KvCursor {}

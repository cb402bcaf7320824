//! Typed record iteration over a namespace cursor

use burrow_core::{decode_record, Record, RecordKey, Result};
use burrow_storage::KvCursor;
use std::marker::PhantomData;

/// Lazy, finite, non-restartable sequence of decoded records
///
/// Holds its read transaction open until dropped or exhausted. Every key
/// and value is decoded; the first malformed entry is yielded as an error
/// and ends the sequence, so corruption is never skipped over.
pub struct RecordIter<R: Record> {
    cursor: Option<KvCursor>,
    _kind: PhantomData<fn() -> R>,
}

impl<R: Record> RecordIter<R> {
    pub(crate) fn new(cursor: KvCursor) -> Self {
        Self {
            cursor: Some(cursor),
            _kind: PhantomData,
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            cursor: None,
            _kind: PhantomData,
        }
    }

    fn decode(key: &[u8], value: &[u8]) -> Result<R> {
        R::Key::decode(key)?;
        decode_record(R::NAMESPACE, value)
    }
}

impl<R: Record> Iterator for RecordIter<R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self
            .cursor
            .as_mut()?
            .next()?
            .and_then(|(key, value)| Self::decode(&key, &value));
        if item.is_err() {
            // Releases the snapshot too
            self.cursor = None;
        }
        Some(item)
    }
}

impl<R: Record> std::iter::FusedIterator for RecordIter<R> {}

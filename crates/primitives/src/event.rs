//! Timed events, range-scannable by timestamp

use burrow_core::{Record, TimeKey, TimeOrdered};
use serde::{Deserialize, Serialize};

/// Namespace holding events
pub const EVENTS: &str = "Events";

/// A timed event
///
/// Stored under `(time, id)`, so events with equal timestamps stay distinct
/// and a key-range walk returns them in time order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Sequence assigned at creation; 0 until created
    pub id: u64,
    /// Unix timestamp (seconds) the event happened at
    pub time: i64,
    /// Event name
    pub name: String,
    /// Application-defined category
    #[serde(rename = "type")]
    pub kind: u8,
    /// Whether the event was cancelled
    pub cancel: bool,
}

impl Record for Event {
    const NAMESPACE: &'static str = EVENTS;
    type Key = TimeKey;

    fn key(&self) -> TimeKey {
        TimeKey::new(self.time, self.id)
    }

    fn assign_sequence(&mut self, seq: u64) {
        self.id = seq;
    }
}

impl TimeOrdered for Event {
    fn timestamp(&self) -> i64 {
        self.time
    }
}

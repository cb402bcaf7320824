//! User profiles keyed by sequence

use burrow_core::{Record, SequenceKey};
use serde::{Deserialize, Serialize};

/// Namespace holding user profiles
pub const USERS: &str = "Users";

/// A user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Sequence assigned at creation; 0 until created
    pub id: u64,
    /// Display name
    pub name: String,
    /// 0 or 1
    pub gender: u8,
    /// Age in years
    pub age: u8,
    /// Phone number
    pub phone: String,
    /// Email address
    pub email: String,
    /// Unix timestamp (seconds) of account creation
    pub created_at: i64,
}

impl Record for User {
    const NAMESPACE: &'static str = USERS;
    type Key = SequenceKey;

    fn key(&self) -> SequenceKey {
        SequenceKey(self.id)
    }

    fn assign_sequence(&mut self, seq: u64) {
        self.id = seq;
    }
}

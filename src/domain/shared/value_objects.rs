//! Shared value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Orchestrator-assigned session slot
///
/// `-1` marks a session that has not been bound to a slot yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(i32);

impl SessionId {
    pub const UNBOUND: SessionId = SessionId(-1);

    pub fn new(slot: i32) -> Self {
        Self(slot)
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }

    pub fn is_bound(&self) -> bool {
        self.0 != -1
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::UNBOUND
    }
}

impl From<i32> for SessionId {
    fn from(slot: i32) -> Self {
        Self(slot)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

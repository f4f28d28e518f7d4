//! Call log
//!
//! Bounded in-memory history of completed calls.

use crate::domain::call::CallType;
use crate::domain::ports::CallLog;
use crate::domain::shared::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// One completed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLogEntry {
    pub id: Uuid,
    pub call_type: CallType,
    pub number: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub duration: Duration,
}

#[derive(Default)]
struct Inner {
    entries: VecDeque<CallLogEntry>,
    unsaved: usize,
}

/// Call history keeping the most recent `max_entries` calls
pub struct CallHistory {
    inner: Mutex<Inner>,
    max_entries: usize,
}

impl CallHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_entries,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Most recent first
    pub fn recent(&self, count: usize) -> Vec<CallLogEntry> {
        self.lock().entries.iter().rev().take(count).cloned().collect()
    }

    pub fn by_type(&self, call_type: CallType) -> Vec<CallLogEntry> {
        self.lock()
            .entries
            .iter()
            .filter(|e| e.call_type == call_type)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries added since the last save
    pub fn unsaved(&self) -> usize {
        self.lock().unsaved
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.unsaved = 0;
    }
}

impl Default for CallHistory {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl CallLog for CallHistory {
    fn add_call(
        &self,
        call_type: CallType,
        number: &str,
        name: &str,
        timestamp: DateTime<Utc>,
        duration: Duration,
    ) {
        let mut inner = self.lock();
        inner.entries.push_back(CallLogEntry {
            id: Uuid::new_v4(),
            call_type,
            number: number.to_string(),
            name: name.to_string(),
            timestamp,
            duration,
        });
        inner.unsaved += 1;

        while inner.entries.len() > self.max_entries {
            inner.entries.pop_front();
        }
    }

    fn save(&self) -> Result<()> {
        let mut inner = self.lock();
        debug!("Call log saved ({} new entries)", inner.unsaved);
        inner.unsaved = 0;
        Ok(())
    }
}

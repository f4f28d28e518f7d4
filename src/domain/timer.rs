//! Per-session countdown timers
//!
//! A session owns one timer per [`TimerKind`]. Every run of a timer is tagged
//! with an epoch; the expiry callback hands that epoch back so a fire that was
//! overtaken by a stop (or by a later restart) can be recognised and dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Timer kinds used by the call state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Far end or local user did not answer in time
    NoReply,
    /// Hold-off between release and returning to idle
    Released,
}

impl TimerKind {
    pub const ALL: [TimerKind; 2] = [TimerKind::NoReply, TimerKind::Released];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerKind::NoReply => "no_reply",
            TimerKind::Released => "released",
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoked once per run when the countdown elapses, with the run's epoch
pub type ExpiryCallback = Arc<dyn Fn(TimerKind, u64) + Send + Sync>;

/// A single startable/stoppable countdown
pub trait Timer: Send {
    fn kind(&self) -> TimerKind;

    fn interval(&self) -> Duration;

    fn set_interval(&mut self, interval: Duration);

    /// Arm the countdown for run `epoch`. Returns false if already running.
    fn start(&mut self, epoch: u64) -> bool;

    /// Cancel the countdown. Returns false if it was not running.
    fn stop(&mut self) -> bool;

    fn is_running(&self) -> bool;
}

/// Creates timers wired to an expiry callback
pub trait TimerFactory: Send + Sync {
    fn create(
        &self,
        kind: TimerKind,
        interval: Duration,
        on_expiry: ExpiryCallback,
    ) -> Box<dyn Timer>;
}

struct Slot {
    timer: Box<dyn Timer>,
    armed: Option<u64>,
}

/// Timers of one session keyed by kind
///
/// An empty registry is valid: every operation reports failure.
#[derive(Default)]
pub struct TimerRegistry {
    slots: HashMap<TimerKind, Slot>,
    next_epoch: u64,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, timer: Box<dyn Timer>) {
        self.slots.insert(timer.kind(), Slot { timer, armed: None });
    }

    pub fn start(&mut self, kind: TimerKind) -> bool {
        let Some(slot) = self.slots.get_mut(&kind) else {
            return false;
        };
        if slot.armed.is_some() {
            debug!("Timer {} already running", kind);
            return false;
        }

        self.next_epoch += 1;
        let epoch = self.next_epoch;
        if slot.timer.start(epoch) {
            slot.armed = Some(epoch);
            true
        } else {
            false
        }
    }

    pub fn stop(&mut self, kind: TimerKind) -> bool {
        let Some(slot) = self.slots.get_mut(&kind) else {
            return false;
        };
        if slot.armed.take().is_none() {
            return false;
        }
        slot.timer.stop();
        true
    }

    pub fn stop_all(&mut self) {
        for kind in TimerKind::ALL {
            self.stop(kind);
        }
    }

    pub fn is_running(&self, kind: TimerKind) -> bool {
        self.slots
            .get(&kind)
            .map(|slot| slot.armed.is_some())
            .unwrap_or(false)
    }

    /// Consume a fire notification.
    ///
    /// Returns true only if `epoch` is the currently armed run; the timer is
    /// then considered stopped. Stale fires return false.
    pub fn accept_expiry(&mut self, kind: TimerKind, epoch: u64) -> bool {
        let Some(slot) = self.slots.get_mut(&kind) else {
            return false;
        };
        if slot.armed != Some(epoch) {
            debug!("Dropping stale {} expiry (epoch {})", kind, epoch);
            return false;
        }
        slot.armed = None;
        slot.timer.stop();
        true
    }
}

//! Call session data

use crate::domain::shared::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Classification written to the call log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Dialed,
    Received,
    Missed,
    Undefined,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Dialed => "dialed",
            CallType::Received => "received",
            CallType::Missed => "missed",
            CallType::Undefined => "undefined",
        }
    }
}

/// Why the call is heading to Released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseCause {
    /// Local user hung up
    LocalRelease,
    /// Far end hung up or cancelled
    RemoteRelease,
    /// Local user declined an incoming call
    LocalReject,
    /// Far end declined an outgoing call
    RemoteReject,
    /// No-reply timer ran out
    NoReply,
}

/// Metadata of one call, owned by its state machine
#[derive(Debug, Clone)]
pub struct CallSession {
    pub(crate) session: SessionId,
    pub(crate) call_type: CallType,
    pub(crate) calling_number: String,
    pub(crate) calling_name: String,
    pub(crate) incoming: bool,
    pub(crate) is_held: bool,
    pub(crate) is_3pty: bool,
    pub(crate) counting: bool,
    pub(crate) hold_requested: bool,
    pub(crate) retrieve_requested: bool,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) duration: Duration,
    pub(crate) release_cause: Option<ReleaseCause>,
    talk_started: Option<Instant>,
}

impl CallSession {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            call_type: CallType::Undefined,
            calling_number: String::new(),
            calling_name: String::new(),
            incoming: false,
            is_held: false,
            is_3pty: false,
            counting: false,
            hold_requested: false,
            retrieve_requested: false,
            timestamp: Utc::now(),
            duration: Duration::ZERO,
            release_cause: None,
            talk_started: None,
        }
    }

    /// Reset per-call data for a new setup.
    pub(crate) fn begin(&mut self, call_type: CallType, number: &str, name: &str, incoming: bool) {
        self.call_type = call_type;
        self.calling_number = number.to_string();
        self.calling_name = name.to_string();
        self.incoming = incoming;
        self.timestamp = Utc::now();
        self.duration = Duration::ZERO;
        self.counting = false;
        self.talk_started = None;
        self.release_cause = None;
    }

    /// Begin or resume talk-time accrual.
    ///
    /// The first call marks the talk start; resuming after hold keeps it.
    pub(crate) fn start_counting(&mut self) {
        if self.talk_started.is_none() {
            self.talk_started = Some(Instant::now());
            self.timestamp = Utc::now();
        }
        self.counting = true;
    }

    /// Stop accrual and finalize `duration`.
    pub(crate) fn stop_counting(&mut self) {
        if !self.counting {
            return;
        }
        self.duration = self.elapsed();
        self.counting = false;
    }

    fn elapsed(&self) -> Duration {
        self.talk_started
            .map(|started| Instant::now().saturating_duration_since(started))
            .unwrap_or(Duration::ZERO)
    }

    /// Live talk time; zero whenever not counting.
    pub fn runtime_duration(&self) -> Duration {
        if self.counting {
            self.elapsed()
        } else {
            Duration::ZERO
        }
    }

    /// Whether teardown should produce a call-log entry
    pub fn should_log(&self) -> bool {
        match self.call_type {
            CallType::Undefined => false,
            CallType::Dialed => !self.calling_number.is_empty(),
            CallType::Received | CallType::Missed => true,
        }
    }

    pub(crate) fn clear_transient_flags(&mut self) {
        self.hold_requested = false;
        self.retrieve_requested = false;
        self.is_held = false;
        self.is_3pty = false;
        self.release_cause = None;
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn call_type(&self) -> CallType {
        self.call_type
    }

    pub fn calling_number(&self) -> &str {
        &self.calling_number
    }

    pub fn calling_name(&self) -> &str {
        &self.calling_name
    }

    pub fn is_incoming(&self) -> bool {
        self.incoming
    }

    pub fn is_held(&self) -> bool {
        self.is_held
    }

    pub fn is_3pty(&self) -> bool {
        self.is_3pty
    }

    pub fn is_counting(&self) -> bool {
        self.counting
    }

    pub fn hold_requested(&self) -> bool {
        self.hold_requested
    }

    pub fn retrieve_requested(&self) -> bool {
        self.retrieve_requested
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Finalized talk time; meaningful once counting has stopped.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn release_cause(&self) -> Option<ReleaseCause> {
        self.release_cause
    }
}

//! Call states
//!
//! Each state is a stateless unit type implementing [`CallState`], selected
//! by its [`StateId`]. Event handlers only look at and annotate the call
//! data and pick the next state; timers, tones and signaling are touched
//! exclusively from entry and exit actions, which receive the machine
//! explicitly.

use super::event::{ReleaseOrigin, SetupRequest};
use super::machine::StateMachine;
use super::session::{CallSession, ReleaseCause};
use super::states::{Active, Alerting, Connecting, Holding, Idle, Incoming, Released};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one of the seven call states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateId {
    Idle,
    Connecting,
    Alerting,
    Active,
    Released,
    Incoming,
    Holding,
}

impl StateId {
    pub const ALL: [StateId; 7] = [
        StateId::Idle,
        StateId::Connecting,
        StateId::Alerting,
        StateId::Active,
        StateId::Released,
        StateId::Incoming,
        StateId::Holding,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StateId::Idle => "Idle",
            StateId::Connecting => "Connecting",
            StateId::Alerting => "Alerting",
            StateId::Active => "Active",
            StateId::Released => "Released",
            StateId::Incoming => "Incoming",
            StateId::Holding => "Holding",
        }
    }

    /// Handler implementing this state
    pub fn handler(&self) -> &'static dyn CallState {
        match self {
            StateId::Idle => &Idle,
            StateId::Connecting => &Connecting,
            StateId::Alerting => &Alerting,
            StateId::Active => &Active,
            StateId::Released => &Released,
            StateId::Incoming => &Incoming,
            StateId::Holding => &Holding,
        }
    }

    /// Still ringing, either direction
    pub fn is_unanswered(&self) -> bool {
        matches!(
            self,
            StateId::Connecting | StateId::Alerting | StateId::Incoming
        )
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Common event surface of every call state
///
/// Events a state does not handle return `None` and are ignored.
pub trait CallState: Send + Sync {
    fn id(&self) -> StateId;

    fn on_entry(&self, _machine: &mut StateMachine, _from: StateId) {}

    fn on_exit(&self, _machine: &mut StateMachine, _to: StateId) {}

    fn on_setup(&self, _call: &mut CallSession, _request: &SetupRequest) -> Option<StateId> {
        None
    }

    fn on_alerting(&self, _call: &mut CallSession) -> Option<StateId> {
        None
    }

    fn on_accept(&self, _call: &mut CallSession) -> Option<StateId> {
        None
    }

    fn on_reject(&self, _call: &mut CallSession) -> Option<StateId> {
        None
    }

    fn on_hold_request(&self, _call: &mut CallSession) -> Option<StateId> {
        None
    }

    fn on_retrieve_request(&self, _call: &mut CallSession) -> Option<StateId> {
        None
    }

    /// Release is honoured from every state that has a call in progress.
    fn on_release(&self, call: &mut CallSession, origin: ReleaseOrigin) -> Option<StateId> {
        call.release_cause = Some(match origin {
            ReleaseOrigin::Local => ReleaseCause::LocalRelease,
            ReleaseOrigin::Remote => ReleaseCause::RemoteRelease,
        });
        Some(StateId::Released)
    }

    fn on_no_reply_timer_expired(&self, _call: &mut CallSession) -> Option<StateId> {
        None
    }

    fn on_released_timer_expired(&self, _call: &mut CallSession) -> Option<StateId> {
        None
    }
}

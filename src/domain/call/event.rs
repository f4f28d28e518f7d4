//! Events delivered to the active call state

use crate::domain::timer::TimerKind;
use serde::{Deserialize, Serialize};

/// Direction of a new call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    /// Far end is calling us
    Incoming,
    /// We are calling the far end
    Outgoing,
}

/// Which side asked to end the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseOrigin {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupRequest {
    pub direction: CallDirection,
    pub number: String,
    pub name: String,
}

impl SetupRequest {
    pub fn outgoing(number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            direction: CallDirection::Outgoing,
            number: number.into(),
            name: name.into(),
        }
    }

    pub fn incoming(number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            direction: CallDirection::Incoming,
            number: number.into(),
            name: name.into(),
        }
    }
}

/// Call control event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallEvent {
    /// New call, either dialed locally or arriving from the far end
    Setup(SetupRequest),
    /// Far end is ringing
    Alerting,
    /// Call answered (by the far end for outgoing, locally for incoming)
    Accept,
    /// Call declined (by us for incoming, by the far end for outgoing)
    Reject,
    HoldRequest,
    RetrieveRequest,
    Release(ReleaseOrigin),
    NoReplyTimerExpired,
    ReleasedTimerExpired,
}

impl CallEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CallEvent::Setup(_) => "setup",
            CallEvent::Alerting => "alerting",
            CallEvent::Accept => "accept",
            CallEvent::Reject => "reject",
            CallEvent::HoldRequest => "hold_request",
            CallEvent::RetrieveRequest => "retrieve_request",
            CallEvent::Release(_) => "release",
            CallEvent::NoReplyTimerExpired => "no_reply_timer_expired",
            CallEvent::ReleasedTimerExpired => "released_timer_expired",
        }
    }

    /// Event produced when a timer of `kind` fires
    pub fn timer_expired(kind: TimerKind) -> Self {
        match kind {
            TimerKind::NoReply => CallEvent::NoReplyTimerExpired,
            TimerKind::Released => CallEvent::ReleasedTimerExpired,
        }
    }
}

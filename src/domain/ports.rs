//! Collaborator contracts
//!
//! The state machine references these handles but never owns their
//! lifetime: the orchestrator creates the signaling proxies and the media
//! subsystem owns the media proxy.

use crate::domain::call::CallType;
use crate::domain::shared::{Result, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Tones the media proxy can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Ringback,
    Ring,
    Busy,
}

/// Multi-call orchestrator hooks
#[cfg_attr(test, mockall::automock)]
pub trait Orchestrator: Send + Sync {
    /// Refresh whatever views depend on `session`
    fn update_gui(&self, session: SessionId);

    /// Release the slot held for `session`
    fn destroy_session(&self, session: SessionId);

    /// Run any queued cross-session action
    fn activate_pending_action(&self);
}

/// Signaling transport for one call
#[cfg_attr(test, mockall::automock)]
pub trait SignalingProxy: Send + Sync {
    fn session_id(&self) -> SessionId;

    fn set_session_id(&self, session: SessionId);

    fn setup(&self, number: &str, name: &str);

    fn alerting(&self);

    fn connect(&self);

    fn reject(&self);

    fn release(&self);

    fn hold(&self);

    fn retrieve(&self);
}

#[cfg_attr(test, mockall::automock)]
pub trait SignalingProxyFactory: Send + Sync {
    fn create(&self, session: SessionId) -> Arc<dyn SignalingProxy>;
}

/// Tone playback
#[cfg_attr(test, mockall::automock)]
pub trait MediaProxy: Send + Sync {
    fn play_tone(&self, tone: Tone);

    fn stop_tone(&self);
}

/// Append-only log of completed calls
#[cfg_attr(test, mockall::automock)]
pub trait CallLog: Send + Sync {
    fn add_call(
        &self,
        call_type: CallType,
        number: &str,
        name: &str,
        timestamp: DateTime<Utc>,
        duration: Duration,
    );

    fn save(&self) -> Result<()>;
}

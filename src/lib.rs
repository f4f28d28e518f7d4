//! callfsm - per-call state machine for telephony sessions
//!
//! Governs the lifecycle of one call: state transitions, timer-driven
//! timeouts, coordination with the signaling and media proxies, and the
//! call-log entry written at teardown.

pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use domain::call::{CallEvent, CallSnapshot, CallType, SessionDeps, StateId, StateMachine};
pub use domain::shared::error::FsmError;
pub use domain::shared::result::Result;
pub use domain::shared::SessionId;
pub use infrastructure::{spawn_session, SessionHandle};

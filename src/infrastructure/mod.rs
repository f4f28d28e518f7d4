//! Infrastructure layer - Runtime implementations
//!
//! This layer contains:
//! - Tokio-backed countdown timers
//! - The per-session actor that serializes state machine access

pub mod session_actor;
pub mod timer;

pub use session_actor::{spawn_session, SessionHandle};
pub use timer::{TokioTimer, TokioTimerFactory};

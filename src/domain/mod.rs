//! Domain layer - call control logic and the ports it talks through
//!
//! This layer contains:
//! - The per-call state machine and its seven states
//! - Timer ports and the per-session timer registry
//! - Collaborator contracts (orchestrator, proxies, call log)
//! - An in-memory call log implementation

pub mod call;
pub mod call_log;
pub mod ports;
pub mod shared;
pub mod timer;

// Re-export commonly used types
pub use shared::{FsmError, Result};

//! Result alias

use super::error::FsmError;

/// Standard result type for crate operations
pub type Result<T> = std::result::Result<T, FsmError>;

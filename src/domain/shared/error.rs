//! Crate errors

use thiserror::Error;

/// Errors surfaced outside the state machine itself.
///
/// The machine reports timer failures as booleans and ignores unknown
/// events; these variants cover the layers around it.
#[derive(Error, Debug)]
pub enum FsmError {
    #[error("Session {0} is closed")]
    SessionClosed(String),

    #[error("Session {0} has already been destroyed")]
    AlreadyDestroyed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

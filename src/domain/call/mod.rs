//! Call bounded context - per-call state machine

pub mod event;
pub mod machine;
pub mod session;
pub mod state;
pub mod states;

#[cfg(test)]
pub(crate) mod testing;

pub use event::{CallDirection, CallEvent, ReleaseOrigin, SetupRequest};
pub use machine::{CallSnapshot, SessionDeps, StateMachine};
pub use session::{CallSession, CallType, ReleaseCause};
pub use state::{CallState, StateId};

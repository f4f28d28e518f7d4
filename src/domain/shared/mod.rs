//! Shared kernel - types used across the call and timer modules

pub mod error;
pub mod result;
pub mod value_objects;

pub use error::FsmError;
pub use result::Result;
pub use value_objects::*;

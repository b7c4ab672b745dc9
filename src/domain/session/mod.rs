//! Session domain module

mod state;

pub use state::{
    Affordances, InvalidStateTransition, SessionId, SessionKind, SessionMachine, SessionState,
};

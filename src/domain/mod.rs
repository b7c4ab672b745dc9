//! Domain layer - Core business logic
//!
//! Contains value objects, entities, the session state machine and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod recording;
pub mod session;

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use recording::{ClipNamer, Duration, Recording, RecordingStore};
pub use session::{SessionId, SessionKind, SessionMachine, SessionState};

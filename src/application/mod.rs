//! Application layer - Use cases and port interfaces
//!
//! Contains the session coordinator and the trait definitions
//! for external system interactions.

pub mod coordinator;
pub mod ports;
pub mod ticker;

// Re-export use cases
pub use coordinator::{
    CoordinatorChannels, CoordinatorError, Notification, Progress, SessionCoordinator, Transition,
};
pub use ticker::FrameTicker;

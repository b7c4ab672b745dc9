//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod audio_cue;
pub mod capture;
pub mod config;
pub mod events;
pub mod playback;
pub mod storage;

// Re-export common types
pub use audio_cue::{AudioCue, AudioCueError, AudioCueType};
pub use capture::{
    CaptureBackend, CaptureError, CLIP_BITS_PER_SAMPLE, CLIP_CHANNELS, CLIP_SAMPLE_RATE,
};
pub use config::ConfigStore;
pub use events::{BackendEvent, BackendEventKind, SessionSink};
pub use playback::{PlaybackBackend, PlaybackError};
pub use storage::{ClipStorage, StorageError};

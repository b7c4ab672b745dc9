//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with cpal, rodio and the local filesystem.

pub mod audio_cue;
pub mod capture;
pub mod config;
pub mod playback;
pub mod storage;

// Re-export adapters
pub use audio_cue::{create_audio_cue, NoOpAudioCue, RodioAudioCue};
pub use capture::CpalCapture;
pub use config::XdgConfigStore;
pub use playback::RodioPlayback;
pub use storage::TempDirStorage;

//! Playback port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use super::SessionSink;
use crate::domain::recording::Duration;

/// Playback errors
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Failed to open clip for playback: {0}")]
    OpenFailed(String),

    #[error("Failed to decode clip: {0}")]
    DecodeFailed(String),
}

/// Port for clip playback
#[async_trait]
pub trait PlaybackBackend: Send + Sync {
    /// Loaded clip, valid from `load` until `stop`
    type Handle: Send;

    /// Open and pre-buffer the clip at `location`, paused.
    ///
    /// The sink reports exactly once if the clip ends or fails to decode
    /// before `stop` is called.
    async fn load(&self, location: &Path, sink: SessionSink)
        -> Result<Self::Handle, PlaybackError>;

    /// Start output
    async fn play(&self, handle: &mut Self::Handle) -> Result<(), PlaybackError>;

    /// Stop output and release the device. Never fails.
    async fn stop(&self, handle: Self::Handle);

    /// Current position; cheap enough to call every frame
    fn position(&self, handle: &Self::Handle) -> Duration;
}

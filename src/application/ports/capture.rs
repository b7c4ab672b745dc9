//! Capture port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use super::SessionSink;
use crate::domain::recording::Duration;

/// Sample rate of every captured clip
pub const CLIP_SAMPLE_RATE: u32 = 44_100;

/// Channel count of every captured clip
pub const CLIP_CHANNELS: u16 = 2;

/// Bits per sample of every captured clip
pub const CLIP_BITS_PER_SAMPLE: u16 = 16;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Microphone access denied")]
    PermissionDenied,

    #[error("No audio input device available")]
    NoAudioDevice,

    #[error("Failed to open capture stream: {0}")]
    OpenFailed(String),

    #[error("Failed to encode captured audio: {0}")]
    EncodeFailed(String),
}

/// Port for microphone capture.
///
/// A capture goes through `prepare`, `start`, then `stop`. Failures that
/// happen between `start` and `stop` are reported through the sink given to
/// `prepare`.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Open stream, valid from `prepare` until `stop`
    type Handle: Send;

    /// Ask for microphone access and set up duplex routing.
    /// Any failure counts as denied.
    async fn request_permission(&self) -> bool;

    /// Open a capture stream writing to `destination`.
    ///
    /// # Arguments
    /// * `destination` - Fresh file path for the clip
    /// * `sink` - Reporter for asynchronous encoder failures
    async fn prepare(
        &self,
        destination: &Path,
        sink: SessionSink,
    ) -> Result<Self::Handle, CaptureError>;

    /// Begin capturing into the prepared destination
    async fn start(&self, handle: &mut Self::Handle) -> Result<(), CaptureError>;

    /// Stop the stream, finish the file and return the captured length
    async fn stop(&self, handle: Self::Handle) -> Result<Duration, CaptureError>;

    /// Captured length so far; cheap enough to call every frame
    fn elapsed(&self, handle: &Self::Handle) -> Duration;
}

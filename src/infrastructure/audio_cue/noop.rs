//! Silent audio cue, used when `cues` is off

use async_trait::async_trait;

use crate::application::ports::{AudioCue, AudioCueError, AudioCueType};

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAudioCue;

#[async_trait]
impl AudioCue for NoOpAudioCue {
    async fn play(&self, _cue_type: AudioCueType) -> Result<(), AudioCueError> {
        Ok(())
    }
}

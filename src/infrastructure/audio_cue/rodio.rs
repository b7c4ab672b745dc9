//! Rodio-based audio cue adapter
//!
//! Synthesized taps marking the start and end of playback.

use std::time::Duration;

use async_trait::async_trait;
use rodio::source::{SineWave, Source, Zero};
use rodio::{OutputStream, Sink};
use tracing::debug;

use crate::application::ports::{AudioCue, AudioCueError, AudioCueType};

const CUE_RATE: u32 = 44_100;
const LOUDNESS: f32 = 0.3;

/// One tone of a cue followed by an optional pause
#[derive(Debug, Clone, Copy)]
struct Tap {
    freq: f32,
    millis: u64,
    pause_after: u64,
}

const START_TAPS: &[Tap] = &[
    Tap { freq: 440.0, millis: 40, pause_after: 25 },
    Tap { freq: 587.0, millis: 70, pause_after: 0 },
];

const STOP_TAPS: &[Tap] = &[
    Tap { freq: 587.0, millis: 40, pause_after: 0 },
    Tap { freq: 440.0, millis: 50, pause_after: 0 },
];

/// Rising pair for start, falling and quieter pair for stop
fn taps(cue_type: AudioCueType) -> (&'static [Tap], f32) {
    match cue_type {
        AudioCueType::PlaybackStart => (START_TAPS, LOUDNESS),
        AudioCueType::PlaybackStop => (STOP_TAPS, LOUDNESS * 0.8),
    }
}

/// Cue player on the default output device
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioAudioCue;

impl RodioAudioCue {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioCue for RodioAudioCue {
    async fn play(&self, cue_type: AudioCueType) -> Result<(), AudioCueError> {
        tokio::task::spawn_blocking(move || play_blocking(cue_type))
            .await
            .map_err(|e| AudioCueError::PlaybackFailed(format!("Task join error: {}", e)))?
    }
}

fn tone(tap: Tap, amplitude: f32) -> impl Source<Item = f32> + Send {
    let fade = Duration::from_millis((tap.millis / 5).min(30));
    SineWave::new(tap.freq)
        .take_duration(Duration::from_millis(tap.millis))
        .fade_in(fade)
        .amplify(amplitude)
}

fn pause(millis: u64) -> impl Source<Item = f32> + Send {
    Zero::<f32>::new(1, CUE_RATE).take_duration(Duration::from_millis(millis))
}

fn play_blocking(cue_type: AudioCueType) -> Result<(), AudioCueError> {
    let (_stream, handle) = OutputStream::try_default()
        .map_err(|e| AudioCueError::DeviceNotAvailable(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| AudioCueError::PlaybackFailed(e.to_string()))?;

    let (sequence, amplitude) = taps(cue_type);
    for tap in sequence {
        sink.append(tone(*tap, amplitude));
        if tap.pause_after > 0 {
            sink.append(pause(tap.pause_after));
        }
    }

    sink.sleep_until_end();
    debug!(?cue_type, "Cue played");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_rises_and_stop_falls() {
        let (start, _) = taps(AudioCueType::PlaybackStart);
        let (stop, _) = taps(AudioCueType::PlaybackStop);
        assert!(start[0].freq < start[start.len() - 1].freq);
        assert!(stop[0].freq > stop[stop.len() - 1].freq);
    }

    #[test]
    fn stop_is_quieter_than_start() {
        let (_, start) = taps(AudioCueType::PlaybackStart);
        let (_, stop) = taps(AudioCueType::PlaybackStop);
        assert!(stop < start);
    }

    #[tokio::test]
    #[ignore = "Requires audio hardware"]
    async fn can_play_both_cues() {
        let cue = RodioAudioCue::new();
        assert!(cue.play(AudioCueType::PlaybackStart).await.is_ok());
        assert!(cue.play(AudioCueType::PlaybackStop).await.is_ok());
    }
}

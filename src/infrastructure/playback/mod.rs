//! Playback infrastructure module

mod rodio_playback;

pub use rodio_playback::{RodioPlayback, RodioPlaybackHandle};

//! Duration value object

use std::fmt;

/// Value object representing the length of a clip or a playback position.
/// Immutable, millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Zero length
    pub const ZERO: Self = Self::from_millis(0);

    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Create a Duration from a count of audio frames at the given rate.
    /// A zero rate yields zero.
    pub fn from_frames(frames: u64, sample_rate: u32) -> Self {
        if sample_rate == 0 {
            return Self::ZERO;
        }
        Self::from_millis(frames.saturating_mul(1000) / u64::from(sample_rate))
    }

    /// Get duration in whole seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }
}

impl fmt::Display for Duration {
    /// Formats as `mm:ss`; minutes wrap at one hour.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.as_secs();
        let seconds = total_secs % 60;
        let minutes = (total_secs / 60) % 60;
        write!(f, "{:02}:{:02}", minutes, seconds)
    }
}

//! Recording entity

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::Duration;

/// One captured clip.
///
/// Only the title is mutable. The location is owned exclusively by this
/// recording: removing the recording from the store removes the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    title: String,
    capture_date: DateTime<Local>,
    duration: Duration,
    location: PathBuf,
}

impl Recording {
    /// Create a new recording
    pub fn new(
        title: impl Into<String>,
        capture_date: DateTime<Local>,
        duration: Duration,
        location: impl Into<PathBuf>,
    ) -> Self {
        Self {
            title: title.into(),
            capture_date,
            duration,
            location: location.into(),
        }
    }

    /// Display title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// When the clip was captured
    pub fn capture_date(&self) -> DateTime<Local> {
        self.capture_date
    }

    /// Captured length
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Path of the audio file
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Localized short date and time, e.g. `14/03/2023 10:42`
    pub fn printable_date(&self) -> String {
        self.capture_date.format("%x %H:%M").to_string()
    }

    pub(super) fn set_title(&mut self, title: String) {
        self.title = title;
    }
}

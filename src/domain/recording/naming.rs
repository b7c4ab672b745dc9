//! Clip file naming

/// Base name of every captured clip
pub const CLIP_BASE_NAME: &str = "recording";

/// File extension of every captured clip
pub const CLIP_EXTENSION: &str = "wav";

/// Generates `recording_<n>.wav` names.
///
/// The counter starts at 0, only moves forward, and is advanced before a
/// capture attempt is made, so a number is never handed out twice even
/// when the attempt fails.
#[derive(Debug, Default)]
pub struct ClipNamer {
    next: u64,
}

impl ClipNamer {
    /// Create a namer starting at 0
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate the next file name
    pub fn next_name(&mut self) -> String {
        let name = format!("{}_{}.{}", CLIP_BASE_NAME, self.next, CLIP_EXTENSION);
        self.next += 1;
        name
    }
}

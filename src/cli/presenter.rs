//! CLI presenter for output formatting

use std::io::{self, Write};
use std::path::Path;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::Progress;
use crate::domain::recording::{Duration, Recording};
use crate::domain::session::Affordances;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message.
    /// The spinner advances on [`Presenter::update_spinner`], not on its own.
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        self.spinner = Some(spinner);
    }

    /// Update spinner message and advance it one frame
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
            spinner.tick();
        }
    }

    /// Whether a spinner is showing
    pub fn has_spinner(&self) -> bool {
        self.spinner.is_some()
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        self.suspend(|| eprintln!("{} {}", "ℹ".cyan(), message));
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        self.suspend(|| eprintln!("{} {}", "✓".green(), message));
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        self.suspend(|| eprintln!("{} {}", "⚠".yellow(), message));
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        self.suspend(|| eprintln!("{} {}", "✗".red(), message));
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        self.suspend(|| println!("{}", text));
    }

    /// Run `f` with the spinner line hidden
    fn suspend(&self, f: impl FnOnce()) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }

    /// Print the shell prompt
    pub fn prompt(&self) {
        self.suspend(|| {
            print!("{} ", ">".bold());
            let _ = io::stdout().flush();
        });
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Format one row of the recordings list. `index` is 1-based.
    pub fn format_row(&self, index: usize, recording: &Recording, playing: bool) -> String {
        let marker = if playing { "▶".green().to_string() } else { " ".to_string() };
        format!(
            "{} {:>3}. {:<28} {:>5}  {}",
            marker,
            index,
            recording.title(),
            recording.duration().to_string(),
            recording.printable_date().dimmed()
        )
    }

    /// Print the recordings list, newest first
    pub fn recordings(&self, recordings: &[Recording], playing: Option<&Path>) {
        if recordings.is_empty() {
            self.output(&"No recordings yet. Type 'record' to make one.".dimmed().to_string());
            return;
        }
        for (i, recording) in recordings.iter().enumerate() {
            let is_playing = playing == Some(recording.location());
            self.output(&self.format_row(i + 1, recording, is_playing));
        }
    }

    /// Format the live timer line
    pub fn format_progress(&self, progress: &Progress) -> String {
        match progress {
            Progress::Capturing(elapsed) => format!("{} {}", "● REC".red().bold(), elapsed),
            Progress::Playing { target, position } => format!(
                "{} {} {}",
                "▶".green(),
                file_name(target),
                position
            ),
        }
    }

    /// Print the session status line
    pub fn status(&self, state: &str, affordances: Affordances, count: usize) {
        let flag = |enabled: bool| if enabled { "on".green() } else { "off".red() };
        self.suspend(|| {
            eprintln!(
                "{} {} | record: {} | play: {} | {} recording(s)",
                "●".cyan(),
                state,
                flag(affordances.capture_enabled),
                flag(affordances.playback_enabled),
                count
            )
        });
    }

    /// Print the shell command summary
    pub fn help(&self) {
        let commands = [
            ("record", "start a capture, or stop and keep the running one"),
            ("stop", "stop the running capture or playback"),
            ("discard", "stop the running capture without keeping it"),
            ("play <n>", "play recording n, or stop it if it is playing"),
            ("list", "show recordings, newest first"),
            ("rename <n> <title>", "change the title of recording n"),
            ("delete <n>", "delete recording n and its file"),
            ("status", "show the session state"),
            ("help", "show this help"),
            ("quit", "stop everything and exit"),
        ];
        for (command, description) in commands {
            println!("  {:<20} {}", command.cyan(), description);
        }
    }

    /// Message for a finished capture
    pub fn capture_saved(&self, title: &str, duration: Duration) {
        self.success(&format!("Saved {} ({})", title, duration));
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use std::path::PathBuf;

    fn recording() -> Recording {
        let date = Local.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap();
        Recording::new(
            "recording_0.wav",
            date,
            Duration::from_secs(75),
            "/tmp/voice-memos/recording_0.wav",
        )
    }

    #[test]
    fn row_shows_index_title_and_duration() {
        colored::control::set_override(false);
        let presenter = Presenter::new();
        let row = presenter.format_row(1, &recording(), false);
        assert!(row.contains("1. recording_0.wav"));
        assert!(row.contains("01:15"));
    }

    #[test]
    fn row_marks_playing() {
        colored::control::set_override(false);
        let presenter = Presenter::new();
        assert!(presenter.format_row(2, &recording(), true).starts_with('▶'));
    }

    #[test]
    fn prompt_with_spinner_does_not_drop_it() {
        let mut presenter = Presenter::new();
        presenter.start_spinner("capturing");
        presenter.prompt();
        assert!(presenter.has_spinner());
        presenter.stop_spinner();
        presenter.prompt();
        assert!(!presenter.has_spinner());
    }

    #[test]
    fn capture_progress_shows_elapsed() {
        colored::control::set_override(false);
        let presenter = Presenter::new();
        let line = presenter.format_progress(&Progress::Capturing(Duration::from_secs(5)));
        assert_eq!(line, "● REC 00:05");
    }

    #[test]
    fn playback_progress_shows_file_name() {
        colored::control::set_override(false);
        let presenter = Presenter::new();
        let line = presenter.format_progress(&Progress::Playing {
            target: PathBuf::from("/tmp/voice-memos/recording_3.wav"),
            position: Duration::from_millis(2500),
        });
        assert_eq!(line, "▶ recording_3.wav 00:02");
    }
}

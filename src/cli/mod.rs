//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal handling,
//! shell command parsing and the interactive shell runner.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod presenter;
pub mod shell;
pub mod signals;

// Re-export commonly used types
pub use app::{run_shell, EXIT_ERROR, EXIT_SUCCESS};
pub use args::{Cli, Commands, ConfigAction};
pub use presenter::Presenter;
pub use shell::{ParseError, ShellCommand};

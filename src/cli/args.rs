//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::config::AppConfig;

/// Voice Memos - record, list and play back short audio clips
#[derive(Parser, Debug)]
#[command(name = "voice-memos")]
#[command(version)]
#[command(about = "Record, list and play back short audio clips from the terminal")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory for clip files (default: <temp>/voice-memos)
    #[arg(short = 's', long, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Refresh rate of the live timer in frames per second
    #[arg(short = 'r', long, value_name = "HZ", value_parser = clap::value_parser!(u32).range(1..=240))]
    pub frame_rate: Option<u32>,

    /// Play a short tone when playback starts and stops
    #[arg(short = 'c', long)]
    pub cues: bool,

    /// Log filter for stderr diagnostics (e.g. warn, info, voice_memos=debug)
    #[arg(long, value_name = "LEVEL", env = "VOICE_MEMOS_LOG")]
    pub log_level: Option<String>,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Settings given on the command line, as a partial config
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            storage_dir: self.storage_dir.clone(),
            frame_rate: self.frame_rate,
            cues: if self.cues { Some(true) } else { None },
            log_level: self.log_level.clone(),
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &["storage_dir", "frame_rate", "cues", "log_level"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default refresh rate of the live timer, in frames per second
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Highest accepted refresh rate
pub const MAX_FRAME_RATE: u32 = 240;

/// Default tracing filter when neither RUST_LOG nor config set one
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Name of the directory created under the system temp dir for clips
pub const STORAGE_DIR_NAME: &str = "voice-memos";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage_dir: Option<PathBuf>,
    pub frame_rate: Option<u32>,
    pub cues: Option<bool>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Create config with default values.
    /// `storage_dir` stays unset: the temp dir is resolved at run time.
    pub fn defaults() -> Self {
        Self {
            storage_dir: None,
            frame_rate: Some(DEFAULT_FRAME_RATE),
            cues: Some(false),
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            storage_dir: other.storage_dir.or(self.storage_dir),
            frame_rate: other.frame_rate.or(self.frame_rate),
            cues: other.cues.or(self.cues),
            log_level: other.log_level.or(self.log_level),
        }
    }

    /// Directory where clips are written, or `<temp>/voice-memos`
    pub fn storage_dir_or_default(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(STORAGE_DIR_NAME))
    }

    /// Frame rate clamped to 1..=MAX_FRAME_RATE, or the default
    pub fn frame_rate_or_default(&self) -> u32 {
        self.frame_rate
            .map(|r| r.clamp(1, MAX_FRAME_RATE))
            .unwrap_or(DEFAULT_FRAME_RATE)
    }

    /// Get cues setting, or false if not set
    pub fn cues_or_default(&self) -> bool {
        self.cues.unwrap_or(false)
    }

    /// Get log filter, or "warn" if not set
    pub fn log_level_or_default(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert!(config.storage_dir.is_none());
        assert_eq!(config.frame_rate, Some(60));
        assert_eq!(config.cues, Some(false));
        assert_eq!(config.log_level, Some("warn".to_string()));
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.storage_dir.is_none());
        assert!(config.frame_rate.is_none());
        assert!(config.cues.is_none());
        assert!(config.log_level.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            frame_rate: Some(30),
            cues: Some(false),
            ..Default::default()
        };

        let other = AppConfig {
            frame_rate: None,
            cues: Some(true),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.frame_rate, Some(30));
        assert_eq!(merged.cues, Some(true));
        assert_eq!(merged.log_level, Some("debug".to_string()));
    }

    #[test]
    fn merge_preserves_base_when_other_is_none() {
        let base = AppConfig {
            storage_dir: Some(PathBuf::from("/data/clips")),
            ..Default::default()
        };

        let merged = base.merge(AppConfig::empty());
        assert_eq!(merged.storage_dir, Some(PathBuf::from("/data/clips")));
    }

    #[test]
    fn storage_dir_defaults_to_temp() {
        let config = AppConfig::empty();
        let dir = config.storage_dir_or_default();
        assert!(dir.starts_with(std::env::temp_dir()));
        assert!(dir.ends_with(STORAGE_DIR_NAME));
    }

    #[test]
    fn frame_rate_is_clamped() {
        let zero = AppConfig {
            frame_rate: Some(0),
            ..Default::default()
        };
        let huge = AppConfig {
            frame_rate: Some(10_000),
            ..Default::default()
        };
        assert_eq!(zero.frame_rate_or_default(), 1);
        assert_eq!(huge.frame_rate_or_default(), MAX_FRAME_RATE);
        assert_eq!(AppConfig::empty().frame_rate_or_default(), DEFAULT_FRAME_RATE);
    }

    #[test]
    fn boolean_and_string_defaults() {
        let config = AppConfig::empty();
        assert!(!config.cues_or_default());
        assert_eq!(config.log_level_or_default(), "warn");
    }
}

//! Stride Configuration
//!
//! Config file: $STRIDE_CONFIG, or ~/.config/stride/config.toml
//! Every field has a default, so partial files are fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::progress::{DEFAULT_CODE_LANGUAGE, REVISION_CAP, REVISION_LIST_DEFAULT};
use crate::streaks::StreakPolicy;
use crate::tasks::SCHEDULE_WINDOW_MONTHS;

/// Progress tracking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Language stamped on freshly cloned problems
    #[serde(default = "default_code_language")]
    pub default_code_language: String,

    /// Revisions kept per problem, at most 50
    #[serde(default = "default_revision_cap")]
    pub revision_cap: usize,

    /// Revisions listed when no limit is given
    #[serde(default = "default_revision_list")]
    pub revision_list_default: usize,
}

fn default_code_language() -> String {
    DEFAULT_CODE_LANGUAGE.to_string()
}

fn default_revision_cap() -> usize {
    REVISION_CAP
}

fn default_revision_list() -> usize {
    REVISION_LIST_DEFAULT
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            default_code_language: default_code_language(),
            revision_cap: default_revision_cap(),
            revision_list_default: default_revision_list(),
        }
    }
}

/// Scheduling settings for tasks and workout logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_window_months")]
    pub window_months: u32,
}

fn default_window_months() -> u32 {
    SCHEDULE_WINDOW_MONTHS
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            window_months: default_window_months(),
        }
    }
}

/// Where progress documents live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stride")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Main Stride configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrideConfig {
    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub streaks: StreakPolicy,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl StrideConfig {
    /// Default user config path: ~/.config/stride/config.toml
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stride").join("config.toml"))
    }

    /// Load configuration
    ///
    /// Priority:
    /// 1. Explicit path (must exist)
    /// 2. $STRIDE_CONFIG (must exist)
    /// 3. User config (~/.config/stride/config.toml), if present
    /// 4. Defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        if let Ok(env_path) = std::env::var("STRIDE_CONFIG") {
            return Self::load_from(Path::new(&env_path));
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::load_from(&user_path);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: StrideConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StrideConfig::default();
        assert_eq!(config.progress.default_code_language, "cpp");
        assert_eq!(config.progress.revision_cap, 50);
        assert_eq!(config.streaks.completion_threshold, 0.75);
        assert_eq!(config.streaks.skip_lookback_days, 30);
        assert_eq!(config.streaks.max_lookback_days, 365);
        assert_eq!(config.schedule.window_months, 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: StrideConfig = toml::from_str(
            r#"
            [streaks]
            completion_threshold = 0.5

            [progress]
            default_code_language = "python"
            "#,
        )
        .unwrap();
        assert_eq!(config.streaks.completion_threshold, 0.5);
        assert_eq!(config.streaks.max_lookback_days, 365);
        assert_eq!(config.progress.default_code_language, "python");
        assert_eq!(config.progress.revision_cap, 50);
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut saved = StrideConfig::default();
        saved.schedule.window_months = 6;
        saved.storage.data_dir = dir.path().join("data");
        saved.save_to(&path).unwrap();

        let loaded = StrideConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StrideConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}

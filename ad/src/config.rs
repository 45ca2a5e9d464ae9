//! alarmdesk configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::EngineConfig;

/// Main alarmdesk configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Alarm engine settings
    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration with fallback chain:
    /// explicit path, `./.alarmdesk.yml`, `~/.config/alarmdesk/alarmdesk.yml`, defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::default_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.engine.validate().context("Invalid engine section")
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".alarmdesk.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("alarmdesk").join("alarmdesk.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::domain::MessagePolicy;

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "log-level: debug\nengine:\n  lanes: 4\n  report-interval-secs: 5\n  message-policy: truncate"
        )
        .unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.engine.lanes, 4);
        assert_eq!(config.engine.report_interval_secs, 5);
        assert_eq!(config.engine.message_policy, MessagePolicy::Truncate);
        assert_eq!(config.engine.reporter_poll_ms, 250);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yml");
        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("nope.yml"));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "engine: [not, a, map]").unwrap();
        assert!(Config::load(Some(&file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_log_level_only() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "log-level: warn").unwrap();
        assert_eq!(
            Config::load_log_level(Some(&file.path().to_path_buf())).as_deref(),
            Some("warn")
        );
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let yaml = Config::default().to_yaml().unwrap();
        assert!(yaml.contains("lanes: 2"));
        assert!(yaml.contains("message-policy: reject"));
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_validate_catches_bad_engine() {
        let config = Config {
            engine: EngineConfig {
                event_capacity: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

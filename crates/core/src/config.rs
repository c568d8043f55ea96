//! Report configuration (`runlog.toml`).
//!
//! Every field has a default, so an empty file and a missing `--config` flag
//! behave the same:
//! ```toml
//! [display]
//! timezone = "source"   # or "local" (host zone) or "utc"
//! time_format = "%H:%M:%S"
//!
//! [content]
//! long_content_lines = 5
//! ```

use crate::time::DisplayTimezone;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted when no `--config` flag is given.
pub const CONFIG_ENV: &str = "RUNLOG_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid time_format {0:?}")]
    InvalidTimeFormat(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub content: ContentSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub timezone: DisplayTimezone,
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            timezone: DisplayTimezone::Source,
            time_format: default_time_format(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSettings {
    /// A tool result with at least this many newlines is flagged as long.
    #[serde(default = "default_long_content_lines")]
    pub long_content_lines: usize,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            long_content_lines: default_long_content_lines(),
        }
    }
}

fn default_time_format() -> String {
    "%H:%M:%S".to_string()
}

fn default_long_content_lines() -> usize {
    5
}

impl ReportConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load from `explicit`, else from `$RUNLOG_CONFIG`, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    /// chrono panics when formatting with a bad strftime string, so reject it
    /// up front.
    fn validate(&self) -> Result<(), ConfigError> {
        let bad = StrftimeItems::new(&self.display.time_format)
            .any(|item| matches!(item, Item::Error));
        if bad {
            return Err(ConfigError::InvalidTimeFormat(self.display.time_format.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ReportConfig::from_toml_str("").unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.display.time_format, "%H:%M:%S");
        assert_eq!(config.content.long_content_lines, 5);
        assert_eq!(config.display.timezone, DisplayTimezone::Source);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config = ReportConfig::from_toml_str("[display]\ntimezone = \"utc\"\n").unwrap();
        assert_eq!(config.display.timezone, DisplayTimezone::Utc);
        assert_eq!(config.display.time_format, "%H:%M:%S");
    }

    #[test]
    fn accepts_every_timezone_name() {
        for (name, zone) in [
            ("source", DisplayTimezone::Source),
            ("local", DisplayTimezone::Local),
            ("utc", DisplayTimezone::Utc),
        ] {
            let raw = format!("[display]\ntimezone = \"{name}\"\n");
            assert_eq!(ReportConfig::from_toml_str(&raw).unwrap().display.timezone, zone);
        }
    }

    #[test]
    fn rejects_bad_time_format() {
        let err = ReportConfig::from_toml_str("[display]\ntime_format = \"%Q\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeFormat(_)));
    }

    #[test]
    fn rejects_unknown_timezone() {
        let err = ReportConfig::from_toml_str("[display]\ntimezone = \"mars\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runlog.toml");
        std::fs::write(&path, "[content]\nlong_content_lines = 2\n").unwrap();
        let config = ReportConfig::resolve(Some(&path)).unwrap();
        assert_eq!(config.content.long_content_lines, 2);

        let missing = ReportConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}

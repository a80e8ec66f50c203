use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[serde(alias = "warning")]
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Spec string understood by flexi_logger
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// `[logging]` section. Missing keys take the values from `Default`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub level: LogLevel,
    /// Mirror log lines to stdout. This draws over the grid, so only for debugging.
    pub console: bool,
    pub append: bool,
    pub rotate: bool,
    /// File size in MB that triggers rotation
    pub rotate_size_mb: u64,
    /// Rotated files kept around
    pub rotate_keep: u32,
    /// Overrides the platform data dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LogLevel::Info,
            console: false,
            append: true,
            rotate: true,
            rotate_size_mb: 10,
            rotate_keep: 5,
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: LoggingConfig = toml::from_str("level = \"warning\"\nrotate = false").unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert!(!config.rotate);
        assert!(config.enabled);
        assert_eq!(config.rotate_keep, 5);
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        assert!(toml::from_str::<LoggingConfig>("level = \"loud\"").is_err());
    }
}

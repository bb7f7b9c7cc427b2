//! Logging configuration
//!
//! Thresholds can come from a JSON document, a file or the environment:
//!
//! ```json
//! { "console": "warning", "syslog": "none" }
//! ```

use crate::level::{parse_threshold, ParseLevelError};
use crate::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the console threshold
pub const CONSOLE_LEVEL_ENV: &str = "ERRCHAIN_CONSOLE_LEVEL";
/// Environment variable holding the system log threshold
pub const SYSLOG_LEVEL_ENV: &str = "ERRCHAIN_SYSLOG_LEVEL";

/// Errors raised while loading a [`LogConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read log config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {var}: {source}")]
    Env {
        var: &'static str,
        #[source]
        source: ParseLevelError,
    },
}

/// Sink thresholds. `None` disables the sink; the default disables both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default, with = "threshold")]
    pub console: Option<LogLevel>,
    #[serde(default, with = "threshold")]
    pub syslog: Option<LogLevel>,
}

impl LogConfig {
    /// Set the console threshold
    pub fn with_console(mut self, level: Option<LogLevel>) -> Self {
        self.console = level;
        self
    }

    /// Set the system log threshold
    pub fn with_syslog(mut self, level: Option<LogLevel>) -> Self {
        self.syslog = level;
        self
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Read [`CONSOLE_LEVEL_ENV`] and [`SYSLOG_LEVEL_ENV`]. Unset variables
    /// leave the sink disabled.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &'static str| -> Result<Option<LogLevel>, ConfigError> {
            match lookup(var) {
                Some(value) => {
                    parse_threshold(&value).map_err(|source| ConfigError::Env { var, source })
                }
                None => Ok(None),
            }
        };

        Ok(Self {
            console: read(CONSOLE_LEVEL_ENV)?,
            syslog: read(SYSLOG_LEVEL_ENV)?,
        })
    }
}

/// Serde adapter writing a disabled threshold as `"none"`
mod threshold {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(level: &Option<LogLevel>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(level.map(|l| l.as_str()).unwrap_or("none"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<LogLevel>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_threshold(&raw).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_disables_everything() {
        let config = LogConfig::default();
        assert_eq!(config.console, None);
        assert_eq!(config.syslog, None);
    }

    #[test]
    fn test_from_json() {
        let config = LogConfig::from_json(r#"{"console": "wrn", "syslog": "off"}"#).unwrap();
        assert_eq!(config.console, Some(LogLevel::Warning));
        assert_eq!(config.syslog, None);

        let config = LogConfig::from_json(r#"{"syslog": "error"}"#).unwrap();
        assert_eq!(config.console, None);
        assert_eq!(config.syslog, Some(LogLevel::Error));
    }

    #[test]
    fn test_from_json_rejects_unknown_level() {
        let err = LogConfig::from_json(r#"{"console": "chatty"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("chatty"));
    }

    #[test]
    fn test_json_roundtrip_uses_names() {
        let config = LogConfig::default().with_console(Some(LogLevel::Debug));
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"console":"debug","syslog":"none"}"#);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"console": "info"}}"#).unwrap();

        let config = LogConfig::from_file(file.path()).unwrap();
        assert_eq!(config.console, Some(LogLevel::Info));
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = LogConfig::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(CONSOLE_LEVEL_ENV, "debug"), (SYSLOG_LEVEL_ENV, "none")]);
        let config = LogConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.console, Some(LogLevel::Debug));
        assert_eq!(config.syslog, None);

        let err = LogConfig::from_lookup(|k| {
            (k == SYSLOG_LEVEL_ENV).then(|| "bogus".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: SYSLOG_LEVEL_ENV, .. }));
    }
}

//! Log severity levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity of a log message.
///
/// Levels are totally ordered, `Debug < Info < Warning < Error`. A sink with
/// threshold `t` emits every message whose level is `>= t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Development traces
    Debug,
    /// Informational messages
    Info,
    /// Non-fatal conditions
    Warning,
    /// Failures
    Error,
}

impl LogLevel {
    /// All levels, least severe first
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
    ];

    /// Lowercase name, as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }

    /// Three-letter tag used as the line prefix on the console and syslog
    pub fn tag(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DBG",
            LogLevel::Info => "INF",
            LogLevel::Warning => "WRN",
            LogLevel::Error => "ERR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known level
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level '{0}'")]
pub struct ParseLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "info" | "inf" => Ok(LogLevel::Info),
            "warning" | "warn" | "wrn" => Ok(LogLevel::Warning),
            "error" | "err" => Ok(LogLevel::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Parse a sink threshold, where `none` / `off` / `disabled` mean the sink is off.
pub fn parse_threshold(s: &str) -> Result<Option<LogLevel>, ParseLevelError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "none" | "off" | "disabled" => Ok(None),
        _ => s.parse().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert_eq!(LogLevel::ALL.iter().max(), Some(&LogLevel::Error));
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("WRN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!(" Error ".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert_eq!("dbg".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("off").unwrap(), None);
        assert_eq!(parse_threshold("NONE").unwrap(), None);
        assert_eq!(parse_threshold("info").unwrap(), Some(LogLevel::Info));
        assert_eq!(
            parse_threshold("loud").unwrap_err(),
            ParseLevelError("loud".to_string())
        );
    }

    #[test]
    fn test_tags() {
        assert_eq!(LogLevel::Error.tag(), "ERR");
        assert_eq!(LogLevel::Warning.to_string(), "warning");
    }
}

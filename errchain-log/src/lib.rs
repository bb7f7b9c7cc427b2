//! # errchain-log
//!
//! Message logging for errchain, independent of error chains.
//!
//! ## Sinks
//!
//! - **Console**: stderr, enabled by a threshold
//! - **System log**: `syslog(3)`, enabled by a threshold
//! - **Callback**: one process-wide closure that receives every message and
//!   filters by level itself
//!
//! A message reaches a threshold sink when `level >= threshold`. All sinks
//! start disabled.
//!
//! ## Usage
//!
//! ```rust
//! use errchain_log::{log_warn, LogLevel};
//!
//! errchain_log::set_console_level(Some(LogLevel::Warning));
//! log_warn!("datastore {} is read-only", "running");
//! ```

mod config;
mod level;
mod logger;
mod sink;

pub use config::{ConfigError, LogConfig, CONSOLE_LEVEL_ENV, SYSLOG_LEVEL_ENV};
pub use level::{parse_threshold, LogLevel, ParseLevelError};
pub use logger::{
    clear_callback, configure, format_message, log, log_plugin, logger, set_callback,
    set_console_level, set_syslog_level, LogCallback, Logger, MAX_MESSAGE_LEN,
};
pub use sink::{ConsoleSink, LogSink, MemorySink, SystemLogSink};

/// Log at error level through the process-wide logger
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::log($crate::LogLevel::Error, format_args!($($arg)+))
    };
}

/// Log at warning level through the process-wide logger
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => {
        $crate::log($crate::LogLevel::Warning, format_args!($($arg)+))
    };
}

/// Log at info level through the process-wide logger
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::log($crate::LogLevel::Info, format_args!($($arg)+))
    };
}

/// Log at debug level through the process-wide logger
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::log($crate::LogLevel::Debug, format_args!($($arg)+))
    };
}

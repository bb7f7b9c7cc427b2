//! The logger and its process-wide instance

use crate::sink::{ConsoleSink, LogSink, SystemLogSink};
use crate::{LogConfig, LogLevel};
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex, PoisonError};

/// Longest message handed to a sink, in bytes
pub const MAX_MESSAGE_LEN: usize = 2048;

/// Appended when a `Display` implementation fails mid-message
const FORMAT_FAILED: &str = " <formatting failed>";

/// Callback receiving every logged message: `(from_plugin, level, message)`
pub type LogCallback = Arc<dyn Fn(bool, LogLevel, &str) + Send + Sync>;

/// Everything `log` reads, swapped as one value
#[derive(Clone, Default)]
struct Settings {
    console: Option<LogLevel>,
    syslog: Option<LogLevel>,
    callback: Option<LogCallback>,
}

impl Settings {
    fn console_wants(&self, level: LogLevel) -> bool {
        self.console.is_some_and(|threshold| level >= threshold)
    }

    fn syslog_wants(&self, level: LogLevel) -> bool {
        self.syslog.is_some_and(|threshold| level >= threshold)
    }

    fn wants(&self, level: LogLevel) -> bool {
        self.callback.is_some() || self.console_wants(level) || self.syslog_wants(level)
    }
}

/// Dispatches messages to the console, the system log and a callback.
///
/// Readers take a snapshot of the settings without locking, so `log` may be
/// called from any number of threads. Configuration calls serialize on a
/// mutex that is released before any message is dispatched.
pub struct Logger {
    settings: ArcSwap<Settings>,
    update: Mutex<()>,
    console: Box<dyn LogSink>,
    system: Box<dyn LogSink>,
}

impl Logger {
    /// Logger writing to stderr and syslog, all sinks disabled
    pub fn new() -> Self {
        Self::with_sinks(Box::new(ConsoleSink), Box::new(SystemLogSink))
    }

    /// Logger with custom console and system log sinks, all sinks disabled
    pub fn with_sinks(console: Box<dyn LogSink>, system: Box<dyn LogSink>) -> Self {
        Self {
            settings: ArcSwap::from_pointee(Settings::default()),
            update: Mutex::new(()),
            console,
            system,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Current console threshold
    pub fn console_level(&self) -> Option<LogLevel> {
        self.settings.load().console
    }

    /// Current system log threshold
    pub fn syslog_level(&self) -> Option<LogLevel> {
        self.settings.load().syslog
    }

    /// Whether a callback is registered
    pub fn has_callback(&self) -> bool {
        self.settings.load().callback.is_some()
    }

    /// Current thresholds
    pub fn config(&self) -> LogConfig {
        let settings = self.settings.load();
        LogConfig {
            console: settings.console,
            syslog: settings.syslog,
        }
    }

    /// Apply both thresholds from a config; the callback is left alone
    pub fn configure(&self, config: &LogConfig) {
        self.update(|settings| {
            settings.console = config.console;
            settings.syslog = config.syslog;
        });
    }

    /// Enable (`Some`) or disable (`None`) console output
    pub fn set_console_level(&self, level: Option<LogLevel>) {
        self.update(|settings| settings.console = level);
    }

    /// Enable (`Some`) or disable (`None`) system log output
    pub fn set_syslog_level(&self, level: Option<LogLevel>) {
        self.update(|settings| settings.syslog = level);
    }

    /// Register the process callback, replacing any previous one
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(bool, LogLevel, &str) + Send + Sync + 'static,
    {
        let callback: LogCallback = Arc::new(callback);
        self.update(|settings| settings.callback = Some(callback));
    }

    /// Unregister the callback
    pub fn clear_callback(&self) {
        self.update(|settings| settings.callback = None);
    }

    fn update(&self, change: impl FnOnce(&mut Settings)) {
        let _guard = self.update.lock().unwrap_or_else(PoisonError::into_inner);

        let previous = self.settings.load_full();
        let mut next = (*previous).clone();
        change(&mut next);

        match (previous.syslog.is_some(), next.syslog.is_some()) {
            (false, true) => self.system.open(),
            (true, false) => self.system.close(),
            _ => {}
        }

        self.settings.store(Arc::new(next));
    }

    // =========================================================================
    // Logging
    // =========================================================================

    /// Log a message from the library itself
    pub fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.emit(false, level, args);
    }

    /// Log a message on behalf of a plugin; only the callback can tell the difference
    pub fn log_plugin(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.emit(true, level, args);
    }

    /// Log an already-formatted message. Performs no allocation of its own.
    pub fn log_str(&self, level: LogLevel, message: &str) {
        let settings = self.settings.load_full();
        if settings.wants(level) {
            self.dispatch(&settings, false, level, message);
        }
    }

    fn emit(&self, plugin: bool, level: LogLevel, args: fmt::Arguments<'_>) {
        let settings = self.settings.load_full();
        if !settings.wants(level) {
            return;
        }

        let message = format_message(args);
        self.dispatch(&settings, plugin, level, &message);
    }

    fn dispatch(&self, settings: &Settings, plugin: bool, level: LogLevel, message: &str) {
        let message = clip(message, MAX_MESSAGE_LEN);

        if settings.console_wants(level) {
            self.console.write(level, message);
        }
        if settings.syslog_wants(level) {
            self.system.write(level, message);
        }
        if let Some(callback) = &settings.callback {
            callback(plugin, level, message);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.settings.load();
        f.debug_struct("Logger")
            .field("console", &settings.console)
            .field("syslog", &settings.syslog)
            .field("callback", &settings.callback.is_some())
            .field("console_sink", &self.console.name())
            .field("system_sink", &self.system.name())
            .finish()
    }
}

/// Format `args` into a message.
///
/// Static messages are borrowed without allocating. A `Display` impl that
/// fails leaves the partial text followed by a `<formatting failed>` marker.
pub fn format_message(args: fmt::Arguments<'_>) -> Cow<'static, str> {
    if let Some(message) = args.as_str() {
        return Cow::Borrowed(message);
    }

    let mut message = String::new();
    if message.write_fmt(args).is_err() {
        message.push_str(FORMAT_FAILED);
    }
    Cow::Owned(message)
}

fn clip(message: &str, max: usize) -> &str {
    if message.len() <= max {
        return message;
    }
    let mut end = max;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

// =============================================================================
// Process-wide logger
// =============================================================================

static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// The process-wide logger
pub fn logger() -> &'static Logger {
    &LOGGER
}

/// Log through the process-wide logger
pub fn log(level: LogLevel, args: fmt::Arguments<'_>) {
    LOGGER.log(level, args);
}

/// Log a plugin message through the process-wide logger
pub fn log_plugin(level: LogLevel, args: fmt::Arguments<'_>) {
    LOGGER.log_plugin(level, args);
}

/// Set the process-wide console threshold
pub fn set_console_level(level: Option<LogLevel>) {
    LOGGER.set_console_level(level);
}

/// Set the process-wide system log threshold
pub fn set_syslog_level(level: Option<LogLevel>) {
    LOGGER.set_syslog_level(level);
}

/// Register the process-wide callback
pub fn set_callback<F>(callback: F)
where
    F: Fn(bool, LogLevel, &str) + Send + Sync + 'static,
{
    LOGGER.set_callback(callback);
}

/// Unregister the process-wide callback
pub fn clear_callback() {
    LOGGER.clear_callback();
}

/// Apply a config to the process-wide logger
pub fn configure(config: &LogConfig) {
    LOGGER.configure(config);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySink;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn memory_logger() -> (Logger, Arc<MemorySink>, Arc<MemorySink>) {
        let console = Arc::new(MemorySink::new());
        let system = Arc::new(MemorySink::new());
        let logger = Logger::with_sinks(Box::new(console.clone()), Box::new(system.clone()));
        (logger, console, system)
    }

    #[test]
    fn test_disabled_by_default() {
        let (logger, console, system) = memory_logger();
        logger.log(LogLevel::Error, format_args!("nobody listens"));
        assert!(console.is_empty());
        assert!(system.is_empty());
        assert_eq!(logger.config(), LogConfig::default());
    }

    #[test]
    fn test_console_threshold() {
        let (logger, console, _) = memory_logger();
        logger.set_console_level(Some(LogLevel::Warning));

        logger.log(LogLevel::Debug, format_args!("debug"));
        logger.log(LogLevel::Info, format_args!("info"));
        logger.log(LogLevel::Warning, format_args!("warning {}", 1));
        logger.log(LogLevel::Error, format_args!("error {}", 2));

        assert_eq!(
            console.lines(),
            vec![
                (LogLevel::Warning, "warning 1".to_string()),
                (LogLevel::Error, "error 2".to_string()),
            ]
        );
    }

    #[test]
    fn test_callback_ignores_thresholds() {
        let (logger, console, _) = memory_logger();
        logger.set_console_level(Some(LogLevel::Warning));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        logger.set_callback(move |plugin, level, message| {
            sink.lock().unwrap().push((plugin, level, message.to_string()));
        });

        logger.log(LogLevel::Debug, format_args!("trace {}", "x"));

        assert!(console.is_empty());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(false, LogLevel::Debug, "trace x".to_string())]
        );
    }

    #[test]
    fn test_sinks_are_independent() {
        let (logger, console, system) = memory_logger();
        logger.set_console_level(Some(LogLevel::Error));
        logger.set_syslog_level(Some(LogLevel::Info));

        logger.log(LogLevel::Info, format_args!("info"));
        logger.log(LogLevel::Error, format_args!("error"));

        assert_eq!(console.len(), 1);
        assert_eq!(system.len(), 2);
    }

    #[test]
    fn test_syslog_opened_and_closed() {
        let (logger, _, system) = memory_logger();
        assert!(!system.is_open());

        logger.set_syslog_level(Some(LogLevel::Warning));
        assert!(system.is_open());

        logger.set_syslog_level(Some(LogLevel::Debug));
        assert!(system.is_open());

        logger.configure(&LogConfig::default());
        assert!(!system.is_open());
        assert_eq!(logger.syslog_level(), None);
    }

    #[test]
    fn test_plugin_flag_reaches_callback() {
        let (logger, _, _) = memory_logger();
        let plugin_calls = Arc::new(AtomicUsize::new(0));
        let counter = plugin_calls.clone();
        logger.set_callback(move |plugin, _, _| {
            if plugin {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        logger.log(LogLevel::Info, format_args!("library"));
        logger.log_plugin(LogLevel::Info, format_args!("plugin"));

        assert_eq!(plugin_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_callback() {
        let (logger, _, _) = memory_logger();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        logger.set_callback(move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(logger.has_callback());

        logger.log(LogLevel::Info, format_args!("one"));
        logger.clear_callback();
        logger.log(LogLevel::Info, format_args!("two"));

        assert!(!logger.has_callback());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_message_formatted_once_for_all_sinks() {
        struct Counted<'a>(&'a AtomicUsize);
        impl fmt::Display for Counted<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fetch_add(1, Ordering::SeqCst);
                f.write_str("counted")
            }
        }

        let (logger, console, system) = memory_logger();
        logger.set_console_level(Some(LogLevel::Debug));
        logger.set_syslog_level(Some(LogLevel::Debug));
        logger.set_callback(|_, _, _| {});

        let formats = AtomicUsize::new(0);
        logger.log(LogLevel::Info, format_args!("{}", Counted(&formats)));

        assert_eq!(formats.load(Ordering::SeqCst), 1);
        assert_eq!(console.lines()[0].1, "counted");
        assert_eq!(system.lines()[0].1, "counted");
    }

    #[test]
    fn test_nothing_formatted_when_no_sink_listens() {
        struct Panicky;
        impl fmt::Display for Panicky {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("must not be formatted");
            }
        }

        let (logger, _, _) = memory_logger();
        logger.set_console_level(Some(LogLevel::Error));
        logger.log(LogLevel::Debug, format_args!("{}", Panicky));
    }

    #[test]
    fn test_failing_display_does_not_crash() {
        struct Broken;
        impl fmt::Display for Broken {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                Err(fmt::Error)
            }
        }

        let (logger, console, _) = memory_logger();
        logger.set_console_level(Some(LogLevel::Debug));
        logger.log(LogLevel::Warning, format_args!("value: {}", Broken));

        let lines = console.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].1.starts_with("value: "));
        assert!(lines[0].1.ends_with("<formatting failed>"));
    }

    #[test]
    fn test_long_messages_clipped_on_char_boundary() {
        let (logger, console, _) = memory_logger();
        logger.set_console_level(Some(LogLevel::Debug));

        let long = "é".repeat(MAX_MESSAGE_LEN);
        logger.log(LogLevel::Info, format_args!("{}", long));

        let line = &console.lines()[0].1;
        assert!(line.len() <= MAX_MESSAGE_LEN);
        assert!(line.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_static_messages_borrowed() {
        assert!(matches!(format_message(format_args!("static")), Cow::Borrowed("static")));
        let batch = 1;
        assert!(matches!(format_message(format_args!("batch {}", batch)), Cow::Owned(_)));
    }

    #[test]
    fn test_concurrent_logging_while_reconfiguring() {
        let (logger, console, _) = memory_logger();
        let logger = Arc::new(logger);

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let logger = logger.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        logger.log(LogLevel::Error, format_args!("thread {} msg {}", t, i));
                    }
                })
            })
            .collect();

        for i in 0..50 {
            let level = if i % 2 == 0 { Some(LogLevel::Debug) } else { None };
            logger.set_console_level(level);
        }
        logger.set_console_level(Some(LogLevel::Debug));

        for writer in writers {
            writer.join().unwrap();
        }

        // every emitted line is whole, whichever snapshot it saw
        for (level, line) in console.lines() {
            assert_eq!(level, LogLevel::Error);
            assert!(line.starts_with("thread "));
        }
    }
}

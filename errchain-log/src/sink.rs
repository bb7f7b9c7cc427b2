//! Log sinks
//!
//! A sink is one destination for formatted log lines. The [`Logger`](crate::Logger)
//! owns a console sink and a system log sink and decides, per message, which
//! of them see it. Sinks never report failures: a line that cannot be written
//! is dropped.

use crate::LogLevel;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A destination for log lines.
///
/// Implement this trait to redirect the console or system log output, e.g.
/// into a test buffer or a different transport.
pub trait LogSink: Send + Sync {
    /// Write one already-formatted message
    fn write(&self, level: LogLevel, message: &str);

    /// Called when the sink goes from disabled to enabled
    fn open(&self) {}

    /// Called when the sink goes from enabled to disabled
    fn close(&self) {}

    /// Get sink name for debugging
    fn name(&self) -> &'static str;
}

// =============================================================================
// Console (stderr)
// =============================================================================

/// Writes `[TAG]: message` lines to standard error
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, level: LogLevel, message: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "[{}]: {}", level.tag(), message);
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

// =============================================================================
// System log
// =============================================================================

/// Writes to the system log through `syslog(3)`.
///
/// The connection is opened with ident `errchain`, facility `LOG_DAEMON`, when
/// the sink is enabled and closed again when it is disabled. On non-unix
/// targets the sink discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLogSink;

#[cfg(unix)]
mod syslog {
    use crate::LogLevel;
    use std::ffi::{CStr, CString};

    const IDENT: &CStr = c"errchain";
    const LINE_FORMAT: &CStr = c"[%s] %s";

    fn priority(level: LogLevel) -> libc::c_int {
        match level {
            LogLevel::Debug => libc::LOG_DEBUG,
            LogLevel::Info => libc::LOG_INFO,
            LogLevel::Warning => libc::LOG_WARNING,
            LogLevel::Error => libc::LOG_ERR,
        }
    }

    fn tag(level: LogLevel) -> &'static CStr {
        match level {
            LogLevel::Debug => c"DBG",
            LogLevel::Info => c"INF",
            LogLevel::Warning => c"WRN",
            LogLevel::Error => c"ERR",
        }
    }

    pub(super) fn open() {
        // SAFETY: IDENT is a 'static nul-terminated string, as openlog requires.
        unsafe {
            libc::openlog(
                IDENT.as_ptr(),
                libc::LOG_CONS | libc::LOG_PID | libc::LOG_NDELAY,
                libc::LOG_DAEMON,
            )
        }
    }

    pub(super) fn close() {
        // SAFETY: closelog has no preconditions.
        unsafe { libc::closelog() }
    }

    pub(super) fn write(level: LogLevel, message: &str) {
        // interior NULs would truncate the line
        let message = match CString::new(message) {
            Ok(message) => message,
            Err(_) => match CString::new(message.replace('\0', " ")) {
                Ok(message) => message,
                Err(_) => return,
            },
        };

        // SAFETY: the format takes exactly two C strings and both arguments are
        // valid nul-terminated strings that outlive the call.
        unsafe {
            libc::syslog(
                priority(level),
                LINE_FORMAT.as_ptr(),
                tag(level).as_ptr(),
                message.as_ptr(),
            )
        }
    }
}

impl LogSink for SystemLogSink {
    fn write(&self, level: LogLevel, message: &str) {
        #[cfg(unix)]
        syslog::write(level, message);
        #[cfg(not(unix))]
        let _ = (level, message);
    }

    fn open(&self) {
        #[cfg(unix)]
        syslog::open();
    }

    fn close(&self) {
        #[cfg(unix)]
        syslog::close();
    }

    fn name(&self) -> &'static str {
        "syslog"
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Keeps every line in memory.
///
/// Useful for tests and for hosts that want to display recent messages
/// themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(LogLevel, String)>>,
    opened: AtomicBool,
}

impl MemorySink {
    /// Create an empty memory sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines written so far, oldest first
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Number of lines written so far
    pub fn len(&self) -> usize {
        self.lines.lock().map(|lines| lines.len()).unwrap_or(0)
    }

    /// Check if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the sink is currently between `open` and `close`
    pub fn is_open(&self) -> bool {
        self.opened.load(Ordering::SeqCst)
    }
}

impl LogSink for MemorySink {
    fn write(&self, level: LogLevel, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_string()));
        }
    }

    fn open(&self) {
        self.opened.store(true, Ordering::SeqCst);
    }

    fn close(&self) {
        self.opened.store(false, Ordering::SeqCst);
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn write(&self, level: LogLevel, message: &str) {
        (**self).write(level, message)
    }

    fn open(&self) {
        (**self).open()
    }

    fn close(&self) {
        (**self).close()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

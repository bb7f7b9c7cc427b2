//! A single reported failure

use crate::ErrorCode;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::io;

/// Message of [`ErrorRecord::OUT_OF_MEMORY`]
pub const NO_MEMORY_MESSAGE: &str = "Memory allocation failed.";

/// Structured payload attached to a record.
///
/// `format` names the shape of `bytes` (e.g. `"netconf-error"`); the bytes
/// are opaque to errchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    format: String,
    bytes: Vec<u8>,
}

impl ErrorData {
    /// Create a payload
    pub fn new(format: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            format: format.into(),
            bytes: bytes.into(),
        }
    }

    /// Get the format tag
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Get the payload
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// One reported failure.
///
/// A record has:
/// - `code`: what kind of failure, never [`ErrorCode::Ok`]
/// - `message`: human-readable, formatted when the record is created
/// - `path`: where in the data tree the failure was found (if known)
/// - `data`: optional structured payload with its format tag
///
/// # Example
///
/// ```rust
/// use errchain_error::{ErrorCode, ErrorData, ErrorRecord};
///
/// let record = ErrorRecord::new(ErrorCode::ValidationFailed, "leaf \"mtu\" out of range")
///     .with_path("/interfaces/interface[name='eth0']/mtu")
///     .with_data(ErrorData::new("range", *b"68..9000"));
///
/// assert_eq!(record.code(), ErrorCode::ValidationFailed);
/// assert_eq!(record.data().map(|d| d.format()), Some("range"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    code: ErrorCode,
    message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<ErrorData>,
}

impl ErrorRecord {
    /// The out-of-memory record. Its message is static, so reporting it
    /// allocates nothing beyond the chain slot.
    pub const OUT_OF_MEMORY: ErrorRecord = ErrorRecord {
        code: ErrorCode::NoMemory,
        message: Cow::Borrowed(NO_MEMORY_MESSAGE),
        path: None,
        data: None,
    };

    /// Create a record with the given code and message.
    ///
    /// `ErrorCode::Ok` is not a failure; it is recorded as `Internal`.
    pub fn new(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        let code = if code.is_ok() { ErrorCode::Internal } else { code };

        Self {
            code,
            message: message.into(),
            path: None,
            data: None,
        }
    }

    /// Create a record, formatting the message from `format_args!`
    pub fn from_args(code: ErrorCode, args: fmt::Arguments<'_>) -> Self {
        Self::new(code, errchain_log::format_message(args))
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the data-tree path, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the structured payload, if any
    pub fn data(&self) -> Option<&ErrorData> {
        self.data.as_ref()
    }

    // =========================================================================
    // Builders (chainable)
    // =========================================================================

    /// Set the data-tree path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach a structured payload
    pub fn with_data(mut self, data: ErrorData) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach an optional structured payload
    pub fn with_data_opt(mut self, data: Option<ErrorData>) -> Self {
        self.data = data;
        self
    }
}

// =============================================================================
// Display - message plus path, used for log lines
// =============================================================================

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl From<io::Error> for ErrorRecord {
    fn from(err: io::Error) -> Self {
        ErrorRecord::new(ErrorCode::System, err.to_string())
    }
}

// =============================================================================
// Convenience constructors
// =============================================================================

impl ErrorRecord {
    /// The out-of-memory record
    pub fn no_memory() -> Self {
        Self::OUT_OF_MEMORY
    }

    /// An invariant violation at `file:line`; use with `file!()` and `line!()`
    pub fn internal(file: &str, line: u32) -> Self {
        Self::new(
            ErrorCode::Internal,
            format!("Internal error ({}:{}).", file, line),
        )
    }

    /// Locking `func` failed; a timeout maps to `TimeOut`, anything else to `Internal`
    pub fn lock_failed(func: &str, err: &io::Error) -> Self {
        Self::new(
            timeout_or_internal(err),
            format!("Locking a mutex failed ({}: {}).", func, err),
        )
    }

    /// Waiting on a condition variable in `func` failed
    pub fn cond_wait_failed(func: &str, err: &io::Error) -> Self {
        Self::new(
            timeout_or_internal(err),
            format!("Waiting on a conditional variable failed ({}: {}).", func, err),
        )
    }

    /// An OS call failed, carrying the OS error text
    pub fn system(func: &str, err: &io::Error) -> Self {
        Self::new(ErrorCode::System, format!("{}() failed ({}).", func, err))
    }

    /// An OS call on `path` failed
    pub fn system_path(func: &str, path: &str, err: &io::Error) -> Self {
        Self::new(
            ErrorCode::System,
            format!("{}() on \"{}\" failed ({}).", func, path, err),
        )
    }

    /// Generic validation failure
    pub fn validation_failed() -> Self {
        Self::new(ErrorCode::ValidationFailed, "Validation failed.")
    }

    /// The caller passed invalid arguments to `func`
    pub fn invalid_argument(func: &str) -> Self {
        Self::new(
            ErrorCode::InvalidArgument,
            format!("Invalid arguments for function \"{}\".", func),
        )
    }

    /// A user callback reported a failure
    pub fn callback_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::CallbackFailed, message)
    }
}

fn timeout_or_internal(err: &io::Error) -> ErrorCode {
    if err.kind() == io::ErrorKind::TimedOut {
        ErrorCode::TimeOut
    } else {
        ErrorCode::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = ErrorRecord::new(ErrorCode::NotFound, "item \"/a\" not found");
        assert_eq!(record.code(), ErrorCode::NotFound);
        assert_eq!(record.message(), "item \"/a\" not found");
        assert_eq!(record.path(), None);
        assert_eq!(record.data(), None);
    }

    #[test]
    fn test_success_code_recorded_as_internal() {
        let record = ErrorRecord::new(ErrorCode::Ok, "nothing failed?");
        assert_eq!(record.code(), ErrorCode::Internal);
        assert_eq!(record.message(), "nothing failed?");
    }

    #[test]
    fn test_from_args() {
        let record = ErrorRecord::from_args(ErrorCode::Exists, format_args!("node {} exists", 7));
        assert_eq!(record.message(), "node 7 exists");
    }

    #[test]
    fn test_data_carries_format() {
        let record = ErrorRecord::validation_failed().with_data(ErrorData::new("yang", vec![1, 2]));
        let data = record.data().unwrap();
        assert_eq!(data.format(), "yang");
        assert_eq!(data.bytes(), &[1, 2]);
    }

    #[test]
    fn test_out_of_memory_is_static() {
        let record = ErrorRecord::no_memory();
        assert_eq!(record.code(), ErrorCode::NoMemory);
        assert_eq!(record.message(), NO_MEMORY_MESSAGE);
        assert!(matches!(record.message, Cow::Borrowed(_)));
    }

    #[test]
    fn test_display_with_path() {
        let record = ErrorRecord::new(ErrorCode::Engine, "bad value").with_path("/m:c/l");
        assert_eq!(record.to_string(), "bad value (path: /m:c/l)");

        let record = ErrorRecord::new(ErrorCode::Engine, "bad value");
        assert_eq!(record.to_string(), "bad value");
    }

    #[test]
    fn test_convenience_constructors() {
        let record = ErrorRecord::internal("chain.rs", 42);
        assert_eq!(record.code(), ErrorCode::Internal);
        assert_eq!(record.message(), "Internal error (chain.rs:42).");

        let timeout = io::Error::new(io::ErrorKind::TimedOut, "timed out");
        assert_eq!(ErrorRecord::lock_failed("shm_lock", &timeout).code(), ErrorCode::TimeOut);
        assert_eq!(
            ErrorRecord::cond_wait_failed("wait", &timeout).code(),
            ErrorCode::TimeOut
        );

        let busy = io::Error::new(io::ErrorKind::WouldBlock, "busy");
        let record = ErrorRecord::lock_failed("shm_lock", &busy);
        assert_eq!(record.code(), ErrorCode::Internal);
        assert_eq!(record.message(), "Locking a mutex failed (shm_lock: busy).");

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let record = ErrorRecord::system_path("open", "/etc/x", &denied);
        assert_eq!(record.code(), ErrorCode::System);
        assert_eq!(
            record.message(),
            "open() on \"/etc/x\" failed (permission denied)."
        );

        let record = ErrorRecord::invalid_argument("get_item");
        assert_eq!(record.code(), ErrorCode::InvalidArgument);
        assert_eq!(record.message(), "Invalid arguments for function \"get_item\".");
    }

    #[test]
    fn test_from_io_error() {
        let record: ErrorRecord = io::Error::new(io::ErrorKind::Other, "disk gone").into();
        assert_eq!(record.code(), ErrorCode::System);
        assert_eq!(record.message(), "disk gone");
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let record = ErrorRecord::new(ErrorCode::Locked, "locked");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"code": "Locked", "message": "locked"}));
    }
}

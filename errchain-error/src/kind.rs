//! Error codes returned by errchain operations

use serde::{Deserialize, Serialize};
use std::fmt;

/// The code of a reported failure.
///
/// Discriminants are the numeric return codes of the public API and are
/// stable. `Ok` is the success code; it never appears inside a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
#[non_exhaustive]
pub enum ErrorCode {
    /// No error
    Ok = 0,
    /// Caller contract violation
    InvalidArgument = 1,
    /// Error generated by the schema/validation engine
    Engine = 2,
    /// A low-level OS call failed
    System = 3,
    /// Allocation failure
    NoMemory = 4,
    /// Item not found
    NotFound = 5,
    /// Item already exists
    Exists = 6,
    /// Programming or invariant violation
    Internal = 7,
    /// Initialization failed
    InitFailed = 8,
    /// The peer disconnected
    Disconnected = 9,
    /// Malformed message
    MalformedMessage = 10,
    /// Operation not supported
    Unsupported = 11,
    /// Unknown schema model
    UnknownModel = 12,
    /// Unknown element in a known schema
    BadElement = 13,
    /// Schema or business-rule rejection
    ValidationFailed = 14,
    /// An operation failed
    OperationFailed = 15,
    /// Operation not authorized
    Unauthorized = 16,
    /// Invalid username
    InvalidUser = 17,
    /// Requested resource already locked
    Locked = 18,
    /// Lock or condition wait exceeded its timeout
    TimeOut = 19,
    /// A user callback failed
    CallbackFailed = 20,
}

impl ErrorCode {
    /// Every code, in numeric order
    pub const ALL: [ErrorCode; 21] = [
        ErrorCode::Ok,
        ErrorCode::InvalidArgument,
        ErrorCode::Engine,
        ErrorCode::System,
        ErrorCode::NoMemory,
        ErrorCode::NotFound,
        ErrorCode::Exists,
        ErrorCode::Internal,
        ErrorCode::InitFailed,
        ErrorCode::Disconnected,
        ErrorCode::MalformedMessage,
        ErrorCode::Unsupported,
        ErrorCode::UnknownModel,
        ErrorCode::BadElement,
        ErrorCode::ValidationFailed,
        ErrorCode::OperationFailed,
        ErrorCode::Unauthorized,
        ErrorCode::InvalidUser,
        ErrorCode::Locked,
        ErrorCode::TimeOut,
        ErrorCode::CallbackFailed,
    ];

    /// Numeric return code
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Look a code up by its numeric value
    pub fn from_i32(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    /// Whether this is the success code
    pub fn is_ok(self) -> bool {
        self == ErrorCode::Ok
    }

    /// Returns the code name as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Ok => "Ok",
            ErrorCode::InvalidArgument => "InvalidArgument",
            ErrorCode::Engine => "Engine",
            ErrorCode::System => "System",
            ErrorCode::NoMemory => "NoMemory",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::Exists => "Exists",
            ErrorCode::Internal => "Internal",
            ErrorCode::InitFailed => "InitFailed",
            ErrorCode::Disconnected => "Disconnected",
            ErrorCode::MalformedMessage => "MalformedMessage",
            ErrorCode::Unsupported => "Unsupported",
            ErrorCode::UnknownModel => "UnknownModel",
            ErrorCode::BadElement => "BadElement",
            ErrorCode::ValidationFailed => "ValidationFailed",
            ErrorCode::OperationFailed => "OperationFailed",
            ErrorCode::Unauthorized => "Unauthorized",
            ErrorCode::InvalidUser => "InvalidUser",
            ErrorCode::Locked => "Locked",
            ErrorCode::TimeOut => "TimeOut",
            ErrorCode::CallbackFailed => "CallbackFailed",
        }
    }

    /// Human-readable description of the code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::Ok => "Operation succeeded",
            ErrorCode::InvalidArgument => "Invalid argument",
            ErrorCode::Engine => "Validation engine error",
            ErrorCode::System => "System function call failed",
            ErrorCode::NoMemory => "Out of memory",
            ErrorCode::NotFound => "Item not found",
            ErrorCode::Exists => "Item already exists",
            ErrorCode::Internal => "Internal error",
            ErrorCode::InitFailed => "Initialization failed",
            ErrorCode::Disconnected => "The peer disconnected",
            ErrorCode::MalformedMessage => "Malformed message",
            ErrorCode::Unsupported => "Operation not supported",
            ErrorCode::UnknownModel => "Unknown schema model",
            ErrorCode::BadElement => "Unknown element",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::OperationFailed => "Operation failed",
            ErrorCode::Unauthorized => "Operation not authorized",
            ErrorCode::InvalidUser => "Invalid username",
            ErrorCode::Locked => "Requested resource already locked",
            ErrorCode::TimeOut => "Timeout expired",
            ErrorCode::CallbackFailed => "User callback failed",
        }
    }
}

/// Description of a numeric return code, `"Unknown error"` for values
/// outside the table.
pub fn strerror(code: i32) -> &'static str {
    ErrorCode::from_i32(code)
        .map(|code| code.description())
        .unwrap_or("Unknown error")
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.as_i32()
    }
}

//! # errchain-error
//!
//! Structured error records accumulated into ordered chains.
//!
//! ## Design Philosophy
//!
//! - **ErrorCode**: Know what failed; the numeric value is the API return code
//! - **ErrorRecord**: One failure with its message, path and optional payload
//! - **ErrorChain**: Every failure of one operation, oldest first
//! - **First error wins**: the first record decides the reported code
//!
//! ## Usage
//!
//! ```rust
//! use errchain_error::{first_code, push_error, ErrorChain, ErrorCode};
//!
//! fn apply(chain: &mut Option<ErrorChain>) -> bool {
//!     push_error!(chain, ErrorCode::Locked, "datastore \"{}\" is locked", "running");
//!     false
//! }
//!
//! let mut chain = None;
//! if !apply(&mut chain) {
//!     assert_eq!(first_code(chain.as_ref()), ErrorCode::Locked);
//! }
//! ```
//!
//! ## Principles
//!
//! - `None` means no error; a chain that exists is never empty
//! - Lower layers append and unwind; they do not log
//! - Chains have one owner and move on merge or attach

mod chain;
mod kind;
mod record;

pub use chain::{append, first_code, into_result, merge, push, release, ErrorChain};
pub use kind::{strerror, ErrorCode};
pub use record::{ErrorData, ErrorRecord, NO_MEMORY_MESSAGE};

/// Result type alias carrying a whole chain as the error
pub type Result<T> = std::result::Result<T, ErrorChain>;

/// Append a formatted error record.
///
/// `push_error!(chain, code, "format", args...)` where `chain` is a
/// `&mut Option<ErrorChain>`.
#[macro_export]
macro_rules! push_error {
    ($chain:expr, $code:expr, $($arg:tt)+) => {
        $crate::append($chain, $code, None, format_args!($($arg)+))
    };
}

/// Append a formatted error record carrying an [`ErrorData`] payload
#[macro_export]
macro_rules! push_error_data {
    ($chain:expr, $code:expr, $data:expr, $($arg:tt)+) => {
        $crate::append($chain, $code, Some($data), format_args!($($arg)+))
    };
}

/// Append an `Internal` record naming the current source location
#[macro_export]
macro_rules! push_internal {
    ($chain:expr) => {
        $crate::push($chain, $crate::ErrorRecord::internal(file!(), line!()))
    };
}

/// Append the allocation-free out-of-memory record
#[macro_export]
macro_rules! push_no_memory {
    ($chain:expr) => {
        $crate::push($chain, $crate::ErrorRecord::OUT_OF_MEMORY)
    };
}

//! Error types used by sessions
//!
//! Re-exports errchain-error so API layers need only this crate.

pub use errchain_error::{
    append, first_code, into_result, merge, push, release, strerror, ErrorChain, ErrorCode,
    ErrorData, ErrorRecord, Result,
};

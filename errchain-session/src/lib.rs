//! # errchain-session
//!
//! The caller-facing end of error reporting.
//!
//! ## Core Concepts
//! - **Session**: handle holding the error chain of its last API call
//! - **Adapter**: transcribes validation-engine diagnostics into chains
//! - **Gateway**: logs a finished chain, attaches it and returns one code
//!
//! ## Flow
//!
//! ```rust
//! use errchain_session::{finish, from_external_context, Diagnostic, EngineCode, ErrorCode,
//!     MemoryEngine, Session};
//!
//! let mut session = Session::new();
//! let mut engine = MemoryEngine::from(vec![
//!     Diagnostic::error(EngineCode::Validation, "mandatory node missing"),
//! ]);
//!
//! let mut chain = None;
//! from_external_context(&mut chain, &mut engine, false);
//! let code = finish(Some(&mut session), chain);
//!
//! assert_eq!(code, ErrorCode::ValidationFailed);
//! assert_eq!(session.error().map(|c| c.len()), Some(1));
//! ```

pub mod adapter;
pub mod error;
pub mod gateway;
pub mod session;

pub use adapter::{
    append_all, append_first, from_external_context, log_external_warnings, map_engine_code,
    Diagnostic, DiagnosticSource, EngineAdapter, EngineCode, MemoryEngine, Severity,
};
pub use error::{ErrorChain, ErrorCode, ErrorData, ErrorRecord, Result};
pub use gateway::{finish, invalid_argument, ReturnGateway};
pub use session::Session;

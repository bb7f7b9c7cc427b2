//! # Session handles
//!
//! A [`Session`] is the caller-visible handle of the API. After every API
//! call it holds the error chain of that call, if it failed, so callers that
//! want more than the return code can read every record.
//!
//! A session holds at most one chain. Attaching a new chain drops the old one;
//! dropping the session drops whatever is attached.

use crate::error::{ErrorChain, ErrorCode, ErrorRecord};
use serde::Serialize;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_SESSION_ID: AtomicU32 = AtomicU32::new(1);

/// A caller-visible handle holding the errors of its last operation
#[derive(Debug, Serialize)]
pub struct Session {
    /// Process-unique session identifier
    id: u32,
    /// Chain of the last failed operation
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorChain>,
}

impl Session {
    /// Create a new session with a fresh id
    pub fn new() -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            error: None,
        }
    }

    /// Get the session id
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Attach `chain`, dropping any chain attached before
    pub fn attach_chain(&mut self, chain: ErrorChain) {
        self.error = Some(chain);
    }

    /// Take the attached chain out of the session
    pub fn detach_chain(&mut self) -> Option<ErrorChain> {
        self.error.take()
    }

    /// Drop the attached chain, if any
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// The attached chain
    pub fn error(&self) -> Option<&ErrorChain> {
        self.error.as_ref()
    }

    /// Code of the last operation together with its full chain
    pub fn error_info(&self) -> (ErrorCode, Option<&ErrorChain>) {
        let code = self.error.as_ref().map_or(ErrorCode::Ok, ErrorChain::first_code);
        (code, self.error.as_ref())
    }

    /// Report a failure from application code running inside a callback.
    ///
    /// The message is stored as a `CallbackFailed` record after any records
    /// already attached; the operation that invoked the callback collects
    /// them with [`detach_chain`](Self::detach_chain).
    pub fn set_error(&mut self, message: impl Into<Cow<'static, str>>, path: Option<&str>) {
        let mut record = ErrorRecord::callback_failed(message);
        if let Some(path) = path {
            record = record.with_path(path);
        }
        crate::error::push(&mut self.error, record);
    }

    /// The attached chain as JSON, `null` when there is none
    pub fn error_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.error).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

//! # Validation engine adapter
//!
//! The schema/validation engine keeps its own queue of pending diagnostics.
//! This module transcribes that queue into error chains, or into warning log
//! lines when the caller decided the condition is not fatal.
//!
//! Every entry point drains the queue completely, so stale diagnostics never
//! leak into a later, unrelated operation.

use crate::error::{push, ErrorChain, ErrorCode, ErrorData, ErrorRecord};
use errchain_log::{LogLevel, Logger};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

// =============================================================================
// Engine contract
// =============================================================================

/// Error category reported by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EngineCode {
    /// Engine ran out of memory
    Memory,
    /// An OS call inside the engine failed
    System,
    /// The engine was called with invalid arguments
    InvalidArgument,
    /// An item already exists
    Exists,
    /// An item was not found
    NotFound,
    /// Engine-internal failure
    Internal,
    /// Access denied
    Denied,
    /// Data does not validate against the schema
    Validation,
    /// Anything else
    #[default]
    Other,
}

/// Severity the engine assigned to a diagnostic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Fails the operation; recorded in the chain
    #[default]
    Error,
    /// Informational; logged and never recorded
    Warning,
}

/// One pending diagnostic of the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub code: EngineCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<ErrorData>,
}

impl Diagnostic {
    /// An error-severity diagnostic
    pub fn error(code: EngineCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            path: None,
            payload: None,
        }
    }

    /// A warning-severity diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(EngineCode::Other, message)
        }
    }

    /// Set the data-tree path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach a structured payload
    pub fn with_payload(mut self, payload: ErrorData) -> Self {
        self.payload = Some(payload);
        self
    }

    fn into_record(self) -> ErrorRecord {
        let mut record = ErrorRecord::new(map_engine_code(self.code), self.message)
            .with_data_opt(self.payload);
        if let Some(path) = self.path {
            record = record.with_path(path);
        }
        record
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

/// Access to an engine context's diagnostic queue.
///
/// `drain` hands over every pending diagnostic, oldest first, and leaves the
/// queue empty.
pub trait DiagnosticSource {
    /// Whether any diagnostic is queued
    fn has_pending(&self) -> bool;

    /// Remove and return all queued diagnostics
    fn drain(&mut self) -> Vec<Diagnostic>;
}

/// Map an engine category onto the error taxonomy.
///
/// Categories without a closer match become `ValidationFailed`.
pub fn map_engine_code(code: EngineCode) -> ErrorCode {
    match code {
        EngineCode::Memory => ErrorCode::NoMemory,
        EngineCode::System => ErrorCode::System,
        EngineCode::InvalidArgument => ErrorCode::InvalidArgument,
        EngineCode::Exists => ErrorCode::Exists,
        EngineCode::NotFound => ErrorCode::NotFound,
        EngineCode::Internal => ErrorCode::Internal,
        EngineCode::Denied => ErrorCode::Unauthorized,
        EngineCode::Validation | EngineCode::Other => ErrorCode::ValidationFailed,
    }
}

// =============================================================================
// In-memory engine queue
// =============================================================================

/// A plain diagnostic queue, for hosts without a real engine and for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    pending: VecDeque<Diagnostic>,
}

impl MemoryEngine {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.pending.push_back(diagnostic);
    }

    /// Number of queued diagnostics
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl From<Vec<Diagnostic>> for MemoryEngine {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            pending: diagnostics.into(),
        }
    }
}

impl DiagnosticSource for MemoryEngine {
    fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn drain(&mut self) -> Vec<Diagnostic> {
        self.pending.drain(..).collect()
    }
}

// =============================================================================
// Adapter
// =============================================================================

/// Transcribes engine diagnostics, logging through a chosen [`Logger`]
#[derive(Debug, Clone, Copy)]
pub struct EngineAdapter<'a> {
    logger: &'a Logger,
}

impl<'a> EngineAdapter<'a> {
    /// Adapter logging through `logger`
    pub fn new(logger: &'a Logger) -> Self {
        Self { logger }
    }

    /// Append every pending error diagnostic to `chain`, in order.
    /// Warning diagnostics are logged instead of recorded.
    pub fn append_all<S>(&self, chain: &mut Option<ErrorChain>, ctx: &mut S)
    where
        S: DiagnosticSource + ?Sized,
    {
        for diagnostic in ctx.drain() {
            self.transcribe(chain, diagnostic);
        }
    }

    /// Append only the earliest pending diagnostic and discard the rest
    pub fn append_first<S>(&self, chain: &mut Option<ErrorChain>, ctx: &mut S)
    where
        S: DiagnosticSource + ?Sized,
    {
        if let Some(diagnostic) = ctx.drain().into_iter().next() {
            self.transcribe(chain, diagnostic);
        }
    }

    /// Log every pending diagnostic as a warning; nothing is recorded
    pub fn log_warnings<S>(&self, ctx: &mut S)
    where
        S: DiagnosticSource + ?Sized,
    {
        for diagnostic in ctx.drain() {
            self.logger.log(LogLevel::Warning, format_args!("{}", diagnostic));
        }
    }

    /// Record every pending diagnostic, or only log them when `treat_as_warning`
    pub fn from_external_context<S>(
        &self,
        chain: &mut Option<ErrorChain>,
        ctx: &mut S,
        treat_as_warning: bool,
    ) where
        S: DiagnosticSource + ?Sized,
    {
        if treat_as_warning {
            self.log_warnings(ctx);
        } else {
            self.append_all(chain, ctx);
        }
    }

    fn transcribe(&self, chain: &mut Option<ErrorChain>, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => {
                self.logger.log(LogLevel::Warning, format_args!("{}", diagnostic));
            }
            Severity::Error => push(chain, diagnostic.into_record()),
        }
    }
}

impl Default for EngineAdapter<'static> {
    fn default() -> Self {
        Self::new(errchain_log::logger())
    }
}

/// [`EngineAdapter::append_all`] through the process-wide logger
pub fn append_all<S>(chain: &mut Option<ErrorChain>, ctx: &mut S)
where
    S: DiagnosticSource + ?Sized,
{
    EngineAdapter::default().append_all(chain, ctx);
}

/// [`EngineAdapter::append_first`] through the process-wide logger
pub fn append_first<S>(chain: &mut Option<ErrorChain>, ctx: &mut S)
where
    S: DiagnosticSource + ?Sized,
{
    EngineAdapter::default().append_first(chain, ctx);
}

/// [`EngineAdapter::from_external_context`] through the process-wide logger
pub fn from_external_context<S>(chain: &mut Option<ErrorChain>, ctx: &mut S, treat_as_warning: bool)
where
    S: DiagnosticSource + ?Sized,
{
    EngineAdapter::default().from_external_context(chain, ctx, treat_as_warning);
}

/// Log every pending diagnostic as a warning through the process-wide logger
pub fn log_external_warnings<S>(ctx: &mut S)
where
    S: DiagnosticSource + ?Sized,
{
    EngineAdapter::default().log_warnings(ctx);
}

//! Ordered error chains
//!
//! An operation that can fail takes `&mut Option<ErrorChain>` and appends to
//! it. `None` is the "no error" state; a chain that exists always holds at
//! least one record, so "absent" and "empty" cannot disagree.
//!
//! ```rust
//! use errchain_error::{first_code, merge, push_error, ErrorChain, ErrorCode};
//!
//! fn load(chain: &mut Option<ErrorChain>) {
//!     push_error!(chain, ErrorCode::NotFound, "module \"{}\" not found", "ietf-ip");
//! }
//!
//! let mut chain = None;
//! let mut local = None;
//! load(&mut local);
//! merge(&mut chain, local);
//!
//! assert_eq!(first_code(chain.as_ref()), ErrorCode::NotFound);
//! ```

use crate::record::{ErrorData, ErrorRecord, NO_MEMORY_MESSAGE};
use crate::ErrorCode;
use errchain_log::LogLevel;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Records of the chain reported when the first record could not be stored
static OUT_OF_MEMORY_RECORDS: [ErrorRecord; 1] = [ErrorRecord::OUT_OF_MEMORY];

/// Non-empty, append-only sequence of error records in the order they
/// occurred. The first record decides the reported code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorChain {
    /// Borrowed only for the static out-of-memory chain
    records: Cow<'static, [ErrorRecord]>,
}

impl ErrorChain {
    /// Create a chain holding one record
    pub fn new(record: ErrorRecord) -> Self {
        Self {
            records: Cow::Owned(vec![record]),
        }
    }

    /// The chain holding only the out-of-memory record. Allocates nothing.
    pub fn out_of_memory() -> Self {
        Self {
            records: Cow::Borrowed(&OUT_OF_MEMORY_RECORDS[..]),
        }
    }

    /// The earliest record
    pub fn first(&self) -> &ErrorRecord {
        &self.records[0]
    }

    /// Code of the earliest record
    pub fn first_code(&self) -> ErrorCode {
        self.records
            .first()
            .map_or(ErrorCode::Ok, ErrorRecord::code)
    }

    /// Number of records (at least one)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; present for API symmetry with collections
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, oldest first
    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Iterate over the records, oldest first
    pub fn iter(&self) -> std::slice::Iter<'_, ErrorRecord> {
        self.records.iter()
    }

    /// Take the records out of the chain
    pub fn into_records(self) -> Vec<ErrorRecord> {
        self.records.into_owned()
    }

    /// Append a record. If the chain cannot grow, the out-of-memory
    /// condition is logged and the record is dropped.
    pub fn push(&mut self, record: ErrorRecord) {
        if !self.try_grow(1) {
            report_out_of_memory();
            return;
        }
        self.records.to_mut().push(record);
    }

    /// Move every record of `other` after the existing ones
    pub fn append_chain(&mut self, other: ErrorChain) {
        if !self.try_grow(other.len()) {
            report_out_of_memory();
            return;
        }
        let records = self.records.to_mut();
        match other.records {
            Cow::Owned(other) => records.extend(other),
            Cow::Borrowed(other) => records.extend_from_slice(other),
        }
    }

    /// Make room for `additional` records in owned storage, so the following
    /// `to_mut` and push cannot allocate
    fn try_grow(&mut self, additional: usize) -> bool {
        if let Cow::Borrowed(shared) = self.records {
            let mut owned = Vec::new();
            if owned.try_reserve(shared.len() + additional).is_err() {
                return false;
            }
            owned.extend_from_slice(shared);
            self.records = Cow::Owned(owned);
            return true;
        }
        match &mut self.records {
            Cow::Owned(records) => records.try_reserve(additional).is_ok(),
            Cow::Borrowed(_) => false,
        }
    }
}

// =============================================================================
// Operations on an optional chain
// =============================================================================

/// Append `record`, creating the chain when `chain` is `None`.
///
/// When even the first record cannot be stored, `chain` becomes the static
/// out-of-memory chain, so the failure is still reported as `NoMemory`.
pub fn push(chain: &mut Option<ErrorChain>, record: ErrorRecord) {
    match chain {
        Some(chain) => chain.push(record),
        None => {
            let mut records = Vec::new();
            if records.try_reserve_exact(1).is_err() {
                *chain = Some(ErrorChain::out_of_memory());
                report_out_of_memory();
                return;
            }
            records.push(record);
            *chain = Some(ErrorChain {
                records: Cow::Owned(records),
            });
        }
    }
}

/// Format a message and append a new record.
///
/// Usually called through [`push_error!`](crate::push_error) or
/// [`push_error_data!`](crate::push_error_data).
pub fn append(
    chain: &mut Option<ErrorChain>,
    code: ErrorCode,
    data: Option<ErrorData>,
    args: fmt::Arguments<'_>,
) {
    push(chain, ErrorRecord::from_args(code, args).with_data_opt(data));
}

/// Append every record of `source` after the records of `target`, keeping
/// their order. When `target` is empty, `source` is moved in as a whole.
pub fn merge(target: &mut Option<ErrorChain>, source: Option<ErrorChain>) {
    let Some(source) = source else {
        return;
    };

    match target {
        Some(target) => target.append_chain(source),
        None => *target = Some(source),
    }
}

/// Drop every record and leave `chain` as `None`. Releasing an absent chain
/// does nothing.
pub fn release(chain: &mut Option<ErrorChain>) {
    *chain = None;
}

/// Code of the first record, or `ErrorCode::Ok` for no chain
pub fn first_code(chain: Option<&ErrorChain>) -> ErrorCode {
    chain.map_or(ErrorCode::Ok, ErrorChain::first_code)
}

/// `Ok(())` for no chain, `Err(chain)` otherwise
pub fn into_result(chain: Option<ErrorChain>) -> crate::Result<()> {
    match chain {
        Some(chain) => Err(chain),
        None => Ok(()),
    }
}

fn report_out_of_memory() {
    errchain_log::logger().log_str(LogLevel::Error, NO_MEMORY_MESSAGE);
}

// =============================================================================
// Trait impls
// =============================================================================

impl From<ErrorRecord> for ErrorChain {
    fn from(record: ErrorRecord) -> Self {
        ErrorChain::new(record)
    }
}

impl IntoIterator for ErrorChain {
    type Item = ErrorRecord;
    type IntoIter = std::vec::IntoIter<ErrorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_owned().into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorChain {
    type Item = &'a ErrorRecord;
    type IntoIter = std::slice::Iter<'a, ErrorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl fmt::Display for ErrorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.first_code(), self.first())?;
        if self.len() > 1 {
            write!(f, " (+{} more)", self.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorChain {}

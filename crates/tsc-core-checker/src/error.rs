//! The checker's fatal-error contract (§4.3, §7): the first violation
//! aborts the current pass. `CheckError` wraps a `Diagnostic` so it can
//! flow through `?` while still being convertible to the plain
//! `tsc_core_common::Diagnostic` the spec's "structured error record"
//! names.

use tsc_core_common::Diagnostic;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{0}")]
pub struct CheckError(pub Diagnostic);

impl From<Diagnostic> for CheckError {
    fn from(d: Diagnostic) -> Self {
        CheckError(d)
    }
}

impl From<CheckError> for Diagnostic {
    fn from(e: CheckError) -> Self {
        e.0
    }
}

pub type CheckResult<T> = Result<T, CheckError>;

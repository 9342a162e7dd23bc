//! The diagnostic taxonomy shared by the type checker and both back-ends (§7).
//!
//! `SyntaxError` is not represented here: the parser (out of scope for this
//! core) is assumed to have already produced a valid AST by the time any of
//! these crates see it.

use crate::position::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Suggestion,
}

/// The four fatal-error families a compilation unit can fail with (§7).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Assignability violation, unknown member, overload resolution
    /// failure, arity mismatch, bad type-argument count, failed
    /// constraint, invalid contextual typing.
    Type,
    /// Undefined variable, unknown class/interface, namespace path miss,
    /// invalid import alias target.
    Resolution,
    /// Abstract class instantiation, non-implemented abstract member,
    /// duplicate index signature, circular type alias without
    /// indirection, label shadow, misplaced break/continue.
    Structural,
    /// Template literal expansion or type-alias expansion exceeded its cap.
    Overflow,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Type => "TypeError",
            ErrorKind::Resolution => "ResolutionError",
            ErrorKind::Structural => "StructuralError",
            ErrorKind::Overflow => "OverflowError",
        };
        f.write_str(s)
    }
}

/// A single structured diagnostic: kind, stable numeric code, rendered
/// message, and source location. The checker raises one of these and aborts
/// the current pass (§7 propagation policy: no recovery).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub kind: ErrorKind,
    pub code: u32,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    #[must_use]
    pub fn error(kind: ErrorKind, code: u32, message: impl Into<String>, location: Location) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            kind,
            code,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} TS{}: {}",
            self.location.file,
            self.location.range.start.line + 1,
            self.location.range.start.character + 1,
            self.kind,
            self.code,
            self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Stable numeric codes for diagnostics this core raises. Grouped loosely by
/// `ErrorKind`; back-ends and tests match on these rather than on message
/// text.
pub mod diagnostic_codes {
    // TypeError family (2000s)
    pub const NOT_ASSIGNABLE: u32 = 2322;
    pub const NO_OVERLOAD_MATCHES: u32 = 2769;
    pub const WRONG_ARGUMENT_COUNT: u32 = 2554;
    pub const WRONG_TYPE_ARGUMENT_COUNT: u32 = 2558;
    pub const UNKNOWN_PROPERTY: u32 = 2339;
    pub const TUPLE_ARITY_MISMATCH: u32 = 2322;
    pub const CONSTRAINT_NOT_SATISFIED: u32 = 2344;
    pub const RETURN_TYPE_MISMATCH: u32 = 2322;
    pub const INTERSECTION_NEVER_ASSIGNMENT: u32 = 2322;

    // ResolutionError family (2300s)
    pub const UNDEFINED_NAME: u32 = 2304;
    pub const UNKNOWN_TYPE_NAME: u32 = 2304;
    pub const NAMESPACE_PATH_MISS: u32 = 2503;
    pub const INVALID_IMPORT_ALIAS: u32 = 2305;

    // StructuralError family (2500s)
    pub const ABSTRACT_CLASS_INSTANTIATION: u32 = 2511;
    pub const MISSING_ABSTRACT_IMPLEMENTATION: u32 = 2515;
    pub const MISSING_INTERFACE_MEMBER: u32 = 2420;
    pub const DUPLICATE_INDEX_SIGNATURE: u32 = 2374;
    pub const CIRCULAR_TYPE_ALIAS: u32 = 2456;
    pub const LABEL_SHADOW: u32 = 1114;
    pub const BREAK_OUTSIDE_LOOP: u32 = 1105;
    pub const CONTINUE_TARGET_NOT_LOOP: u32 = 1107;
    pub const CONTINUE_OUTSIDE_LOOP: u32 = 1104;
    pub const RETURN_OUTSIDE_FUNCTION: u32 = 1108;
    pub const DUPLICATE_ABSTRACT_DECLARATION: u32 = 2392;
    pub const CONST_ENUM_NOT_CLOSED: u32 = 2474;

    // OverflowError family (2700s)
    pub const TEMPLATE_LITERAL_EXPANSION_LIMIT: u32 = 2799;
    pub const TYPE_ALIAS_EXPANSION_LIMIT: u32 = 2798;
    pub const EXPRESSION_NESTING_LIMIT: u32 = 2797;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_kind() {
        let d = Diagnostic::error(
            ErrorKind::Type,
            diagnostic_codes::NOT_ASSIGNABLE,
            "Type 'string' is not assignable to type 'number'.",
            Location::synthetic(),
        );
        let rendered = d.to_string();
        assert!(rendered.contains("TS2322"));
        assert!(rendered.contains("TypeError"));
    }
}

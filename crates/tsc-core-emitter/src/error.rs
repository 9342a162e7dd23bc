//! Emission-time errors (§4.7 "Back-ends distinguish compile-time
//! diagnostics ... from runtime errors").
//!
//! Everything this crate raises is a compile-time condition: the checker
//! has already validated the program, so an `EmitError` signals either an
//! internal inconsistency (a `TypeMap` miss for a node the checker must
//! have visited) or a back-end-specific limitation the spec calls out
//! (e.g. an async state machine whose hoisted-local count would overflow
//! the runtime's slot width). Runtime errors thrown by emitted code are not
//! modeled here — they propagate through the target runtime's own
//! exception machinery (§4.7), which this core does not simulate.

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("no resolved type recorded for this expression; the checker must run before emission")]
    MissingTypeMapEntry,
    #[error("unresolved call target for method '{0}'")]
    UnresolvedCallTarget(String),
    #[error("labeled break/continue to unknown label '{0}' reached the emitter; the checker should have rejected this")]
    UnknownLabel(String),
}

pub type EmitResult<T> = Result<T, EmitError>;

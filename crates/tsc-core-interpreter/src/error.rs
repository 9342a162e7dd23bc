//! The interpreter's control-flow and exception plumbing (§4.7 "runtime
//! errors are propagated through the runtime's exception machinery").
//!
//! Unlike the checker's `CheckError` (a fatal, structured diagnostic that
//! aborts a compilation pass), a thrown value here is an ordinary
//! [`Value`] — `throw "x"` throws the string `"x"`, not a diagnostic
//! record — matching source-language semantics rather than the compiler's
//! own error taxonomy.

use crate::value::Value;

/// What a statement did, other than run straight through to its next
/// sibling. Loops and switches consume `Break`/`Continue` that name no
/// label or that name one of their own active labels; anything else
/// propagates up to an enclosing construct, mirroring the checker's own
/// label-target validation (`tsc_core_checker::narrowing`'s control-flow
/// invariants) which guarantees by the time the interpreter runs that
/// every label reference here is well-formed.
#[derive(Debug, Clone)]
pub enum Signal {
    Normal,
    Return(Value),
    Break(Option<String>),
    Continue(Option<String>),
}

/// A thrown value unwinding the Rust call stack. `exec_stmt`/`eval_expr`
/// return `Result<_, Thrown>` uniformly so `?` propagates a JS exception
/// exactly like a Rust one, and `try`/`catch` is the only place that turns
/// it back into a normal `Signal`.
#[derive(Debug, Clone)]
pub struct Thrown(pub Value);

pub type EvalResult = Result<Value, Thrown>;
pub type ExecResult = Result<Signal, Thrown>;

impl Thrown {
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Thrown(Value::String(message.into().into()))
    }
}

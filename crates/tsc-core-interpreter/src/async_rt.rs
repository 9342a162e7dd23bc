//! The interpreter's async and generator execution model (§4.6 "Async
//! lowering", §5 "Suspension").
//!
//! A tree-walking interpreter has no need for the IL emitter's explicit
//! `MoveNext` state machine (`tsc_core_lowering::async_lowering` computes
//! that *shape* for the emitter to turn into real states): the Rust call
//! stack already suspends and resumes correctly across ordinary function
//! calls. What it cannot do is yield control back to an event loop at an
//! `await` point, because this core does not implement one (Promises,
//! timers, and microtask scheduling are runtime-library concerns, out of
//! scope per §1). So `await` here resolves eagerly and synchronously: the
//! awaited expression is expected to already be settled by the time
//! control reaches it, matching `Value::Promise`'s doc comment. This
//! preserves §5's ordering guarantee (one resumption at a time, in
//! program order) trivially, since there genuinely is no concurrency.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{EvalResult, Thrown};
use crate::value::{PromiseState, Value};

/// Wraps a value as a settled, fulfilled promise (what a non-throwing
/// `async function`'s return value becomes, and what `Promise.resolve`
/// would produce).
#[must_use]
pub fn fulfilled(value: Value) -> Value {
    Value::Promise(Rc::new(RefCell::new(PromiseState::Fulfilled(value))))
}

#[must_use]
pub fn rejected(value: Value) -> Value {
    Value::Promise(Rc::new(RefCell::new(PromiseState::Rejected(value))))
}

/// Runs an `async function`'s body to completion eagerly, then wraps
/// whatever it returns (or throws) in a settled promise — the "the lowered
/// async-function state machine *model* is explicit" contract from §5,
/// specialized to a single-threaded tree-walker with no real task queue.
#[must_use]
pub fn wrap_async_result(result: EvalResult) -> Value {
    match result {
        Ok(value) => fulfilled(value),
        Err(Thrown(value)) => rejected(value),
    }
}

/// `await expr`: unwraps a settled promise's value, re-throwing a
/// rejection as a normal thrown exception in the awaiting function — the
/// await-resumption step of the state machine, collapsed to an immediate
/// unwrap since resolution already happened by construction.
pub fn await_value(value: Value) -> EvalResult {
    match value {
        Value::Promise(state) => match &*state.borrow() {
            PromiseState::Fulfilled(v) => Ok(v.clone()),
            PromiseState::Rejected(v) => Err(Thrown(v.clone())),
            PromiseState::Pending => Err(Thrown::type_error("await on a promise that never settled")),
        },
        other => Ok(other),
    }
}

/// A generator's eagerly-collected yield sequence (§4.6 models generators
/// the same way as async: run to completion, since this core has no
/// suspendable coroutine machinery, then expose the results through an
/// iterator-shaped object). `next()` pulls one value at a time from the
/// pre-computed queue; the generator function itself has already finished
/// running by the time any value is requested.
pub struct GeneratorQueue {
    pub values: RefCell<std::collections::VecDeque<Value>>,
    pub return_value: Value,
}

impl GeneratorQueue {
    #[must_use]
    pub fn new(values: Vec<Value>, return_value: Value) -> Rc<Self> {
        Rc::new(GeneratorQueue { values: RefCell::new(values.into()), return_value })
    }

    /// `{ value, done }` shape for one `.next()` call.
    #[must_use]
    pub fn next(&self) -> (Value, bool) {
        match self.values.borrow_mut().pop_front() {
            Some(v) => (v, false),
            None => (self.return_value.clone(), true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn await_unwraps_a_fulfilled_promise() {
        let p = fulfilled(Value::Number(42.0));
        let v = await_value(p).unwrap();
        assert!(matches!(v, Value::Number(n) if n == 42.0));
    }

    #[test]
    fn await_rethrows_a_rejected_promise() {
        let p = rejected(Value::String("boom".into()));
        assert!(await_value(p).is_err());
    }

    #[test]
    fn await_on_a_non_promise_is_the_identity() {
        let v = await_value(Value::Number(1.0)).unwrap();
        assert!(matches!(v, Value::Number(n) if n == 1.0));
    }

    #[test]
    fn generator_queue_yields_then_reports_done() {
        let q = GeneratorQueue::new(vec![Value::Number(1.0), Value::Number(2.0)], Value::Undefined);
        let (v1, done1) = q.next();
        assert!(matches!(v1, Value::Number(n) if n == 1.0) && !done1);
        let (_, done2) = q.next();
        assert!(!done2);
        let (_, done3) = q.next();
        assert!(done3);
    }
}

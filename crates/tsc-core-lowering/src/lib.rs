//! The shared lowering dispatcher kernel (§4.6): the expression/statement
//! dispatch trait both back-ends drive, stack-type tracking, property and
//! method dispatch decisions, closure capture analysis, async state-machine
//! shape computation, and ES2022 private-slot brand checking.
//!
//! Neither back-end constructs its own copy of this machinery — the
//! interpreter and the IL emitter both call into this crate so the two
//! back-ends can never disagree about, say, whether `obj.x` dispatches
//! directly or dynamically.

pub mod async_lowering;
pub mod closures;
pub mod dispatch;
pub mod private_slots;
pub mod property_dispatch;
pub mod stack_type;

pub use dispatch::{dispatch_expr, dispatch_stmt, LoweringHooks};
pub use property_dispatch::{classify_member_dispatch, BuiltinReceiver, DispatchKind};
pub use stack_type::{stack_type_of, StackType};

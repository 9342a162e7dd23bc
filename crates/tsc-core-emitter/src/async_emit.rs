//! Async function emission (§4.6 "Async lowering").
//!
//! `tsc_core_lowering::async_lowering::split_into_states` computes the
//! *shape* of an async body's state machine; this module turns that shape
//! into a concrete `MoveNext`-style instruction stream, grounded on
//! `tsz-emitter`'s `es5_helpers_async.rs` (a numbered switch jumping into
//! the state that was suspended, with hoisted locals read from a record
//! rather than the call stack).

use tsc_core_ast::{Param, Stmt};
use tsc_core_lowering::async_lowering::{split_into_states, AsyncState};

use crate::context::EmitContext;
use crate::instr::{Instr, Label, LocalType};
use crate::stmt::StmtEmitter;

pub struct EmittedAsyncMethod {
    pub instrs: Vec<Instr>,
    pub param_names: Vec<String>,
}

/// Lowers an `async` function/method body to its `MoveNext` instruction
/// stream. Callers are responsible for everything outside the state
/// machine itself (declaring `this`, splicing in a constructor's field
/// initializers, etc) exactly as they would for a non-async method, since
/// the state split only changes how the *body* turns into instructions.
pub fn emit_async_method(ctx: &mut EmitContext, params: &[Param], body: &[Stmt]) -> EmittedAsyncMethod {
    ctx.flags.in_async_state_machine = true;

    let mut param_names = Vec::new();
    for p in params {
        let mut bound = Vec::new();
        p.pattern.bound_names(&mut bound);
        for name in &bound {
            ctx.locals.declare(name, LocalType::Boxed);
        }
        param_names.extend(bound);
    }

    let machine = split_into_states(body);
    for name in &machine.hoisted_locals {
        ctx.locals.declare(name, LocalType::Boxed);
    }

    let state_labels: Vec<Label> = machine.states.iter().map(|_| ctx.new_label()).collect();

    let mut body_instrs = vec![Instr::DispatchState(state_labels.clone())];
    for (state, &label) in machine.states.iter().zip(&state_labels) {
        body_instrs.push(Instr::Label(label));
        body_instrs.extend(lower_state(ctx, state));
    }

    let mut instrs = ctx.locals.declare_instructions();
    instrs.push(Instr::BuildAsyncStateMachine { hoisted_locals: u32::try_from(machine.hoisted_locals.len()).unwrap_or(0) });
    instrs.extend(body_instrs);

    EmittedAsyncMethod { instrs, param_names }
}

/// Lowers one state's statements, then patches the `AwaitSuspend` the
/// state's trailing await produced (`on_await` hard-codes `resume_state: 0`
/// since it has no view of the whole-function split) with the real state
/// this suspension resumes into.
fn lower_state(ctx: &mut EmitContext, state: &AsyncState) -> Vec<Instr> {
    let mut emitter = StmtEmitter::new(ctx);
    let mut instrs = emitter.lower_body(&state.statements);
    if let Some(point) = &state.suspends {
        for instr in instrs.iter_mut().rev() {
            if let Instr::AwaitSuspend { resume_state } = instr {
                *resume_state = point.resume_state;
                break;
            }
        }
    }
    instrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsc_core_ast::{Expr, ExprKind, NodeId, Stmt, StmtKind};
    use tsc_core_common::Span;

    fn span() -> Span {
        Span::new(0, 0)
    }

    fn await_stmt() -> Stmt {
        let awaited = Expr { id: NodeId(1), span: span(), kind: ExprKind::UndefinedLiteral };
        let await_expr = Expr { id: NodeId(2), span: span(), kind: ExprKind::Await(Box::new(awaited)) };
        Stmt { id: NodeId(3), span: span(), kind: StmtKind::Expr(await_expr) }
    }

    #[test]
    fn a_single_await_splits_the_body_into_two_states() {
        let mut ctx = EmitContext::new(tsc_core_checker::TypeMap::new());
        let body = vec![await_stmt()];
        let emitted = emit_async_method(&mut ctx, &[], &body);
        assert!(emitted.instrs.iter().any(|i| matches!(i, Instr::DispatchState(labels) if labels.len() == 2)));
    }

    #[test]
    fn the_await_suspend_is_patched_to_its_real_resume_state() {
        let mut ctx = EmitContext::new(tsc_core_checker::TypeMap::new());
        let body = vec![await_stmt()];
        let emitted = emit_async_method(&mut ctx, &[], &body);
        assert!(emitted.instrs.iter().any(|i| matches!(i, Instr::AwaitSuspend { resume_state: 1 })));
    }
}

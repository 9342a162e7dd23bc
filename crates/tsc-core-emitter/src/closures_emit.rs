//! Closure-record construction (§4.6 "Closures").
//!
//! `tsc_core_lowering::closures::{analyze_arrow, analyze_function}` compute
//! *which* outer bindings a function value needs; this module builds the
//! actual capture record an emitted closure carries: each captured name's
//! current value pushed in first-seen order, `this` appended when the body
//! reads it, then one `NewObject` constructing the runtime's closure value.
//! A function value capturing nothing lowers to a zero-argument
//! `StaticCallable` instead, since it needs no per-call-site allocation.

use tsc_core_ast::{ArrowExpr, FunctionExpr};
use tsc_core_lowering::closures::{analyze_arrow, analyze_function, CaptureSet};

use crate::context::EmitContext;
use crate::instr::{Instr, LocalSlot};

pub fn emit_arrow_closure(ctx: &mut EmitContext, arrow: &ArrowExpr) -> Vec<Instr> {
    let captures = analyze_arrow(arrow, &ctx.locals.declared_names());
    build_closure(ctx, &captures, "Closure")
}

pub fn emit_function_closure(ctx: &mut EmitContext, func: &FunctionExpr) -> Vec<Instr> {
    let captures = analyze_function(func, &ctx.locals.declared_names());
    build_closure(ctx, &captures, "Function")
}

fn build_closure(ctx: &mut EmitContext, captures: &CaptureSet, class: &str) -> Vec<Instr> {
    if !captures.is_capturing() {
        return vec![Instr::NewObject { class: "StaticCallable".to_string(), arg_count: 0 }];
    }
    let mut instrs = Vec::new();
    for name in &captures.captured {
        instrs.push(match ctx.locals.lookup(name) {
            Some(slot) => Instr::LoadLocal(slot),
            None => Instr::GetProperty(name.clone()),
        });
    }
    if captures.captures_this {
        instrs.push(Instr::LoadLocal(LocalSlot(0)));
    }
    let arg_count = u32::try_from(captures.captured.len() + usize::from(captures.captures_this)).unwrap_or(0);
    instrs.push(Instr::NewObject { class: class.to_string(), arg_count });
    instrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsc_core_ast::{ArrowBody, Expr, ExprKind, Ident, NodeId};
    use tsc_core_checker::TypeMap;
    use tsc_core_common::Span;

    fn span() -> Span {
        Span::new(0, 0)
    }

    fn ident_expr(name: &str) -> Expr {
        Expr { id: NodeId(1), span: span(), kind: ExprKind::Ident(Ident { id: NodeId(2), name: name.to_string(), span: span() }) }
    }

    #[test]
    fn a_non_capturing_arrow_becomes_a_static_callable() {
        let mut ctx = EmitContext::new(TypeMap::new());
        let arrow = ArrowExpr { type_params: vec![], params: vec![], return_type: None, body: ArrowBody::Expr(Box::new(ident_expr("x"))), is_async: false };
        let instrs = emit_arrow_closure(&mut ctx, &arrow);
        assert_eq!(instrs, vec![Instr::NewObject { class: "StaticCallable".to_string(), arg_count: 0 }]);
    }

    #[test]
    fn a_capturing_arrow_loads_the_captured_local_before_constructing() {
        let mut ctx = EmitContext::new(TypeMap::new());
        let slot = ctx.locals.declare("outerVar", crate::instr::LocalType::Boxed);
        let arrow = ArrowExpr { type_params: vec![], params: vec![], return_type: None, body: ArrowBody::Expr(Box::new(ident_expr("outerVar"))), is_async: false };
        let instrs = emit_arrow_closure(&mut ctx, &arrow);
        assert_eq!(instrs[0], Instr::LoadLocal(slot));
        assert_eq!(instrs[1], Instr::NewObject { class: "Closure".to_string(), arg_count: 1 });
    }
}

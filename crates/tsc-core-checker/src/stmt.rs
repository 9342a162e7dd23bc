//! Statement checking (§4.3): variable declarations (with `let`/`var`
//! widening vs. `const` literal retention), control flow, and the
//! loop/switch/label bookkeeping `Checker` exposes.

use crate::context::Checker;
use crate::decl;
use crate::error::CheckResult;
use crate::expr::{check_expr, check_expr_contextual};
use crate::narrowing;
use tsc_core_ast::*;
use tsc_core_common::diagnostics::{diagnostic_codes, ErrorKind};
use tsc_core_types::env::ScopeKind;
use tsc_core_types::model::*;
use tsc_core_types::normalize::{is_assignable, make_union};

pub fn check_block(ck: &mut Checker, stmts: &[Stmt]) -> CheckResult<()> {
    decl::predeclare_decls(ck, stmts);
    for stmt in stmts {
        check_stmt(ck, stmt)?;
    }
    Ok(())
}

pub fn check_stmt(ck: &mut Checker, stmt: &Stmt) -> CheckResult<()> {
    match &stmt.kind {
        StmtKind::Expr(e) => {
            check_expr(ck, e)?;
            Ok(())
        }
        StmtKind::VariableDecl(decl) => check_variable_decl(ck, decl),
        StmtKind::Block(stmts) => {
            ck.env.push_scope(ScopeKind::Block);
            let result = check_block(ck, stmts);
            ck.env.pop_scope();
            result
        }
        StmtKind::If { test, consequent, alternate } => check_if(ck, test, consequent, alternate.as_deref()),
        StmtKind::For { init, test, update, body } => check_for(ck, init.as_deref(), test, update, body, stmt.span),
        StmtKind::ForIn { left, right, body } => check_for_in(ck, left, right, body, stmt.span),
        StmtKind::ForOf { left, right, body, is_await } => check_for_of(ck, left, right, body, *is_await, stmt.span),
        StmtKind::While { test, body } => check_while(ck, test, body, stmt.span),
        StmtKind::DoWhile { body, test } => check_do_while(ck, body, test, stmt.span),
        StmtKind::Return(value) => check_return(ck, value.as_ref(), stmt.span),
        StmtKind::Break(label) => check_break_continue(ck, label.as_deref(), stmt.span, true),
        StmtKind::Continue(label) => check_break_continue(ck, label.as_deref(), stmt.span, false),
        StmtKind::Throw(e) => {
            check_expr(ck, e)?;
            Ok(())
        }
        StmtKind::Try { block, handler, finalizer } => check_try(ck, block, handler.as_ref(), finalizer.as_deref()),
        StmtKind::Switch { discriminant, cases } => check_switch(ck, discriminant, cases),
        StmtKind::Labeled { label, body } => check_labeled(ck, label, body, stmt.span),
        StmtKind::Decl(d) => decl::check_decl(ck, d),
        StmtKind::Empty => Ok(()),
    }
}

/// `let`/`var` widen a literal initializer to its primitive (so later
/// reassignment to any value of that primitive is allowed); `const` keeps
/// the narrow literal type, since it can never be reassigned (§3 widening
/// invariant, applied at the declaration site rather than inside
/// `normalize`).
fn widen_for_kind(kind: VariableDeclKind, ty: &Ty) -> Ty {
    if kind == VariableDeclKind::Const {
        return ty.clone();
    }
    match ty.widen_literal() {
        Some(widened) => widened.rc(),
        None => ty.clone(),
    }
}

fn check_variable_decl(ck: &mut Checker, decl: &VariableDecl) -> CheckResult<()> {
    let is_const = decl.kind == VariableDeclKind::Const;
    for d in &decl.declarators {
        let declared = ck.resolve_type_opt(&d.type_ann)?;
        let init_ty = match (&d.init, &declared) {
            (Some(init), Some(target)) => Some(check_expr_contextual(ck, init, Some(target))?),
            (Some(init), None) => Some(check_expr(ck, init)?),
            (None, _) => None,
        };
        if let (Some(target), Some(actual)) = (&declared, &init_ty) {
            if !is_assignable(target, actual) {
                return ck.error(
                    ErrorKind::Type,
                    diagnostic_codes::NOT_ASSIGNABLE,
                    format!("Type '{actual}' is not assignable to type '{target}'."),
                    d.pattern.span(),
                );
            }
        }
        let final_ty = match (declared, init_ty) {
            (Some(target), _) => target,
            (None, Some(inferred)) => widen_for_kind(decl.kind, &inferred),
            (None, None) => well_known::any(),
        };
        let mut names = Vec::new();
        d.pattern.bound_names(&mut names);
        for name in names {
            ck.env.declare_variable(name, final_ty.clone(), is_const);
        }
    }
    Ok(())
}

fn push_narrowed(ck: &mut Checker, narrowings: &[(String, Ty)]) {
    ck.env.push_scope(ScopeKind::Block);
    for (name, ty) in narrowings {
        ck.env.update_variable(name, ty.clone());
    }
}

fn check_if(ck: &mut Checker, test: &Expr, consequent: &Stmt, alternate: Option<&Stmt>) -> CheckResult<()> {
    let n = narrowing::analyze(&ck.env, test);
    check_expr(ck, test)?;

    push_narrowed(ck, &n.then);
    let c = check_stmt(ck, consequent);
    ck.env.pop_scope();
    c?;

    if let Some(alt) = alternate {
        push_narrowed(ck, &n.els);
        let a = check_stmt(ck, alt);
        ck.env.pop_scope();
        a?;
    }
    Ok(())
}

fn check_for(ck: &mut Checker, init: Option<&ForInit>, test: &Option<Expr>, update: &Option<Expr>, body: &Stmt, _span: tsc_core_common::Span) -> CheckResult<()> {
    ck.env.push_scope(ScopeKind::Block);
    let result = (|| {
        match init {
            Some(ForInit::VarDecl(decl)) => check_variable_decl(ck, decl)?,
            Some(ForInit::Expr(e)) => {
                check_expr(ck, e)?;
            }
            None => {}
        }
        if let Some(test) = test {
            check_expr(ck, test)?;
        }
        if let Some(update) = update {
            check_expr(ck, update)?;
        }
        ck.enter_loop();
        let body_result = check_stmt(ck, body);
        ck.leave_loop();
        body_result
    })();
    ck.env.pop_scope();
    result
}

fn declare_for_target(ck: &mut Checker, left: &ForTarget, element_ty: Ty) {
    ck.env.push_scope(ScopeKind::Block);
    match left {
        ForTarget::VarDecl(kind, pattern) => {
            let mut names = Vec::new();
            pattern.bound_names(&mut names);
            let is_const = *kind == VariableDeclKind::Const;
            for name in names {
                ck.env.declare_variable(name, element_ty.clone(), is_const);
            }
        }
        ForTarget::Pattern(pattern) => {
            let mut names = Vec::new();
            pattern.bound_names(&mut names);
            for name in names {
                ck.env.update_variable(&name, element_ty.clone());
            }
        }
    }
}

fn check_for_in(ck: &mut Checker, left: &ForTarget, right: &Expr, body: &Stmt, _span: tsc_core_common::Span) -> CheckResult<()> {
    check_expr(ck, right)?;
    declare_for_target(ck, left, well_known::string());
    ck.enter_loop();
    let result = check_stmt(ck, body);
    ck.leave_loop();
    ck.env.pop_scope();
    result
}

fn iteration_element(ty: &Ty) -> Ty {
    match &**ty {
        TypeInfo::Array(el) => el.clone(),
        TypeInfo::Tuple { elements, .. } => make_union(elements.iter().map(|e| e.ty.clone()).collect()),
        TypeInfo::Set(el) => el.clone(),
        TypeInfo::StringType | TypeInfo::StringLiteral(_) => well_known::string(),
        _ => well_known::any(),
    }
}

fn check_for_of(ck: &mut Checker, left: &ForTarget, right: &Expr, body: &Stmt, is_await: bool, _span: tsc_core_common::Span) -> CheckResult<()> {
    let right_ty = check_expr(ck, right)?;
    let iterated = if is_await {
        match &*right_ty {
            TypeInfo::Promise(inner) => iteration_element(inner),
            _ => iteration_element(&right_ty),
        }
    } else {
        iteration_element(&right_ty)
    };
    declare_for_target(ck, left, iterated);
    ck.enter_loop();
    let result = check_stmt(ck, body);
    ck.leave_loop();
    ck.env.pop_scope();
    result
}

fn check_while(ck: &mut Checker, test: &Expr, body: &Stmt, _span: tsc_core_common::Span) -> CheckResult<()> {
    let n = narrowing::analyze(&ck.env, test);
    check_expr(ck, test)?;
    push_narrowed(ck, &n.then);
    ck.enter_loop();
    let result = check_stmt(ck, body);
    ck.leave_loop();
    ck.env.pop_scope();
    result
}

fn check_do_while(ck: &mut Checker, body: &Stmt, test: &Expr, _span: tsc_core_common::Span) -> CheckResult<()> {
    ck.enter_loop();
    let body_result = check_stmt(ck, body);
    ck.leave_loop();
    body_result?;
    check_expr(ck, test)?;
    Ok(())
}

fn check_return(ck: &mut Checker, value: Option<&Expr>, span: tsc_core_common::Span) -> CheckResult<()> {
    let Some(func) = ck.current_function().cloned() else {
        return ck.error(ErrorKind::Structural, diagnostic_codes::RETURN_OUTSIDE_FUNCTION, "A 'return' statement can only be used within a function body.", span);
    };
    let actual = match value {
        Some(e) => check_expr_contextual(ck, e, Some(&func.return_type))?,
        None => well_known::undefined(),
    };
    let expected = if func.is_generator { return Ok(()) } else { func.return_type.clone() };
    if !expected.is_any() && !is_assignable(&expected, &actual) {
        return ck.error(
            ErrorKind::Type,
            diagnostic_codes::RETURN_TYPE_MISMATCH,
            format!("Type '{actual}' is not assignable to return type '{expected}'."),
            span,
        );
    }
    Ok(())
}

fn check_break_continue(ck: &Checker, label: Option<&str>, span: tsc_core_common::Span, is_break: bool) -> CheckResult<()> {
    if let Some(label) = label {
        match ck.label_target(label) {
            None => {
                return ck.error(ErrorKind::Structural, diagnostic_codes::CONTINUE_TARGET_NOT_LOOP, format!("Cannot find label named '{label}'."), span);
            }
            Some(crate::context::LabelTarget::Plain) if !is_break => {
                return ck.error(
                    ErrorKind::Structural,
                    diagnostic_codes::CONTINUE_TARGET_NOT_LOOP,
                    format!("A 'continue' statement can only jump to a label of an enclosing loop; '{label}' does not label a loop."),
                    span,
                );
            }
            _ => return Ok(()),
        }
    }
    if is_break {
        if !ck.in_loop_or_switch() {
            return ck.error(ErrorKind::Structural, diagnostic_codes::BREAK_OUTSIDE_LOOP, "A 'break' statement can only be used within an enclosing iteration or switch statement.", span);
        }
    } else if !ck.in_loop() {
        return ck.error(ErrorKind::Structural, diagnostic_codes::CONTINUE_OUTSIDE_LOOP, "A 'continue' statement can only be used within an enclosing iteration statement.", span);
    }
    Ok(())
}

fn check_try(ck: &mut Checker, block: &[Stmt], handler: Option<&CatchClause>, finalizer: Option<&[Stmt]>) -> CheckResult<()> {
    ck.env.push_scope(ScopeKind::Block);
    let block_result = check_block(ck, block);
    ck.env.pop_scope();
    block_result?;

    if let Some(handler) = handler {
        ck.env.push_scope(ScopeKind::Block);
        if let Some(param) = &handler.param {
            let mut names = Vec::new();
            param.bound_names(&mut names);
            for name in names {
                ck.env.declare_variable(name, well_known::unknown(), false);
            }
        }
        let handler_result = check_block(ck, &handler.body);
        ck.env.pop_scope();
        handler_result?;
    }

    if let Some(finalizer) = finalizer {
        ck.env.push_scope(ScopeKind::Block);
        let finalizer_result = check_block(ck, finalizer);
        ck.env.pop_scope();
        finalizer_result?;
    }
    Ok(())
}

fn check_switch(ck: &mut Checker, discriminant: &Expr, cases: &[SwitchCase]) -> CheckResult<()> {
    check_expr(ck, discriminant)?;
    ck.env.push_scope(ScopeKind::Block);
    ck.enter_switch();
    let result = (|| {
        for case in cases {
            if let Some(test) = &case.test {
                check_expr(ck, test)?;
            }
            check_block(ck, &case.consequent)?;
        }
        Ok(())
    })();
    ck.leave_switch();
    ck.env.pop_scope();
    result
}

fn check_labeled(ck: &mut Checker, label: &str, body: &Stmt, span: tsc_core_common::Span) -> CheckResult<()> {
    let target = match &body.kind {
        StmtKind::For { .. } | StmtKind::ForIn { .. } | StmtKind::ForOf { .. } | StmtKind::While { .. } | StmtKind::DoWhile { .. } => crate::context::LabelTarget::Loop,
        StmtKind::Switch { .. } => crate::context::LabelTarget::Switch,
        _ => crate::context::LabelTarget::Plain,
    };
    ck.push_label(label.to_string(), target, span)?;
    let result = check_stmt(ck, body);
    ck.pop_label();
    result
}

//! Statement lowering (§6): each `Stmt` lowers to zero or more `Instr`s via
//! `dispatch_stmt`. Unlike [`crate::expr::ExprEmitter`], the statement hooks
//! below return `()` (matching `LoweringHooks`'s stmt-hook signatures) and
//! instead append to `self.out` in place — a statement has no single
//! "result value" the way an expression does.

use tsc_core_ast::{DeclKind, Expr, ForInit, ForTarget, Pattern, Stmt, StmtKind};
use tsc_core_lowering::{dispatch_stmt, LoweringHooks};

use crate::context::EmitContext;
use crate::expr::ExprEmitter;
use crate::instr::{CallTarget, Instr, Label, LocalType};

struct LoopFrame {
    label: Option<String>,
    continue_target: Label,
    break_target: Label,
}

pub struct StmtEmitter<'a> {
    pub ctx: &'a mut EmitContext,
    pub out: Vec<Instr>,
    loop_stack: Vec<LoopFrame>,
    pending_label: Option<String>,
}

impl<'a> StmtEmitter<'a> {
    #[must_use]
    pub fn new(ctx: &'a mut EmitContext) -> Self {
        Self { ctx, out: Vec::new(), loop_stack: Vec::new(), pending_label: None }
    }

    /// Lowers a whole method/function body, returning the full instruction
    /// stream (the `LocalTable`'s `DeclareLocal` prologue is prepended by
    /// the caller once every local used in the body has been allocated).
    pub fn lower_body(&mut self, stmts: &[Stmt]) -> Vec<Instr> {
        for s in stmts {
            dispatch_stmt(self, s);
        }
        std::mem::take(&mut self.out)
    }

    fn lower_expr(&mut self, expr: &Expr) -> Vec<Instr> {
        ExprEmitter::new(self.ctx).lower(expr)
    }

    fn emit_expr_stmt(&mut self, expr: &Expr) {
        let instrs = self.lower_expr(expr);
        self.out.extend(instrs);
        // Every expression lowering except `Assign` leaves exactly one
        // value on the stack (§4.6); an assignment's `StoreLocal`/
        // `SetProperty` already consumes it, so only the other kinds need
        // an explicit pop to keep the stack balanced at a statement
        // boundary.
        if !matches!(expr.kind, tsc_core_ast::ExprKind::Assign { .. }) {
            self.out.push(Instr::Pop);
        }
    }

    fn declare_pattern(&mut self, pattern: &Pattern, init: Option<&Expr>) {
        match pattern {
            Pattern::Ident(id) => {
                let ty = init
                    .and_then(|e| self.ctx.type_map.get(e.id))
                    .map_or(LocalType::Boxed, |t| LocalType::from(tsc_core_lowering::stack_type::stack_type_of(&t)));
                let slot = self.ctx.locals.declare(&id.name, ty);
                if let Some(e) = init {
                    let instrs = self.lower_expr(e);
                    self.out.extend(instrs);
                    self.out.push(Instr::StoreLocal(slot));
                } else {
                    self.out.push(Instr::LoadUndefined);
                    self.out.push(Instr::StoreLocal(slot));
                }
            }
            Pattern::Array(arr) => {
                let temp = self.ctx.locals.alloc_temp(LocalType::Boxed);
                if let Some(e) = init {
                    let instrs = self.lower_expr(e);
                    self.out.extend(instrs);
                } else {
                    self.out.push(Instr::LoadUndefined);
                }
                self.out.push(Instr::StoreLocal(temp));
                for (index, element) in arr.elements.iter().enumerate() {
                    let Some(el) = element else { continue };
                    self.out.push(Instr::LoadLocal(temp));
                    self.out.push(Instr::LoadConstNumber(index as f64));
                    self.out.push(Instr::Call { target: CallTarget::Dynamic { method: "__index".to_string() }, arg_count: 1 });
                    let element_temp = self.ctx.locals.alloc_temp(LocalType::Boxed);
                    self.out.push(Instr::StoreLocal(element_temp));
                    self.declare_pattern_from_temp(el, element_temp);
                }
            }
            Pattern::Object(obj) => {
                let temp = self.ctx.locals.alloc_temp(LocalType::Boxed);
                if let Some(e) = init {
                    let instrs = self.lower_expr(e);
                    self.out.extend(instrs);
                } else {
                    self.out.push(Instr::LoadUndefined);
                }
                self.out.push(Instr::StoreLocal(temp));
                for prop in &obj.properties {
                    self.out.push(Instr::LoadLocal(temp));
                    self.out.push(Instr::GetProperty(prop.key.clone()));
                    let prop_temp = self.ctx.locals.alloc_temp(LocalType::Boxed);
                    self.out.push(Instr::StoreLocal(prop_temp));
                    self.declare_pattern_from_temp(&prop.value, prop_temp);
                }
            }
            Pattern::Rest(inner) => self.declare_pattern(inner, init),
            Pattern::Assign(inner, default) => {
                // `{ x = defaultExpr } = obj`: fall back to the default only
                // when the destructured value is `undefined`, matching the
                // source language's default-value semantics rather than
                // nullish-coalescing's broader "null or undefined" check.
                match init {
                    Some(_) => self.declare_pattern(inner, init),
                    None => self.declare_pattern(inner, Some(default.as_ref())),
                }
            }
        }
    }

    /// Binds the already-evaluated value sitting in `temp` to `pattern`,
    /// recursing for nested destructuring without re-evaluating `init`.
    fn declare_pattern_from_temp(&mut self, pattern: &Pattern, temp: crate::instr::LocalSlot) {
        match pattern {
            Pattern::Ident(id) => {
                let slot = self.ctx.locals.declare(&id.name, LocalType::Boxed);
                self.out.push(Instr::LoadLocal(temp));
                self.out.push(Instr::StoreLocal(slot));
            }
            Pattern::Array(_) | Pattern::Object(_) => {
                self.out.push(Instr::LoadLocal(temp));
                self.out.push(Instr::StoreLocal(temp));
                self.declare_pattern(pattern, None);
            }
            Pattern::Rest(inner) => self.declare_pattern_from_temp(inner, temp),
            Pattern::Assign(inner, _) => self.declare_pattern_from_temp(inner, temp),
        }
    }
}

impl<'a> LoweringHooks for StmtEmitter<'a> {
    type Out = Vec<crate::instr::Instr>;

    fn on_block(&mut self, stmts: &[Stmt]) {
        for s in stmts {
            dispatch_stmt(self, s);
        }
    }

    fn on_expr_stmt(&mut self, expr: &Expr) {
        self.emit_expr_stmt(expr);
    }

    fn on_variable_decl(&mut self, stmt: &Stmt) {
        let StmtKind::VariableDecl(decl) = &stmt.kind else { return };
        // `var`/`let`/`const` distinctions are the checker's concern
        // (redeclaration, TDZ, reassignment); by emission time every
        // declarator lowers the same way.
        for declarator in &decl.declarators {
            self.declare_pattern(&declarator.pattern, declarator.init.as_ref());
        }
    }

    fn on_if(&mut self, stmt: &Stmt) {
        let StmtKind::If { test, consequent, alternate } = &stmt.kind else { return };
        let else_label = self.ctx.new_label();
        let end_label = self.ctx.new_label();
        let test_instrs = self.lower_expr(test);
        self.out.extend(test_instrs);
        self.out.push(Instr::BranchIfFalse(else_label));
        dispatch_stmt(self, consequent);
        self.out.push(Instr::Branch(end_label));
        self.out.push(Instr::Label(else_label));
        if let Some(alt) = alternate {
            dispatch_stmt(self, alt);
        }
        self.out.push(Instr::Label(end_label));
    }

    fn on_loop(&mut self, stmt: &Stmt) {
        let label = self.pending_label.take();
        match &stmt.kind {
            StmtKind::While { test, body } => self.lower_while(label, test, body),
            StmtKind::DoWhile { body, test } => self.lower_do_while(label, body, test),
            StmtKind::For { init, test, update, body } => self.lower_for(label, init.as_deref(), test.as_ref(), update.as_ref(), body),
            StmtKind::ForIn { left, right, body } => self.lower_for_in_of(label, left, right, body, false),
            StmtKind::ForOf { left, right, body, .. } => self.lower_for_in_of(label, left, right, body, true),
            _ => {}
        }
    }

    fn on_return(&mut self, stmt: &Stmt) {
        let StmtKind::Return(value) = &stmt.kind else { return };
        match value {
            Some(e) => {
                let instrs = self.lower_expr(e);
                self.out.extend(instrs);
                self.out.push(Instr::Return);
            }
            None => self.out.push(Instr::ReturnVoid),
        }
    }

    fn on_break_continue(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Break(label) => {
                if let Some(target) = self.resolve_loop_target(label.as_deref(), true) {
                    self.out.push(Instr::Branch(target));
                }
            }
            StmtKind::Continue(label) => {
                if let Some(target) = self.resolve_loop_target(label.as_deref(), false) {
                    self.out.push(Instr::Branch(target));
                }
            }
            _ => {}
        }
    }

    fn on_throw(&mut self, stmt: &Stmt) {
        let StmtKind::Throw(e) = &stmt.kind else { return };
        let instrs = self.lower_expr(e);
        self.out.extend(instrs);
        self.out.push(Instr::Throw);
    }

    fn on_try(&mut self, stmt: &Stmt) {
        let StmtKind::Try { block, handler, finalizer } = &stmt.kind else { return };
        let handler_label = self.ctx.new_label();
        let finally_label = finalizer.is_some().then(|| self.ctx.new_label());
        self.out.push(Instr::EnterTry { handler: handler_label, finally: finally_label });
        for s in block {
            dispatch_stmt(self, s);
        }
        self.out.push(Instr::LeaveTry);
        if let Some(fl) = finally_label {
            self.out.push(Instr::Branch(fl));
        }
        self.out.push(Instr::Label(handler_label));
        if let Some(catch) = handler {
            self.lower_catch(catch);
        }
        self.out.push(Instr::LeaveCatch);
        if let Some(fl) = finally_label {
            self.out.push(Instr::Label(fl));
        }
        if let Some(fin) = finalizer {
            self.out.push(Instr::EnterFinally);
            for s in fin {
                dispatch_stmt(self, s);
            }
            self.out.push(Instr::LeaveFinally);
        }
    }

    fn on_switch(&mut self, stmt: &Stmt) {
        let StmtKind::Switch { discriminant, cases } = &stmt.kind else { return };
        let label = self.pending_label.take();
        let end_label = self.ctx.new_label();
        self.loop_stack.push(LoopFrame { label, continue_target: end_label, break_target: end_label });

        let disc_instrs = self.lower_expr(discriminant);
        let disc_temp = self.ctx.locals.alloc_temp(LocalType::Boxed);
        self.out.extend(disc_instrs);
        self.out.push(Instr::StoreLocal(disc_temp));

        let case_labels: Vec<Label> = cases.iter().map(|_| self.ctx.new_label()).collect();
        let default_index = cases.iter().position(|c| c.test.is_none());
        for (case, &case_label) in cases.iter().zip(&case_labels) {
            if let Some(test) = &case.test {
                self.out.push(Instr::LoadLocal(disc_temp));
                let test_instrs = self.lower_expr(test);
                self.out.extend(test_instrs);
                self.out.push(Instr::StrictEq);
                self.out.push(Instr::BranchIfTrue(case_label));
            }
        }
        match default_index {
            Some(i) => self.out.push(Instr::Branch(case_labels[i])),
            None => self.out.push(Instr::Branch(end_label)),
        }
        for (case, &case_label) in cases.iter().zip(&case_labels) {
            self.out.push(Instr::Label(case_label));
            for s in &case.consequent {
                dispatch_stmt(self, s);
            }
        }
        self.out.push(Instr::Label(end_label));
        self.loop_stack.pop();
    }

    fn on_labeled(&mut self, stmt: &Stmt) {
        let StmtKind::Labeled { label, body } = &stmt.kind else { return };
        if matches!(body.kind, StmtKind::For { .. } | StmtKind::ForIn { .. } | StmtKind::ForOf { .. } | StmtKind::While { .. } | StmtKind::DoWhile { .. } | StmtKind::Switch { .. })
        {
            self.pending_label = Some(label.clone());
            dispatch_stmt(self, body);
        } else {
            // A label on a non-loop statement only has a target for
            // unlabeled-break-style escapes (`break label;` inside a plain
            // block); model it the same way a loop's break target works.
            let end_label = self.ctx.new_label();
            self.loop_stack.push(LoopFrame { label: Some(label.clone()), continue_target: end_label, break_target: end_label });
            dispatch_stmt(self, body);
            self.out.push(Instr::Label(end_label));
            self.loop_stack.pop();
        }
    }

    fn on_decl(&mut self, stmt: &Stmt) {
        let StmtKind::Decl(decl) = &stmt.kind else { return };
        match &decl.kind {
            DeclKind::Function(f) => {
                let slot = self.ctx.locals.declare(&f.name.name, LocalType::Boxed);
                self.out.push(Instr::NewObject { class: "Function".to_string(), arg_count: 0 });
                self.out.push(Instr::StoreLocal(slot));
            }
            DeclKind::Class(c) => {
                if let Some(name) = &c.name {
                    let slot = self.ctx.locals.declare(&name.name, LocalType::Boxed);
                    self.out.push(Instr::NewObject { class: "Class".to_string(), arg_count: 0 });
                    self.out.push(Instr::StoreLocal(slot));
                }
            }
            // Interfaces, type aliases, and namespaces used only as type
            // containers are erased entirely at emission (§4.1 "Non-goals":
            // type-level constructs have no runtime representation).
            DeclKind::Interface(_) | DeclKind::TypeAlias(_) | DeclKind::Namespace(_) | DeclKind::Enum(_) => {}
        }
    }
}

impl<'a> StmtEmitter<'a> {
    fn resolve_loop_target(&self, label: Option<&str>, is_break: bool) -> Option<Label> {
        let frame = match label {
            Some(l) => self.loop_stack.iter().rev().find(|f| f.label.as_deref() == Some(l))?,
            None => self.loop_stack.last()?,
        };
        Some(if is_break { frame.break_target } else { frame.continue_target })
    }

    fn lower_while(&mut self, label: Option<String>, test: &Expr, body: &Stmt) {
        let start = self.ctx.new_label();
        let end = self.ctx.new_label();
        self.out.push(Instr::Label(start));
        let test_instrs = self.lower_expr(test);
        self.out.extend(test_instrs);
        self.out.push(Instr::BranchIfFalse(end));
        self.loop_stack.push(LoopFrame { label, continue_target: start, break_target: end });
        dispatch_stmt(self, body);
        self.loop_stack.pop();
        self.out.push(Instr::Branch(start));
        self.out.push(Instr::Label(end));
    }

    fn lower_do_while(&mut self, label: Option<String>, body: &Stmt, test: &Expr) {
        let start = self.ctx.new_label();
        let continue_target = self.ctx.new_label();
        let end = self.ctx.new_label();
        self.out.push(Instr::Label(start));
        self.loop_stack.push(LoopFrame { label, continue_target, break_target: end });
        dispatch_stmt(self, body);
        self.loop_stack.pop();
        self.out.push(Instr::Label(continue_target));
        let test_instrs = self.lower_expr(test);
        self.out.extend(test_instrs);
        self.out.push(Instr::BranchIfTrue(start));
        self.out.push(Instr::Label(end));
    }

    fn lower_for(&mut self, label: Option<String>, init: Option<&ForInit>, test: Option<&Expr>, update: Option<&Expr>, body: &Stmt) {
        match init {
            Some(ForInit::VarDecl(decl)) => {
                for d in &decl.declarators {
                    self.declare_pattern(&d.pattern, d.init.as_ref());
                }
            }
            Some(ForInit::Expr(e)) => self.emit_expr_stmt(e),
            None => {}
        }
        let start = self.ctx.new_label();
        let continue_target = self.ctx.new_label();
        let end = self.ctx.new_label();
        self.out.push(Instr::Label(start));
        if let Some(t) = test {
            let test_instrs = self.lower_expr(t);
            self.out.extend(test_instrs);
            self.out.push(Instr::BranchIfFalse(end));
        }
        self.loop_stack.push(LoopFrame { label, continue_target, break_target: end });
        dispatch_stmt(self, body);
        self.loop_stack.pop();
        self.out.push(Instr::Label(continue_target));
        if let Some(u) = update {
            self.emit_expr_stmt(u);
        }
        self.out.push(Instr::Branch(start));
        self.out.push(Instr::Label(end));
    }

    fn lower_for_in_of(&mut self, label: Option<String>, left: &ForTarget, right: &Expr, body: &Stmt, is_of: bool) {
        let iter_temp = self.ctx.locals.alloc_temp(LocalType::Boxed);
        let right_instrs = self.lower_expr(right);
        self.out.extend(right_instrs);
        self.out.push(Instr::Call {
            target: CallTarget::Dynamic { method: if is_of { "__iterator".to_string() } else { "__keys".to_string() } },
            arg_count: 0,
        });
        self.out.push(Instr::StoreLocal(iter_temp));

        let start = self.ctx.new_label();
        let continue_target = self.ctx.new_label();
        let end = self.ctx.new_label();
        self.out.push(Instr::Label(start));
        self.out.push(Instr::LoadLocal(iter_temp));
        self.out.push(Instr::Call { target: CallTarget::Dynamic { method: "__hasNext".to_string() }, arg_count: 0 });
        self.out.push(Instr::BranchIfFalse(end));
        self.out.push(Instr::LoadLocal(iter_temp));
        self.out.push(Instr::Call { target: CallTarget::Dynamic { method: "__next".to_string() }, arg_count: 0 });
        let value_temp = self.ctx.locals.alloc_temp(LocalType::Boxed);
        self.out.push(Instr::StoreLocal(value_temp));
        self.bind_for_target(left, value_temp);

        self.loop_stack.push(LoopFrame { label, continue_target, break_target: end });
        dispatch_stmt(self, body);
        self.loop_stack.pop();
        self.out.push(Instr::Label(continue_target));
        self.out.push(Instr::Branch(start));
        self.out.push(Instr::Label(end));
    }

    fn bind_for_target(&mut self, target: &ForTarget, value_temp: crate::instr::LocalSlot) {
        match target {
            ForTarget::VarDecl(_, pattern) => self.declare_pattern_from_temp(pattern, value_temp),
            ForTarget::Pattern(pattern) => {
                // Assigning into an already-declared binding: bind through
                // the same temp-based path since the pattern shape
                // (array/object/plain) is identical either way.
                self.declare_pattern_from_temp(pattern, value_temp);
            }
        }
    }

    fn lower_catch(&mut self, catch: &tsc_core_ast::CatchClause) {
        let exception_local = catch.param.as_ref().map(|p| {
            let mut names = Vec::new();
            p.bound_names(&mut names);
            let name = names.first().cloned().unwrap_or_else(|| "<exception>".to_string());
            self.ctx.locals.declare(&name, LocalType::Boxed)
        });
        self.out.push(Instr::EnterCatch { exception_local });
        if let (Some(param), Some(slot)) = (&catch.param, exception_local) {
            if !matches!(param, Pattern::Ident(_)) {
                self.declare_pattern_from_temp(param, slot);
            }
        }
        for s in &catch.body {
            dispatch_stmt(self, s);
        }
    }
}

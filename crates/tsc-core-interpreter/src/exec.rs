//! Statement execution (§4.3 "names are declared before their
//! initializers", §4.7 control-flow signals).
//!
//! Every `exec_*` function returns an [`ExecResult`]: `Ok(Signal::Normal)`
//! for a statement that ran straight through, `Ok(Signal::Break/Continue/
//! Return(_))` for control flow that the nearest matching construct (a
//! loop, a switch, a labeled statement, or the call that invoked a
//! function body) must consume, and `Err(Thrown)` for an unwinding
//! exception. The checker has already validated that every label reference
//! here targets an enclosing labeled statement, so this module never has
//! to reject a dangling label — only route it.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use tsc_core_ast::{Decl, DeclKind, EnumDecl, ForInit, ForTarget, NamespaceDecl, Stmt, StmtKind, VariableDecl, VariableDeclKind};

use crate::env::Scope;
use crate::error::{ExecResult, Signal, Thrown};
use crate::ops;
use crate::value::{ClosureBody, Value};
use crate::Interpreter;

/// Declares every function named at the top of `stmts` before any of them
/// runs (§4.3). Classes are deliberately not hoisted here — like source
/// TypeScript, a class reference before its declaration is a runtime
/// error, not a forward reference.
pub fn hoist_declarations(_interp: &mut Interpreter, scope: &Rc<RefCell<Scope>>, stmts: &[Stmt]) -> ExecResult {
    for stmt in stmts {
        if let StmtKind::Decl(Decl { kind: DeclKind::Function(f), .. }) = &stmt.kind {
            let closure = Rc::new(crate::value::Closure {
                name: Some(f.name.name.clone()),
                params: f.params.clone(),
                body: ClosureBody::Block(f.body.clone().unwrap_or_default()),
                captured_env: Rc::clone(scope),
                this_value: None,
                is_async: f.is_async,
                is_generator: f.is_generator,
                is_arrow: false,
            });
            scope.borrow_mut().declare(f.name.name.clone(), Value::Closure(closure), false);
        }
    }
    Ok(Signal::Normal)
}

/// Runs a statement list in `scope` as-is, with no further scope creation
/// and no hoisting pass of its own — the caller (the top-level program,
/// or `exec_block`'s own hoist-then-run pair) is responsible for both.
pub fn exec_block_no_scope(interp: &mut Interpreter, scope: &Rc<RefCell<Scope>>, stmts: &[Stmt]) -> ExecResult {
    for stmt in stmts {
        match interp.exec_stmt_inner(scope, stmt, None)? {
            Signal::Normal => {}
            other => return Ok(other),
        }
    }
    Ok(Signal::Normal)
}

/// Hoists then runs a statement list in an already-created `scope` — the
/// common case for a nested `{ ... }` block, a loop body, or a function
/// body.
pub fn exec_block(interp: &mut Interpreter, scope: &Rc<RefCell<Scope>>, stmts: &[Stmt]) -> ExecResult {
    hoist_declarations(interp, scope, stmts)?;
    exec_block_no_scope(interp, scope, stmts)
}

/// A function/method/closure body, called from `eval::call_closure` with
/// its already-prepared call scope (`this`/params already bound).
pub fn exec_function_body(interp: &mut Interpreter, scope: &Rc<RefCell<Scope>>, stmts: &[Stmt]) -> ExecResult {
    exec_block(interp, scope, stmts)
}

impl Interpreter {
    /// Executes one statement, given the label (if any) that directly
    /// names it. A matching unlabeled-or-same-label `break` that survives
    /// the inner dispatch is converted to `Signal::Normal` here, covering
    /// the case of a label on a plain block (`outer: { ...; break outer; }`)
    /// that a loop/switch wouldn't itself consume.
    fn exec_stmt_inner(&mut self, scope: &Rc<RefCell<Scope>>, stmt: &Stmt, own_label: Option<&str>) -> ExecResult {
        let signal = self.exec_stmt_kind(scope, stmt, own_label)?;
        match &signal {
            Signal::Break(Some(l)) if Some(l.as_str()) == own_label => Ok(Signal::Normal),
            _ => Ok(signal),
        }
    }

    fn exec_stmt_kind(&mut self, scope: &Rc<RefCell<Scope>>, stmt: &Stmt, own_label: Option<&str>) -> ExecResult {
        match &stmt.kind {
            StmtKind::Empty => Ok(Signal::Normal),
            StmtKind::Expr(e) => {
                self.eval_expr(scope, e)?;
                Ok(Signal::Normal)
            }
            StmtKind::VariableDecl(decl) => {
                self.exec_variable_decl(scope, decl)?;
                Ok(Signal::Normal)
            }
            StmtKind::Block(stmts) => exec_block(self, &Scope::child(scope), stmts),
            StmtKind::If { test, consequent, alternate } => {
                if self.eval_expr(scope, test)?.truthy() {
                    self.exec_stmt_inner(scope, consequent, None)
                } else if let Some(alt) = alternate {
                    self.exec_stmt_inner(scope, alt, None)
                } else {
                    Ok(Signal::Normal)
                }
            }
            StmtKind::For { init, test, update, body } => self.exec_for(scope, init, test, update, body, own_label),
            StmtKind::ForIn { left, right, body } => self.exec_for_in(scope, left, right, body, own_label),
            StmtKind::ForOf { left, right, body, .. } => self.exec_for_of(scope, left, right, body, own_label),
            StmtKind::While { test, body } => self.exec_while(scope, test, body, own_label),
            StmtKind::DoWhile { body, test } => self.exec_do_while(scope, body, test, own_label),
            StmtKind::Return(e) => {
                let value = match e {
                    Some(e) => self.eval_expr(scope, e)?,
                    None => Value::Undefined,
                };
                Ok(Signal::Return(value))
            }
            StmtKind::Break(label) => Ok(Signal::Break(label.clone())),
            StmtKind::Continue(label) => Ok(Signal::Continue(label.clone())),
            StmtKind::Throw(e) => {
                let value = self.eval_expr(scope, e)?;
                Err(Thrown(value))
            }
            StmtKind::Try { block, handler, finalizer } => self.exec_try(scope, block, handler, finalizer),
            StmtKind::Switch { discriminant, cases } => self.exec_switch(scope, discriminant, cases, own_label),
            StmtKind::Labeled { label, body } => self.exec_stmt_inner(scope, body, Some(label.as_str())),
            StmtKind::Decl(decl) => self.exec_decl(scope, decl),
        }
    }

    fn exec_variable_decl(&mut self, scope: &Rc<RefCell<Scope>>, decl: &VariableDecl) -> Result<(), Thrown> {
        let mutable = !matches!(decl.kind, VariableDeclKind::Const);
        for declarator in &decl.declarators {
            let value = match &declarator.init {
                Some(e) => self.eval_expr(scope, e)?,
                None => Value::Undefined,
            };
            crate::patterns::bind_pattern(scope, &declarator.pattern, value, mutable, &mut |e| self.eval_expr(scope, e))?;
        }
        Ok(())
    }

    fn exec_decl(&mut self, scope: &Rc<RefCell<Scope>>, decl: &Decl) -> ExecResult {
        match &decl.kind {
            // Already bound by `hoist_declarations`.
            DeclKind::Function(_) => Ok(Signal::Normal),
            DeclKind::Class(c) => self.exec_class_decl(scope, c),
            DeclKind::Interface(_) | DeclKind::TypeAlias(_) => Ok(Signal::Normal),
            DeclKind::Enum(e) => self.exec_enum_decl(scope, e),
            DeclKind::Namespace(ns) => self.exec_namespace_decl(scope, ns),
        }
    }

    /// A class declaration additionally binds its name into the
    /// surrounding scope (unlike a class expression, whose name is visible
    /// only within its own body — see `eval::build_class_value`).
    fn exec_class_decl(&mut self, scope: &Rc<RefCell<Scope>>, decl: &tsc_core_ast::ClassDecl) -> ExecResult {
        let class = self.build_class_value(scope, decl)?;
        if let Some(name) = &decl.name {
            scope.borrow_mut().declare(name.name.clone(), Value::Class(class), false);
        }
        Ok(Signal::Normal)
    }

    /// Materializes a numeric/string enum as a plain runtime object,
    /// including the reverse `value -> name` mapping numeric enums get in
    /// the managed runtime. `const enum`s are not specially inlined here —
    /// that erasure is an emitter/checker-time optimization, not a
    /// difference in interpreted behavior.
    fn exec_enum_decl(&mut self, scope: &Rc<RefCell<Scope>>, decl: &EnumDecl) -> ExecResult {
        let mut map = IndexMap::new();
        let mut next_numeric = 0.0;
        for member in &decl.members {
            let value = match &member.initializer {
                Some(expr) => self.eval_expr(scope, expr)?,
                None => Value::Number(next_numeric),
            };
            if let Value::Number(n) = value {
                next_numeric = n + 1.0;
                map.insert(n.to_string(), Value::String(member.name.as_str().into()));
            }
            map.insert(member.name.clone(), value);
        }
        scope.borrow_mut().declare(decl.name.name.clone(), Value::Object(Rc::new(RefCell::new(map))), false);
        Ok(Signal::Normal)
    }

    /// Runs a namespace body in its own scope, then exposes every name it
    /// declared as a plain object bound to the namespace's name — a
    /// reasonable runtime stand-in for the managed runtime's actual
    /// namespace-merging semantics, which this core does not otherwise
    /// model (out of scope: module/namespace merging across files).
    fn exec_namespace_decl(&mut self, scope: &Rc<RefCell<Scope>>, decl: &NamespaceDecl) -> ExecResult {
        let ns_scope = Scope::child(scope);
        exec_block(self, &ns_scope, &decl.body)?;
        let mut map = IndexMap::new();
        for (name, value) in ns_scope.borrow().own_bindings() {
            map.insert(name, value);
        }
        scope.borrow_mut().declare(decl.name.clone(), Value::Object(Rc::new(RefCell::new(map))), false);
        Ok(Signal::Normal)
    }

    #[allow(clippy::too_many_arguments)]
    fn exec_for(
        &mut self,
        scope: &Rc<RefCell<Scope>>,
        init: &Option<Box<ForInit>>,
        test: &Option<tsc_core_ast::Expr>,
        update: &Option<tsc_core_ast::Expr>,
        body: &Stmt,
        own_label: Option<&str>,
    ) -> ExecResult {
        let loop_scope = Scope::child(scope);
        if let Some(init) = init {
            match init.as_ref() {
                ForInit::VarDecl(decl) => self.exec_variable_decl(&loop_scope, decl)?,
                ForInit::Expr(e) => {
                    self.eval_expr(&loop_scope, e)?;
                }
            }
        }
        loop {
            if let Some(t) = test {
                if !self.eval_expr(&loop_scope, t)?.truthy() {
                    break;
                }
            }
            match self.exec_stmt_inner(&loop_scope, body, None)? {
                Signal::Break(l) if l.is_none() || l.as_deref() == own_label => return Ok(Signal::Normal),
                Signal::Continue(l) if l.is_none() || l.as_deref() == own_label => {}
                Signal::Normal => {}
                other => return Ok(other),
            }
            if let Some(u) = update {
                self.eval_expr(&loop_scope, u)?;
            }
        }
        Ok(Signal::Normal)
    }

    fn exec_while(&mut self, scope: &Rc<RefCell<Scope>>, test: &tsc_core_ast::Expr, body: &Stmt, own_label: Option<&str>) -> ExecResult {
        while self.eval_expr(scope, test)?.truthy() {
            match self.exec_stmt_inner(scope, body, None)? {
                Signal::Break(l) if l.is_none() || l.as_deref() == own_label => return Ok(Signal::Normal),
                Signal::Continue(l) if l.is_none() || l.as_deref() == own_label => {}
                Signal::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Signal::Normal)
    }

    fn exec_do_while(&mut self, scope: &Rc<RefCell<Scope>>, body: &Stmt, test: &tsc_core_ast::Expr, own_label: Option<&str>) -> ExecResult {
        loop {
            match self.exec_stmt_inner(scope, body, None)? {
                Signal::Break(l) if l.is_none() || l.as_deref() == own_label => return Ok(Signal::Normal),
                Signal::Continue(l) if l.is_none() || l.as_deref() == own_label => {}
                Signal::Normal => {}
                other => return Ok(other),
            }
            if !self.eval_expr(scope, test)?.truthy() {
                break;
            }
        }
        Ok(Signal::Normal)
    }

    fn exec_for_in(&mut self, scope: &Rc<RefCell<Scope>>, left: &ForTarget, right: &tsc_core_ast::Expr, body: &Stmt, own_label: Option<&str>) -> ExecResult {
        let obj = self.eval_expr(scope, right)?;
        let keys: Vec<String> = match &obj {
            Value::Object(o) => o.borrow().keys().cloned().collect(),
            Value::Array(a) => (0..a.borrow().len()).map(|i| i.to_string()).collect(),
            Value::Instance(inst) => inst.fields.borrow().keys().cloned().collect(),
            Value::Class(c) => c.static_members.borrow().keys().cloned().collect(),
            _ => Vec::new(),
        };
        for key in keys {
            let iter_scope = Scope::child(scope);
            self.bind_for_target(&iter_scope, left, Value::String(key.into()))?;
            match self.exec_stmt_inner(&iter_scope, body, None)? {
                Signal::Break(l) if l.is_none() || l.as_deref() == own_label => return Ok(Signal::Normal),
                Signal::Continue(l) if l.is_none() || l.as_deref() == own_label => {}
                Signal::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Signal::Normal)
    }

    fn exec_for_of(&mut self, scope: &Rc<RefCell<Scope>>, left: &ForTarget, right: &tsc_core_ast::Expr, body: &Stmt, own_label: Option<&str>) -> ExecResult {
        let iterable = self.eval_expr(scope, right)?;
        let values = self.iterate_values(iterable)?;
        for value in values {
            let iter_scope = Scope::child(scope);
            self.bind_for_target(&iter_scope, left, value)?;
            match self.exec_stmt_inner(&iter_scope, body, None)? {
                Signal::Break(l) if l.is_none() || l.as_deref() == own_label => return Ok(Signal::Normal),
                Signal::Continue(l) if l.is_none() || l.as_deref() == own_label => {}
                Signal::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Signal::Normal)
    }

    fn bind_for_target(&mut self, scope: &Rc<RefCell<Scope>>, target: &ForTarget, value: Value) -> Result<(), Thrown> {
        let (pattern, mutable) = match target {
            ForTarget::VarDecl(kind, pattern) => (pattern, !matches!(kind, VariableDeclKind::Const)),
            ForTarget::Pattern(pattern) => (pattern, true),
        };
        crate::patterns::bind_pattern(scope, pattern, value, mutable, &mut |e| self.eval_expr(scope, e))
    }

    /// Eagerly collects the values a `for...of` target produces: arrays
    /// and strings iterate their elements/code points directly; any other
    /// object exposing a `next()` method (the shape `eval::make_generator_object`
    /// produces) is drained by repeated calls, matching this core's
    /// eager generator model (§4.6).
    fn iterate_values(&mut self, value: Value) -> Result<Vec<Value>, Thrown> {
        match value {
            Value::Array(a) => Ok(a.borrow().clone()),
            Value::String(s) => Ok(s.chars().map(|c| Value::String(c.to_string().into())).collect()),
            Value::Object(o) => {
                let next = o.borrow().get("next").cloned();
                let Some(Value::NativeFunction(next)) = next else {
                    return Err(Thrown::type_error("value is not iterable"));
                };
                let mut out = Vec::new();
                loop {
                    let result = (next.func)(None, &[]).map_err(Thrown)?;
                    let Value::Object(r) = result else { break };
                    let done = r.borrow().get("done").cloned().unwrap_or(Value::Boolean(true)).truthy();
                    if done {
                        break;
                    }
                    out.push(r.borrow().get("value").cloned().unwrap_or(Value::Undefined));
                }
                Ok(out)
            }
            _ => Err(Thrown::type_error("value is not iterable")),
        }
    }

    fn exec_try(
        &mut self,
        scope: &Rc<RefCell<Scope>>,
        block: &[Stmt],
        handler: &Option<tsc_core_ast::CatchClause>,
        finalizer: &Option<Vec<Stmt>>,
    ) -> ExecResult {
        let try_result = exec_block(self, &Scope::child(scope), block);
        let result = match try_result {
            Err(Thrown(thrown)) => {
                if let Some(h) = handler {
                    let catch_scope = Scope::child(scope);
                    if let Some(pattern) = &h.param {
                        crate::patterns::bind_pattern(&catch_scope, pattern, thrown, true, &mut |e| self.eval_expr(&catch_scope, e))?;
                    }
                    exec_block(self, &catch_scope, &h.body)
                } else {
                    Err(Thrown(thrown))
                }
            }
            other => other,
        };
        if let Some(fin) = finalizer {
            let fin_signal = exec_block(self, &Scope::child(scope), fin)?;
            if !matches!(fin_signal, Signal::Normal) {
                // `finally`'s own control flow overrides whatever the
                // try/catch produced, matching source-language semantics.
                return Ok(fin_signal);
            }
        }
        result
    }

    fn exec_switch(&mut self, scope: &Rc<RefCell<Scope>>, discriminant: &tsc_core_ast::Expr, cases: &[tsc_core_ast::SwitchCase], own_label: Option<&str>) -> ExecResult {
        let disc = self.eval_expr(scope, discriminant)?;
        let switch_scope = Scope::child(scope);
        for case in cases {
            hoist_declarations(self, &switch_scope, &case.consequent)?;
        }
        let mut matched = None;
        for (i, case) in cases.iter().enumerate() {
            if let Some(test) = &case.test {
                let t = self.eval_expr(&switch_scope, test)?;
                if ops::strict_equals(&disc, &t) {
                    matched = Some(i);
                    break;
                }
            }
        }
        if matched.is_none() {
            matched = cases.iter().position(|c| c.test.is_none());
        }
        let Some(start) = matched else { return Ok(Signal::Normal) };
        for case in &cases[start..] {
            for stmt in &case.consequent {
                match self.exec_stmt_inner(&switch_scope, stmt, None)? {
                    Signal::Break(l) if l.is_none() || l.as_deref() == own_label => return Ok(Signal::Normal),
                    Signal::Normal => {}
                    other => return Ok(other),
                }
            }
        }
        Ok(Signal::Normal)
    }
}

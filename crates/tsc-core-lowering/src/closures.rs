//! Closure capture analysis (§4.6 "Closures").
//!
//! Arrow functions (and function expressions used as callbacks) that read
//! an outer-scope binding must be lowered to a closure record whose fields
//! are the captured bindings. An arrow that captures nothing becomes a
//! top-level static callable with no allocation. This module computes the
//! capture set a back-end needs to build either shape; it does not decide
//! *how* the closure record is represented (that is back-end specific).

use rustc_hash::FxHashSet;
use tsc_core_ast::{ArrowBody, ArrowExpr, Expr, ExprKind, FunctionExpr, MemberKey, Param, Stmt, StmtKind};

/// The result of analyzing one function/arrow body for captured bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSet {
    /// Outer-scope names read (or assigned) inside the body, in first-seen
    /// order so back-ends can lay out closure-record fields deterministically.
    pub captured: Vec<String>,
    /// Whether the body references `this` or `super` and therefore needs
    /// `this` threaded into the closure record too (§4.6 "Async arrows
    /// share the enclosing async state machine's boxed state").
    pub captures_this: bool,
}

impl CaptureSet {
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        !self.captured.is_empty() || self.captures_this
    }
}

/// Computes the capture set for an arrow function given the set of names
/// bound in scopes enclosing it (parameters of outer functions, outer
/// `let`/`const`/`var`/function declarations, etc).
#[must_use]
pub fn analyze_arrow(arrow: &ArrowExpr, outer_bound: &FxHashSet<String>) -> CaptureSet {
    let mut bound = FxHashSet::default();
    for p in &arrow.params {
        collect_param_names(p, &mut bound);
    }
    let mut set = CaptureSet::default();
    let mut order: Vec<String> = Vec::new();
    match &arrow.body {
        ArrowBody::Block(stmts) => walk_stmts(stmts, &bound, outer_bound, &mut order, &mut set.captures_this),
        ArrowBody::Expr(e) => walk_expr(e, &bound, outer_bound, &mut order, &mut set.captures_this),
    }
    set.captured = order;
    set
}

/// Same analysis for a named/anonymous function expression, which captures
/// `this` dynamically at call time in JS but, when used as a callback
/// bound with `.bind`/arrow-wrapper idioms, is handled identically by the
/// dispatcher's capture bookkeeping for outer variables.
#[must_use]
pub fn analyze_function(func: &FunctionExpr, outer_bound: &FxHashSet<String>) -> CaptureSet {
    let mut bound = FxHashSet::default();
    for p in &func.params {
        collect_param_names(p, &mut bound);
    }
    let mut set = CaptureSet::default();
    let mut order = Vec::new();
    if let Some(body) = &func.body {
        walk_stmts(body, &bound, outer_bound, &mut order, &mut set.captures_this);
    }
    set.captured = order;
    // A plain `function` expression's `this` is dynamic, not captured.
    set.captures_this = false;
    set
}

fn collect_param_names(p: &Param, out: &mut FxHashSet<String>) {
    let mut names = Vec::new();
    p.pattern.bound_names(&mut names);
    out.extend(names);
}

fn record_capture(name: &str, bound: &FxHashSet<String>, outer_bound: &FxHashSet<String>, order: &mut Vec<String>) {
    if !bound.contains(name) && outer_bound.contains(name) && !order.iter().any(|n| n == name) {
        order.push(name.to_string());
    }
}

fn walk_stmts(stmts: &[Stmt], bound: &FxHashSet<String>, outer_bound: &FxHashSet<String>, order: &mut Vec<String>, this_seen: &mut bool) {
    // Block-scoped locals declared within the body shadow outer captures;
    // a single flat `bound` set is a reasonable approximation since the
    // checker has already validated there is no illegal shadowing ordering
    // that would change what's visible at each reference site.
    let mut local_bound = bound.clone();
    for s in stmts {
        collect_stmt_bindings(s, &mut local_bound);
    }
    for s in stmts {
        walk_stmt(s, &local_bound, outer_bound, order, this_seen);
    }
}

fn collect_stmt_bindings(s: &Stmt, out: &mut FxHashSet<String>) {
    if let StmtKind::VariableDecl(decl) = &s.kind {
        for d in &decl.declarators {
            let mut names = Vec::new();
            d.pattern.bound_names(&mut names);
            out.extend(names);
        }
    }
    if let StmtKind::Decl(d) = &s.kind {
        use tsc_core_ast::DeclKind;
        match &d.kind {
            DeclKind::Function(f) => {
                out.insert(f.name.name.clone());
            }
            DeclKind::Class(c) => {
                if let Some(name) = &c.name {
                    out.insert(name.name.clone());
                }
            }
            _ => {}
        }
    }
}

fn walk_stmt(s: &Stmt, bound: &FxHashSet<String>, outer_bound: &FxHashSet<String>, order: &mut Vec<String>, this_seen: &mut bool) {
    match &s.kind {
        StmtKind::Expr(e) => walk_expr(e, bound, outer_bound, order, this_seen),
        StmtKind::VariableDecl(decl) => {
            for d in &decl.declarators {
                if let Some(init) = &d.init {
                    walk_expr(init, bound, outer_bound, order, this_seen);
                }
            }
        }
        StmtKind::Block(b) => walk_stmts(b, bound, outer_bound, order, this_seen),
        StmtKind::If { test, consequent, alternate } => {
            walk_expr(test, bound, outer_bound, order, this_seen);
            walk_stmt(consequent, bound, outer_bound, order, this_seen);
            if let Some(alt) = alternate {
                walk_stmt(alt, bound, outer_bound, order, this_seen);
            }
        }
        StmtKind::For { init, test, update, body } => {
            if let Some(init) = init {
                match &**init {
                    tsc_core_ast::ForInit::VarDecl(d) => {
                        for decl in &d.declarators {
                            if let Some(e) = &decl.init {
                                walk_expr(e, bound, outer_bound, order, this_seen);
                            }
                        }
                    }
                    tsc_core_ast::ForInit::Expr(e) => walk_expr(e, bound, outer_bound, order, this_seen),
                }
            }
            if let Some(t) = test {
                walk_expr(t, bound, outer_bound, order, this_seen);
            }
            if let Some(u) = update {
                walk_expr(u, bound, outer_bound, order, this_seen);
            }
            walk_stmt(body, bound, outer_bound, order, this_seen);
        }
        StmtKind::ForIn { right, body, .. } | StmtKind::ForOf { right, body, .. } => {
            walk_expr(right, bound, outer_bound, order, this_seen);
            walk_stmt(body, bound, outer_bound, order, this_seen);
        }
        StmtKind::While { test, body } => {
            walk_expr(test, bound, outer_bound, order, this_seen);
            walk_stmt(body, bound, outer_bound, order, this_seen);
        }
        StmtKind::DoWhile { body, test } => {
            walk_stmt(body, bound, outer_bound, order, this_seen);
            walk_expr(test, bound, outer_bound, order, this_seen);
        }
        StmtKind::Return(Some(e)) => walk_expr(e, bound, outer_bound, order, this_seen),
        StmtKind::Throw(e) => walk_expr(e, bound, outer_bound, order, this_seen),
        StmtKind::Try { block, handler, finalizer } => {
            walk_stmts(block, bound, outer_bound, order, this_seen);
            if let Some(h) = handler {
                walk_stmts(&h.body, bound, outer_bound, order, this_seen);
            }
            if let Some(f) = finalizer {
                walk_stmts(f, bound, outer_bound, order, this_seen);
            }
        }
        StmtKind::Switch { discriminant, cases } => {
            walk_expr(discriminant, bound, outer_bound, order, this_seen);
            for case in cases {
                if let Some(t) = &case.test {
                    walk_expr(t, bound, outer_bound, order, this_seen);
                }
                walk_stmts(&case.consequent, bound, outer_bound, order, this_seen);
            }
        }
        StmtKind::Labeled { body, .. } => walk_stmt(body, bound, outer_bound, order, this_seen),
        _ => {}
    }
}

fn walk_expr(e: &Expr, bound: &FxHashSet<String>, outer_bound: &FxHashSet<String>, order: &mut Vec<String>, this_seen: &mut bool) {
    match &e.kind {
        ExprKind::Ident(id) => record_capture(&id.name, bound, outer_bound, order),
        ExprKind::This | ExprKind::Super => *this_seen = true,
        ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
            walk_expr(left, bound, outer_bound, order, this_seen);
            walk_expr(right, bound, outer_bound, order, this_seen);
        }
        ExprKind::Assign { target, value, .. } => {
            walk_expr(target, bound, outer_bound, order, this_seen);
            walk_expr(value, bound, outer_bound, order, this_seen);
        }
        ExprKind::Conditional { test, consequent, alternate } => {
            walk_expr(test, bound, outer_bound, order, this_seen);
            walk_expr(consequent, bound, outer_bound, order, this_seen);
            walk_expr(alternate, bound, outer_bound, order, this_seen);
        }
        ExprKind::Call { callee, args, .. } | ExprKind::New { callee, args, .. } => {
            walk_expr(callee, bound, outer_bound, order, this_seen);
            for a in args {
                let inner = match a {
                    tsc_core_ast::Argument::Normal(e) | tsc_core_ast::Argument::Spread(e) => e,
                };
                walk_expr(inner, bound, outer_bound, order, this_seen);
            }
        }
        ExprKind::Member { object, property, .. } => {
            walk_expr(object, bound, outer_bound, order, this_seen);
            if let MemberKey::Computed(c) = property {
                walk_expr(c, bound, outer_bound, order, this_seen);
            }
        }
        ExprKind::Unary { operand, .. } | ExprKind::NonNull(operand) | ExprKind::Await(operand) | ExprKind::Spread(operand) => {
            walk_expr(operand, bound, outer_bound, order, this_seen);
        }
        ExprKind::TypeAssertion { expr, .. } | ExprKind::AsExpr { expr, .. } | ExprKind::SatisfiesExpr { expr, .. } => {
            walk_expr(expr, bound, outer_bound, order, this_seen);
        }
        ExprKind::Paren(inner) => walk_expr(inner, bound, outer_bound, order, this_seen),
        ExprKind::Yield { arg: Some(a), .. } => walk_expr(a, bound, outer_bound, order, this_seen),
        ExprKind::Sequence(exprs) => {
            for e in exprs {
                walk_expr(e, bound, outer_bound, order, this_seen);
            }
        }
        ExprKind::ArrayLiteral(elements) => {
            for el in elements.iter().flatten() {
                let inner = match el {
                    tsc_core_ast::ArrayElement::Item(e) | tsc_core_ast::ArrayElement::Spread(e) => e,
                };
                walk_expr(inner, bound, outer_bound, order, this_seen);
            }
        }
        ExprKind::ObjectLiteral(props) => {
            for p in props {
                walk_object_property(p, bound, outer_bound, order, this_seen);
            }
        }
        ExprKind::TemplateLiteral { exprs, .. } => {
            for e in exprs {
                walk_expr(e, bound, outer_bound, order, this_seen);
            }
        }
        ExprKind::TaggedTemplate { tag, exprs, .. } => {
            walk_expr(tag, bound, outer_bound, order, this_seen);
            for e in exprs {
                walk_expr(e, bound, outer_bound, order, this_seen);
            }
        }
        // Nested functions/arrows establish their own capture scope; from
        // the *outer* function's point of view, whatever the nested one
        // captures from beyond its own params is itself a potential
        // capture of this function too, so we still recurse into it.
        ExprKind::Arrow(inner) => {
            let nested = analyze_arrow(inner, &union(bound, outer_bound));
            for name in nested.captured {
                record_capture(&name, bound, outer_bound, order);
            }
            if nested.captures_this {
                *this_seen = true;
            }
        }
        ExprKind::Function(inner) => {
            let nested = analyze_function(inner, &union(bound, outer_bound));
            for name in nested.captured {
                record_capture(&name, bound, outer_bound, order);
            }
        }
        _ => {}
    }
}

fn walk_object_property(p: &tsc_core_ast::ObjectProperty, bound: &FxHashSet<String>, outer_bound: &FxHashSet<String>, order: &mut Vec<String>, this_seen: &mut bool) {
    use tsc_core_ast::ObjectProperty;
    match p {
        ObjectProperty::KeyValue { value, .. } => walk_expr(value, bound, outer_bound, order, this_seen),
        ObjectProperty::Shorthand(ident) => record_capture(&ident.name, bound, outer_bound, order),
        ObjectProperty::Method { func, .. } | ObjectProperty::Getter { func, .. } | ObjectProperty::Setter { func, .. } => {
            let nested = analyze_function(func, &union(bound, outer_bound));
            for name in nested.captured {
                record_capture(&name, bound, outer_bound, order);
            }
        }
        ObjectProperty::Spread(e) => walk_expr(e, bound, outer_bound, order, this_seen),
    }
}

fn union(a: &FxHashSet<String>, b: &FxHashSet<String>) -> FxHashSet<String> {
    a.union(b).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsc_core_ast::{Ident, NodeId};
    use tsc_core_common::Span;

    fn span() -> Span {
        Span::new(0, 0)
    }

    fn ident_expr(name: &str) -> Expr {
        Expr { id: NodeId(1), span: span(), kind: ExprKind::Ident(Ident { id: NodeId(2), name: name.to_string(), span: span() }) }
    }

    #[test]
    fn non_capturing_arrow_has_empty_capture_set() {
        let param = Param {
            pattern: tsc_core_ast::Pattern::Ident(Ident { id: NodeId(3), name: "x".into(), span: span() }),
            type_ann: None,
            optional: false,
            default: None,
            is_rest: false,
            ctor_property: None,
            readonly: false,
        };
        let arrow = ArrowExpr {
            type_params: vec![],
            params: vec![param],
            return_type: None,
            body: ArrowBody::Expr(Box::new(ident_expr("x"))),
            is_async: false,
        };
        let outer = FxHashSet::default();
        let captures = analyze_arrow(&arrow, &outer);
        assert!(!captures.is_capturing());
    }

    #[test]
    fn arrow_referencing_outer_binding_captures_it() {
        let arrow = ArrowExpr {
            type_params: vec![],
            params: vec![],
            return_type: None,
            body: ArrowBody::Expr(Box::new(ident_expr("outerVar"))),
            is_async: false,
        };
        let mut outer = FxHashSet::default();
        outer.insert("outerVar".to_string());
        let captures = analyze_arrow(&arrow, &outer);
        assert!(captures.is_capturing());
        assert_eq!(captures.captured, vec!["outerVar".to_string()]);
    }

    #[test]
    fn arrow_referencing_this_is_capturing() {
        let arrow = ArrowExpr {
            type_params: vec![],
            params: vec![],
            return_type: None,
            body: ArrowBody::Expr(Box::new(Expr { id: NodeId(1), span: span(), kind: ExprKind::This })),
            is_async: false,
        };
        let outer = FxHashSet::default();
        let captures = analyze_arrow(&arrow, &outer);
        assert!(captures.captures_this);
    }
}

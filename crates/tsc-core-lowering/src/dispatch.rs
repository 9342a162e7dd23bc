//! The abstract expression/statement dispatcher (§4.6, §9 "Deep dispatch
//! chains").
//!
//! Rather than a virtual-inheritance hierarchy of per-node-kind visitor
//! objects (the original tree-walking style), this is a single dispatcher
//! function that pattern-matches on the AST variant and calls back into a
//! small trait with one method per variant family. Both back-ends
//! (`tsc-core-interpreter`, `tsc-core-emitter`) implement [`LoweringHooks`]
//! and drive their evaluation/emission loop by calling [`dispatch_expr`] /
//! [`dispatch_stmt`], matching `tsz-checker/dispatch.rs`'s dispatch-by-node-
//! kind shape generalized to "one hook per kind" instead of one method per
//! concrete check.

use tsc_core_ast::{Expr, ExprKind, Stmt, StmtKind};

/// One callback per expression-node family a back-end must handle. The
/// default implementations simply do nothing / return the unit outcome,
/// so a back-end only overrides the families it treats specially (e.g. the
/// emitter overrides every family; a diagnostic-only consumer might
/// override just `on_call`).
pub trait LoweringHooks {
    type Out: Default;

    fn on_literal(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_ident(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_binary(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_logical(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_unary(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_assign(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_conditional(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_call(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_new(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_member(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_array_literal(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_object_literal(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_function(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_arrow(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_class_expr(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_await(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_yield(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_template_literal(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }
    fn on_other_expr(&mut self, _expr: &Expr) -> Self::Out {
        Self::Out::default()
    }

    fn on_block(&mut self, _stmts: &[Stmt]) {}
    fn on_expr_stmt(&mut self, _expr: &Expr) {}
    fn on_variable_decl(&mut self, _stmt: &Stmt) {}
    fn on_if(&mut self, _stmt: &Stmt) {}
    fn on_loop(&mut self, _stmt: &Stmt) {}
    fn on_return(&mut self, _stmt: &Stmt) {}
    fn on_break_continue(&mut self, _stmt: &Stmt) {}
    fn on_throw(&mut self, _stmt: &Stmt) {}
    fn on_try(&mut self, _stmt: &Stmt) {}
    fn on_switch(&mut self, _stmt: &Stmt) {}
    fn on_labeled(&mut self, _stmt: &Stmt) {}
    fn on_decl(&mut self, _stmt: &Stmt) {}
}

/// Dispatches one expression node to the matching hook. This is the single
/// chokepoint every expression lowering passes through in both back-ends,
/// so adding a new `ExprKind` variant only ever requires touching this
/// match and the trait above, never a scattered set of per-back-end
/// visitors (§9 "avoid virtual inheritance").
pub fn dispatch_expr<H: LoweringHooks>(hooks: &mut H, expr: &Expr) -> H::Out {
    match &expr.kind {
        ExprKind::NumberLiteral(_)
        | ExprKind::StringLiteral(_)
        | ExprKind::BooleanLiteral(_)
        | ExprKind::NullLiteral
        | ExprKind::UndefinedLiteral
        | ExprKind::BigIntLiteral(_)
        | ExprKind::RegExpLiteral(_) => hooks.on_literal(expr),
        ExprKind::Ident(_) | ExprKind::This | ExprKind::Super | ExprKind::Private(_) => hooks.on_ident(expr),
        ExprKind::Binary { .. } => hooks.on_binary(expr),
        ExprKind::Logical { .. } => hooks.on_logical(expr),
        ExprKind::Unary { .. } => hooks.on_unary(expr),
        ExprKind::Assign { .. } => hooks.on_assign(expr),
        ExprKind::Conditional { .. } => hooks.on_conditional(expr),
        ExprKind::Call { .. } => hooks.on_call(expr),
        ExprKind::New { .. } => hooks.on_new(expr),
        ExprKind::Member { .. } | ExprKind::NonNull(_) => hooks.on_member(expr),
        ExprKind::ArrayLiteral(_) => hooks.on_array_literal(expr),
        ExprKind::ObjectLiteral(_) => hooks.on_object_literal(expr),
        ExprKind::Function(_) => hooks.on_function(expr),
        ExprKind::Arrow(_) => hooks.on_arrow(expr),
        ExprKind::ClassExpr(_) => hooks.on_class_expr(expr),
        ExprKind::Await(_) => hooks.on_await(expr),
        ExprKind::Yield { .. } => hooks.on_yield(expr),
        ExprKind::TemplateLiteral { .. } | ExprKind::TaggedTemplate { .. } => hooks.on_template_literal(expr),
        ExprKind::Paren(inner) => dispatch_expr(hooks, inner),
        ExprKind::TypeAssertion { expr: inner, .. } | ExprKind::AsExpr { expr: inner, .. } | ExprKind::SatisfiesExpr { expr: inner, .. } => {
            dispatch_expr(hooks, inner)
        }
        ExprKind::Spread(_) | ExprKind::Sequence(_) => hooks.on_other_expr(expr),
    }
}

/// Dispatches one statement node to the matching hook.
pub fn dispatch_stmt<H: LoweringHooks>(hooks: &mut H, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Block(stmts) => hooks.on_block(stmts),
        StmtKind::Expr(e) => hooks.on_expr_stmt(e),
        StmtKind::VariableDecl(_) => hooks.on_variable_decl(stmt),
        StmtKind::If { .. } => hooks.on_if(stmt),
        StmtKind::For { .. } | StmtKind::ForIn { .. } | StmtKind::ForOf { .. } | StmtKind::While { .. } | StmtKind::DoWhile { .. } => {
            hooks.on_loop(stmt)
        }
        StmtKind::Return(_) => hooks.on_return(stmt),
        StmtKind::Break(_) | StmtKind::Continue(_) => hooks.on_break_continue(stmt),
        StmtKind::Throw(_) => hooks.on_throw(stmt),
        StmtKind::Try { .. } => hooks.on_try(stmt),
        StmtKind::Switch { .. } => hooks.on_switch(stmt),
        StmtKind::Labeled { .. } => hooks.on_labeled(stmt),
        StmtKind::Decl(_) => hooks.on_decl(stmt),
        StmtKind::Empty => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsc_core_ast::NodeId;
    use tsc_core_common::Span;

    #[derive(Default)]
    struct Counter {
        literals: u32,
        calls: u32,
    }

    impl LoweringHooks for Counter {
        type Out = ();
        fn on_literal(&mut self, _expr: &Expr) {
            self.literals += 1;
        }
        fn on_call(&mut self, _expr: &Expr) {
            self.calls += 1;
        }
    }

    #[test]
    fn dispatch_routes_literal_and_call_to_their_hooks() {
        let span = Span::new(0, 0);
        let lit = Expr { id: NodeId(1), span, kind: ExprKind::NumberLiteral("1".into()) };
        let call = Expr {
            id: NodeId(2),
            span,
            kind: ExprKind::Call { callee: Box::new(lit.clone()), type_args: vec![], args: vec![], optional: false },
        };
        let mut counter = Counter::default();
        dispatch_expr(&mut counter, &lit);
        dispatch_expr(&mut counter, &call);
        assert_eq!(counter.literals, 1);
        assert_eq!(counter.calls, 1);
    }
}

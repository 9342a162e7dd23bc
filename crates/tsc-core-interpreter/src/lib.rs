//! The tree-walking interpreter back-end (§4.6, §9 "Deep dispatch chains").
//!
//! Both back-ends are driven by the same checked program: the type checker
//! (`tsc_core_checker`) runs first and hands over a [`TypeMap`]; this
//! back-end then walks the AST directly, consulting the `TypeMap` only to
//! decide between the lowering dispatcher's direct/dynamic dispatch
//! strategies (`tsc_core_lowering::property_dispatch`) — never to
//! re-derive a type the checker already computed. Every value at runtime
//! is uniformly boxed (`crate::value::Value`); the checker-driven
//! dispatch decision is the only optimization this back-end makes, by
//! design (§9 "Dynamic typing from the source language").

pub mod async_rt;
pub mod builtins;
pub mod classes;
pub mod env;
pub mod error;
pub mod eval;
pub mod exec;
pub mod ops;
pub mod patterns;
pub mod value;

pub use error::{EvalResult, ExecResult, Signal, Thrown};
pub use value::Value;

use std::cell::RefCell;
use std::rc::Rc;

use tsc_core_ast::Stmt;
use tsc_core_checker::TypeMap;

use env::Scope;

/// Top-level interpreter state: the global lexical scope and the checker's
/// `TypeMap`, consulted for dispatch decisions but never mutated here —
/// the checker's write-once contract (§3 "Lifecycle") holds for back-ends
/// too.
pub struct Interpreter {
    pub global: Rc<RefCell<Scope>>,
    pub type_map: Option<TypeMap>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    #[must_use]
    pub fn new() -> Self {
        let global = Scope::root();
        builtins::install_globals(&global);
        Interpreter { global, type_map: None }
    }

    #[must_use]
    pub fn with_type_map(type_map: TypeMap) -> Self {
        let mut interp = Self::new();
        interp.type_map = Some(type_map);
        interp
    }

    /// Runs a whole program's top-level statement list in the global
    /// scope, hoisting function and class declarations first (§4.3
    /// "names are declared before their initializers are checked") and
    /// returning the final `Signal` (normally `Normal`, since a top-level
    /// `return` is a checker-level error the interpreter does not need to
    /// re-validate) or the first uncaught thrown value.
    pub fn run(&mut self, program: &[Stmt]) -> ExecResult {
        exec::hoist_declarations(self, &Rc::clone(&self.global), program)?;
        exec::exec_block_no_scope(self, &Rc::clone(&self.global), program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsc_core_ast::{BinaryOp, Expr, ExprKind, Ident, NodeId, Stmt, StmtKind, VariableDecl, VariableDeclKind, VariableDeclarator};
    use tsc_core_ast::Pattern;
    use tsc_core_common::Span;

    fn span() -> Span {
        Span::new(0, 0)
    }

    fn num(n: &str) -> Expr {
        Expr { id: NodeId(0), span: span(), kind: ExprKind::NumberLiteral(n.to_string()) }
    }

    #[test]
    fn runs_a_variable_declaration_and_reads_it_back() {
        let program = vec![
            Stmt {
                id: NodeId(1),
                span: span(),
                kind: StmtKind::VariableDecl(VariableDecl {
                    kind: VariableDeclKind::Let,
                    declarators: vec![VariableDeclarator {
                        id: NodeId(2),
                        pattern: Pattern::Ident(Ident { id: NodeId(3), name: "x".into(), span: span() }),
                        type_ann: None,
                        init: Some(Expr {
                            id: NodeId(4),
                            span: span(),
                            kind: ExprKind::Binary { op: BinaryOp::Add, left: Box::new(num("1")), right: Box::new(num("2")) },
                        }),
                    }],
                }),
            },
        ];
        let mut interp = Interpreter::new();
        interp.run(&program).unwrap();
        let x = env::lookup(&interp.global, "x").unwrap();
        assert!(matches!(x, Value::Number(n) if n == 3.0));
    }
}

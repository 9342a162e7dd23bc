//! The type checker (§4): a single-pass traversal over a statement list that
//! resolves every expression's type into a [`type_map::TypeMap`], enforcing
//! assignability, overload resolution, narrowing, and generic inference
//! along the way, and raising the first [`tsc_core_common::Diagnostic`] it
//! hits (§7 "no recovery" propagation policy).

pub mod builtins;
pub mod classes;
pub mod context;
pub mod contextual;
pub mod decl;
pub mod enums;
pub mod error;
pub mod expr;
pub mod inference;
pub mod narrowing;
pub mod options;
pub mod overloads;
pub mod property_access;
pub mod stmt;
pub mod type_map;

pub use context::Checker;
pub use error::{CheckError, CheckResult};
pub use options::CheckerOptions;
pub use type_map::TypeMap;

use tsc_core_ast::Stmt;
use tsc_core_common::Diagnostic;

/// Type-checks a full source file's top-level statement list and returns
/// the populated [`TypeMap`], or the first diagnostic raised.
///
/// This is the entry point both back-ends (`tsc-core-interpreter`,
/// `tsc-core-emitter`) call before lowering: they never construct a
/// `Checker` themselves.
pub fn check(program: &[Stmt], file: impl Into<String>, source: &str, options: CheckerOptions) -> Result<TypeMap, Diagnostic> {
    let mut ck = Checker::new(file, source, options);
    stmt::check_block(&mut ck, program).map_err(|e| e.0)?;
    Ok(ck.type_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsc_core_ast::{Expr, ExprKind, Ident, NodeId, Stmt, StmtKind, VariableDecl, VariableDeclKind, VariableDeclarator};
    use tsc_core_ast::Pattern;
    use tsc_core_common::Span;

    fn span() -> Span {
        Span::new(0, 0)
    }

    fn ident_pattern(name: &str, id: u32) -> Pattern {
        Pattern::Ident(Ident { id: NodeId(id), name: name.to_string(), span: span() })
    }

    #[test]
    fn checks_a_trivial_variable_declaration() {
        let program = vec![Stmt {
            id: NodeId(1),
            span: span(),
            kind: StmtKind::VariableDecl(VariableDecl {
                kind: VariableDeclKind::Let,
                declarators: vec![VariableDeclarator {
                    pattern: ident_pattern("x", 2),
                    type_ann: None,
                    init: Some(Expr { id: NodeId(3), span: span(), kind: ExprKind::NumberLiteral("1".to_string()) }),
                }],
            }),
        }];
        let result = check(&program, "test.ts", "let x = 1;", CheckerOptions::default());
        assert!(result.is_ok());
    }

    #[test]
    fn reports_undefined_name() {
        let program = vec![Stmt {
            id: NodeId(1),
            span: span(),
            kind: StmtKind::Expr(Expr { id: NodeId(2), span: span(), kind: ExprKind::Ident(Ident { id: NodeId(3), name: "nope".to_string(), span: span() }) }),
        }];
        let result = check(&program, "test.ts", "nope;", CheckerOptions::default());
        assert!(result.is_err());
    }
}

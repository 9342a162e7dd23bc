//! Binding patterns: plain identifiers and destructuring targets.

use crate::{Expr, Ident, NodeId, TypeAnnotation};
use tsc_core_common::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Ident(Ident),
    Array(ArrayPattern),
    Object(ObjectPattern),
    Rest(Box<Pattern>),
    Assign(Box<Pattern>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayPattern {
    pub id: NodeId,
    pub span: Span,
    pub elements: Vec<Option<Pattern>>,
    pub type_ann: Option<TypeAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPattern {
    pub id: NodeId,
    pub span: Span,
    pub properties: Vec<ObjectPatternProp>,
    pub type_ann: Option<TypeAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPatternProp {
    pub key: String,
    pub value: Pattern,
    pub computed: bool,
}

impl Pattern {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Pattern::Ident(i) => i.span,
            Pattern::Array(a) => a.span,
            Pattern::Object(o) => o.span,
            Pattern::Rest(p) => p.span(),
            Pattern::Assign(p, _) => p.span(),
        }
    }

    /// Every identifier bound by this pattern, left to right — used by the
    /// checker to declare destructured bindings and by the dispatcher to
    /// compute closure captures (§4.6).
    pub fn bound_names(&self, out: &mut Vec<String>) {
        match self {
            Pattern::Ident(i) => out.push(i.name.clone()),
            Pattern::Array(a) => {
                for el in a.elements.iter().flatten() {
                    el.bound_names(out);
                }
            }
            Pattern::Object(o) => {
                for prop in &o.properties {
                    prop.value.bound_names(out);
                }
            }
            Pattern::Rest(p) | Pattern::Assign(p, _) => p.bound_names(out),
        }
    }
}

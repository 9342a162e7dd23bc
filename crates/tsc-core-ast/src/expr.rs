//! Expression nodes.

use crate::{Ident, NodeId, Pattern, Stmt, TypeAnnotation};
use tsc_core_common::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Ident(Ident),
    This,
    Super,
    NumberLiteral(String),
    StringLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,
    UndefinedLiteral,
    BigIntLiteral(String),
    TemplateLiteral { quasis: Vec<String>, exprs: Vec<Expr> },
    TaggedTemplate { tag: Box<Expr>, quasis: Vec<String>, exprs: Vec<Expr> },
    RegExpLiteral(String),
    ArrayLiteral(Vec<Option<ArrayElement>>),
    ObjectLiteral(Vec<ObjectProperty>),
    Paren(Box<Expr>),
    Function(FunctionExpr),
    Arrow(ArrowExpr),
    ClassExpr(Box<crate::ClassDecl>),
    Unary { op: UnaryOp, operand: Box<Expr>, prefix: bool },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    Logical { op: LogicalOp, left: Box<Expr>, right: Box<Expr> },
    Assign { op: AssignOp, target: Box<Expr>, value: Box<Expr> },
    Conditional { test: Box<Expr>, consequent: Box<Expr>, alternate: Box<Expr> },
    Call { callee: Box<Expr>, type_args: Vec<TypeAnnotation>, args: Vec<Argument>, optional: bool },
    New { callee: Box<Expr>, type_args: Vec<TypeAnnotation>, args: Vec<Argument> },
    Member { object: Box<Expr>, property: MemberKey, optional: bool },
    NonNull(Box<Expr>),
    TypeAssertion { expr: Box<Expr>, type_ann: TypeAnnotation },
    AsExpr { expr: Box<Expr>, type_ann: TypeAnnotation, is_const: bool },
    SatisfiesExpr { expr: Box<Expr>, type_ann: TypeAnnotation },
    Await(Box<Expr>),
    Yield { arg: Option<Box<Expr>>, delegate: bool },
    Spread(Box<Expr>),
    Sequence(Vec<Expr>),
    Private(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKey {
    Name(String),
    Computed(Box<Expr>),
    Private(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayElement {
    Item(Expr),
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Normal(Expr),
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectProperty {
    KeyValue { key: PropertyKey, value: Expr },
    Shorthand(Ident),
    Method { key: PropertyKey, func: FunctionExpr },
    Getter { key: PropertyKey, func: FunctionExpr },
    Setter { key: PropertyKey, func: FunctionExpr },
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    Ident(String),
    StringLiteral(String),
    NumberLiteral(String),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub pattern: Pattern,
    pub type_ann: Option<TypeAnnotation>,
    pub optional: bool,
    pub default: Option<Box<Expr>>,
    pub is_rest: bool,
    /// Set on constructor parameters declared with `public`/`private`/
    /// `protected`/`readonly` — TypeScript's parameter-property sugar.
    pub ctor_property: Option<crate::AccessModifier>,
    pub readonly: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionExpr {
    pub name: Option<Ident>,
    pub type_params: Vec<crate::TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Option<Vec<Stmt>>,
    pub is_async: bool,
    pub is_generator: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrowExpr {
    pub type_params: Vec<crate::TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: ArrowBody,
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrowBody {
    Block(Vec<Stmt>),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
    Increment,
    Decrement,
}

/// All binary operator tokens the operator resolver (§4.5) classifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    In,
    Instanceof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    NullishCoalescing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    PowAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
    UShrAssign,
    AndAssign,
    OrAssign,
    NullishAssign,
}

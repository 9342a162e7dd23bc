//! Declarations: functions, classes, interfaces, type aliases, enums, namespaces.

use crate::{AccessModifier, Ident, NodeId, Param, Stmt, TypeAnnotation, TypeParam};
use tsc_core_common::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub id: NodeId,
    pub span: Span,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Function(FunctionDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Enum(EnumDecl),
    Namespace(NamespaceDecl),
}

/// A single named function declaration. A TypeScript overload group is
/// represented as several consecutive `FunctionDecl`s sharing a name where
/// all but the last have `body: None` (the call signatures), and the last
/// has a body (the implementation) — see §4.3 "Overload resolution".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Option<Vec<Stmt>>,
    pub is_async: bool,
    pub is_generator: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: Option<Ident>,
    pub type_params: Vec<TypeParam>,
    pub superclass: Option<TypeAnnotation>,
    pub implements: Vec<TypeAnnotation>,
    pub members: Vec<ClassMember>,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassMember {
    Method(MethodMember),
    Field(FieldMember),
    Constructor(MethodMember),
    StaticBlock(Vec<Stmt>),
    IndexSignature { key_name: String, key_type: TypeAnnotation, value_type: TypeAnnotation },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Normal,
    Getter,
    Setter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMember {
    pub name: String,
    pub is_private: bool,
    pub kind: MethodKind,
    pub is_static: bool,
    pub is_abstract: bool,
    pub access: AccessModifier,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    /// `None` for an overload signature or an abstract method; `Some` for
    /// the implementation (§3 `Class`: methods grouped into `OverloadedFunction`
    /// when several same-named signatures precede one body).
    pub body: Option<Vec<Stmt>>,
    pub is_async: bool,
    pub is_generator: bool,
    pub is_override: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMember {
    pub name: String,
    pub is_private: bool,
    pub is_static: bool,
    pub is_readonly: bool,
    pub is_abstract: bool,
    pub access: AccessModifier,
    pub type_ann: Option<TypeAnnotation>,
    pub initializer: Option<crate::Expr>,
    pub definite_assignment: bool,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeAnnotation>,
    pub members: Vec<InterfaceMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceMember {
    Property { name: String, type_ann: TypeAnnotation, optional: bool, readonly: bool },
    Method { name: String, type_params: Vec<TypeParam>, params: Vec<Param>, return_type: Option<TypeAnnotation>, optional: bool },
    CallSignature { type_params: Vec<TypeParam>, params: Vec<Param>, return_type: Option<TypeAnnotation> },
    IndexSignature { key_type: IndexKeyType, value_type: TypeAnnotation },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKeyType {
    String,
    Number,
    Symbol,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAliasDecl {
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub type_ann: TypeAnnotation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: Ident,
    pub is_const: bool,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub initializer: Option<crate::Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub name: String,
    pub body: Vec<Stmt>,
}

//! The `TypeInfo` tagged sum (§3) — every type shape the checker and both
//! back-ends reason about.
//!
//! Variants that nest other types hold `Rc<TypeInfo>` rather than `Box`: the
//! same subtree is frequently shared (a type alias referenced from a dozen
//! call sites, a class's instance type referenced from every method body),
//! and `Rc` lets those sites share one allocation instead of re-cloning a
//! tree on every substitution. This mirrors the ground truth's choice to
//! intern types for sharing; we use `Rc` instead of a full interner because
//! this core does not need cross-session identity, only cheap structural
//! sharing (see `DESIGN.md`).

use indexmap::{IndexMap, IndexSet};
use std::rc::Rc;

pub type Ty = Rc<TypeInfo>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Number,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleElementKind {
    Required,
    Optional,
    Spread,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    pub ty: Ty,
    pub kind: TupleElementKind,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    pub fields: IndexMap<String, Ty>,
    pub optional: IndexSet<String>,
    pub string_index: Option<Ty>,
    pub number_index: Option<Ty>,
    pub symbol_index: Option<Ty>,
}

impl RecordType {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            fields: IndexMap::new(),
            optional: IndexSet::new(),
            string_index: None,
            number_index: None,
            symbol_index: None,
        }
    }

    #[must_use]
    pub fn is_optional(&self, name: &str) -> bool {
        self.optional.contains(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub params: Vec<Ty>,
    pub ret: Ty,
    pub min_arity: usize,
    pub has_rest: bool,
    pub this_type: Option<Ty>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverloadedFunction {
    pub signatures: Vec<FunctionType>,
    pub implementation: FunctionType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericFunction {
    pub type_params: Vec<TypeParamDecl>,
    pub params: Vec<Ty>,
    pub ret: Ty,
    pub min_arity: usize,
    pub has_rest: bool,
    pub this_type: Option<Ty>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericOverloadedFunction {
    pub type_params: Vec<TypeParamDecl>,
    pub signatures: Vec<FunctionType>,
    pub implementation: FunctionType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParamDecl {
    pub name: String,
    pub constraint: Option<Ty>,
    pub default: Option<Ty>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// A class method value is either a plain function or an overload group;
/// back-ends must accept either uniformly (§9 "OverloadedFunction vs.
/// Function").
#[derive(Debug, Clone, PartialEq)]
pub enum MethodSignature {
    Plain(FunctionType),
    Overloaded(OverloadedFunction),
}

impl MethodSignature {
    /// The signature to use for emission: the plain function, or the
    /// implementation of an overload group (§9).
    #[must_use]
    pub fn callable(&self) -> &FunctionType {
        match self {
            MethodSignature::Plain(f) => f,
            MethodSignature::Overloaded(o) => &o.implementation,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassType {
    pub name: String,
    pub superclass: Option<Ty>,
    pub methods: IndexMap<String, MethodSignature>,
    pub static_methods: IndexMap<String, MethodSignature>,
    pub static_properties: IndexMap<String, Ty>,
    pub method_access: IndexMap<String, Visibility>,
    pub field_access: IndexMap<String, Visibility>,
    pub readonly_fields: IndexSet<String>,
    pub getters: IndexMap<String, Ty>,
    pub setters: IndexMap<String, Ty>,
    pub declared_field_types: IndexMap<String, Ty>,
    pub is_abstract: bool,
    pub abstract_methods: IndexSet<String>,
    pub abstract_getters: IndexSet<String>,
    pub abstract_setters: IndexSet<String>,
}

/// Transient placeholder used while collecting a class's own member
/// signatures, so method bodies may refer to the class under construction
/// before it is frozen (§9 "Cyclic class references").
#[derive(Debug, Clone, PartialEq)]
pub struct MutableClassType {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericClassType {
    pub class: ClassType,
    pub type_params: Vec<TypeParamDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    pub name: String,
    pub members: IndexMap<String, Ty>,
    pub optional_members: IndexSet<String>,
    pub string_index: Option<Ty>,
    pub number_index: Option<Ty>,
    pub symbol_index: Option<Ty>,
    pub call_signatures: Vec<FunctionType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericInterfaceType {
    pub interface: InterfaceType,
    pub type_params: Vec<TypeParamDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKind {
    Numeric,
    String,
    Heterogeneous,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub members: IndexMap<String, EnumValue>,
    pub kind: EnumKind,
    pub is_const: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceType {
    pub name: String,
    pub types: IndexMap<String, Ty>,
    pub values: IndexMap<String, Ty>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstantiatedGeneric {
    pub definition: Ty,
    pub type_arguments: Vec<Ty>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MappedModifier {
    Keep,
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedTypeInfo {
    pub param: String,
    pub constraint: Ty,
    pub value: Ty,
    pub readonly_modifier: MappedModifier,
    pub optional_modifier: MappedModifier,
    pub as_clause: Option<Ty>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalTypeInfo {
    pub check: Ty,
    pub extends: Ty,
    pub true_branch: Ty,
    pub false_branch: Ty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLiteralType {
    pub strings: Vec<String>,
    pub interpolated: Vec<Ty>,
}

/// The central tagged sum (§3). `PartialEq` is structural; use
/// [`crate::normalize::types_identical`] when the §4.1 identity rule (which
/// treats e.g. differently-ordered but equal unions as equal) is needed
/// instead of plain derived equality.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeInfo {
    Primitive(PrimitiveKind),
    StringType,
    BigInt,
    Symbol,
    Void,
    Null,
    Undefined,
    Unknown,
    Never,
    Any,
    Object,

    StringLiteral(String),
    NumberLiteral(String, f64),
    BooleanLiteral(bool),

    Array(Ty),
    Tuple { elements: Vec<TupleElement>, required_count: usize, rest: Option<Ty> },
    Record(RecordType),

    Function(FunctionType),
    OverloadedFunction(OverloadedFunction),
    GenericFunction(GenericFunction),
    GenericOverloadedFunction(GenericOverloadedFunction),

    Class(ClassType),
    MutableClass(MutableClassType),
    GenericClass(GenericClassType),
    Interface(InterfaceType),
    GenericInterface(GenericInterfaceType),
    InstantiatedGeneric(InstantiatedGeneric),
    Instance(Ty),

    Enum(EnumType),
    Namespace(NamespaceType),

    Union(Vec<Ty>),
    Intersection(Vec<Ty>),

    TypeParameter { name: String, constraint: Option<Ty>, default: Option<Ty> },
    KeyOf(Ty),
    IndexedAccess { object: Ty, index: Ty },
    MappedType(MappedTypeInfo),
    ConditionalType(ConditionalTypeInfo),
    InferredTypeParameter(String),
    TypePredicate { param_name: String, ty: Ty, is_assertion: bool },
    AssertsNonNull { param_name: String },
    TemplateLiteral(TemplateLiteralType),
    RecursiveTypeAlias(String),

    Promise(Ty),
    Map(Ty, Ty),
    Set(Ty),
    WeakMap(Ty, Ty),
    WeakSet(Ty),
    Date,
    RegExp,
    Buffer,
    Timeout,
    Error(String),
}

impl TypeInfo {
    #[must_use]
    pub fn rc(self) -> Ty {
        Rc::new(self)
    }

    #[must_use]
    pub fn is_never(&self) -> bool {
        matches!(self, TypeInfo::Never)
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, TypeInfo::Any)
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeInfo::Unknown)
    }

    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, TypeInfo::Null | TypeInfo::Undefined)
    }

    /// The widened primitive a literal type narrows, per §3's widening
    /// invariant ("literal types are subtypes of their widened primitives").
    #[must_use]
    pub fn widen_literal(&self) -> Option<TypeInfo> {
        match self {
            TypeInfo::StringLiteral(_) => Some(TypeInfo::StringType),
            TypeInfo::NumberLiteral(..) => Some(TypeInfo::Primitive(PrimitiveKind::Number)),
            TypeInfo::BooleanLiteral(_) => Some(TypeInfo::Primitive(PrimitiveKind::Boolean)),
            _ => None,
        }
    }
}

pub mod well_known {
    use super::{PrimitiveKind, Ty, TypeInfo};

    #[must_use]
    pub fn number() -> Ty {
        TypeInfo::Primitive(PrimitiveKind::Number).rc()
    }
    #[must_use]
    pub fn boolean() -> Ty {
        TypeInfo::Primitive(PrimitiveKind::Boolean).rc()
    }
    #[must_use]
    pub fn string() -> Ty {
        TypeInfo::StringType.rc()
    }
    #[must_use]
    pub fn any() -> Ty {
        TypeInfo::Any.rc()
    }
    #[must_use]
    pub fn unknown() -> Ty {
        TypeInfo::Unknown.rc()
    }
    #[must_use]
    pub fn never() -> Ty {
        TypeInfo::Never.rc()
    }
    #[must_use]
    pub fn void() -> Ty {
        TypeInfo::Void.rc()
    }
    #[must_use]
    pub fn null() -> Ty {
        TypeInfo::Null.rc()
    }
    #[must_use]
    pub fn undefined() -> Ty {
        TypeInfo::Undefined.rc()
    }
}

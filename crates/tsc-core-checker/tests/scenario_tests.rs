//! End-to-end scenarios exercising the checker's public `check()` entry
//! point against hand-built ASTs (there is no parser in this workspace, so
//! every program below is a direct `Stmt`/`Expr` literal rather than parsed
//! source text).

use tsc_core_ast::{
    AccessModifier, ArrayElement, Argument, ClassDecl, ClassMember, Decl, DeclKind, Expr, ExprKind,
    FieldMember, FunctionDecl, Ident, InterfaceDecl, InterfaceMember, MemberKey, MethodKind,
    MethodMember, NodeId, Param, Pattern, Stmt, StmtKind, TypeAliasDecl, TypeAnnotation, TypeParam,
    UnaryOp, BinaryOp, VariableDecl, VariableDeclKind, VariableDeclarator,
};
use tsc_core_checker::{check, CheckerOptions};
use tsc_core_common::diagnostics::ErrorKind;
use tsc_core_common::Span;

struct Ids(u32);

impl Ids {
    fn next(&mut self) -> NodeId {
        self.0 += 1;
        NodeId(self.0)
    }
}

fn span() -> Span {
    Span::new(0, 0)
}

fn ident(ids: &mut Ids, name: &str) -> Ident {
    Ident { id: ids.next(), name: name.to_string(), span: span() }
}

fn ident_pattern(ids: &mut Ids, name: &str) -> Pattern {
    Pattern::Ident(ident(ids, name))
}

fn ident_expr(ids: &mut Ids, name: &str) -> Expr {
    Expr { id: ids.next(), span: span(), kind: ExprKind::Ident(ident(ids, name)) }
}

fn num_lit(ids: &mut Ids, n: &str) -> Expr {
    Expr { id: ids.next(), span: span(), kind: ExprKind::NumberLiteral(n.to_string()) }
}

fn str_lit(ids: &mut Ids, s: &str) -> Expr {
    Expr { id: ids.next(), span: span(), kind: ExprKind::StringLiteral(s.to_string()) }
}

fn ty_ann(text: &str) -> TypeAnnotation {
    TypeAnnotation { text: text.to_string(), span: span() }
}

fn param(ids: &mut Ids, name: &str, type_ann: &str) -> Param {
    Param {
        pattern: ident_pattern(ids, name),
        type_ann: Some(ty_ann(type_ann)),
        optional: false,
        default: None,
        is_rest: false,
        ctor_property: None,
        readonly: false,
    }
}

fn let_decl(ids: &mut Ids, name: &str, type_ann: Option<TypeAnnotation>, init: Expr) -> Stmt {
    Stmt {
        id: ids.next(),
        span: span(),
        kind: StmtKind::VariableDecl(VariableDecl {
            kind: VariableDeclKind::Let,
            declarators: vec![VariableDeclarator { pattern: ident_pattern(ids, name), type_ann, init: Some(init) }],
        }),
    }
}

fn return_stmt(ids: &mut Ids, value: Option<Expr>) -> Stmt {
    Stmt { id: ids.next(), span: span(), kind: StmtKind::Return(value) }
}

fn decl_stmt(ids: &mut Ids, kind: DeclKind) -> Stmt {
    Stmt { id: ids.next(), span: span(), kind: StmtKind::Decl(Decl { id: ids.next(), span: span(), kind }) }
}

fn call_expr(ids: &mut Ids, callee: Expr, type_args: Vec<TypeAnnotation>, args: Vec<Argument>) -> Expr {
    Expr { id: ids.next(), span: span(), kind: ExprKind::Call { callee: Box::new(callee), type_args, args, optional: false } }
}

// Scenario A (spec.md §8): a tuple-typed variable accepts an array literal
// of matching arity and shape, and rejects one with too few elements.
#[test]
fn scenario_a_tuple_literal_matching_arity_is_accepted() {
    let mut ids = Ids(0);
    let array = Expr {
        id: ids.next(),
        span: span(),
        kind: ExprKind::ArrayLiteral(vec![Some(ArrayElement::Item(str_lit(&mut ids, "x"))), Some(ArrayElement::Item(num_lit(&mut ids, "1")))]),
    };
    let program = vec![let_decl(&mut ids, "p", Some(ty_ann("[string, number]")), array)];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    assert!(result.is_ok(), "expected tuple literal to type-check, got {:?}", result.err());
}

#[test]
fn scenario_a_tuple_literal_missing_element_is_rejected() {
    let mut ids = Ids(0);
    let array = Expr { id: ids.next(), span: span(), kind: ExprKind::ArrayLiteral(vec![Some(ArrayElement::Item(str_lit(&mut ids, "x")))]) };
    let program = vec![let_decl(&mut ids, "p", Some(ty_ann("[string, number]")), array)];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    let err = result.expect_err("a short tuple literal must be rejected for arity");
    assert_eq!(err.kind, ErrorKind::Type);
}

// Scenario B (spec.md §8): overload resolution picks the most specific
// matching signature, not the first or the widest.
#[test]
fn scenario_b_overload_resolves_to_the_literal_specific_signature() {
    let mut ids = Ids(0);
    let overload_a = FunctionDecl {
        name: ident(&mut ids, "f"),
        type_params: vec![],
        params: vec![param(&mut ids, "x", "\"a\"")],
        return_type: Some(ty_ann("1")),
        body: None,
        is_async: false,
        is_generator: false,
    };
    let overload_b = FunctionDecl {
        name: ident(&mut ids, "f"),
        type_params: vec![],
        params: vec![param(&mut ids, "x", "string")],
        return_type: Some(ty_ann("2")),
        body: None,
        is_async: false,
        is_generator: false,
    };
    let implementation = FunctionDecl {
        name: ident(&mut ids, "f"),
        type_params: vec![],
        params: vec![param(&mut ids, "x", "string")],
        return_type: Some(ty_ann("number")),
        body: Some(vec![return_stmt(&mut ids, Some(num_lit(&mut ids, "1")))]),
        is_async: false,
        is_generator: false,
    };

    let call = call_expr(&mut ids, ident_expr(&mut ids, "f"), vec![], vec![Argument::Normal(str_lit(&mut ids, "a"))]);
    let call_id = call.id;
    let call_stmt = Stmt { id: ids.next(), span: span(), kind: StmtKind::Expr(call) };

    let program = vec![
        decl_stmt(&mut ids, DeclKind::Function(overload_a)),
        decl_stmt(&mut ids, DeclKind::Function(overload_b)),
        decl_stmt(&mut ids, DeclKind::Function(implementation)),
        call_stmt,
    ];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    let type_map = result.expect("overloaded call should type-check");
    let resolved = type_map.get(call_id).expect("call expression should have a recorded type");
    assert_eq!(*resolved, tsc_core_types::model::TypeInfo::NumberLiteral("1".to_string(), 1.0));
}

// Scenario C (spec.md §8): generic inference binds `T` from the argument,
// and an explicit mismatched type argument is rejected.
#[test]
fn scenario_c_generic_inference_binds_literal_type() {
    let mut ids = Ids(0);
    let id_fn = FunctionDecl {
        name: ident(&mut ids, "id"),
        type_params: vec![TypeParam { name: "T".to_string(), constraint: None, default: None }],
        params: vec![param(&mut ids, "x", "T")],
        return_type: Some(ty_ann("T")),
        body: Some(vec![return_stmt(&mut ids, Some(ident_expr(&mut ids, "x")))]),
        is_async: false,
        is_generator: false,
    };
    let call = call_expr(&mut ids, ident_expr(&mut ids, "id"), vec![], vec![Argument::Normal(num_lit(&mut ids, "42"))]);
    let call_id = call.id;
    let call_stmt = Stmt { id: ids.next(), span: span(), kind: StmtKind::Expr(call) };

    let program = vec![decl_stmt(&mut ids, DeclKind::Function(id_fn)), call_stmt];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    let type_map = result.expect("id(42) should type-check");
    let resolved = type_map.get(call_id).expect("call expression should have a recorded type");
    assert_eq!(*resolved, tsc_core_types::model::TypeInfo::NumberLiteral("42".to_string(), 42.0));
}

#[test]
fn scenario_c_explicit_type_argument_mismatch_is_rejected() {
    let mut ids = Ids(0);
    let id_fn = FunctionDecl {
        name: ident(&mut ids, "id"),
        type_params: vec![TypeParam { name: "T".to_string(), constraint: None, default: None }],
        params: vec![param(&mut ids, "x", "T")],
        return_type: Some(ty_ann("T")),
        body: Some(vec![return_stmt(&mut ids, Some(ident_expr(&mut ids, "x")))]),
        is_async: false,
        is_generator: false,
    };
    let call = call_expr(&mut ids, ident_expr(&mut ids, "id"), vec![ty_ann("string")], vec![Argument::Normal(num_lit(&mut ids, "42"))]);
    let call_stmt = Stmt { id: ids.next(), span: span(), kind: StmtKind::Expr(call) };

    let program = vec![decl_stmt(&mut ids, DeclKind::Function(id_fn)), call_stmt];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    let err = result.expect_err("id<string>(42) must be rejected");
    assert_eq!(err.kind, ErrorKind::Type);
}

// Scenario D (spec.md §8): structural interface compliance. A class missing
// a required member fails; missing only an optional member still passes.
#[test]
fn scenario_d_missing_required_interface_member_is_rejected() {
    let mut ids = Ids(0);
    let iface = InterfaceDecl {
        name: ident(&mut ids, "Greeter"),
        type_params: vec![],
        extends: vec![],
        members: vec![
            InterfaceMember::Property { name: "name".to_string(), type_ann: ty_ann("string"), optional: false, readonly: false },
            InterfaceMember::Method { name: "greet".to_string(), type_params: vec![], params: vec![], return_type: Some(ty_ann("void")), optional: true },
        ],
    };
    let bad_class = ClassDecl {
        name: Some(ident(&mut ids, "Bad")),
        type_params: vec![],
        superclass: None,
        implements: vec![ty_ann("Greeter")],
        members: vec![],
        is_abstract: false,
    };
    let program = vec![decl_stmt(&mut ids, DeclKind::Interface(iface)), decl_stmt(&mut ids, DeclKind::Class(bad_class))];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    let err = result.expect_err("a class missing a required interface member must be rejected");
    assert_eq!(err.kind, ErrorKind::Structural);
}

#[test]
fn scenario_d_missing_only_optional_interface_member_is_accepted() {
    let mut ids = Ids(0);
    let iface = InterfaceDecl {
        name: ident(&mut ids, "Greeter"),
        type_params: vec![],
        extends: vec![],
        members: vec![
            InterfaceMember::Property { name: "name".to_string(), type_ann: ty_ann("string"), optional: false, readonly: false },
            InterfaceMember::Method { name: "greet".to_string(), type_params: vec![], params: vec![], return_type: Some(ty_ann("void")), optional: true },
        ],
    };
    let good_class = ClassDecl {
        name: Some(ident(&mut ids, "Good")),
        type_params: vec![],
        superclass: None,
        implements: vec![ty_ann("Greeter")],
        members: vec![ClassMember::Field(FieldMember {
            name: "name".to_string(),
            is_private: false,
            is_static: false,
            is_readonly: false,
            is_abstract: false,
            access: AccessModifier::Public,
            type_ann: Some(ty_ann("string")),
            initializer: Some(str_lit(&mut ids, "hi")),
            definite_assignment: false,
            optional: false,
        })],
        is_abstract: false,
    };
    let program = vec![decl_stmt(&mut ids, DeclKind::Interface(iface)), decl_stmt(&mut ids, DeclKind::Class(good_class))];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    assert!(result.is_ok(), "a class missing only an optional member should type-check, got {:?}", result.err());
}

// Scenario E (spec.md §8): narrowing `unknown` via `typeof` lets a
// member access through that would otherwise be rejected.
#[test]
fn scenario_e_typeof_narrowing_unlocks_string_member_access() {
    let mut ids = Ids(0);
    let x_param = param(&mut ids, "x", "unknown");
    let typeof_x = Expr { id: ids.next(), span: span(), kind: ExprKind::Unary { op: UnaryOp::Typeof, operand: Box::new(ident_expr(&mut ids, "x")), prefix: true } };
    let guard = Expr { id: ids.next(), span: span(), kind: ExprKind::Binary { op: BinaryOp::StrictEq, left: Box::new(typeof_x), right: Box::new(str_lit(&mut ids, "string")) } };

    let length_access_obj = ident_expr(&mut ids, "x");
    let length_access_id = length_access_obj.id;
    let length_access = Expr { id: ids.next(), span: span(), kind: ExprKind::Member { object: Box::new(length_access_obj), property: tsc_core_ast::MemberKey::Name("length".to_string()), optional: false } };

    let then_branch = Stmt { id: ids.next(), span: span(), kind: StmtKind::Block(vec![return_stmt(&mut ids, Some(length_access))]) };
    let if_stmt = Stmt { id: ids.next(), span: span(), kind: StmtKind::If { test: guard, consequent: Box::new(then_branch), alternate: None } };
    let fallback = return_stmt(&mut ids, Some(num_lit(&mut ids, "0")));

    let g_fn = FunctionDecl {
        name: ident(&mut ids, "g"),
        type_params: vec![],
        params: vec![x_param],
        return_type: Some(ty_ann("number")),
        body: Some(vec![if_stmt, fallback]),
        is_async: false,
        is_generator: false,
    };

    let program = vec![decl_stmt(&mut ids, DeclKind::Function(g_fn))];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    let type_map = result.expect("typeof-narrowed unknown should let .length through");
    let narrowed = type_map.get(length_access_id).expect("the narrowed receiver should have a recorded type");
    assert_eq!(*narrowed, tsc_core_types::model::TypeInfo::StringType);
}

// Scenario F (spec.md §8): `string & number` simplifies to `Never`, so no
// non-never value may be assigned to a variable of that alias.
#[test]
fn scenario_f_conflicting_intersection_alias_rejects_every_assignment() {
    let mut ids = Ids(0);
    let alias = TypeAliasDecl { name: ident(&mut ids, "T"), type_params: vec![], type_ann: ty_ann("string & number") };
    let assignment = let_decl(&mut ids, "v", Some(ty_ann("T")), str_lit(&mut ids, "x"));
    let program = vec![decl_stmt(&mut ids, DeclKind::TypeAlias(alias)), assignment];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    let err = result.expect_err("assigning a string literal to a string & number alias must be rejected");
    assert_eq!(err.kind, ErrorKind::Type);
}

// §4.2: a type alias that is nothing but a re-entrant reference to itself
// (no indirection through an object-like/callable shape) is a fatal error,
// not a silently accepted `RecursiveTypeAlias` placeholder.
#[test]
fn direct_self_referential_type_alias_is_rejected() {
    let mut ids = Ids(0);
    let alias = TypeAliasDecl { name: ident(&mut ids, "A"), type_params: vec![], type_ann: ty_ann("A") };
    let program = vec![decl_stmt(&mut ids, DeclKind::TypeAlias(alias))];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    let err = result.expect_err("`type A = A;` must be rejected as a circular alias");
    assert_eq!(err.kind, ErrorKind::Structural);
    assert_eq!(err.code, tsc_core_common::diagnostics::diagnostic_codes::CIRCULAR_TYPE_ALIAS);
}

#[test]
fn union_of_only_self_references_is_rejected() {
    let mut ids = Ids(0);
    let alias = TypeAliasDecl { name: ident(&mut ids, "A"), type_params: vec![], type_ann: ty_ann("A | A") };
    let program = vec![decl_stmt(&mut ids, DeclKind::TypeAlias(alias))];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    let err = result.expect_err("`type A = A | A;` must be rejected as a circular alias");
    assert_eq!(err.kind, ErrorKind::Structural);
    assert_eq!(err.code, tsc_core_common::diagnostics::diagnostic_codes::CIRCULAR_TYPE_ALIAS);
}

// Legal indirection (§4.2): a self-reference nested inside a `Record`
// (object literal type) shape is fine — only a *direct* structural
// self-reference is fatal.
#[test]
fn self_reference_indirected_through_a_record_is_accepted() {
    let mut ids = Ids(0);
    let alias = TypeAliasDecl {
        name: ident(&mut ids, "Tree"),
        type_params: vec![],
        type_ann: ty_ann("{ value: number; children: Tree[] }"),
    };
    let program = vec![decl_stmt(&mut ids, DeclKind::TypeAlias(alias))];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    assert!(result.is_ok(), "a recursive alias indirected through a record field should type-check, got {:?}", result.err());
}

// §4.3: "an abstract method must be the only declaration for its name" —
// pairing an abstract declaration with a concrete one under the same name
// is a structural error, not a silent overwrite of the abstract entry.
#[test]
fn abstract_method_paired_with_concrete_override_is_rejected() {
    let mut ids = Ids(0);
    let abstract_foo = MethodMember {
        name: "foo".to_string(),
        is_private: false,
        kind: MethodKind::Normal,
        is_static: false,
        is_abstract: true,
        access: AccessModifier::Public,
        type_params: vec![],
        params: vec![],
        return_type: Some(ty_ann("void")),
        body: None,
        is_async: false,
        is_generator: false,
        is_override: false,
    };
    let concrete_foo = MethodMember {
        name: "foo".to_string(),
        is_private: false,
        kind: MethodKind::Normal,
        is_static: false,
        is_abstract: false,
        access: AccessModifier::Public,
        type_params: vec![],
        params: vec![],
        return_type: Some(ty_ann("void")),
        body: Some(vec![]),
        is_async: false,
        is_generator: false,
        is_override: false,
    };
    let class = ClassDecl {
        name: Some(ident(&mut ids, "C")),
        type_params: vec![],
        superclass: None,
        implements: vec![],
        members: vec![ClassMember::Method(abstract_foo), ClassMember::Method(concrete_foo)],
        is_abstract: true,
    };
    let program = vec![decl_stmt(&mut ids, DeclKind::Class(class))];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    let err = result.expect_err("an abstract method paired with a concrete declaration of the same name must be rejected");
    assert_eq!(err.kind, ErrorKind::Structural);
    assert_eq!(err.code, tsc_core_common::diagnostics::diagnostic_codes::DUPLICATE_ABSTRACT_DECLARATION);
}

// §4.1: two intersected interfaces merge field-wise, so a member declared
// on either branch is reachable through the intersection.
#[test]
fn intersected_interfaces_expose_both_sides_members() {
    let mut ids = Ids(0);
    let iface_a = InterfaceDecl {
        name: ident(&mut ids, "A"),
        type_params: vec![],
        extends: vec![],
        members: vec![InterfaceMember::Property { name: "x".to_string(), type_ann: ty_ann("string"), optional: false, readonly: false }],
    };
    let iface_b = InterfaceDecl {
        name: ident(&mut ids, "B"),
        type_params: vec![],
        extends: vec![],
        members: vec![InterfaceMember::Property { name: "y".to_string(), type_ann: ty_ann("number"), optional: false, readonly: false }],
    };
    let param_c = param(&mut ids, "c", "A & B");
    let x_obj = ident_expr(&mut ids, "c");
    let x_access = Expr {
        id: ids.next(),
        span: span(),
        kind: ExprKind::Member { object: Box::new(x_obj), property: MemberKey::Name("x".to_string()), optional: false },
    };
    let y_obj = ident_expr(&mut ids, "c");
    let y_access = Expr {
        id: ids.next(),
        span: span(),
        kind: ExprKind::Member { object: Box::new(y_obj), property: MemberKey::Name("y".to_string()), optional: false },
    };
    let body = vec![
        Stmt { id: ids.next(), span: span(), kind: StmtKind::Expr(x_access) },
        Stmt { id: ids.next(), span: span(), kind: StmtKind::Expr(y_access) },
    ];
    let f = FunctionDecl {
        name: ident(&mut ids, "f"),
        type_params: vec![],
        params: vec![param_c],
        return_type: Some(ty_ann("void")),
        body: Some(body),
        is_async: false,
        is_generator: false,
    };
    let program = vec![
        decl_stmt(&mut ids, DeclKind::Interface(iface_a)),
        decl_stmt(&mut ids, DeclKind::Interface(iface_b)),
        decl_stmt(&mut ids, DeclKind::Function(f)),
    ];
    let result = check(&program, "test.ts", "", CheckerOptions::default());
    assert!(result.is_ok(), "members of both intersected interfaces should be reachable, got {:?}", result.err());
}

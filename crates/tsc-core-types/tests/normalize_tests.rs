use crate::model::*;
use crate::normalize::{is_assignable, make_intersection, make_union};

fn lit_str(s: &str) -> Ty {
    TypeInfo::StringLiteral(s.to_string()).rc()
}

fn lit_num(n: f64) -> Ty {
    TypeInfo::NumberLiteral(n.to_string(), n).rc()
}

#[test]
fn union_of_any_collapses_to_any() {
    let u = make_union(vec![well_known::string(), well_known::any()]);
    assert_eq!(*u, TypeInfo::Any);
}

#[test]
fn union_drops_never_members() {
    let u = make_union(vec![well_known::string(), well_known::never()]);
    assert_eq!(*u, TypeInfo::StringType);
}

#[test]
fn union_flattens_nested_unions() {
    let inner = make_union(vec![lit_str("a"), lit_str("b")]);
    let outer = make_union(vec![inner, lit_str("c")]);
    match &*outer {
        TypeInfo::Union(members) => assert_eq!(members.len(), 3),
        other => panic!("expected flattened union, got {other:?}"),
    }
}

#[test]
fn union_deduplicates_identical_literals() {
    let u = make_union(vec![lit_str("a"), lit_str("a")]);
    assert_eq!(*u, TypeInfo::StringLiteral("a".into()));
}

#[test]
fn singleton_union_simplifies_to_member() {
    let u = make_union(vec![well_known::string()]);
    assert_eq!(*u, TypeInfo::StringType);
}

#[test]
fn intersection_with_never_is_never() {
    let i = make_intersection(vec![well_known::string(), well_known::never()]);
    assert_eq!(*i, TypeInfo::Never);
}

#[test]
fn intersection_of_conflicting_primitives_is_never() {
    let i = make_intersection(vec![well_known::string(), well_known::number()]);
    assert_eq!(*i, TypeInfo::Never);
}

#[test]
fn intersection_merges_record_fields() {
    let mut a = RecordType::empty();
    a.fields.insert("x".into(), well_known::string());
    let mut b = RecordType::empty();
    b.fields.insert("y".into(), well_known::number());

    let merged = make_intersection(vec![TypeInfo::Record(a).rc(), TypeInfo::Record(b).rc()]);
    match &*merged {
        TypeInfo::Record(r) => {
            assert_eq!(r.fields.len(), 2);
            assert_eq!(r.fields["x"], well_known::string());
            assert_eq!(r.fields["y"], well_known::number());
        }
        other => panic!("expected merged record, got {other:?}"),
    }
}

#[test]
fn intersection_merge_conflicts_become_never() {
    let mut a = RecordType::empty();
    a.fields.insert("x".into(), well_known::string());
    let mut b = RecordType::empty();
    b.fields.insert("x".into(), well_known::number());

    let merged = make_intersection(vec![TypeInfo::Record(a).rc(), TypeInfo::Record(b).rc()]);
    match &*merged {
        TypeInfo::Record(r) => assert_eq!(r.fields["x"], well_known::never()),
        other => panic!("expected merged record, got {other:?}"),
    }
}

fn interface_of(name: &str, fields: &[(&str, Ty)]) -> Ty {
    let mut members = indexmap::IndexMap::new();
    for (n, t) in fields {
        members.insert((*n).to_string(), t.clone());
    }
    TypeInfo::Interface(InterfaceType {
        name: name.into(),
        members,
        optional_members: indexmap::IndexSet::new(),
        string_index: None,
        number_index: None,
        symbol_index: None,
        call_signatures: Vec::new(),
    })
    .rc()
}

#[test]
fn intersection_merges_interface_fields() {
    let a = interface_of("A", &[("x", well_known::string())]);
    let b = interface_of("B", &[("y", well_known::number())]);

    let merged = make_intersection(vec![a, b]);
    match &*merged {
        TypeInfo::Record(r) => {
            assert_eq!(r.fields.len(), 2);
            assert_eq!(r.fields["x"], well_known::string());
            assert_eq!(r.fields["y"], well_known::number());
        }
        other => panic!("expected merged record, got {other:?}"),
    }
}

#[test]
fn intersection_merges_interface_and_record_fields() {
    let a = interface_of("A", &[("x", well_known::string())]);
    let mut b = RecordType::empty();
    b.fields.insert("y".into(), well_known::number());

    let merged = make_intersection(vec![a, TypeInfo::Record(b).rc()]);
    match &*merged {
        TypeInfo::Record(r) => {
            assert_eq!(r.fields.len(), 2);
            assert_eq!(r.fields["x"], well_known::string());
            assert_eq!(r.fields["y"], well_known::number());
        }
        other => panic!("expected merged record, got {other:?}"),
    }
}

#[test]
fn any_is_assignable_both_ways() {
    assert!(is_assignable(&well_known::any(), &well_known::string()));
    assert!(is_assignable(&well_known::string(), &well_known::any()));
}

#[test]
fn never_is_assignable_to_everything() {
    assert!(is_assignable(&well_known::string(), &well_known::never()));
    assert!(!is_assignable(&well_known::never(), &well_known::string()));
}

#[test]
fn unknown_accepts_everything_but_assigns_nowhere() {
    assert!(is_assignable(&well_known::unknown(), &well_known::string()));
    assert!(!is_assignable(&well_known::string(), &well_known::unknown()));
}

#[test]
fn string_literal_is_assignable_to_string() {
    assert!(is_assignable(&well_known::string(), &lit_str("hello")));
    assert!(!is_assignable(&lit_str("hello"), &well_known::string()));
}

#[test]
fn numeric_literal_mismatch_rejected() {
    assert!(!is_assignable(&lit_num(1.0), &lit_num(2.0)));
    assert!(is_assignable(&lit_num(1.0), &lit_num(1.0)));
}

#[test]
fn union_member_accepts_matching_actual() {
    let u = make_union(vec![well_known::string(), well_known::number()]);
    assert!(is_assignable(&u, &well_known::string()));
    assert!(!is_assignable(&u, &well_known::boolean()));
}

#[test]
fn actual_union_requires_every_member_assignable() {
    let actual = make_union(vec![lit_str("a"), lit_str("b")]);
    assert!(is_assignable(&well_known::string(), &actual));
    let mixed = make_union(vec![lit_str("a"), well_known::number()]);
    assert!(!is_assignable(&well_known::string(), &mixed));
}

#[test]
fn arrays_are_covariant() {
    let strings = TypeInfo::Array(well_known::string()).rc();
    let literals = TypeInfo::Array(lit_str("a")).rc();
    assert!(is_assignable(&strings, &literals));
    assert!(!is_assignable(&literals, &strings));
}

#[test]
fn tuple_assignable_to_compatible_array() {
    let tuple = TypeInfo::Tuple {
        elements: vec![TupleElement { ty: well_known::string(), kind: TupleElementKind::Required, label: None }],
        required_count: 1,
        rest: None,
    }
    .rc();
    let array = TypeInfo::Array(well_known::string()).rc();
    assert!(is_assignable(&array, &tuple));
}

#[test]
fn function_params_are_contravariant_return_covariant() {
    let narrow_param_fn = TypeInfo::Function(FunctionType {
        params: vec![lit_str("x")],
        ret: well_known::string(),
        min_arity: 1,
        has_rest: false,
        this_type: None,
    })
    .rc();
    let wide_param_fn = TypeInfo::Function(FunctionType {
        params: vec![well_known::string()],
        ret: lit_str("x"),
        min_arity: 1,
        has_rest: false,
        this_type: None,
    })
    .rc();
    // A function accepting the wider param type may be used wherever one
    // accepting the narrower param type is expected (contravariance).
    assert!(is_assignable(&narrow_param_fn, &wide_param_fn));
    assert!(!is_assignable(&wide_param_fn, &narrow_param_fn));
}

#[test]
fn record_structural_match_allows_missing_optional() {
    let mut expected = RecordType::empty();
    expected.fields.insert("x".into(), well_known::string());
    expected.optional.insert("x".into());
    let expected_ty = TypeInfo::Record(expected).rc();

    let actual_ty = TypeInfo::Record(RecordType::empty()).rc();
    assert!(is_assignable(&expected_ty, &actual_ty));
}

#[test]
fn record_structural_match_rejects_missing_required() {
    let mut expected = RecordType::empty();
    expected.fields.insert("x".into(), well_known::string());
    let expected_ty = TypeInfo::Record(expected).rc();

    let actual_ty = TypeInfo::Record(RecordType::empty()).rc();
    assert!(!is_assignable(&expected_ty, &actual_ty));
}

#[test]
fn cyclic_interface_self_reference_does_not_overflow() {
    let mut iface = InterfaceType {
        name: "Node".into(),
        members: IndexMap::new(),
        optional_members: IndexSet::new(),
        string_index: None,
        number_index: None,
        symbol_index: None,
        call_signatures: Vec::new(),
    };
    let placeholder = TypeInfo::Interface(iface.clone()).rc();
    iface.members.insert("next".into(), placeholder.clone());
    let full = TypeInfo::Interface(iface).rc();
    assert!(is_assignable(&full, &full));
}

use indexmap::{IndexMap, IndexSet};

fn record_of(fields: &[(&str, Ty)]) -> Ty {
    let mut r = RecordType::empty();
    for (name, ty) in fields {
        r.fields.insert((*name).to_string(), ty.clone());
    }
    TypeInfo::Record(r).rc()
}

#[test]
fn keyof_record_yields_string_literal_union() {
    let obj = record_of(&[("a", well_known::number()), ("b", well_known::string())]);
    let keys = crate::normalize::force(&TypeInfo::KeyOf(obj).rc());
    match &*keys {
        TypeInfo::Union(members) => {
            assert_eq!(members.len(), 2);
            assert!(members.contains(&lit_str("a")));
            assert!(members.contains(&lit_str("b")));
        }
        other => panic!("expected a union of string literals, got {other:?}"),
    }
}

#[test]
fn indexed_access_looks_up_field_by_literal_key() {
    let obj = record_of(&[("a", well_known::number())]);
    let accessed = TypeInfo::IndexedAccess { object: obj, index: lit_str("a") }.rc();
    assert_eq!(crate::normalize::force(&accessed), well_known::number());
}

#[test]
fn indexed_access_distributes_over_union_index() {
    let obj = record_of(&[("a", well_known::number()), ("b", well_known::string())]);
    let index = make_union(vec![lit_str("a"), lit_str("b")]);
    let accessed = TypeInfo::IndexedAccess { object: obj, index }.rc();
    let result = crate::normalize::force(&accessed);
    assert!(is_assignable(&result, &well_known::number()));
    assert!(is_assignable(&result, &well_known::string()));
}

#[test]
fn mapped_type_builds_record_from_keyof_constraint() {
    let source = record_of(&[("a", well_known::number()), ("b", well_known::string())]);
    let mapped = TypeInfo::MappedType(MappedTypeInfo {
        param: "K".into(),
        constraint: TypeInfo::KeyOf(source.clone()).rc(),
        value: TypeInfo::IndexedAccess { object: source, index: TypeInfo::TypeParameter { name: "K".into(), constraint: None, default: None }.rc() }.rc(),
        readonly_modifier: MappedModifier::Keep,
        optional_modifier: MappedModifier::Keep,
        as_clause: None,
    })
    .rc();
    let result = crate::normalize::force(&mapped);
    let TypeInfo::Record(r) = &*result else {
        panic!("expected a record, got {result:?}");
    };
    assert_eq!(r.fields.get("a"), Some(&well_known::number()));
    assert_eq!(r.fields.get("b"), Some(&well_known::string()));
}

#[test]
fn conditional_type_picks_true_branch_when_extends_matches() {
    let cond = TypeInfo::ConditionalType(ConditionalTypeInfo {
        check: well_known::string(),
        extends: well_known::string(),
        true_branch: lit_num(1.0),
        false_branch: lit_num(2.0),
    })
    .rc();
    assert_eq!(crate::normalize::force(&cond), lit_num(1.0));
}

#[test]
fn conditional_type_infers_array_element_type() {
    let cond = TypeInfo::ConditionalType(ConditionalTypeInfo {
        check: TypeInfo::Array(well_known::number()).rc(),
        extends: TypeInfo::Array(TypeInfo::InferredTypeParameter("Elem".into()).rc()).rc(),
        true_branch: TypeInfo::InferredTypeParameter("Elem".into()).rc(),
        false_branch: well_known::never(),
    })
    .rc();
    assert_eq!(crate::normalize::force(&cond), well_known::number());
}

#[test]
fn conditional_type_distributes_over_union_check() {
    let cond = TypeInfo::ConditionalType(ConditionalTypeInfo {
        check: make_union(vec![well_known::string(), well_known::number()]),
        extends: well_known::string(),
        true_branch: lit_num(1.0),
        false_branch: lit_num(2.0),
    })
    .rc();
    let result = crate::normalize::force(&cond);
    assert!(is_assignable(&result, &lit_num(1.0)));
    assert!(is_assignable(&result, &lit_num(2.0)));
}

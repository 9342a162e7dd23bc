//! Union/intersection normalization and the `IsAssignable` predicate (§4.1).

use crate::model::*;
use rustc_hash::FxHashSet;
use std::rc::Rc;
use tsc_core_common::limits::MAX_ASSIGNABILITY_DEPTH;

/// Flattens and de-duplicates a union's members (§4.1 "Union flattening").
///
/// - Associativity: nested unions are flattened into their parent.
/// - `never` members are dropped.
/// - Any member being `any` collapses the whole union to `any`.
/// - Any member being `unknown` collapses the whole union to `unknown`
///   (unless `any` is also present, which wins per rule order below).
/// - Duplicate literal/primitive members (by structural equality) are
///   removed, first occurrence kept for declaration-order diagnostics.
#[must_use]
pub fn make_union(members: Vec<Ty>) -> Ty {
    let mut flat: Vec<Ty> = Vec::with_capacity(members.len());
    flatten_union_into(members, &mut flat);

    if flat.iter().any(|t| t.is_any()) {
        return well_known::any();
    }
    if flat.iter().any(|t| t.is_unknown()) {
        return well_known::unknown();
    }

    flat.retain(|t| !t.is_never());

    let mut deduped: Vec<Ty> = Vec::with_capacity(flat.len());
    for t in flat {
        if !deduped.iter().any(|existing| types_identical(existing, &t)) {
            deduped.push(t);
        }
    }

    match deduped.len() {
        0 => well_known::never(),
        1 => deduped.into_iter().next().unwrap(),
        _ => TypeInfo::Union(deduped).rc(),
    }
}

fn flatten_union_into(members: Vec<Ty>, out: &mut Vec<Ty>) {
    for m in members {
        match &*m {
            TypeInfo::Union(inner) => flatten_union_into(inner.clone(), out),
            _ => out.push(m),
        }
    }
}

/// Simplifies an intersection (§4.1 "Intersection simplification").
///
/// - `never` in any branch wins: the whole intersection is `never`.
/// - `any` in any branch wins: the whole intersection is `any`.
/// - `unknown` branches are the identity and are dropped.
/// - Two distinct primitive kinds (string/number/boolean/null/undefined/
///   symbol/bigint) conflict and collapse to `never`.
/// - Object-like branches (`Record`) are merged field-wise; a field present
///   in more than one branch with disagreeing types becomes `never`; a
///   field is optional in the merge only if optional in every branch that
///   declares it.
#[must_use]
pub fn make_intersection(members: Vec<Ty>) -> Ty {
    let mut flat = Vec::with_capacity(members.len());
    flatten_intersection_into(members, &mut flat);

    if flat.iter().any(|t| t.is_never()) {
        return well_known::never();
    }
    if flat.iter().any(|t| t.is_any()) {
        return well_known::any();
    }
    flat.retain(|t| !t.is_unknown());

    if flat.is_empty() {
        return well_known::unknown();
    }
    if flat.len() == 1 {
        return flat.into_iter().next().unwrap();
    }

    if let Some(conflict) = primitive_conflict(&flat) {
        if conflict {
            return well_known::never();
        }
    }

    if flat.iter().all(|t| object_like_fields(t).is_some()) {
        return merge_object_like(&flat);
    }

    let mut deduped: Vec<Ty> = Vec::with_capacity(flat.len());
    for t in flat {
        if !deduped.iter().any(|existing| types_identical(existing, &t)) {
            deduped.push(t);
        }
    }
    if deduped.len() == 1 {
        return deduped.into_iter().next().unwrap();
    }
    TypeInfo::Intersection(deduped).rc()
}

fn flatten_intersection_into(members: Vec<Ty>, out: &mut Vec<Ty>) {
    for m in members {
        match &*m {
            TypeInfo::Intersection(inner) => flatten_intersection_into(inner.clone(), out),
            _ => out.push(m),
        }
    }
}

fn primitive_tag(t: &TypeInfo) -> Option<&'static str> {
    match t {
        TypeInfo::StringType | TypeInfo::StringLiteral(_) => Some("string"),
        TypeInfo::Primitive(PrimitiveKind::Number) | TypeInfo::NumberLiteral(..) => Some("number"),
        TypeInfo::Primitive(PrimitiveKind::Boolean) | TypeInfo::BooleanLiteral(_) => Some("boolean"),
        TypeInfo::Null => Some("null"),
        TypeInfo::Undefined => Some("undefined"),
        TypeInfo::Symbol => Some("symbol"),
        TypeInfo::BigInt => Some("bigint"),
        _ => None,
    }
}

/// Returns `Some(true)` if two distinct primitive branches conflict.
fn primitive_conflict(members: &[Ty]) -> Option<bool> {
    let mut seen: Option<&'static str> = None;
    for m in members {
        if let Some(tag) = primitive_tag(m) {
            match seen {
                None => seen = Some(tag),
                Some(prev) if prev != tag => return Some(true),
                _ => {}
            }
        }
    }
    Some(false)
}

/// Object-like members an intersection may merge field-wise (§4.1): both
/// `Record` (structural object types) and `Interface` expose the same
/// shape — a field map plus an optional-field set — so `Interface & Record`
/// and `Interface & Interface` merge exactly like `Record & Record`.
fn object_like_fields(t: &Ty) -> Option<(&indexmap::IndexMap<String, Ty>, &indexmap::IndexSet<String>)> {
    match &**t {
        TypeInfo::Record(r) => Some((&r.fields, &r.optional)),
        TypeInfo::Interface(i) => Some((&i.members, &i.optional_members)),
        _ => None,
    }
}

fn merge_object_like(members: &[Ty]) -> Ty {
    let shapes: Vec<(&indexmap::IndexMap<String, Ty>, &indexmap::IndexSet<String>)> =
        members.iter().filter_map(object_like_fields).collect();

    let mut merged = RecordType::empty();
    let mut field_names: Vec<&String> = Vec::new();
    for (fields, _) in &shapes {
        for name in fields.keys() {
            if !field_names.contains(&name) {
                field_names.push(name);
            }
        }
    }

    for name in field_names {
        let declaring: Vec<&(&indexmap::IndexMap<String, Ty>, &indexmap::IndexSet<String>)> =
            shapes.iter().filter(|(fields, _)| fields.contains_key(name)).collect();
        let mut merged_ty: Option<Ty> = None;
        for (fields, _) in &declaring {
            let field_ty = fields[name].clone();
            merged_ty = Some(match merged_ty {
                None => field_ty,
                Some(prev) => {
                    if types_identical(&prev, &field_ty) {
                        prev
                    } else if let (Some(pt), Some(ft)) = (primitive_tag(&prev), primitive_tag(&field_ty)) {
                        if pt == ft { prev } else { well_known::never() }
                    } else {
                        well_known::never()
                    }
                }
            });
        }
        let optional_everywhere = declaring.iter().all(|(_, optional)| optional.contains(name));
        merged.fields.insert(name.clone(), merged_ty.unwrap());
        if optional_everywhere {
            merged.optional.insert(name.clone());
        }
    }

    TypeInfo::Record(merged).rc()
}

/// Structural equality used for union/intersection de-duplication; coarser
/// than `PartialEq` in that two unions with members in a different order
/// are identical (§3 "order-insensitive for equality").
#[must_use]
pub fn types_identical(a: &Ty, b: &Ty) -> bool {
    if Rc::ptr_eq(a, b) {
        return true;
    }
    match (&**a, &**b) {
        (TypeInfo::Union(xs), TypeInfo::Union(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|x| ys.iter().any(|y| types_identical(x, y)))
        }
        (TypeInfo::Intersection(xs), TypeInfo::Intersection(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|x| ys.iter().any(|y| types_identical(x, y)))
        }
        _ => a == b,
    }
}

/// `IsAssignable(expected, actual)` (§4.1): may a value typed `actual` be
/// stored in a slot typed `expected`?
#[must_use]
pub fn is_assignable(expected: &Ty, actual: &Ty) -> bool {
    let mut seen = FxHashSet::default();
    is_assignable_inner(expected, actual, &mut seen, 0)
}

type SeenPairs = FxHashSet<(usize, usize)>;

fn ptr_key(t: &Ty) -> usize {
    Rc::as_ptr(t) as *const () as usize
}

fn is_assignable_inner(expected: &Ty, actual: &Ty, seen: &mut SeenPairs, depth: u32) -> bool {
    // Every deferred type-level form (`keyof`, indexed access, mapped,
    // conditional) is forced to its concrete result before any structural
    // rule runs, per §3's "lazy until queried" lifecycle.
    let expected = force(expected);
    let actual = force(actual);

    // Coinductive cycle-breaking: if we're already in the middle of
    // checking this exact (expected, actual) pair deeper in the recursion,
    // assume it holds (matches §9's cyclic self-referential structural
    // types, e.g. `interface Node { next: Node }`).
    let key = (ptr_key(&expected), ptr_key(&actual));
    if !seen.insert(key) {
        return true;
    }
    if depth > MAX_ASSIGNABILITY_DEPTH {
        tracing::warn!("assignability recursion depth exceeded, assuming compatible");
        return true;
    }
    let result = is_assignable_uncached(&expected, &actual, seen, depth);
    seen.remove(&key);
    result
}

/// Forces deferred type-level computations — `KeyOf`, `IndexedAccess`,
/// `MappedType`, `ConditionalType` — into their concrete result. Called at
/// every point that needs to pattern-match on a type's actual shape
/// (assignability, property resolution), matching `InstantiatedGeneric`'s
/// "substitution is lazy until queried" lifecycle note (§3).
#[must_use]
pub fn force(ty: &Ty) -> Ty {
    force_depth(ty, 0)
}

fn force_depth(ty: &Ty, depth: u32) -> Ty {
    if depth > tsc_core_common::limits::MAX_GENERIC_INSTANTIATION_DEPTH {
        tracing::warn!("deferred-type forcing depth exceeded, giving up with unknown");
        return well_known::unknown();
    }
    match &**ty {
        TypeInfo::KeyOf(inner) => force_keyof(&force_depth(inner, depth + 1)),
        TypeInfo::IndexedAccess { object, index } => {
            let object = force_depth(object, depth + 1);
            let index = force_depth(index, depth + 1);
            force_indexed_access(&object, &index).unwrap_or_else(well_known::any)
        }
        TypeInfo::MappedType(m) => force_mapped(m, depth),
        TypeInfo::ConditionalType(c) => force_conditional(c, depth),
        TypeInfo::Union(members) => make_union(members.iter().map(|m| force_depth(m, depth + 1)).collect()),
        TypeInfo::Intersection(members) => make_intersection(members.iter().map(|m| force_depth(m, depth + 1)).collect()),
        _ => ty.clone(),
    }
}

/// `keyof T` (§4.2): the union of `T`'s own member names as string-literal
/// types. `keyof (A | B)` distributes as `keyof A & keyof B` (only keys
/// common to every union member are guaranteed present).
fn force_keyof(ty: &Ty) -> Ty {
    match &**ty {
        TypeInfo::Record(r) => make_union(r.fields.keys().map(|k| TypeInfo::StringLiteral(k.clone()).rc()).collect()),
        TypeInfo::Interface(i) => make_union(i.members.keys().map(|k| TypeInfo::StringLiteral(k.clone()).rc()).collect()),
        TypeInfo::Instance(class) => force_keyof_class(class),
        TypeInfo::Array(_) => make_union(vec![TypeInfo::StringLiteral("length".into()).rc(), well_known::number()]),
        TypeInfo::Union(members) => members
            .iter()
            .map(force_keyof)
            .reduce(|a, b| make_intersection(vec![a, b]))
            .unwrap_or_else(well_known::never),
        _ => well_known::never(),
    }
}

fn force_keyof_class(class: &Ty) -> Ty {
    let TypeInfo::Class(c) = &**class else {
        return well_known::never();
    };
    let mut keys: Vec<Ty> = c
        .declared_field_types
        .keys()
        .chain(c.getters.keys())
        .chain(c.setters.keys())
        .chain(c.methods.keys())
        .map(|k| TypeInfo::StringLiteral(k.clone()).rc())
        .collect();
    if let Some(sup) = &c.superclass {
        if let TypeInfo::Union(more) = &*force_keyof_class(sup) {
            keys.extend(more.iter().cloned());
        }
    }
    make_union(keys)
}

/// `T[K]` (§4.2 indexed access): looks up a field by literal name/position,
/// or distributes over a union index.
fn force_indexed_access(object: &Ty, index: &Ty) -> Option<Ty> {
    match &**index {
        TypeInfo::StringLiteral(name) => lookup_field(object, name).or_else(|| array_element(object)),
        TypeInfo::NumberLiteral(_, n) => lookup_tuple_position(object, *n as usize).or_else(|| array_element(object)),
        TypeInfo::Union(members) => {
            let mut results = Vec::with_capacity(members.len());
            for m in members {
                results.push(force_indexed_access(object, m)?);
            }
            Some(make_union(results))
        }
        TypeInfo::StringType | TypeInfo::Primitive(PrimitiveKind::Number) => array_element(object),
        _ => None,
    }
}

fn lookup_field(object: &Ty, name: &str) -> Option<Ty> {
    match &**object {
        TypeInfo::Record(r) => r.fields.get(name).cloned().or_else(|| r.string_index.clone()),
        TypeInfo::Interface(i) => i.members.get(name).cloned().or_else(|| i.string_index.clone()),
        TypeInfo::Instance(class) => lookup_class_field(class, name),
        _ => None,
    }
}

fn lookup_class_field(class: &Ty, name: &str) -> Option<Ty> {
    let TypeInfo::Class(c) = &**class else {
        return None;
    };
    c.declared_field_types
        .get(name)
        .or_else(|| c.getters.get(name))
        .cloned()
        .or_else(|| c.methods.get(name).map(|m| TypeInfo::Function(m.callable().clone()).rc()))
        .or_else(|| c.superclass.as_ref().and_then(|s| lookup_class_field(s, name)))
}

fn lookup_tuple_position(object: &Ty, index: usize) -> Option<Ty> {
    match &**object {
        TypeInfo::Tuple { elements, .. } => elements.get(index).map(|e| e.ty.clone()),
        _ => None,
    }
}

fn array_element(object: &Ty) -> Option<Ty> {
    match &**object {
        TypeInfo::Array(el) => Some(el.clone()),
        TypeInfo::Tuple { elements, rest, .. } => {
            let mut members: Vec<Ty> = elements.iter().map(|e| e.ty.clone()).collect();
            if let Some(r) = rest {
                members.push(r.clone());
            }
            Some(make_union(members))
        }
        _ => None,
    }
}

/// `{ [K in C]: V }` (§4.2 mapped types): iterates `C`'s (forced) key
/// literals, substituting each into `value` in place of the mapped
/// parameter, applying the `as` clause's key remapping and the
/// readonly/optional modifiers onto the resulting `Record`.
fn force_mapped(m: &MappedTypeInfo, depth: u32) -> Ty {
    let constraint = force_depth(&m.constraint, depth + 1);
    let keys: Vec<Ty> = match &*constraint {
        TypeInfo::Union(members) => members.clone(),
        TypeInfo::Never => Vec::new(),
        other => vec![other.clone().rc()],
    };
    let mut fields = indexmap::IndexMap::new();
    let mut optional = indexmap::IndexSet::new();
    for key in keys {
        let TypeInfo::StringLiteral(key_name) = &*key else {
            continue;
        };
        let substituted_value = force_depth(&substitute_param(&m.value, &m.param, &key), depth + 1);
        let out_key = match &m.as_clause {
            Some(as_ty) => match &*force_depth(&substitute_param(as_ty, &m.param, &key), depth + 1) {
                TypeInfo::StringLiteral(renamed) => renamed.clone(),
                _ => key_name.clone(),
            },
            None => key_name.clone(),
        };
        if matches!(m.optional_modifier, MappedModifier::Add) {
            optional.insert(out_key.clone());
        }
        fields.insert(out_key, substituted_value);
    }
    TypeInfo::Record(RecordType { fields, optional, string_index: None, number_index: None, symbol_index: None }).rc()
}

/// Rewrites every occurrence of type parameter `name` (including inside a
/// nested `IndexedAccess { object, index: TypeParameter(name) }`, the shape
/// a mapped type's value clause uses to write `T[K]`) to `with`.
fn substitute_param(ty: &Ty, name: &str, with: &Ty) -> Ty {
    match &**ty {
        TypeInfo::TypeParameter { name: n, .. } if n == name => with.clone(),
        TypeInfo::InferredTypeParameter(n) if n == name => with.clone(),
        TypeInfo::Array(el) => TypeInfo::Array(substitute_param(el, name, with)).rc(),
        TypeInfo::IndexedAccess { object, index } => {
            TypeInfo::IndexedAccess { object: substitute_param(object, name, with), index: substitute_param(index, name, with) }.rc()
        }
        TypeInfo::Union(members) => TypeInfo::Union(members.iter().map(|m| substitute_param(m, name, with)).collect()).rc(),
        TypeInfo::Intersection(members) => TypeInfo::Intersection(members.iter().map(|m| substitute_param(m, name, with)).collect()).rc(),
        TypeInfo::Promise(inner) => TypeInfo::Promise(substitute_param(inner, name, with)).rc(),
        _ => ty.clone(),
    }
}

/// `C extends E ? T : F` (§4.2, §9 "Conditional type distribution"). A
/// union check type distributes unconditionally over each member — this
/// core does not separately track whether the check position is a "naked"
/// type parameter, so it applies TypeScript's naked-union distribution rule
/// to every union check (documented choice for the open question in §9).
fn force_conditional(c: &ConditionalTypeInfo, depth: u32) -> Ty {
    let check = force_depth(&c.check, depth + 1);
    if let TypeInfo::Union(members) = &*check {
        let branches: Vec<Ty> = members
            .iter()
            .map(|m| {
                force_conditional(&ConditionalTypeInfo { check: m.clone(), extends: c.extends.clone(), true_branch: c.true_branch.clone(), false_branch: c.false_branch.clone() }, depth + 1)
            })
            .collect();
        return make_union(branches);
    }
    let extends = force_depth(&c.extends, depth + 1);
    let mut bindings: rustc_hash::FxHashMap<String, Ty> = rustc_hash::FxHashMap::default();
    if match_infer(&extends, &check, &mut bindings) {
        force_depth(&substitute_inferred(&c.true_branch, &bindings), depth + 1)
    } else {
        force_depth(&c.false_branch, depth + 1)
    }
}

/// Structurally matches `pattern` (the conditional's `extends` clause)
/// against `actual` (the forced check type), binding any `infer Name`
/// placeholders it finds along the way. Positions with no `infer` fall
/// back to a plain assignability check.
fn match_infer(pattern: &Ty, actual: &Ty, bindings: &mut rustc_hash::FxHashMap<String, Ty>) -> bool {
    match &**pattern {
        TypeInfo::InferredTypeParameter(name) => {
            bindings.entry(name.clone()).or_insert_with(|| actual.clone());
            true
        }
        TypeInfo::Array(p) => match &**actual {
            TypeInfo::Array(a) => match_infer(p, a, bindings),
            _ => is_assignable(pattern, actual),
        },
        TypeInfo::Promise(p) => match &**actual {
            TypeInfo::Promise(a) => match_infer(p, a, bindings),
            _ => is_assignable(pattern, actual),
        },
        TypeInfo::Function(pf) => match &**actual {
            TypeInfo::Function(af) if pf.params.len() == af.params.len() => {
                pf.params.iter().zip(af.params.iter()).all(|(p, a)| match_infer(p, a, bindings)) && match_infer(&pf.ret, &af.ret, bindings)
            }
            _ => is_assignable(pattern, actual),
        },
        TypeInfo::InstantiatedGeneric(pg) => match &**actual {
            TypeInfo::InstantiatedGeneric(ag) if types_identical(&pg.definition, &ag.definition) && pg.type_arguments.len() == ag.type_arguments.len() => {
                pg.type_arguments.iter().zip(ag.type_arguments.iter()).all(|(p, a)| match_infer(p, a, bindings))
            }
            _ => is_assignable(pattern, actual),
        },
        _ => is_assignable(pattern, actual),
    }
}

/// Substitutes each `InferredTypeParameter` in `ty` with its binding from
/// `match_infer`, defaulting to `unknown` for one that never got bound
/// (e.g. the `infer` only appears under a branch that didn't match).
fn substitute_inferred(ty: &Ty, bindings: &rustc_hash::FxHashMap<String, Ty>) -> Ty {
    match &**ty {
        TypeInfo::InferredTypeParameter(name) => bindings.get(name).cloned().unwrap_or_else(well_known::unknown),
        TypeInfo::Array(el) => TypeInfo::Array(substitute_inferred(el, bindings)).rc(),
        TypeInfo::Union(members) => TypeInfo::Union(members.iter().map(|m| substitute_inferred(m, bindings)).collect()).rc(),
        TypeInfo::Intersection(members) => TypeInfo::Intersection(members.iter().map(|m| substitute_inferred(m, bindings)).collect()).rc(),
        TypeInfo::Promise(inner) => TypeInfo::Promise(substitute_inferred(inner, bindings)).rc(),
        TypeInfo::Function(f) => TypeInfo::Function(FunctionType {
            params: f.params.iter().map(|p| substitute_inferred(p, bindings)).collect(),
            ret: substitute_inferred(&f.ret, bindings),
            min_arity: f.min_arity,
            has_rest: f.has_rest,
            this_type: f.this_type.clone(),
        })
        .rc(),
        _ => ty.clone(),
    }
}

fn is_assignable_uncached(expected: &Ty, actual: &Ty, seen: &mut SeenPairs, depth: u32) -> bool {
    // 1. Any on either side.
    if expected.is_any() || actual.is_any() {
        return true;
    }

    // 2. Type parameters by name; expected type-parameter with a
    // constraint recurses against the constraint.
    if let TypeInfo::TypeParameter { name: en, constraint: ec, .. } = &**expected {
        if let TypeInfo::TypeParameter { name: an, .. } = &**actual {
            if en == an {
                return true;
            }
        }
        if let Some(c) = ec {
            return is_assignable_inner(c, actual, seen, depth + 1);
        }
        return false;
    }
    if let TypeInfo::TypeParameter { constraint: Some(c), .. } = &**actual {
        return is_assignable_inner(expected, c, seen, depth + 1);
    }

    // 3. Never.
    if actual.is_never() {
        return true;
    }
    if expected.is_never() {
        return actual.is_never();
    }

    // 4. Unknown.
    if expected.is_unknown() {
        return true;
    }
    if actual.is_unknown() {
        return expected.is_unknown();
    }

    // 5. Null/undefined.
    if matches!(&**actual, TypeInfo::Null | TypeInfo::Undefined) {
        return type_contains_nullish(expected, &**actual);
    }

    // 6. Literal equality then widening.
    if let Some(r) = literal_assignability(expected, actual) {
        return r;
    }

    // 7. Union on either side.
    if let TypeInfo::Union(exp_members) = &**expected {
        if let TypeInfo::Union(act_members) = &**actual {
            return act_members.iter().all(|a| {
                exp_members.iter().any(|e| is_assignable_inner(e, a, seen, depth + 1))
            });
        }
        return exp_members.iter().any(|e| is_assignable_inner(e, actual, seen, depth + 1));
    }
    if let TypeInfo::Union(act_members) = &**actual {
        return act_members.iter().all(|a| is_assignable_inner(expected, a, seen, depth + 1));
    }

    // 8. Intersection on either side.
    if let TypeInfo::Intersection(exp_members) = &**expected {
        return exp_members.iter().all(|e| is_assignable_inner(e, actual, seen, depth + 1));
    }
    if let TypeInfo::Intersection(act_members) = &**actual {
        return act_members.iter().any(|a| is_assignable_inner(expected, a, seen, depth + 1));
    }

    // 9. Enums assignable to/from their underlying widened primitive.
    if let TypeInfo::Enum(e) = &**expected {
        return enum_accepts(e, actual);
    }
    if let TypeInfo::Enum(e) = &**actual {
        return enum_widens_to(e, expected);
    }

    match (&**expected, &**actual) {
        // 10. Classes: nominal, walk superclass chain.
        (TypeInfo::Instance(ec), TypeInfo::Instance(ac)) => class_is_subtype(ac, ec, seen, depth),

        // 11. Interfaces: structural against the actual's members.
        (TypeInfo::Interface(i), _) => interface_structural_match(i, actual, seen, depth),

        // 12. InstantiatedGeneric: same definition, recursively assignable args.
        (TypeInfo::InstantiatedGeneric(e), TypeInfo::InstantiatedGeneric(a)) => {
            types_identical(&e.definition, &a.definition)
                && e.type_arguments.len() == a.type_arguments.len()
                && e.type_arguments
                    .iter()
                    .zip(a.type_arguments.iter())
                    .all(|(et, at)| is_assignable_inner(et, at, seen, depth + 1))
        }

        // 13. Arrays: covariant (TypeScript's unsound rule).
        (TypeInfo::Array(e), TypeInfo::Array(a)) => is_assignable_inner(e, a, seen, depth + 1),

        // 14. Tuples.
        (
            TypeInfo::Tuple { elements: ee, required_count: erc, rest: er },
            TypeInfo::Tuple { elements: ae, required_count: arc, rest: ar },
        ) => tuple_assignable(ee, *erc, er, ae, *arc, ar, seen, depth),
        (TypeInfo::Array(e), TypeInfo::Tuple { elements: ae, .. }) => {
            ae.iter().all(|el| is_assignable_inner(e, &el.ty, seen, depth + 1))
        }

        // 15. Function: contravariant params, covariant return.
        (TypeInfo::Function(e), TypeInfo::Function(a)) => function_assignable(e, a, seen, depth),
        (TypeInfo::Function(e), _) => {
            if let Some(a) = callable_signature(actual) {
                function_assignable(e, &a, seen, depth)
            } else {
                false
            }
        }

        (TypeInfo::Record(e), _) => record_structural_match(e, actual, seen, depth),

        (TypeInfo::Promise(e), TypeInfo::Promise(a)) => is_assignable_inner(e, a, seen, depth + 1),
        (TypeInfo::Map(ek, ev), TypeInfo::Map(ak, av)) => {
            is_assignable_inner(ek, ak, seen, depth + 1) && is_assignable_inner(ev, av, seen, depth + 1)
        }
        (TypeInfo::Set(e), TypeInfo::Set(a)) => is_assignable_inner(e, a, seen, depth + 1),

        _ => expected == actual,
    }
}

fn type_contains_nullish(expected: &Ty, which: &TypeInfo) -> bool {
    match &**expected {
        TypeInfo::Null => matches!(which, TypeInfo::Null),
        TypeInfo::Undefined => matches!(which, TypeInfo::Undefined),
        TypeInfo::Void => matches!(which, TypeInfo::Undefined),
        TypeInfo::Union(members) => members.iter().any(|m| type_contains_nullish(m, which)),
        _ => false,
    }
}

fn literal_assignability(expected: &Ty, actual: &Ty) -> Option<bool> {
    match (&**expected, &**actual) {
        (TypeInfo::StringLiteral(a), TypeInfo::StringLiteral(b)) => Some(a == b),
        (TypeInfo::NumberLiteral(_, a), TypeInfo::NumberLiteral(_, b)) => Some(a == b),
        (TypeInfo::BooleanLiteral(a), TypeInfo::BooleanLiteral(b)) => Some(a == b),
        (TypeInfo::StringType, TypeInfo::StringLiteral(_)) => Some(true),
        (TypeInfo::Primitive(PrimitiveKind::Number), TypeInfo::NumberLiteral(..)) => Some(true),
        (TypeInfo::Primitive(PrimitiveKind::Boolean), TypeInfo::BooleanLiteral(_)) => Some(true),
        (TypeInfo::StringLiteral(_), TypeInfo::StringType)
        | (TypeInfo::NumberLiteral(..), TypeInfo::Primitive(PrimitiveKind::Number))
        | (TypeInfo::BooleanLiteral(_), TypeInfo::Primitive(PrimitiveKind::Boolean)) => Some(false),
        _ => None,
    }
}

fn enum_accepts(e: &EnumType, actual: &TypeInfo) -> bool {
    match e.kind {
        EnumKind::Numeric => matches!(actual, TypeInfo::Primitive(PrimitiveKind::Number) | TypeInfo::NumberLiteral(..)),
        EnumKind::String => matches!(actual, TypeInfo::StringType | TypeInfo::StringLiteral(_)),
        EnumKind::Heterogeneous => matches!(
            actual,
            TypeInfo::Primitive(PrimitiveKind::Number)
                | TypeInfo::NumberLiteral(..)
                | TypeInfo::StringType
                | TypeInfo::StringLiteral(_)
        ),
    }
}

fn enum_widens_to(e: &EnumType, expected: &Ty) -> bool {
    match e.kind {
        EnumKind::Numeric => matches!(&**expected, TypeInfo::Primitive(PrimitiveKind::Number)),
        EnumKind::String => matches!(&**expected, TypeInfo::StringType),
        EnumKind::Heterogeneous => {
            matches!(&**expected, TypeInfo::Primitive(PrimitiveKind::Number) | TypeInfo::StringType)
        }
    }
}

fn class_is_subtype(actual_class: &Ty, expected_class: &Ty, seen: &mut SeenPairs, depth: u32) -> bool {
    if types_identical(actual_class, expected_class) {
        return true;
    }
    if let TypeInfo::Class(c) = &**actual_class {
        if let Some(sup) = &c.superclass {
            return class_is_subtype(sup, expected_class, seen, depth + 1);
        }
    }
    false
}

fn interface_structural_match(iface: &InterfaceType, actual: &Ty, seen: &mut SeenPairs, depth: u32) -> bool {
    for (name, member_ty) in &iface.members {
        let optional = iface.optional_members.contains(name);
        match lookup_member(actual, name) {
            Some(actual_ty) => {
                if !is_assignable_inner(member_ty, &actual_ty, seen, depth + 1) {
                    return false;
                }
            }
            None => {
                if !optional {
                    return false;
                }
            }
        }
    }
    true
}

fn record_structural_match(record: &RecordType, actual: &Ty, seen: &mut SeenPairs, depth: u32) -> bool {
    for (name, member_ty) in &record.fields {
        let optional = record.is_optional(name);
        match lookup_member(actual, name) {
            Some(actual_ty) => {
                if !is_assignable_inner(member_ty, &actual_ty, seen, depth + 1) {
                    return false;
                }
            }
            None => {
                if !optional {
                    return false;
                }
            }
        }
    }
    true
}

/// Looks up a named member's type on any structural/nominal shape that
/// exposes members: records, interfaces, classes (incl. their instances).
fn lookup_member(ty: &Ty, name: &str) -> Option<Ty> {
    match &**ty {
        TypeInfo::Record(r) => r.fields.get(name).cloned(),
        TypeInfo::Interface(i) => i.members.get(name).cloned(),
        TypeInfo::Instance(c) => lookup_member(c, name),
        TypeInfo::Class(c) => c
            .declared_field_types
            .get(name)
            .cloned()
            .or_else(|| c.getters.get(name).cloned())
            .or_else(|| c.methods.get(name).map(|m| m.callable()).map(|f| TypeInfo::Function(f.clone()).rc()))
            .or_else(|| c.superclass.as_ref().and_then(|s| lookup_member(s, name))),
        _ => None,
    }
}

fn callable_signature(ty: &Ty) -> Option<FunctionType> {
    match &**ty {
        TypeInfo::Function(f) => Some(f.clone()),
        TypeInfo::OverloadedFunction(o) => Some(o.implementation.clone()),
        TypeInfo::Interface(i) => i.call_signatures.first().cloned(),
        _ => None,
    }
}

fn function_assignable(expected: &FunctionType, actual: &FunctionType, seen: &mut SeenPairs, depth: u32) -> bool {
    // Actual may take fewer parameters than expected provides arguments for.
    if actual.params.len() > expected.params.len() && !actual.has_rest {
        return false;
    }
    for (i, actual_param) in actual.params.iter().enumerate() {
        if let Some(expected_param) = expected.params.get(i) {
            // Contravariant: expected's param type must be assignable to actual's param type.
            if !is_assignable_inner(actual_param, expected_param, seen, depth + 1) {
                return false;
            }
        }
    }
    // Covariant return.
    is_assignable_inner(&expected.ret, &actual.ret, seen, depth + 1)
}

#[allow(clippy::too_many_arguments)]
fn tuple_assignable(
    expected_elements: &[TupleElement],
    expected_required: usize,
    expected_rest: &Option<Ty>,
    actual_elements: &[TupleElement],
    actual_required: usize,
    actual_rest: &Option<Ty>,
    seen: &mut SeenPairs,
    depth: u32,
) -> bool {
    if actual_required < expected_required {
        return false;
    }
    for (i, expected_el) in expected_elements.iter().enumerate() {
        match actual_elements.get(i) {
            Some(actual_el) => {
                if !is_assignable_inner(&expected_el.ty, &actual_el.ty, seen, depth + 1) {
                    return false;
                }
            }
            None => {
                if expected_el.kind == TupleElementKind::Required {
                    return false;
                }
            }
        }
    }
    if let Some(rest) = expected_rest {
        for actual_el in actual_elements.iter().skip(expected_elements.len()) {
            if !is_assignable_inner(rest, &actual_el.ty, seen, depth + 1) {
                return false;
            }
        }
        if let Some(actual_rest_ty) = actual_rest {
            if !is_assignable_inner(rest, actual_rest_ty, seen, depth + 1) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
#[path = "../tests/normalize_tests.rs"]
mod normalize_tests;

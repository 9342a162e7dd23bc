//! Property resolution (§4.3, §4.6): `obj.name` / `obj["name"]` member
//! lookup across every shape that carries members — records, interfaces,
//! classes and their instances, enums, namespaces — plus the built-in
//! receivers in `builtins.rs`. Used both by the checker (to type the
//! access and enforce accessibility) and, via `MemberResolution`, by the
//! lowering dispatcher to decide direct vs. dynamic dispatch (§4.6).
use crate::builtins::builtin_member;
use crate::context::Checker;
use crate::error::CheckResult;
use tsc_core_common::diagnostics::{diagnostic_codes, ErrorKind};
use tsc_core_common::Span;
use tsc_core_types::model::*;

/// Whether a resolved member can be emitted as a direct field/method
/// reference (known nominal shape) or must fall back to a dynamic,
/// runtime-checked lookup (§4.6 "Property dispatch").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    Direct,
    Dynamic,
}

pub struct MemberResolution {
    pub ty: Ty,
    pub dispatch: DispatchKind,
    pub is_private: bool,
}

/// Resolves `receiver.name`, reporting an `ErrorKind::Type` "unknown
/// property" diagnostic if no shape recognizes it. `receiver` must already
/// be narrowed/widened as appropriate by the caller.
pub fn resolve_member(ck: &Checker, receiver: &Ty, name: &str, span: Span) -> CheckResult<MemberResolution> {
    // Forces `keyof`/indexed-access/mapped/conditional receivers to their
    // concrete shape before any structural lookup runs.
    let receiver = &tsc_core_types::normalize::force(receiver);
    if receiver.is_any() {
        return Ok(MemberResolution { ty: well_known::any(), dispatch: DispatchKind::Dynamic, is_private: false });
    }
    if let Some(found) = lookup_structural(receiver, name) {
        return Ok(found);
    }
    if let Some(ty) = builtin_member(receiver, name) {
        return Ok(MemberResolution { ty, dispatch: DispatchKind::Dynamic, is_private: false });
    }
    if let TypeInfo::Union(members) = &**receiver {
        let mut found = Vec::with_capacity(members.len());
        for m in members {
            match resolve_member(ck, m, name, span) {
                Ok(r) => found.push(r.ty),
                Err(e) => return Err(e),
            }
        }
        return Ok(MemberResolution {
            ty: tsc_core_types::normalize::make_union(found),
            dispatch: DispatchKind::Dynamic,
            is_private: false,
        });
    }
    ck.error(
        ErrorKind::Type,
        diagnostic_codes::UNKNOWN_PROPERTY,
        format!("Property '{name}' does not exist on type '{receiver}'."),
        span,
    )
}

fn lookup_structural(ty: &Ty, name: &str) -> Option<MemberResolution> {
    match &**ty {
        TypeInfo::Record(r) => r.fields.get(name).cloned().map(|t| MemberResolution { ty: t, dispatch: DispatchKind::Dynamic, is_private: false }),
        TypeInfo::Interface(i) => i
            .members
            .get(name)
            .cloned()
            .map(|t| MemberResolution { ty: t, dispatch: DispatchKind::Dynamic, is_private: false })
            .or_else(|| i.string_index.clone().map(|t| MemberResolution { ty: t, dispatch: DispatchKind::Dynamic, is_private: false })),
        TypeInfo::Instance(class) => lookup_instance_member(class, name),
        TypeInfo::Class(c) => c
            .static_properties
            .get(name)
            .cloned()
            .or_else(|| c.static_methods.get(name).map(|m| TypeInfo::Function(m.callable().clone()).rc()))
            .map(|t| MemberResolution { ty: t, dispatch: DispatchKind::Direct, is_private: false }),
        TypeInfo::Namespace(ns) => ns
            .values
            .get(name)
            .cloned()
            .or_else(|| ns.types.get(name).cloned())
            .map(|t| MemberResolution { ty: t, dispatch: DispatchKind::Direct, is_private: false }),
        TypeInfo::Enum(e) => {
            if e.members.contains_key(name) {
                Some(MemberResolution { ty: ty.clone(), dispatch: DispatchKind::Direct, is_private: false })
            } else {
                None
            }
        }
        TypeInfo::InstantiatedGeneric(g) => lookup_structural(&g.definition, name),
        // `A & B`: the field may be declared on either branch (§4.1 "object-
        // like members are merged with field-wise intersection") — try each
        // member in order rather than requiring `make_intersection` to have
        // pre-merged them, since an intersection can also appear already
        // constructed from non-object-like branches it couldn't flatten.
        TypeInfo::Intersection(members) => members.iter().find_map(|m| lookup_structural(m, name)),
        _ => None,
    }
}

/// Walks `Instance(Class)` up the superclass chain (§4.6 "If it is an
/// `Instance(C)` and `C` declares the member, emit direct dispatch").
fn lookup_instance_member(class: &Ty, name: &str) -> Option<MemberResolution> {
    let TypeInfo::Class(c) = &**class else {
        if let TypeInfo::MutableClass(_) = &**class {
            return Some(MemberResolution { ty: well_known::any(), dispatch: DispatchKind::Dynamic, is_private: false });
        }
        return None;
    };
    if let Some(t) = c.declared_field_types.get(name) {
        return Some(MemberResolution { ty: t.clone(), dispatch: DispatchKind::Direct, is_private: c.field_access.get(name) == Some(&Visibility::Private) });
    }
    if let Some(t) = c.getters.get(name) {
        return Some(MemberResolution { ty: t.clone(), dispatch: DispatchKind::Direct, is_private: false });
    }
    if let Some(m) = c.methods.get(name) {
        return Some(MemberResolution {
            ty: TypeInfo::Function(m.callable().clone()).rc(),
            dispatch: DispatchKind::Direct,
            is_private: c.method_access.get(name) == Some(&Visibility::Private),
        });
    }
    c.superclass.as_ref().and_then(|s| lookup_instance_member(s, name))
}

/// Checks that `receiver.name` (already resolved on a class instance) is
/// visible from the current access site, per §4.1's accessibility rules:
/// `private` only from within the declaring class's own methods, `protected`
/// additionally from subclasses.
pub fn check_accessibility(ck: &Checker, owner_class_name: &str, visibility: Visibility, name: &str, span: Span) -> CheckResult<()> {
    if visibility == Visibility::Public {
        return Ok(());
    }
    let in_class = ck.current_class().map(|c| class_name(&c.this_type));
    match in_class {
        Some(Some(current)) if current == owner_class_name => Ok(()),
        Some(Some(_)) if visibility == Visibility::Protected => Ok(()),
        _ => ck.error(
            ErrorKind::Type,
            diagnostic_codes::UNKNOWN_PROPERTY,
            format!("Property '{name}' is {} and only accessible within its class.", if visibility == Visibility::Private { "private" } else { "protected" }),
            span,
        ),
    }
}

fn class_name(this_type: &Ty) -> Option<String> {
    match &**this_type {
        TypeInfo::Instance(c) => class_name(c),
        TypeInfo::Class(c) => Some(c.name.clone()),
        TypeInfo::MutableClass(c) => Some(c.name.clone()),
        _ => None,
    }
}

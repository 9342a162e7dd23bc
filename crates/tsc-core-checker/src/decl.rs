//! Top-level declaration checking (§4.3): functions (including overload
//! grouping), classes, interfaces, type aliases, enums, and namespaces.
//!
//! Function and class declarations are hoisted within the block they
//! appear in, so sibling declarations (and a class's own self-referential
//! members) can see each other regardless of source order; the other kinds
//! are resolved in a single pass as `check_decl` reaches them.

use crate::classes;
use crate::context::Checker;
use crate::enums;
use crate::error::CheckResult;
use crate::expr::{build_function_type, check_expr_contextual, check_function_body};
use tsc_core_ast::*;
use tsc_core_types::env::ScopeKind;
use tsc_core_types::model::*;

/// Hoists every function-overload group and class declared directly in
/// `stmts` (not inside nested blocks) so the sequential `check_decl` pass
/// that follows sees every sibling name already bound.
pub fn predeclare_decls(ck: &mut Checker, stmts: &[Stmt]) {
    let class_decls: Vec<&ClassDecl> = stmts
        .iter()
        .filter_map(|s| match &s.kind {
            StmtKind::Decl(d) => match &d.kind {
                DeclKind::Class(c) => Some(c),
                _ => None,
            },
            _ => None,
        })
        .collect();
    classes::predeclare_classes(ck, &class_decls);

    let mut i = 0;
    while i < stmts.len() {
        let StmtKind::Decl(d) = &stmts[i].kind else {
            i += 1;
            continue;
        };
        let DeclKind::Function(f) = &d.kind else {
            i += 1;
            continue;
        };
        let mut group = vec![f];
        let mut j = i + 1;
        while let Some(next) = stmts.get(j) {
            let StmtKind::Decl(next_decl) = &next.kind else { break };
            let DeclKind::Function(nf) = &next_decl.kind else { break };
            if nf.name.name != f.name.name {
                break;
            }
            group.push(nf);
            j += 1;
        }
        if let Ok(ty) = build_function_group_signature(ck, &group) {
            ck.env.declare_variable(f.name.name.clone(), ty, false);
        }
        i = j;
    }
}

fn build_function_group_signature(ck: &mut Checker, group: &[&FunctionDecl]) -> CheckResult<Ty> {
    let mut sigs = Vec::with_capacity(group.len());
    let mut implementation_type_params = Vec::new();
    for f in group {
        ck.env.push_scope(ScopeKind::Function);
        let result = build_function_type(ck, &f.type_params, &f.params, &f.return_type);
        ck.env.pop_scope();
        let (sig, type_params) = result?;
        if f.body.is_some() {
            implementation_type_params = type_params;
        }
        sigs.push(sig);
    }

    if sigs.len() == 1 {
        let sig = sigs.into_iter().next().expect("non-empty group");
        return Ok(if implementation_type_params.is_empty() {
            TypeInfo::Function(sig).rc()
        } else {
            TypeInfo::GenericFunction(GenericFunction {
                type_params: implementation_type_params,
                params: sig.params,
                ret: sig.ret,
                min_arity: sig.min_arity,
                has_rest: sig.has_rest,
                this_type: None,
            })
            .rc()
        });
    }

    let implementation = sigs.last().cloned().expect("non-empty overload group");
    Ok(if implementation_type_params.is_empty() {
        TypeInfo::OverloadedFunction(OverloadedFunction { signatures: sigs, implementation }).rc()
    } else {
        TypeInfo::GenericOverloadedFunction(GenericOverloadedFunction { type_params: implementation_type_params, signatures: sigs, implementation }).rc()
    })
}

pub fn check_decl(ck: &mut Checker, decl: &Decl) -> CheckResult<()> {
    match &decl.kind {
        DeclKind::Function(f) => {
            if f.body.is_some() {
                check_function_decl_body(ck, f)?;
            }
            Ok(())
        }
        DeclKind::Class(c) => {
            let frozen = classes::check_class_decl(ck, c, decl.span)?;
            ck.record_type(decl.id, frozen.clone());
            check_class_member_bodies(ck, c, &frozen)
        }
        DeclKind::Interface(iface) => {
            let ty = build_interface_type(ck, iface)?;
            ck.env.declare_type_alias(iface.name.name.clone(), ty);
            Ok(())
        }
        DeclKind::TypeAlias(alias) => check_type_alias_decl(ck, alias),
        DeclKind::Enum(e) => {
            let ty = enums::check_enum_decl(ck, e)?;
            ck.env.declare_type_alias(e.name.name.clone(), ty.clone());
            ck.env.declare_variable(e.name.name.clone(), ty, true);
            Ok(())
        }
        DeclKind::Namespace(ns) => check_namespace_decl(ck, ns),
    }
}

/// Re-resolves a function declaration's own signature (cheap; no more than
/// name lookups) and checks its body. The signature declared for the name
/// itself was already installed by [`predeclare_decls`] — possibly as part
/// of an overload group — so this only needs the implementation's own
/// shape to type the body.
fn check_function_decl_body(ck: &mut Checker, f: &FunctionDecl) -> CheckResult<()> {
    ck.env.push_scope(ScopeKind::Function);
    let result = build_function_type(ck, &f.type_params, &f.params, &f.return_type);
    let body_result = result.and_then(|(sig, _)| check_function_body(ck, &f.params, &f.body, &sig, f.is_async, f.is_generator));
    ck.env.pop_scope();
    body_result
}

/// `classes::check_class_decl` only builds member *signatures* (§4.3's
/// passes 2-3); method/constructor bodies, field initializers, and static
/// blocks are checked here, once the class's frozen type (and therefore
/// `this`) is known.
fn check_class_member_bodies(ck: &mut Checker, decl: &ClassDecl, frozen: &Ty) -> CheckResult<()> {
    for member in &decl.members {
        match member {
            ClassMember::Method(m) | ClassMember::Constructor(m) => {
                if m.body.is_none() {
                    continue;
                }
                ck.push_class(classes::class_context_for(frozen, m.is_static));
                ck.env.push_scope(ScopeKind::Function);
                let result = build_function_type(ck, &m.type_params, &m.params, &m.return_type)
                    .and_then(|(sig, _)| check_function_body(ck, &m.params, &m.body, &sig, m.is_async, m.is_generator));
                ck.env.pop_scope();
                ck.pop_class();
                result?;
            }
            ClassMember::Field(field) => {
                if let Some(init) = &field.initializer {
                    ck.push_class(classes::class_context_for(frozen, field.is_static));
                    let declared = ck.resolve_type_opt(&field.type_ann)?;
                    let result = check_expr_contextual(ck, init, declared.as_ref());
                    ck.pop_class();
                    result?;
                }
            }
            ClassMember::StaticBlock(stmts) => {
                ck.push_class(classes::class_context_for(frozen, true));
                ck.env.push_scope(ScopeKind::Block);
                let result = crate::stmt::check_block(ck, stmts);
                ck.env.pop_scope();
                ck.pop_class();
                result?;
            }
            ClassMember::IndexSignature { .. } => {}
        }
    }
    Ok(())
}

fn build_interface_type(ck: &mut Checker, iface: &InterfaceDecl) -> CheckResult<Ty> {
    ck.env.push_scope(ScopeKind::Function);
    let mut type_param_decls = Vec::with_capacity(iface.type_params.len());
    for tp in &iface.type_params {
        let constraint = ck.resolve_type_opt(&tp.constraint)?;
        let default = ck.resolve_type_opt(&tp.default)?;
        ck.env.declare_type_parameter(tp.name.clone(), TypeInfo::TypeParameter { name: tp.name.clone(), constraint: constraint.clone(), default: default.clone() }.rc());
        type_param_decls.push(TypeParamDecl { name: tp.name.clone(), constraint, default });
    }

    let result = build_interface_body(ck, iface);
    ck.env.pop_scope();
    let (members, optional_members, string_index, number_index, symbol_index, call_signatures) = result?;

    let interface = InterfaceType { name: iface.name.name.clone(), members, optional_members, string_index, number_index, symbol_index, call_signatures };
    Ok(if type_param_decls.is_empty() {
        TypeInfo::Interface(interface).rc()
    } else {
        TypeInfo::GenericInterface(GenericInterfaceType { interface, type_params: type_param_decls }).rc()
    })
}

#[allow(clippy::type_complexity)]
fn build_interface_body(
    ck: &mut Checker,
    iface: &InterfaceDecl,
) -> CheckResult<(indexmap::IndexMap<String, Ty>, indexmap::IndexSet<String>, Option<Ty>, Option<Ty>, Option<Ty>, Vec<FunctionType>)> {
    let mut members = indexmap::IndexMap::new();
    let mut optional_members = indexmap::IndexSet::new();
    let mut string_index = None;
    let mut number_index = None;
    let mut symbol_index = None;
    let mut call_signatures = Vec::new();

    for ann in &iface.extends {
        let base = ck.resolve_type(&ann.text, ann.span)?;
        merge_interface_base(&base, &mut members, &mut optional_members, &mut string_index, &mut number_index, &mut symbol_index);
    }

    for member in &iface.members {
        match member {
            InterfaceMember::Property { name, type_ann, optional, .. } => {
                let ty = ck.resolve_type(&type_ann.text, type_ann.span)?;
                members.insert(name.clone(), ty);
                if *optional {
                    optional_members.insert(name.clone());
                }
            }
            InterfaceMember::Method { name, params, return_type, optional, .. } => {
                let (sig, _) = build_function_type(ck, &[], params, return_type)?;
                members.insert(name.clone(), TypeInfo::Function(sig).rc());
                if *optional {
                    optional_members.insert(name.clone());
                }
            }
            InterfaceMember::CallSignature { params, return_type, .. } => {
                let (sig, _) = build_function_type(ck, &[], params, return_type)?;
                call_signatures.push(sig);
            }
            InterfaceMember::IndexSignature { key_type, value_type } => {
                let ty = ck.resolve_type(&value_type.text, value_type.span)?;
                match key_type {
                    IndexKeyType::String => string_index = Some(ty),
                    IndexKeyType::Number => number_index = Some(ty),
                    IndexKeyType::Symbol => symbol_index = Some(ty),
                }
            }
        }
    }

    Ok((members, optional_members, string_index, number_index, symbol_index, call_signatures))
}

/// Flattens an `extends` base's own members/indices into the derived
/// interface being built (§4.3 "Interface extension is structural
/// flattening, not a superclass link").
fn merge_interface_base(
    base: &Ty,
    members: &mut indexmap::IndexMap<String, Ty>,
    optional_members: &mut indexmap::IndexSet<String>,
    string_index: &mut Option<Ty>,
    number_index: &mut Option<Ty>,
    symbol_index: &mut Option<Ty>,
) {
    if let TypeInfo::Interface(i) = &**base {
        for (name, ty) in &i.members {
            members.insert(name.clone(), ty.clone());
        }
        for name in &i.optional_members {
            optional_members.insert(name.clone());
        }
        if string_index.is_none() {
            *string_index = i.string_index.clone();
        }
        if number_index.is_none() {
            *number_index = i.number_index.clone();
        }
        if symbol_index.is_none() {
            *symbol_index = i.symbol_index.clone();
        }
    }
}

/// A self-referential alias body (`type Tree = { value: number; children:
/// Tree[] }`) resolves its own name, mid-parse, to a `RecursiveTypeAlias`
/// placeholder forward-declared before the body is parsed — mirroring the
/// `MutableClass` placeholder classes use for the same reason (§9 "Cyclic
/// class references"). Unlike classes, the placeholder is never re-visited
/// once substituted into the resolved type: nested occurrences compare by
/// alias name (`TypeInfo`'s derived `PartialEq`) rather than expanding, so
/// recursive aliases are structurally opaque past their first level.
///
/// Re-entering the alias currently being declared is tracked on an explicit
/// expansion stack (§4.2) so pathologically deep alias nesting is rejected
/// rather than recursing unboundedly, and the resolved body is checked for
/// *direct* structural self-reference — a union/intersection whose every
/// branch is the placeholder, or the placeholder itself — which §4.2 calls
/// out as a fatal error distinct from legal indirection through a `Record`/
/// `Array`/`Tuple`/`Function`/`Interface`/`Instance` shape.
fn check_type_alias_decl(ck: &mut Checker, alias: &TypeAliasDecl) -> CheckResult<()> {
    let name = alias.name.name.clone();
    ck.enter_type_alias(name.clone(), alias.type_ann.span)?;
    ck.env.push_scope(ScopeKind::Function);
    let result = check_type_alias_body(ck, alias, &name);
    ck.env.pop_scope();
    ck.leave_type_alias();
    let resolved = result?;

    if is_direct_self_reference(&resolved, &name) {
        return ck.error(
            tsc_core_common::diagnostics::ErrorKind::Structural,
            tsc_core_common::diagnostics::diagnostic_codes::CIRCULAR_TYPE_ALIAS,
            format!("Type alias '{name}' circularly references itself with no indirection."),
            alias.type_ann.span,
        );
    }

    ck.env.declare_type_alias(name, resolved);
    Ok(())
}

fn check_type_alias_body(ck: &mut Checker, alias: &TypeAliasDecl, name: &str) -> CheckResult<Ty> {
    for tp in &alias.type_params {
        let constraint = ck.resolve_type_opt(&tp.constraint)?;
        let default = ck.resolve_type_opt(&tp.default)?;
        ck.env.declare_type_parameter(tp.name.clone(), TypeInfo::TypeParameter { name: tp.name.clone(), constraint, default }.rc());
    }
    ck.env.declare_type_alias(name.to_string(), TypeInfo::RecursiveTypeAlias(name.to_string()).rc());
    ck.resolve_type(&alias.type_ann.text, alias.type_ann.span)
}

/// `true` iff `ty` is nothing but re-entrant references to the alias named
/// `name` — `type A = A;`, or a union/intersection of only such references
/// (`type A = A | A;`) — with no indirection through any other shape.
fn is_direct_self_reference(ty: &Ty, name: &str) -> bool {
    match &**ty {
        TypeInfo::RecursiveTypeAlias(n) => n == name,
        TypeInfo::Union(members) | TypeInfo::Intersection(members) => !members.is_empty() && members.iter().all(|m| is_direct_self_reference(m, name)),
        _ => false,
    }
}

fn check_namespace_decl(ck: &mut Checker, ns: &NamespaceDecl) -> CheckResult<()> {
    ck.env.push_scope(ScopeKind::Namespace);
    predeclare_decls(ck, &ns.body);
    let result = crate::stmt::check_block(ck, &ns.body);
    let (types, values) = ck.env.snapshot_innermost();
    ck.env.pop_scope();
    result?;

    let ns_ty = TypeInfo::Namespace(NamespaceType { name: ns.name.clone(), types: types.into_iter().collect(), values: values.into_iter().collect() }).rc();
    ck.env.declare_namespace(ns.name.clone(), ns_ty);
    Ok(())
}

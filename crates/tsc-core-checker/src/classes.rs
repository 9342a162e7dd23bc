//! Class checking (§4.3 "Classes"): the three-pass protocol — collect
//! `MutableClass` placeholders, build member signatures, then freeze and
//! validate interface/abstract compliance before checking method bodies.

use crate::context::{Checker, ClassContext};
use crate::error::CheckResult;
use tsc_core_ast::{ClassDecl, ClassMember, MethodKind, MethodMember};
use tsc_core_common::diagnostics::{diagnostic_codes, ErrorKind};
use tsc_core_common::Span;
use tsc_core_types::model::*;
use tsc_core_types::normalize::is_assignable;

/// Pass 1: declares every class in `decls` as a `MutableClass` placeholder
/// in the current scope, so sibling classes and self-referential members
/// can resolve the name before the class body is checked (§9 "Cyclic class
/// references").
pub fn predeclare_classes(ck: &mut Checker, decls: &[&ClassDecl]) {
    for decl in decls {
        let Some(name) = &decl.name else { continue };
        let placeholder = TypeInfo::MutableClass(MutableClassType { name: name.name.clone() }).rc();
        ck.env.declare_type_alias(name.name.clone(), placeholder);
    }
}

/// Passes 2-3 for a single class: build its member tables, freeze into
/// `Class`, re-bind the name over the placeholder, validate interface and
/// abstract-member compliance, then check every method body.
pub fn check_class_decl(ck: &mut Checker, decl: &ClassDecl, span: Span) -> CheckResult<Ty> {
    let name = decl.name.as_ref().map(|i| i.name.clone()).unwrap_or_else(|| "<anonymous>".to_string());

    let superclass = match &decl.superclass {
        Some(ann) => Some(ck.resolve_type(&ann.text, ann.span)?),
        None => None,
    };

    let mut class = ClassType {
        name: name.clone(),
        superclass: superclass.clone(),
        methods: indexmap::IndexMap::new(),
        static_methods: indexmap::IndexMap::new(),
        static_properties: indexmap::IndexMap::new(),
        method_access: indexmap::IndexMap::new(),
        field_access: indexmap::IndexMap::new(),
        readonly_fields: indexmap::IndexSet::new(),
        getters: indexmap::IndexMap::new(),
        setters: indexmap::IndexMap::new(),
        declared_field_types: indexmap::IndexMap::new(),
        is_abstract: decl.is_abstract,
        abstract_methods: indexmap::IndexSet::new(),
        abstract_getters: indexmap::IndexSet::new(),
        abstract_setters: indexmap::IndexSet::new(),
    };

    // Pass 2: build member signatures, grouping overload sibling
    // signatures (body: None) under the implementation (body: Some).
    let mut pending_overloads: indexmap::IndexMap<String, Vec<FunctionType>> = indexmap::IndexMap::new();

    for member in &decl.members {
        match member {
            ClassMember::Field(field) => {
                let declared = match &field.type_ann {
                    Some(ann) => ck.resolve_type(&ann.text, ann.span)?,
                    None => well_known::any(),
                };
                let access = if field.is_private { Visibility::Private } else { visibility_of(field.access) };
                if field.is_static {
                    class.static_properties.insert(field.name.clone(), declared);
                } else {
                    class.declared_field_types.insert(field.name.clone(), declared);
                    class.field_access.insert(field.name.clone(), access);
                    if field.is_readonly {
                        class.readonly_fields.insert(field.name.clone());
                    }
                }
            }
            ClassMember::Method(method) | ClassMember::Constructor(method) => {
                build_method_signature(ck, &mut class, method, &mut pending_overloads, span)?;
            }
            ClassMember::StaticBlock(_) => {
                // Static initializer bodies run outside any member's own
                // scope; this core type-checks them for side effects only
                // when the statement checker is wired in by the caller.
            }
            ClassMember::IndexSignature { .. } => {
                // Index signatures on classes are rare enough in the
                // source material that this core does not model them on
                // `ClassType` (no such field exists); structural lookups
                // instead fall through to `Any` via the catch-all below.
            }
        }
    }

    for (name, sigs) in pending_overloads {
        if sigs.len() == 1 {
            class.methods.insert(name, MethodSignature::Plain(sigs.into_iter().next().unwrap()));
        } else {
            let implementation = sigs.last().cloned().expect("non-empty overload group");
            class.methods.insert(name, MethodSignature::Overloaded(OverloadedFunction { signatures: sigs, implementation }));
        }
    }

    // Pass 3: freeze, re-bind over the MutableClass placeholder.
    let frozen = TypeInfo::Class(class.clone()).rc();
    ck.env.declare_type_alias(name.clone(), frozen.clone());

    validate_interface_implementation(ck, &class, decl, span)?;
    validate_abstract_implementation(ck, &frozen, span)?;

    Ok(frozen)
}

fn visibility_of(access: tsc_core_ast::AccessModifier) -> Visibility {
    match access {
        tsc_core_ast::AccessModifier::Public => Visibility::Public,
        tsc_core_ast::AccessModifier::Protected => Visibility::Protected,
        tsc_core_ast::AccessModifier::Private => Visibility::Private,
    }
}

fn build_method_signature(
    ck: &Checker,
    class: &mut ClassType,
    method: &MethodMember,
    pending_overloads: &mut indexmap::IndexMap<String, Vec<FunctionType>>,
    span: Span,
) -> CheckResult<()> {
    let mut params = Vec::with_capacity(method.params.len());
    let mut min_arity = 0;
    let mut has_rest = false;
    for (i, p) in method.params.iter().enumerate() {
        let ty = match &p.type_ann {
            Some(ann) => ck.resolve_type(&ann.text, ann.span)?,
            None => well_known::any(),
        };
        if p.is_rest {
            has_rest = true;
        } else if !p.optional && p.default.is_none() {
            min_arity = i + 1;
        }
        params.push(ty);
    }
    let ret = match &method.return_type {
        Some(ann) => ck.resolve_type(&ann.text, ann.span)?,
        None => well_known::void(),
    };
    let sig = FunctionType { params, ret, min_arity, has_rest, this_type: None };
    let access = if method.is_private { Visibility::Private } else { visibility_of(method.access) };

    match method.kind {
        MethodKind::Getter => {
            if method.is_static {
                class.static_properties.insert(method.name.clone(), sig.ret);
            } else {
                class.getters.insert(method.name.clone(), sig.ret);
                if method.is_abstract {
                    class.abstract_getters.insert(method.name.clone());
                }
            }
        }
        MethodKind::Setter => {
            if !method.is_static {
                class.setters.insert(method.name.clone(), sig.params.first().cloned().unwrap_or_else(well_known::any));
                if method.is_abstract {
                    class.abstract_setters.insert(method.name.clone());
                }
            }
        }
        MethodKind::Normal => {
            // §4.3 "an abstract method must be the only declaration for its
            // name": once a name has been declared abstract, any further
            // declaration under that name (abstract or not) is a conflict,
            // and once a name has a concrete/overload declaration it cannot
            // also be declared abstract.
            let already_abstract = class.abstract_methods.contains(&method.name);
            let already_declared = pending_overloads.contains_key(&method.name) || class.static_methods.contains_key(&method.name);
            if (method.is_abstract && (already_abstract || already_declared)) || (!method.is_abstract && already_abstract) {
                return ck.error(
                    ErrorKind::Structural,
                    diagnostic_codes::DUPLICATE_ABSTRACT_DECLARATION,
                    format!("An abstract method must be the only declaration for '{}'.", method.name),
                    span,
                );
            }
            if method.is_abstract {
                class.abstract_methods.insert(method.name.clone());
                class.methods.insert(method.name.clone(), MethodSignature::Plain(sig));
            } else if method.is_static {
                class.static_methods.insert(method.name.clone(), MethodSignature::Plain(sig));
            } else {
                pending_overloads.entry(method.name.clone()).or_default().push(sig);
                class.method_access.insert(method.name.clone(), access);
            }
        }
    }
    Ok(())
}

/// §4.3 "validate interface implementation (structural)": every
/// `implements` clause must be structurally satisfied by the class's own
/// instance type.
fn validate_interface_implementation(ck: &Checker, class: &ClassType, decl: &ClassDecl, span: Span) -> CheckResult<()> {
    let instance = TypeInfo::Instance(TypeInfo::Class(class.clone()).rc()).rc();
    for ann in &decl.implements {
        let iface_ty = ck.resolve_type(&ann.text, ann.span)?;
        if !is_assignable(&iface_ty, &instance) {
            let iface_name = match &*iface_ty {
                TypeInfo::Interface(i) => i.name.clone(),
                _ => ann.text.clone(),
            };
            return ck.error(
                ErrorKind::Structural,
                diagnostic_codes::MISSING_INTERFACE_MEMBER,
                format!("Class '{}' incorrectly implements interface '{iface_name}'.", class.name),
                span,
            );
        }
    }
    Ok(())
}

/// §4.3 "validate abstract-member implementation (nominal)": every
/// abstract member declared by any ancestor must have a concrete override
/// by the time a non-abstract class is reached.
fn validate_abstract_implementation(ck: &Checker, frozen: &Ty, span: Span) -> CheckResult<()> {
    let TypeInfo::Class(class) = &**frozen else { return Ok(()) };
    if class.is_abstract {
        return Ok(());
    }
    let mut required: Vec<String> = Vec::new();
    collect_ancestor_abstracts(class.superclass.as_ref(), &mut required);
    for name in required {
        let implemented = class.methods.get(&name).is_some_and(|m| !class.abstract_methods.contains(&name))
            || class.getters.contains_key(&name)
            || class.setters.contains_key(&name);
        if !implemented {
            return ck.error(
                ErrorKind::Structural,
                diagnostic_codes::MISSING_ABSTRACT_IMPLEMENTATION,
                format!("Non-abstract class '{}' does not implement inherited abstract member '{name}'.", class.name),
                span,
            );
        }
    }
    Ok(())
}

fn collect_ancestor_abstracts(superclass: Option<&Ty>, out: &mut Vec<String>) {
    let Some(sup) = superclass else { return };
    let TypeInfo::Class(c) = &**sup else { return };
    for name in c.abstract_methods.iter().chain(c.abstract_getters.iter()).chain(c.abstract_setters.iter()) {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    collect_ancestor_abstracts(c.superclass.as_ref(), out);
}

/// Pushes the class-checking context (`this`/`super` in scope) that method
/// bodies are checked under; static members run with no `this` in scope
/// (§4.3 "Static method bodies run with `this` absent").
pub fn class_context_for(frozen: &Ty, is_static_member: bool) -> ClassContext {
    let TypeInfo::Class(class) = &**frozen else {
        return ClassContext { this_type: frozen.clone(), super_type: None, is_static_member };
    };
    ClassContext {
        this_type: TypeInfo::Instance(frozen.clone()).rc(),
        super_type: class.superclass.clone(),
        is_static_member,
    }
}

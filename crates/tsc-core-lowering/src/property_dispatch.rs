//! Property and method dispatch decisions (§4.6 "Property dispatch",
//! "Method dispatch"): for every `obj.name` access or call, decide whether
//! the back-end may emit a direct, statically-typed reference or must fall
//! back to a dynamic, runtime-checked lookup.
//!
//! This mirrors the checker's own member resolution (`tsc_core_checker::
//! property_access`) but is checker-independent: it consults only the
//! already-resolved `TypeInfo` a back-end reads out of the `TypeMap`, the
//! way `tsz-checker/dispatch.rs` separates "what type is this" (computed
//! once, during checking) from "how do I call it" (decided again, per
//! back-end, during emission).

use tsc_core_types::model::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    /// The receiver is a known nominal shape (`Instance(C)`, a static class
    /// reference, an enum, or a namespace) that declares the member: emit a
    /// typed cast plus a direct field load or call.
    Direct,
    /// Fall through to the runtime's dynamic `GetProperty`/`SetProperty`/
    /// `CallMethod` machinery.
    Dynamic,
}

/// The receiver-side strategy a method call dispatches through, for the
/// type-emitter registry (§4.6 "Built-in receivers ... are handled by
/// per-type strategies registered in a type-emitter registry keyed by
/// receiver TypeInfo variant").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinReceiver {
    String,
    Array,
    Map,
    Set,
    WeakMap,
    WeakSet,
    RegExp,
    Error,
    Promise,
    Timeout,
}

#[must_use]
pub fn builtin_receiver_of(ty: &Ty) -> Option<BuiltinReceiver> {
    match &**ty {
        TypeInfo::StringType | TypeInfo::StringLiteral(_) => Some(BuiltinReceiver::String),
        TypeInfo::Array(_) | TypeInfo::Tuple { .. } => Some(BuiltinReceiver::Array),
        TypeInfo::Map(..) => Some(BuiltinReceiver::Map),
        TypeInfo::Set(_) => Some(BuiltinReceiver::Set),
        TypeInfo::WeakMap(..) => Some(BuiltinReceiver::WeakMap),
        TypeInfo::WeakSet(_) => Some(BuiltinReceiver::WeakSet),
        TypeInfo::RegExp => Some(BuiltinReceiver::RegExp),
        TypeInfo::Error(_) => Some(BuiltinReceiver::Error),
        TypeInfo::Promise(_) => Some(BuiltinReceiver::Promise),
        TypeInfo::Timeout => Some(BuiltinReceiver::Timeout),
        _ => None,
    }
}

/// Method names that string and array receivers share (§4.6: "String and
/// array share a runtime-checked dispatcher for methods whose names are
/// ambiguous"). A back-end emitting a call to one of these on a receiver
/// whose static type is a union of string/array cannot pick a strategy at
/// compile time and must check the boxed value's runtime tag first.
const AMBIGUOUS_STRING_ARRAY_METHODS: &[&str] = &["slice", "concat", "includes", "indexOf"];

#[must_use]
pub fn is_ambiguous_string_array_method(name: &str) -> bool {
    AMBIGUOUS_STRING_ARRAY_METHODS.contains(&name)
}

/// Decides the dispatch strategy for `receiver.name`, mirroring the
/// checker's structural/nominal lookup but producing the lowering crate's
/// own [`DispatchKind`] rather than reusing the checker's internal type.
#[must_use]
pub fn classify_member_dispatch(receiver: &Ty, name: &str) -> DispatchKind {
    match &**receiver {
        TypeInfo::Instance(class) => {
            if class_declares_member(class, name) {
                DispatchKind::Direct
            } else {
                DispatchKind::Dynamic
            }
        }
        TypeInfo::Class(c) => {
            if c.static_properties.contains_key(name) || c.static_methods.contains_key(name) {
                DispatchKind::Direct
            } else {
                DispatchKind::Dynamic
            }
        }
        TypeInfo::Enum(e) if e.members.contains_key(name) => DispatchKind::Direct,
        TypeInfo::Namespace(ns) => {
            if ns.values.contains_key(name) || ns.types.contains_key(name) {
                DispatchKind::Direct
            } else {
                DispatchKind::Dynamic
            }
        }
        _ => DispatchKind::Dynamic,
    }
}

fn class_declares_member(class: &Ty, name: &str) -> bool {
    match &**class {
        TypeInfo::Class(c) => {
            c.declared_field_types.contains_key(name)
                || c.getters.contains_key(name)
                || c.setters.contains_key(name)
                || c.methods.contains_key(name)
                || c.superclass.as_ref().is_some_and(|s| class_declares_member(s, name))
        }
        TypeInfo::MutableClass(_) => false,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_class(field: &str) -> Ty {
        let mut fields = indexmap::IndexMap::new();
        fields.insert(field.to_string(), well_known::number());
        TypeInfo::Class(ClassType {
            name: "C".into(),
            superclass: None,
            methods: Default::default(),
            static_methods: Default::default(),
            static_properties: Default::default(),
            method_access: Default::default(),
            field_access: Default::default(),
            readonly_fields: Default::default(),
            getters: Default::default(),
            setters: Default::default(),
            declared_field_types: fields,
            is_abstract: false,
            abstract_methods: Default::default(),
            abstract_getters: Default::default(),
            abstract_setters: Default::default(),
        })
        .rc()
    }

    #[test]
    fn declared_instance_field_dispatches_direct() {
        let class = simple_class("x");
        let instance = TypeInfo::Instance(class).rc();
        assert_eq!(classify_member_dispatch(&instance, "x"), DispatchKind::Direct);
    }

    #[test]
    fn unknown_member_falls_back_to_dynamic() {
        let class = simple_class("x");
        let instance = TypeInfo::Instance(class).rc();
        assert_eq!(classify_member_dispatch(&instance, "y"), DispatchKind::Dynamic);
    }

    #[test]
    fn record_receiver_is_always_dynamic() {
        let record = TypeInfo::Record(RecordType::empty()).rc();
        assert_eq!(classify_member_dispatch(&record, "x"), DispatchKind::Dynamic);
    }

    #[test]
    fn array_receiver_is_a_builtin() {
        let arr = TypeInfo::Array(well_known::number()).rc();
        assert_eq!(builtin_receiver_of(&arr), Some(BuiltinReceiver::Array));
        assert!(is_ambiguous_string_array_method("slice"));
        assert!(!is_ambiguous_string_array_method("push"));
    }
}

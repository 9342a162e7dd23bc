//! Per-class, per-method resolved signature tables (§6 "Outputs consumed by
//! back-ends"): "Per-class, per-method resolved signatures including the
//! implementation signature for overloads, the abstract-member sets, and
//! access-modifier tables. Back-ends key method resolution by
//! `(className, methodName)` where `className` is qualified by module path
//! when multiple modules are compiled."

use rustc_hash::FxHashMap;

use tsc_core_types::model::{ClassType, FunctionType, MethodSignature, Visibility};

/// `(module-qualified class name, method name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub class: String,
    pub method: String,
}

impl MethodKey {
    #[must_use]
    pub fn new(module: Option<&str>, class: &str, method: &str) -> Self {
        let qualified = match module {
            Some(m) if !m.is_empty() => format!("{m}::{class}"),
            _ => class.to_string(),
        };
        MethodKey { class: qualified, method: method.to_string() }
    }
}

/// Resolved emission-time facts about one method: the callable signature
/// (§9 "OverloadedFunction vs. Function" — the implementation for
/// overloads, the plain signature otherwise), its visibility, and whether
/// it is still abstract (an abstract method never has an emittable body).
#[derive(Debug, Clone)]
pub struct MethodEntry {
    pub callable: FunctionType,
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub is_static: bool,
}

/// Built once per compiled class from its frozen `ClassType`, then consulted
/// by the emitter at every call site so direct-dispatch decisions and
/// access-modifier enforcement key off the same resolved table the checker
/// already built (never re-deriving it from scratch).
#[derive(Debug, Default)]
pub struct MethodTable {
    entries: FxHashMap<MethodKey, MethodEntry>,
}

impl MethodTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates the table with every method (instance and static) a class
    /// declares, keyed under `module`-qualified names.
    pub fn add_class(&mut self, module: Option<&str>, class: &ClassType) {
        for (name, sig) in &class.methods {
            let entry = MethodEntry {
                callable: sig.callable().clone(),
                visibility: class.method_access.get(name).copied().unwrap_or(Visibility::Public),
                is_abstract: class.abstract_methods.contains(name),
                is_static: false,
            };
            self.entries.insert(MethodKey::new(module, &class.name, name), entry);
        }
        for (name, sig) in &class.static_methods {
            let entry = match sig {
                MethodSignature::Plain(f) => MethodEntry { callable: f.clone(), visibility: Visibility::Public, is_abstract: false, is_static: true },
                MethodSignature::Overloaded(o) => {
                    MethodEntry { callable: o.implementation.clone(), visibility: Visibility::Public, is_abstract: false, is_static: true }
                }
            };
            self.entries.insert(MethodKey::new(module, &class.name, name), entry);
        }
    }

    #[must_use]
    pub fn get(&self, module: Option<&str>, class: &str, method: &str) -> Option<&MethodEntry> {
        self.entries.get(&MethodKey::new(module, class, method))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsc_core_types::model::*;

    fn sample_class() -> ClassType {
        let mut methods = indexmap::IndexMap::new();
        methods.insert(
            "greet".to_string(),
            MethodSignature::Plain(FunctionType { params: vec![], ret: well_known::string(), min_arity: 0, has_rest: false, this_type: None }),
        );
        let mut method_access = indexmap::IndexMap::new();
        method_access.insert("greet".to_string(), Visibility::Public);
        ClassType {
            name: "Greeter".into(),
            superclass: None,
            methods,
            static_methods: Default::default(),
            static_properties: Default::default(),
            method_access,
            field_access: Default::default(),
            readonly_fields: Default::default(),
            getters: Default::default(),
            setters: Default::default(),
            declared_field_types: Default::default(),
            is_abstract: false,
            abstract_methods: Default::default(),
            abstract_getters: Default::default(),
            abstract_setters: Default::default(),
        }
    }

    #[test]
    fn resolves_an_instance_method_by_class_and_method_name() {
        let mut table = MethodTable::new();
        table.add_class(None, &sample_class());
        let entry = table.get(None, "Greeter", "greet").expect("entry present");
        assert!(!entry.is_abstract);
        assert!(!entry.is_static);
    }

    #[test]
    fn module_qualification_distinguishes_same_named_classes() {
        let mut table = MethodTable::new();
        table.add_class(Some("mod_a"), &sample_class());
        table.add_class(Some("mod_b"), &sample_class());
        assert_eq!(table.len(), 2);
        assert!(table.get(Some("mod_a"), "Greeter", "greet").is_some());
        assert!(table.get(None, "Greeter", "greet").is_none());
    }
}

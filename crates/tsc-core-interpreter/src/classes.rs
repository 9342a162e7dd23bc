//! Class declaration evaluation and instance construction (§4.6 "ES2022
//! private slots", §9 "Cyclic class references").
//!
//! The checker has already validated structural/nominal soundness (§4.3
//! "Classes": the three-pass collection, abstract-member and interface
//! checks) by the time the interpreter ever builds a `ClassObject` — this
//! module only has to realize the runtime shape the checked declaration
//! describes: a method table, a constructor, and field initializers run in
//! declaration order on every `new`.

use std::cell::RefCell;
use std::rc::Rc;
use rustc_hash::{FxHashMap, FxHashSet};

use tsc_core_ast::{ClassDecl, ClassMember, MethodKind};

use crate::env::Scope;
use crate::error::{EvalResult, Thrown};
use crate::value::{ClassObject, Closure, Instance, Value};

/// Builds a `ClassObject` from a checked `ClassDecl`, closing every method
/// over `defining_scope` (the scope the class declaration itself sees, so
/// methods can call sibling functions/classes declared alongside it) with
/// `superclass` already resolved to its own `ClassObject`, breaking the
/// self-reference cycle the same way the checker's `MutableClass`
/// placeholder does: the class's own name is declared in `defining_scope`
/// (see `Interpreter::exec_class_decl`) before members are evaluated, so a
/// method referencing its own class by name resolves correctly.
pub fn build_class(
    decl: &ClassDecl,
    defining_scope: &Rc<RefCell<Scope>>,
    superclass: Option<Rc<ClassObject>>,
) -> (Rc<ClassObject>, Vec<(String, Option<tsc_core_ast::Expr>)>) {
    let name = decl.name.as_ref().map(|n| n.name.clone()).unwrap_or_default();
    let mut methods = FxHashMap::default();
    let mut getters = FxHashMap::default();
    let mut setters = FxHashMap::default();
    let mut static_members = indexmap::IndexMap::new();
    let mut field_initializers = Vec::new();
    let mut static_field_initializers = Vec::new();
    let mut constructor = None;
    let mut private_slots = FxHashSet::default();

    for member in &decl.members {
        match member {
            ClassMember::Constructor(m) => {
                constructor = Some(Rc::new(Closure {
                    name: Some("constructor".to_string()),
                    params: m.params.clone(),
                    body: crate::value::ClosureBody::Block(m.body.clone().unwrap_or_default()),
                    captured_env: Rc::clone(defining_scope),
                    this_value: None,
                    is_async: false,
                    is_generator: false,
                    is_arrow: false,
                }));
            }
            ClassMember::Method(m) => {
                if m.is_private {
                    private_slots.insert(m.name.clone());
                }
                let closure = Rc::new(Closure {
                    name: Some(m.name.clone()),
                    params: m.params.clone(),
                    body: crate::value::ClosureBody::Block(m.body.clone().unwrap_or_default()),
                    captured_env: Rc::clone(defining_scope),
                    this_value: None,
                    is_async: m.is_async,
                    is_generator: m.is_generator,
                    is_arrow: false,
                });
                match m.kind {
                    MethodKind::Normal => {
                        if m.is_static {
                            static_members.insert(m.name.clone(), Value::Closure(closure));
                        } else {
                            methods.insert(m.name.clone(), closure);
                        }
                    }
                    MethodKind::Getter => {
                        getters.insert(m.name.clone(), closure);
                    }
                    MethodKind::Setter => {
                        setters.insert(m.name.clone(), closure);
                    }
                }
            }
            ClassMember::Field(f) => {
                if f.is_private {
                    private_slots.insert(f.name.clone());
                }
                if f.is_static {
                    static_field_initializers.push((f.name.clone(), f.initializer.clone()));
                } else {
                    field_initializers.push((f.name.clone(), f.initializer.clone()));
                }
            }
            ClassMember::StaticBlock(_) | ClassMember::IndexSignature { .. } => {}
        }
    }

    let class = Rc::new(ClassObject {
        name,
        superclass,
        methods,
        getters,
        setters,
        static_members: RefCell::new(static_members),
        field_initializers,
        constructor,
        private_slots,
        defining_scope: Rc::clone(defining_scope),
    });
    (class, static_field_initializers)
}

/// Allocates a fresh instance and runs its field initializers (superclass
/// fields first, via the constructor's `super(...)` call — handled by the
/// caller in `eval.rs`'s `New` evaluation, which calls this once per class
/// in the chain from base to derived) then invokes the constructor body,
/// if any, with `this` bound to the new instance.
#[must_use]
pub fn new_instance(class: &Rc<ClassObject>) -> Rc<Instance> {
    Rc::new(Instance { class: Rc::clone(class), fields: RefCell::new(indexmap::IndexMap::new()), private_slots: RefCell::new(FxHashMap::default()) })
}

/// Runs this class's own field initializers against an already-allocated
/// instance, in declaration order, with `this` bound so an initializer may
/// reference an already-initialized sibling field.
pub fn init_fields(
    class: &Rc<ClassObject>,
    instance: &Rc<Instance>,
    eval_field_init: &mut dyn FnMut(&Option<tsc_core_ast::Expr>) -> EvalResult,
) -> Result<(), Thrown> {
    for (name, init) in &class.field_initializers {
        let value = eval_field_init(init)?;
        if class.private_slots.contains(name) {
            let key = format!("{}#{}", class.name, name);
            instance.private_slots.borrow_mut().insert(key, value);
        } else {
            instance.fields.borrow_mut().insert(name.clone(), value);
        }
    }
    Ok(())
}

/// Reads a field/private-slot/getter off an instance, brand-checking
/// private access (§4.6) and walking the prototype chain for inherited
/// methods and getters the same way `find_method`/`find_getter` already do
/// for public members.
pub fn get_member(instance: &Rc<Instance>, name: &str, accessing_class: Option<&str>) -> Option<Value> {
    if let Some(owner) = accessing_class {
        let key = format!("{owner}#{name}");
        if let Some(v) = instance.private_slots.borrow().get(&key) {
            return Some(v.clone());
        }
    }
    if let Some(v) = instance.fields.borrow().get(name) {
        return Some(v.clone());
    }
    None
}

#[must_use]
pub fn class_static_member(class: &Rc<ClassObject>, name: &str) -> Option<Value> {
    class
        .static_members
        .borrow()
        .get(name)
        .cloned()
        .or_else(|| class.superclass.as_ref().and_then(|s| class_static_member(s, name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_instance_has_empty_fields() {
        let class = Rc::new(ClassObject {
            name: "C".into(),
            superclass: None,
            methods: FxHashMap::default(),
            getters: FxHashMap::default(),
            setters: FxHashMap::default(),
            static_members: RefCell::new(indexmap::IndexMap::new()),
            field_initializers: vec![],
            constructor: None,
            private_slots: FxHashSet::default(),
            defining_scope: Scope::root(),
        });
        let instance = new_instance(&class);
        assert!(instance.fields.borrow().is_empty());
    }

    #[test]
    fn is_subclass_of_walks_the_chain() {
        let base = Rc::new(ClassObject {
            name: "Base".into(),
            superclass: None,
            methods: FxHashMap::default(),
            getters: FxHashMap::default(),
            setters: FxHashMap::default(),
            static_members: RefCell::new(indexmap::IndexMap::new()),
            field_initializers: vec![],
            constructor: None,
            private_slots: FxHashSet::default(),
            defining_scope: Scope::root(),
        });
        let derived = Rc::new(ClassObject {
            name: "Derived".into(),
            superclass: Some(Rc::clone(&base)),
            methods: FxHashMap::default(),
            getters: FxHashMap::default(),
            setters: FxHashMap::default(),
            static_members: RefCell::new(indexmap::IndexMap::new()),
            field_initializers: vec![],
            constructor: None,
            private_slots: FxHashSet::default(),
            defining_scope: Scope::root(),
        });
        assert!(derived.is_subclass_of(&base));
        assert!(!base.is_subclass_of(&derived));
    }
}

//! The interpreter's lexical environment chain.
//!
//! A tree-walking back-end keeps a runtime scope chain that mirrors the
//! checker's `TypeEnvironment` chain (§4.3 "Traversal strategy": a new
//! scope per block/function/class). Unlike the checker's environment,
//! which maps names to `TypeInfo`, this one maps names to boxed runtime
//! [`Value`]s, and is the storage a lowered [`crate::value::Closure`]
//! captures by holding an `Rc` to the defining scope rather than a
//! hand-picked subset of fields — §4.6's per-field closure record is the
//! IL emitter's concern, since IL has no native notion of a parent-scope
//! pointer; the tree-walker already has one for free.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{EvalResult, Thrown};
use crate::value::Value;

struct Binding {
    value: Value,
    mutable: bool,
}

#[derive(Default)]
pub struct Scope {
    bindings: FxHashMap<String, Binding>,
    parent: Option<Rc<RefCell<Scope>>>,
}

impl Scope {
    #[must_use]
    pub fn root() -> Rc<RefCell<Scope>> {
        Rc::new(RefCell::new(Scope::default()))
    }

    #[must_use]
    pub fn child(parent: &Rc<RefCell<Scope>>) -> Rc<RefCell<Scope>> {
        Rc::new(RefCell::new(Scope { bindings: FxHashMap::default(), parent: Some(Rc::clone(parent)) }))
    }

    pub fn declare(&mut self, name: impl Into<String>, value: Value, mutable: bool) {
        self.bindings.insert(name.into(), Binding { value, mutable });
    }

    /// This scope's own bindings (not the parent chain), in the
    /// unspecified order `FxHashMap` iterates — used to materialize a
    /// namespace body's exports into a plain object (`exec::exec_namespace_decl`).
    #[must_use]
    pub fn own_bindings(&self) -> Vec<(String, Value)> {
        self.bindings.iter().map(|(k, b)| (k.clone(), b.value.clone())).collect()
    }
}

/// Looks up `name` starting at `scope` and walking outward. Returns the
/// thrown `ReferenceError`-shaped value the spec's "undefined variable" is
/// surfaced as (§7 `ResolutionError`, at the checker layer; at runtime this
/// can only happen for a dynamically-computed name the checker could not
/// see, e.g. through `eval`-like constructs this core does not model, or a
/// deliberately permissive `any`-typed path — so it stays a thrown value
/// rather than a panic).
pub fn lookup(scope: &Rc<RefCell<Scope>>, name: &str) -> EvalResult {
    let mut current = Rc::clone(scope);
    loop {
        let next = {
            let s = current.borrow();
            if let Some(binding) = s.bindings.get(name) {
                return Ok(binding.value.clone());
            }
            s.parent.clone()
        };
        match next {
            Some(parent) => current = parent,
            None => return Err(Thrown::type_error(format!("{name} is not defined"))),
        }
    }
}

pub fn assign(scope: &Rc<RefCell<Scope>>, name: &str, value: Value) -> EvalResult {
    let mut current = Rc::clone(scope);
    loop {
        let next = {
            let mut s = current.borrow_mut();
            if let Some(binding) = s.bindings.get_mut(name) {
                if !binding.mutable {
                    return Err(Thrown::type_error(format!("Assignment to constant variable '{name}'.")));
                }
                binding.value = value.clone();
                return Ok(value);
            }
            s.parent.clone()
        };
        match next {
            Some(parent) => current = parent,
            None => return Err(Thrown::type_error(format!("{name} is not defined"))),
        }
    }
}

#[must_use]
pub fn is_declared(scope: &Rc<RefCell<Scope>>, name: &str) -> bool {
    let mut current = Rc::clone(scope);
    loop {
        let next = {
            let s = current.borrow();
            if s.bindings.contains_key(name) {
                return true;
            }
            s.parent.clone()
        };
        match next {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scope_sees_parent_bindings() {
        let root = Scope::root();
        root.borrow_mut().declare("x", Value::Number(1.0), true);
        let child = Scope::child(&root);
        assert!(matches!(lookup(&child, "x"), Ok(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn shadowing_in_child_does_not_affect_parent() {
        let root = Scope::root();
        root.borrow_mut().declare("x", Value::Number(1.0), true);
        let child = Scope::child(&root);
        child.borrow_mut().declare("x", Value::Number(2.0), true);
        assert!(matches!(lookup(&child, "x"), Ok(Value::Number(n)) if n == 2.0));
        assert!(matches!(lookup(&root, "x"), Ok(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn assigning_const_binding_throws() {
        let root = Scope::root();
        root.borrow_mut().declare("x", Value::Number(1.0), false);
        assert!(assign(&root, "x", Value::Number(2.0)).is_err());
    }

    #[test]
    fn undeclared_lookup_throws() {
        let root = Scope::root();
        assert!(lookup(&root, "nope").is_err());
    }
}

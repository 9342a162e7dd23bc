//! The type environment (§4.3): a lexically-scoped chain of names to
//! variable types, type aliases, type parameters, and namespaces, pushed
//! and popped as the checker walks into and out of blocks, functions,
//! classes, and namespaces. Mirrors the scope-chain state machine
//! `tsz-binder` drives during its own traversal, specialized here to carry
//! resolved `TypeInfo` rather than pre-binding symbol placeholders.

use crate::model::Ty;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
    Class,
    Namespace,
}

#[derive(Debug, Default)]
struct Scope {
    kind_is_function_boundary: bool,
    variables: FxHashMap<String, Ty>,
    /// Variables declared `const`; reassignment is rejected independent of
    /// type compatibility (a `tsc-core-checker` concern that consults this).
    const_bindings: std::collections::HashSet<String>,
    type_aliases: FxHashMap<String, Ty>,
    type_parameters: FxHashMap<String, Ty>,
    namespaces: FxHashMap<String, Ty>,
}

/// A stack of lexical scopes. The outermost (index 0) is the global scope,
/// created with the environment and never popped.
#[derive(Debug)]
pub struct TypeEnvironment {
    scopes: Vec<Scope>,
}

impl Default for TypeEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeEnvironment {
    #[must_use]
    pub fn new() -> Self {
        Self { scopes: vec![Scope::default()] }
    }

    pub fn push_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope {
            kind_is_function_boundary: kind == ScopeKind::Function,
            ..Scope::default()
        });
        tracing::trace!(depth = self.scopes.len(), ?kind, "entering scope");
    }

    /// Pops the innermost scope. Panics if called more times than
    /// `push_scope` — a checker bug, not a recoverable condition.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
        tracing::trace!(depth = self.scopes.len(), "leaving scope");
    }

    /// Declares a variable in the innermost scope. Returns `false` if a
    /// binding with this name already exists in that same scope (the
    /// checker surfaces this as a duplicate-declaration diagnostic); a name
    /// that merely shadows an outer scope's binding is always allowed.
    pub fn declare_variable(&mut self, name: impl Into<String>, ty: Ty, is_const: bool) -> bool {
        let name = name.into();
        let scope = self.scopes.last_mut().expect("global scope always present");
        if scope.variables.contains_key(&name) {
            return false;
        }
        if is_const {
            scope.const_bindings.insert(name.clone());
        }
        scope.variables.insert(name, ty);
        true
    }

    /// Overwrites a variable's tracked type in whichever scope it was
    /// declared in, without changing its declaration scope. Used by the
    /// checker to install a narrowed type for the rest of a flow branch
    /// (§4.3), and to widen it back on reassignment (§2 "Assignment
    /// narrowing" in `SPEC_FULL.md`).
    pub fn update_variable(&mut self, name: &str, ty: Ty) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if scope.variables.contains_key(name) {
                scope.variables.insert(name.to_string(), ty);
                return true;
            }
        }
        false
    }

    #[must_use]
    pub fn lookup_variable(&self, name: &str) -> Option<Ty> {
        self.scopes.iter().rev().find_map(|s| s.variables.get(name).cloned())
    }

    #[must_use]
    pub fn is_const_binding(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .rev()
            .find(|s| s.variables.contains_key(name))
            .is_some_and(|s| s.const_bindings.contains(name))
    }

    pub fn declare_type_alias(&mut self, name: impl Into<String>, ty: Ty) {
        self.scopes.last_mut().expect("global scope always present").type_aliases.insert(name.into(), ty);
    }

    #[must_use]
    pub fn lookup_type_alias(&self, name: &str) -> Option<Ty> {
        self.scopes.iter().rev().find_map(|s| s.type_aliases.get(name).cloned())
    }

    pub fn declare_type_parameter(&mut self, name: impl Into<String>, ty: Ty) {
        self.scopes.last_mut().expect("global scope always present").type_parameters.insert(name.into(), ty);
    }

    /// Type parameters shadow type aliases of the same name within their
    /// declaring scope and inward (a generic `T` inside `function f<T>()`
    /// hides any outer `type T = ...`).
    #[must_use]
    pub fn lookup_type_parameter(&self, name: &str) -> Option<Ty> {
        self.scopes.iter().rev().find_map(|s| s.type_parameters.get(name).cloned())
    }

    /// Resolves a type name, preferring an in-scope type parameter over a
    /// type alias of the same name.
    #[must_use]
    pub fn lookup_type_name(&self, name: &str) -> Option<Ty> {
        self.lookup_type_parameter(name).or_else(|| self.lookup_type_alias(name))
    }

    pub fn declare_namespace(&mut self, name: impl Into<String>, ty: Ty) {
        self.scopes.last_mut().expect("global scope always present").namespaces.insert(name.into(), ty);
    }

    #[must_use]
    pub fn lookup_namespace(&self, name: &str) -> Option<Ty> {
        self.scopes.iter().rev().find_map(|s| s.namespaces.get(name).cloned())
    }

    /// The type aliases and variables declared directly in the innermost
    /// scope, not inherited from outer scopes. Used to reflect a
    /// `namespace`'s own body back into a `NamespaceType` once its block has
    /// been checked (§4.3 "Namespace members").
    #[must_use]
    pub fn snapshot_innermost(&self) -> (FxHashMap<String, Ty>, FxHashMap<String, Ty>) {
        let scope = self.scopes.last().expect("global scope always present");
        (scope.type_aliases.clone(), scope.variables.clone())
    }

    /// Walks outward from the innermost scope to the nearest function
    /// boundary (inclusive), for `this`/closure-capture style questions that
    /// need "am I still inside the same function" rather than "same block".
    #[must_use]
    pub fn depth_to_enclosing_function(&self) -> usize {
        self.scopes
            .iter()
            .rev()
            .enumerate()
            .find(|(_, s)| s.kind_is_function_boundary)
            .map_or(self.scopes.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::well_known;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut env = TypeEnvironment::new();
        env.declare_variable("x", well_known::string(), false);
        env.push_scope(ScopeKind::Block);
        env.declare_variable("x", well_known::number(), false);
        assert_eq!(env.lookup_variable("x"), Some(well_known::number()));
        env.pop_scope();
        assert_eq!(env.lookup_variable("x"), Some(well_known::string()));
    }

    #[test]
    fn redeclaration_in_same_scope_rejected() {
        let mut env = TypeEnvironment::new();
        assert!(env.declare_variable("x", well_known::string(), false));
        assert!(!env.declare_variable("x", well_known::number(), false));
    }

    #[test]
    fn update_narrows_without_changing_declaration_scope() {
        let mut env = TypeEnvironment::new();
        let union = crate::normalize::make_union(vec![well_known::string(), well_known::number()]);
        env.declare_variable("x", union, false);
        env.push_scope(ScopeKind::Block);
        assert!(env.update_variable("x", well_known::string()));
        env.pop_scope();
        assert_eq!(env.lookup_variable("x"), Some(well_known::string()));
    }

    #[test]
    fn type_parameter_shadows_type_alias() {
        let mut env = TypeEnvironment::new();
        env.declare_type_alias("T", well_known::string());
        env.push_scope(ScopeKind::Function);
        env.declare_type_parameter("T", well_known::number());
        assert_eq!(env.lookup_type_name("T"), Some(well_known::number()));
        env.pop_scope();
        assert_eq!(env.lookup_type_name("T"), Some(well_known::string()));
    }

    #[test]
    fn const_binding_tracked_independent_of_type() {
        let mut env = TypeEnvironment::new();
        env.declare_variable("x", well_known::string(), true);
        assert!(env.is_const_binding("x"));
    }
}

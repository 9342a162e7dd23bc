//! `EmitContext` - transform state management for the IL emitter.
//!
//! Grounded on `tsz-emitter::emit_context::EmitContext`: that printer
//! extracts transform-specific state (arrow `this`-capture depth,
//! destructuring temp counters, module state) out of the main printer
//! struct so each transform can own its slice of state without bloating a
//! god object. This back-end follows the same shape, generalized from
//! "string-printer state" to "instruction-stream builder state": a label
//! counter, the current method's [`LocalTable`], the flags that change how
//! an expression lowers (are we inside an async state machine? inside a
//! computed private-slot access?), and the per-class [`MethodTable`] /
//! [`BrandTable`] lookups every call site and private-field access consult.

use rustc_hash::FxHashMap;

use tsc_core_checker::TypeMap;
use tsc_core_lowering::private_slots::BrandTable;

use crate::instr::Label;
use crate::locals::LocalTable;
use crate::method_table::MethodTable;

/// Flags that control lowering for the current scope/branch, mirroring
/// `tsz-emitter::emit_context::EmitFlags`'s role (one bit per "are we
/// inside X" question a deeply nested lowering call needs answered without
/// threading an extra parameter through every function).
#[derive(Debug, Clone, Default)]
pub struct EmitFlags {
    /// Set while lowering the body of an `async` function; arrow bodies
    /// nested inside share the enclosing machine's hoisted state (§4.6).
    pub in_async_state_machine: bool,
    /// Set while lowering a `static` class member; `this` is not in scope.
    pub in_static_member: bool,
    /// Set while lowering an arrow function body that captures `this`;
    /// distinguishes a closure's own `this` reference from a plain
    /// function expression's dynamic one.
    pub capture_this: bool,
}

impl EmitFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// All state the emitter threads through one compiled module: the
/// checker's `TypeMap` (read-only, never mutated — §3 "Lifecycle"), the
/// resolved method/brand tables every class contributes, and the
/// per-method working state (label counter, current locals) that resets
/// at each function boundary.
pub struct EmitContext {
    pub type_map: TypeMap,
    pub methods: MethodTable,
    pub brands: FxHashMap<String, BrandTable>,
    pub flags: EmitFlags,

    next_label: u32,
    pub locals: LocalTable,
}

impl EmitContext {
    #[must_use]
    pub fn new(type_map: TypeMap) -> Self {
        Self {
            type_map,
            methods: MethodTable::new(),
            brands: FxHashMap::default(),
            flags: EmitFlags::new(),
            next_label: 0,
            locals: LocalTable::new(),
        }
    }

    /// Allocates a fresh jump label, unique for the lifetime of this
    /// context (labels are never reused across methods either, which keeps
    /// a whole-module instruction dump unambiguous for debugging).
    pub fn new_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    /// Resets per-method state when entering a new function/method body;
    /// the `TypeMap`, `methods`, and `brands` tables are module-wide and
    /// survive across this reset.
    pub fn enter_method(&mut self) {
        self.locals = LocalTable::new();
        self.flags = EmitFlags::new();
    }

    pub fn brand_table(&mut self, class: &str) -> &mut BrandTable {
        self.brands.entry(class.to_string()).or_insert_with(|| BrandTable::new(class.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_allocated_monotonically_and_never_repeat() {
        let mut ctx = EmitContext::new(TypeMap::new());
        let a = ctx.new_label();
        let b = ctx.new_label();
        assert_ne!(a, b);
        assert_eq!(a.0 + 1, b.0);
    }

    #[test]
    fn entering_a_method_clears_locals_but_keeps_module_tables() {
        let mut ctx = EmitContext::new(TypeMap::new());
        ctx.locals.declare("x", crate::instr::LocalType::Double);
        ctx.brand_table("C").private_fields.insert("count".to_string());
        ctx.enter_method();
        assert_eq!(ctx.locals.count(), 0);
        assert!(ctx.brands.contains_key("C"));
    }
}

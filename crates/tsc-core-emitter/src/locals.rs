//! Typed-local allocation (§6 "typed-local declaration").
//!
//! Each emitted method owns one [`LocalTable`] mapping a source name to the
//! slot/representation the emitter chose for it. Slots are allocated in
//! declaration order and never reused within a method, matching the
//! `tsz-emitter` destructuring-state convention of a monotonic counter per
//! scope (`emit_context::DestructuringState::next_temp_var`) generalized
//! from "next temp var name" to "next typed slot".

use rustc_hash::{FxHashMap, FxHashSet};

use crate::instr::{Instr, LocalSlot, LocalType};

#[derive(Debug, Default)]
pub struct LocalTable {
    next: u32,
    named: FxHashMap<String, LocalSlot>,
    types: FxHashMap<LocalSlot, LocalType>,
}

impl LocalTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh anonymous temporary slot (used for hoisting
    /// argument expressions ahead of a call per §4.6's await-in-argument
    /// rule, and for destructuring temporaries).
    pub fn alloc_temp(&mut self, ty: LocalType) -> LocalSlot {
        let slot = LocalSlot(self.next);
        self.next += 1;
        self.types.insert(slot, ty);
        slot
    }

    /// Allocates (or returns the existing) slot for a source-level name.
    pub fn declare(&mut self, name: &str, ty: LocalType) -> LocalSlot {
        if let Some(existing) = self.named.get(name) {
            return *existing;
        }
        let slot = self.alloc_temp(ty);
        self.named.insert(name.to_string(), slot);
        slot
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<LocalSlot> {
        self.named.get(name).copied()
    }

    #[must_use]
    pub fn type_of(&self, slot: LocalSlot) -> Option<LocalType> {
        self.types.get(&slot).copied()
    }

    /// Names of every source-level binding declared so far, used as the
    /// capture-analysis boundary when lowering a nested arrow/function
    /// expression (§4.6 "Closures").
    #[must_use]
    pub fn declared_names(&self) -> FxHashSet<String> {
        self.named.keys().cloned().collect()
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.next
    }

    /// Emits the `DeclareLocal` prologue instructions for every slot
    /// allocated so far, in allocation order.
    #[must_use]
    pub fn declare_instructions(&self) -> Vec<Instr> {
        let mut slots: Vec<LocalSlot> = self.types.keys().copied().collect();
        slots.sort();
        slots
            .into_iter()
            .map(|slot| Instr::DeclareLocal { slot, ty: self.types[&slot] })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaring_the_same_name_twice_returns_the_same_slot() {
        let mut table = LocalTable::new();
        let a = table.declare("x", LocalType::Double);
        let b = table.declare("x", LocalType::Double);
        assert_eq!(a, b);
        assert_eq!(table.count(), 1);
    }

    #[test]
    fn temps_never_collide_with_named_locals() {
        let mut table = LocalTable::new();
        let named = table.declare("x", LocalType::Double);
        let temp = table.alloc_temp(LocalType::Boxed);
        assert_ne!(named, temp);
    }
}

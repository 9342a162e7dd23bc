//! ES2022 private-slot brand checking (§4.6).
//!
//! Private instance fields are not lowered to ordinary (if name-mangled)
//! fields: they are stored in a per-class weak mapping from instance to a
//! string-keyed map — the class's "brand". Every read or write checks that
//! the receiver carries the declaring class's brand before touching the
//! slot; a missing brand is a runtime type error (`#x` accessed on an
//! object that never went through this class's constructor), matching
//! native JS semantics for private fields rather than just being a
//! differently-named public field.

use rustc_hash::FxHashSet;

/// The compile-time-known set of private instance field names a class
/// declares directly (not inherited — private fields are never inherited;
/// each class has its own brand and its own slot names).
#[derive(Debug, Clone, Default)]
pub struct BrandTable {
    pub class_name: String,
    pub private_fields: FxHashSet<String>,
    pub private_methods: FxHashSet<String>,
    /// Static private fields are ordinary private static slots on the
    /// class object itself (§4.6), not brand-checked per instance.
    pub static_private_fields: FxHashSet<String>,
}

impl BrandTable {
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self { class_name: class_name.into(), ..Default::default() }
    }

    #[must_use]
    pub fn declares_instance_slot(&self, name: &str) -> bool {
        self.private_fields.contains(name) || self.private_methods.contains(name)
    }
}

/// A brand-checked access to be emitted: which class's brand must be
/// present on the receiver, and the slot name within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandedAccess {
    pub class_name: String,
    pub slot_name: String,
    pub is_static: bool,
}

/// Builds the brand-checked access descriptor for `#name` accessed inside
/// `owner`'s methods. Static private fields skip the brand check (§4.6
/// "Static private fields are ordinary private static slots on the class").
#[must_use]
pub fn branded_access(owner: &BrandTable, name: &str) -> BrandedAccess {
    if owner.static_private_fields.contains(name) {
        BrandedAccess { class_name: owner.class_name.clone(), slot_name: name.to_string(), is_static: true }
    } else {
        BrandedAccess { class_name: owner.class_name.clone(), slot_name: name.to_string(), is_static: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_private_field_is_brand_checked() {
        let mut table = BrandTable::new("Counter");
        table.private_fields.insert("count".to_string());
        let access = branded_access(&table, "count");
        assert!(!access.is_static);
        assert_eq!(access.class_name, "Counter");
    }

    #[test]
    fn static_private_field_skips_brand_check() {
        let mut table = BrandTable::new("Counter");
        table.static_private_fields.insert("instances".to_string());
        let access = branded_access(&table, "instances");
        assert!(access.is_static);
    }

    #[test]
    fn declares_instance_slot_covers_fields_and_methods() {
        let mut table = BrandTable::new("C");
        table.private_methods.insert("helper".to_string());
        assert!(table.declares_instance_slot("helper"));
        assert!(!table.declares_instance_slot("missing"));
    }
}

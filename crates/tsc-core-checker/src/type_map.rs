//! `TypeMap` (§3, §6): expression-identity -> resolved `TypeInfo`,
//! populated by the checker and consumed by both back-ends.
//!
//! Write-once per expression node (§3 "Lifecycle"): a second write to the
//! same [`NodeId`] is a checker bug (e.g. double-visiting a node), not a
//! legitimate re-check, so it panics in debug builds rather than silently
//! overwriting what a back-end may already have read.

use rustc_hash::FxHashMap;
use tsc_core_ast::NodeId;
use tsc_core_types::Ty;

#[derive(Debug, Default)]
pub struct TypeMap {
    entries: FxHashMap<NodeId, Ty>,
}

impl TypeMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: NodeId, ty: Ty) {
        debug_assert!(
            self.entries.get(&id).is_none_or(|existing| *existing == ty),
            "TypeMap entry for {id:?} written twice with different types"
        );
        self.entries.insert(id, ty);
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<Ty> {
        self.entries.get(&id).cloned()
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

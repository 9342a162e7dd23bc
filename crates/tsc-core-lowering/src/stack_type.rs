//! The coarse evaluation-stack type tracker (§4.6 "Stack type tracking").
//!
//! Both back-ends need to know, at each point in an expression's lowering,
//! what representation is sitting on the evaluation stack so they can
//! decide whether a box/unbox is needed before the next operation. This is
//! *not* the full `TypeInfo` — it is a coarse four-way (plus "unknown")
//! split that is cheap to compute and cheap to compare.

use tsc_core_types::model::{PrimitiveKind, TypeInfo};
use tsc_core_types::Ty;

/// What representation is on the evaluation stack. `Unknown` always means
/// "already boxed as a reference" (§4.6): every other variant names an
/// unboxed native representation a back-end may choose to keep on the
/// stack a little longer before materializing a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackType {
    Unknown,
    Double,
    Boolean,
    String,
    Null,
}

impl StackType {
    /// Whether a value of this stack type is already boxed. Only `Unknown`
    /// is boxed; every other variant is an unboxed native value that must
    /// be boxed before it can be stored into a field, passed where a boxed
    /// reference is expected, or compared by reference.
    #[must_use]
    pub fn is_boxed(self) -> bool {
        matches!(self, StackType::Unknown)
    }
}

/// Classifies a resolved `TypeInfo` into the coarse stack representation a
/// back-end would natively hold it in, before any boxing decision.
///
/// Literal types take their widened primitive's representation: a
/// `NumberLiteral` still lives in a native double on the stack, the literal
/// narrowing only matters to the checker.
#[must_use]
pub fn stack_type_of(ty: &Ty) -> StackType {
    match &**ty {
        TypeInfo::Primitive(PrimitiveKind::Number) | TypeInfo::NumberLiteral(..) => StackType::Double,
        TypeInfo::Primitive(PrimitiveKind::Boolean) | TypeInfo::BooleanLiteral(_) => StackType::Boolean,
        TypeInfo::StringType | TypeInfo::StringLiteral(_) => StackType::String,
        TypeInfo::Null => StackType::Null,
        _ => StackType::Unknown,
    }
}

/// Whether a value currently tracked as `from` needs an explicit box
/// operation before it can be used as `to`. A back-end calls this at
/// every stack-consuming site (argument passing, field store, return) to
/// avoid redundant box/unbox pairs (§9 "Dynamic typing from the source
/// language").
#[must_use]
pub fn needs_box(from: StackType, to: StackType) -> bool {
    !from.is_boxed() && to.is_boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsc_core_types::well_known;

    #[test]
    fn number_is_double_on_stack() {
        assert_eq!(stack_type_of(&well_known::number()), StackType::Double);
    }

    #[test]
    fn class_instances_are_unknown_ie_boxed() {
        let ty = TypeInfo::Object.rc();
        assert_eq!(stack_type_of(&ty), StackType::Unknown);
        assert!(StackType::Unknown.is_boxed());
    }

    #[test]
    fn boxing_is_needed_only_moving_into_boxed_context() {
        assert!(needs_box(StackType::Double, StackType::Unknown));
        assert!(!needs_box(StackType::Unknown, StackType::Double));
        assert!(!needs_box(StackType::Double, StackType::Double));
    }
}

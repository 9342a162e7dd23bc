//! Contextual typing (§4.3): when a target type is known, array/object
//! literals are checked element/property-wise against it rather than
//! inferred bottom-up and then compared.

use tsc_core_types::model::*;

/// The expected type for array literal element `index`, given a contextual
/// target type. Handles tuples (positional + rest) and plain arrays
/// (every element shares the same expected type). Returns `None` when the
/// target isn't array-shaped, in which case the caller falls back to
/// bottom-up inference.
#[must_use]
pub fn array_element_context(target: &Ty, index: usize) -> Option<Ty> {
    let target = &tsc_core_types::normalize::force(target);
    match &**target {
        TypeInfo::Array(el) => Some(el.clone()),
        TypeInfo::Tuple { elements, rest, .. } => elements
            .get(index)
            .map(|e| e.ty.clone())
            .or_else(|| rest.clone()),
        TypeInfo::Union(members) => {
            // Prefer the first array/tuple-shaped member; contextual typing
            // against a union target is inherently a heuristic.
            members.iter().find_map(|m| array_element_context(m, index))
        }
        _ => None,
    }
}

/// The expected type for object literal property `name`, given a
/// contextual record/interface target.
#[must_use]
pub fn object_property_context(target: &Ty, name: &str) -> Option<Ty> {
    let target = &tsc_core_types::normalize::force(target);
    match &**target {
        TypeInfo::Record(r) => r.fields.get(name).cloned().or_else(|| r.string_index.clone()),
        TypeInfo::Interface(i) => i.members.get(name).cloned().or_else(|| i.string_index.clone()),
        TypeInfo::Union(members) => members.iter().find_map(|m| object_property_context(m, name)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_context_is_positional() {
        let tuple = TypeInfo::Tuple {
            elements: vec![
                TupleElement { ty: well_known::string(), kind: TupleElementKind::Required, label: None },
                TupleElement { ty: well_known::number(), kind: TupleElementKind::Required, label: None },
            ],
            required_count: 2,
            rest: None,
        }
        .rc();
        assert_eq!(array_element_context(&tuple, 0), Some(well_known::string()));
        assert_eq!(array_element_context(&tuple, 1), Some(well_known::number()));
        assert_eq!(array_element_context(&tuple, 2), None);
    }
}

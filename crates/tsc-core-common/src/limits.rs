//! Centralized recursion and expansion limits.
//!
//! Every recursive algorithm in the type system (alias expansion, generic
//! instantiation, template-literal expansion) bails out with a structured
//! [`crate::diagnostics::ErrorKind::Overflow`] rather than overflowing the
//! stack or looping forever on pathological input. Keeping the numbers here,
//! rather than scattered as magic constants at each call site, means there is
//! one place to retune them.

/// Maximum depth for type-alias expansion (§4.2). Re-entering the same alias
/// name past this depth is almost certainly a bug in the input, not a
/// legitimately deep type.
pub const MAX_TYPE_ALIAS_EXPANSION_DEPTH: u32 = 100;

/// Maximum number of concrete string combinations a template literal type
/// may expand to (§4.2, §8 property 10) before it is treated as an error
/// instead of enumerated.
pub const MAX_TEMPLATE_LITERAL_COMBINATIONS: usize = 10_000;

/// Maximum depth for generic type instantiation before the solver gives up
/// and reports the instantiation as excessively deep.
pub const MAX_GENERIC_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum depth for recursive assignability checks (`IsAssignable`). Deeply
/// self-referential structural types (e.g. `interface I { self: I }`) are
/// legal, but the recursion must terminate via cycle detection; this is the
/// hard backstop if cycle detection somehow misses a case.
pub const MAX_ASSIGNABILITY_DEPTH: u32 = 200;

/// Maximum depth for nested expression type-checking, guarding against stack
/// overflow on pathologically nested expressions.
pub const MAX_EXPR_CHECK_DEPTH: u32 = 500;

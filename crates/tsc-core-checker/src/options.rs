//! `CheckerOptions` (SPEC_FULL §1 "Configuration"): the handful of toggles
//! this core's Non-goals leave meaningful. Named after
//! `tsz-checker::context::CheckerOptions`.

/// Depth/expansion overrides layered over `tsc_core_common::limits`'s
/// centralized constants. `None` means "use the shared default".
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitOverrides {
    pub max_assignability_depth: Option<u32>,
    pub max_expr_check_depth: Option<u32>,
    pub max_generic_instantiation_depth: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
pub struct CheckerOptions {
    /// Whether `null`/`undefined` are excluded from every type unless a
    /// union mentions them explicitly (TypeScript's `strictNullChecks`).
    pub strict_null_checks: bool,
    /// Whether an inferred `any` (e.g. an un-annotated parameter) is a
    /// diagnostic rather than a silent `any`.
    pub no_implicit_any: bool,
    /// Selects the covariant-vs-bivariant function-parameter check the
    /// spec's Open Questions discuss. This core always applies the
    /// covariant rule (see `DESIGN.md`); this flag is carried for
    /// back-end/API parity with the ground truth and is currently
    /// informational only.
    pub strict_function_types: bool,
    pub limits: LimitOverrides,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            strict_null_checks: true,
            no_implicit_any: false,
            strict_function_types: true,
            limits: LimitOverrides::default(),
        }
    }
}

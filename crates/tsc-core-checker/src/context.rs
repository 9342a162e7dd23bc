//! The checker's scoped, explicit call-stack state (§5 "Shared state", §9
//! "Global mutable 'current class / current function' state"): current
//! enclosing function return type, current class/`this` type, and
//! loop/switch/label bookkeeping — all saved and restored on scope exit
//! rather than held as module-global variables.

use crate::error::{CheckError, CheckResult};
use crate::options::CheckerOptions;
use crate::type_map::TypeMap;
use tsc_core_ast::NodeId;
use tsc_core_common::diagnostics::{Diagnostic, DiagnosticCategory, ErrorKind};
use tsc_core_common::position::{LineMap, Location};
use tsc_core_common::Span;
use tsc_core_types::env::TypeEnvironment;
use tsc_core_types::parser::TypeParser;
use tsc_core_types::Ty;

#[derive(Debug, Clone)]
pub struct FunctionContext {
    pub return_type: Ty,
    pub is_async: bool,
    pub is_generator: bool,
}

#[derive(Debug, Clone)]
pub struct ClassContext {
    pub this_type: Ty,
    pub super_type: Option<Ty>,
    pub is_static_member: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTarget {
    Loop,
    Switch,
    Plain,
}

pub struct Checker {
    pub env: TypeEnvironment,
    pub type_map: TypeMap,
    pub options: CheckerOptions,
    file: String,
    line_map: LineMap,
    function_stack: Vec<FunctionContext>,
    class_stack: Vec<ClassContext>,
    loop_depth: u32,
    switch_depth: u32,
    labels: Vec<(String, LabelTarget)>,
    expr_depth: u32,
    type_alias_stack: Vec<String>,
    next_synthetic_id: u32,
}

impl Checker {
    #[must_use]
    pub fn new(file: impl Into<String>, source: &str, options: CheckerOptions) -> Self {
        Self {
            env: TypeEnvironment::new(),
            type_map: TypeMap::new(),
            options,
            file: file.into(),
            line_map: LineMap::build(source),
            function_stack: Vec::new(),
            class_stack: Vec::new(),
            loop_depth: 0,
            switch_depth: 0,
            labels: Vec::new(),
            expr_depth: 0,
            type_alias_stack: Vec::new(),
            next_synthetic_id: 1 << 30,
        }
    }

    #[must_use]
    pub fn location(&self, span: Span) -> Location {
        let start = self.line_map.offset_to_position(span.start);
        let end = self.line_map.offset_to_position(span.end);
        Location::new(self.file.clone(), tsc_core_common::position::Range::new(start, end))
    }

    pub fn error<T>(&self, kind: ErrorKind, code: u32, message: impl Into<String>, span: Span) -> CheckResult<T> {
        Err(CheckError(Diagnostic {
            category: DiagnosticCategory::Error,
            kind,
            code,
            message: message.into(),
            location: self.location(span),
        }))
    }

    /// A `NodeId` for a type parsed or synthesized mid-check (e.g. a
    /// contextual element type) that has no source node of its own but
    /// still needs a `TypeMap` slot.
    pub fn synthetic_id(&mut self) -> NodeId {
        let id = NodeId(self.next_synthetic_id);
        self.next_synthetic_id += 1;
        id
    }

    pub fn record_type(&mut self, id: NodeId, ty: Ty) {
        self.type_map.record(id, ty);
    }

    /// Parses a textual type annotation against the current environment
    /// (§4.2). Resolution errors are reported as `ErrorKind::Resolution`.
    pub fn resolve_type(&self, text: &str, span: Span) -> CheckResult<Ty> {
        let mut parser = TypeParser::new(&self.env);
        parser.parse(text).map_err(|e| {
            CheckError(Diagnostic {
                category: DiagnosticCategory::Error,
                kind: ErrorKind::Resolution,
                code: tsc_core_common::diagnostics::diagnostic_codes::UNKNOWN_TYPE_NAME,
                message: e.to_string(),
                location: self.location(span),
            })
        })
    }

    pub fn resolve_type_opt(&self, text: &Option<tsc_core_ast::TypeAnnotation>) -> CheckResult<Option<Ty>> {
        match text {
            Some(ann) => Ok(Some(self.resolve_type(&ann.text, ann.span)?)),
            None => Ok(None),
        }
    }

    // --- function return-type stack -------------------------------------

    pub fn push_function(&mut self, ctx: FunctionContext) {
        self.function_stack.push(ctx);
    }

    pub fn pop_function(&mut self) {
        self.function_stack.pop();
    }

    #[must_use]
    pub fn current_function(&self) -> Option<&FunctionContext> {
        self.function_stack.last()
    }

    // --- class / this stack ----------------------------------------------

    pub fn push_class(&mut self, ctx: ClassContext) {
        self.class_stack.push(ctx);
    }

    pub fn pop_class(&mut self) {
        self.class_stack.pop();
    }

    #[must_use]
    pub fn current_class(&self) -> Option<&ClassContext> {
        self.class_stack.last()
    }

    // --- loop / switch / label bookkeeping --------------------------------

    pub fn enter_loop(&mut self) {
        self.loop_depth += 1;
    }

    pub fn leave_loop(&mut self) {
        self.loop_depth -= 1;
    }

    pub fn enter_switch(&mut self) {
        self.switch_depth += 1;
    }

    pub fn leave_switch(&mut self) {
        self.switch_depth -= 1;
    }

    #[must_use]
    pub fn in_loop(&self) -> bool {
        self.loop_depth > 0
    }

    #[must_use]
    pub fn in_loop_or_switch(&self) -> bool {
        self.loop_depth > 0 || self.switch_depth > 0
    }

    pub fn push_label(&mut self, name: String, target: LabelTarget, span: Span) -> CheckResult<()> {
        if self.labels.iter().any(|(n, _)| n == &name) {
            return self.error(
                ErrorKind::Structural,
                tsc_core_common::diagnostics::diagnostic_codes::LABEL_SHADOW,
                format!("Label '{name}' is already declared in this scope."),
                span,
            );
        }
        self.labels.push((name, target));
        Ok(())
    }

    pub fn pop_label(&mut self) {
        self.labels.pop();
    }

    #[must_use]
    pub fn label_target(&self, name: &str) -> Option<LabelTarget> {
        self.labels.iter().rev().find(|(n, _)| n == name).map(|(_, t)| *t)
    }

    pub fn enter_expr(&mut self, span: Span) -> CheckResult<()> {
        self.expr_depth += 1;
        let max = self
            .options
            .limits
            .max_expr_check_depth
            .unwrap_or(tsc_core_common::limits::MAX_EXPR_CHECK_DEPTH);
        if self.expr_depth > max {
            return self.error(
                ErrorKind::Overflow,
                tsc_core_common::diagnostics::diagnostic_codes::EXPRESSION_NESTING_LIMIT,
                "Expression is nested too deeply to type-check.",
                span,
            );
        }
        Ok(())
    }

    pub fn leave_expr(&mut self) {
        self.expr_depth -= 1;
    }

    // --- type-alias expansion stack (§4.2) --------------------------------

    /// Pushes `name` onto the stack of type aliases currently being
    /// resolved, raising `ErrorKind::Overflow`/`TYPE_ALIAS_EXPANSION_LIMIT`
    /// if that re-entrant nesting has gone past `MAX_TYPE_ALIAS_EXPANSION_DEPTH`
    /// (§4.2 "Expansion depth is capped").
    pub fn enter_type_alias(&mut self, name: String, span: Span) -> CheckResult<()> {
        self.type_alias_stack.push(name);
        if self.type_alias_stack.len() as u32 > tsc_core_common::limits::MAX_TYPE_ALIAS_EXPANSION_DEPTH {
            return self.error(
                ErrorKind::Overflow,
                tsc_core_common::diagnostics::diagnostic_codes::TYPE_ALIAS_EXPANSION_LIMIT,
                "Type alias expansion exceeded the maximum depth.",
                span,
            );
        }
        Ok(())
    }

    pub fn leave_type_alias(&mut self) {
        self.type_alias_stack.pop();
    }
}

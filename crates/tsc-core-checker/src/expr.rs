//! Expression checking (§4.3): the traversal that computes every
//! expression's `TypeInfo`, records it into the `TypeMap`, and enforces
//! assignability/overload/accessibility rules along the way.
//!
//! Contextual typing (array literal against a tuple, object literal
//! against a record/interface) is threaded through as an `Option<&Ty>`
//! "expected type" parameter rather than a side channel, mirroring how the
//! type parameter inference module takes its inputs explicitly.

use crate::builtins;
use crate::classes;
use crate::context::{Checker, FunctionContext};
use crate::contextual;
use crate::inference;
use crate::narrowing;
use crate::overloads::resolve_overload;
use crate::property_access::{check_accessibility, resolve_member};
use tsc_core_ast::*;
use tsc_core_common::diagnostics::{diagnostic_codes, ErrorKind};
use tsc_core_common::Span;
use tsc_core_types::env::ScopeKind;
use tsc_core_types::model::*;
use tsc_core_types::normalize::{is_assignable, make_union};
use tsc_core_types::operator::resolve_binary;

/// Checks an expression with no contextual target type.
pub fn check_expr(ck: &mut Checker, expr: &Expr) -> crate::error::CheckResult<Ty> {
    check_expr_contextual(ck, expr, None)
}

/// Checks an expression against an optional contextual target type
/// (§4.3 "Contextual typing"), recording the resolved type into the
/// `TypeMap` before returning it.
pub fn check_expr_contextual(ck: &mut Checker, expr: &Expr, expected: Option<&Ty>) -> crate::error::CheckResult<Ty> {
    ck.enter_expr(expr.span)?;
    let ty = check_expr_inner(ck, expr, expected);
    ck.leave_expr();
    let ty = ty?;
    ck.record_type(expr.id, ty.clone());
    Ok(ty)
}

fn check_expr_inner(ck: &mut Checker, expr: &Expr, expected: Option<&Ty>) -> crate::error::CheckResult<Ty> {
    match &expr.kind {
        ExprKind::Ident(id) => ck
            .env
            .lookup_variable(&id.name)
            .ok_or(())
            .or_else(|()| ck.error(ErrorKind::Resolution, diagnostic_codes::UNDEFINED_NAME, format!("Cannot find name '{}'.", id.name), expr.span)),
        ExprKind::This => ck
            .current_class()
            .map(|c| c.this_type.clone())
            .ok_or(())
            .or_else(|()| ck.error(ErrorKind::Resolution, diagnostic_codes::UNDEFINED_NAME, "'this' is not available outside a class method.", expr.span)),
        ExprKind::Super => ck
            .current_class()
            .and_then(|c| c.super_type.clone())
            .ok_or(())
            .or_else(|()| ck.error(ErrorKind::Resolution, diagnostic_codes::UNDEFINED_NAME, "'super' is only available in a derived class.", expr.span)),
        ExprKind::NumberLiteral(text) => {
            let value = tsc_core_common::numeric::parse_numeric_literal_value(text).unwrap_or(f64::NAN);
            Ok(TypeInfo::NumberLiteral(text.clone(), value).rc())
        }
        ExprKind::StringLiteral(s) => Ok(TypeInfo::StringLiteral(s.clone()).rc()),
        ExprKind::BooleanLiteral(b) => Ok(TypeInfo::BooleanLiteral(*b).rc()),
        ExprKind::NullLiteral => Ok(well_known::null()),
        ExprKind::UndefinedLiteral => Ok(well_known::undefined()),
        ExprKind::BigIntLiteral(_) => Ok(TypeInfo::BigInt.rc()),
        ExprKind::TemplateLiteral { quasis, exprs } => {
            for e in exprs {
                check_expr(ck, e)?;
            }
            if exprs.is_empty() {
                Ok(TypeInfo::StringLiteral(quasis.join("")).rc())
            } else {
                Ok(well_known::string())
            }
        }
        ExprKind::TaggedTemplate { tag, exprs, .. } => {
            let tag_ty = check_expr(ck, tag)?;
            for e in exprs {
                check_expr(ck, e)?;
            }
            Ok(match &*tag_ty {
                TypeInfo::Function(f) => f.ret.clone(),
                _ => well_known::any(),
            })
        }
        ExprKind::RegExpLiteral(_) => Ok(TypeInfo::RegExp.rc()),
        ExprKind::ArrayLiteral(elements) => check_array_literal(ck, elements, expected),
        ExprKind::ObjectLiteral(props) => check_object_literal(ck, props, expected),
        ExprKind::Paren(inner) => check_expr_contextual(ck, inner, expected),
        ExprKind::Function(f) => check_function_expr(ck, f),
        ExprKind::Arrow(a) => check_arrow_expr(ck, a, expected),
        ExprKind::ClassExpr(decl) => {
            classes::predeclare_classes(ck, &[decl.as_ref()]);
            classes::check_class_decl(ck, decl, expr.span)
        }
        ExprKind::Unary { op, operand, .. } => check_unary(ck, *op, operand, expr.span),
        ExprKind::Binary { op, left, right } => check_binary(ck, *op, left, right, expr.span),
        ExprKind::Logical { op, left, right } => check_logical(ck, *op, left, right, expected),
        ExprKind::Assign { op, target, value } => check_assign(ck, *op, target, value, expr.span),
        ExprKind::Conditional { test, consequent, alternate } => check_conditional(ck, test, consequent, alternate, expected),
        ExprKind::Call { callee, type_args, args, optional } => check_call(ck, callee, type_args, args, *optional, expr.span),
        ExprKind::New { callee, args, .. } => check_new(ck, callee, args, expr.span),
        ExprKind::Member { object, property, optional } => check_member(ck, object, property, *optional, expr.span),
        ExprKind::NonNull(inner) => {
            let ty = check_expr(ck, inner)?;
            Ok(strip_nullish(&ty))
        }
        ExprKind::TypeAssertion { expr: inner, type_ann } | ExprKind::AsExpr { expr: inner, type_ann, .. } => {
            check_expr(ck, inner)?;
            ck.resolve_type(&type_ann.text, type_ann.span)
        }
        ExprKind::SatisfiesExpr { expr: inner, type_ann } => {
            let actual = check_expr(ck, inner)?;
            let target = ck.resolve_type(&type_ann.text, type_ann.span)?;
            if !is_assignable(&target, &actual) {
                return ck.error(
                    ErrorKind::Type,
                    diagnostic_codes::NOT_ASSIGNABLE,
                    format!("Type '{actual}' does not satisfy the expected type '{target}'."),
                    expr.span,
                );
            }
            Ok(actual)
        }
        ExprKind::Await(inner) => {
            let ty = check_expr(ck, inner)?;
            Ok(match &*ty {
                TypeInfo::Promise(v) => v.clone(),
                _ => ty,
            })
        }
        ExprKind::Yield { arg, .. } => {
            if let Some(a) = arg {
                check_expr(ck, a)?;
            }
            Ok(well_known::any())
        }
        ExprKind::Spread(inner) => check_expr(ck, inner),
        ExprKind::Sequence(exprs) => {
            let mut last = well_known::undefined();
            for e in exprs {
                last = check_expr(ck, e)?;
            }
            Ok(last)
        }
        ExprKind::Private(_) => Ok(well_known::any()),
    }
}

fn strip_nullish(ty: &Ty) -> Ty {
    match &**ty {
        TypeInfo::Union(members) => make_union(members.iter().filter(|m| !m.is_nullish()).cloned().collect()),
        _ if ty.is_nullish() => well_known::never(),
        _ => ty.clone(),
    }
}

fn check_array_literal(ck: &mut Checker, elements: &[Option<ArrayElement>], expected: Option<&Ty>) -> crate::error::CheckResult<Ty> {
    let mut element_types = Vec::with_capacity(elements.len());
    for (i, el) in elements.iter().enumerate() {
        let Some(el) = el else {
            element_types.push(well_known::undefined());
            continue;
        };
        let slot_expected = expected.and_then(|t| contextual::array_element_context(t, i));
        match el {
            ArrayElement::Item(e) => element_types.push(check_expr_contextual(ck, e, slot_expected.as_ref())?),
            ArrayElement::Spread(e) => {
                let spread_ty = check_expr(ck, e)?;
                if let TypeInfo::Array(inner) = &*spread_ty {
                    element_types.push(inner.clone());
                } else if let TypeInfo::Tuple { elements: tel, .. } = &*spread_ty {
                    for tel in tel {
                        element_types.push(tel.ty.clone());
                    }
                } else {
                    element_types.push(well_known::any());
                }
            }
        }
    }
    if let Some(target) = expected {
        if let TypeInfo::Tuple { elements: texels, required_count, rest } = &**target {
            if element_types.len() < *required_count {
                return ck.error(
                    ErrorKind::Type,
                    diagnostic_codes::TUPLE_ARITY_MISMATCH,
                    format!("Tuple type '{target}' requires {required_count} elements, got {}.", element_types.len()),
                    Span::new(0, 0),
                );
            }
            let tuple_elements: Vec<TupleElement> = element_types
                .into_iter()
                .enumerate()
                .map(|(i, ty)| match texels.get(i) {
                    Some(te) => TupleElement { ty, kind: te.kind, label: te.label.clone() },
                    None => TupleElement { ty, kind: TupleElementKind::Required, label: None },
                })
                .collect();
            let _ = rest;
            return Ok(TypeInfo::Tuple { required_count: *required_count, elements: tuple_elements, rest: rest.clone() }.rc());
        }
    }
    let element = make_union(element_types);
    Ok(TypeInfo::Array(if matches!(&*element, TypeInfo::Never) { well_known::any() } else { element }).rc())
}

fn check_object_literal(ck: &mut Checker, props: &[ObjectProperty], expected: Option<&Ty>) -> crate::error::CheckResult<Ty> {
    let mut record = RecordType::empty();
    for prop in props {
        match prop {
            ObjectProperty::KeyValue { key, value } => {
                let name = property_key_name(key);
                let slot_expected = name.as_ref().and_then(|n| expected.and_then(|t| contextual::object_property_context(t, n)));
                let ty = check_expr_contextual(ck, value, slot_expected.as_ref())?;
                if let Some(name) = name {
                    record.fields.insert(name, ty);
                } else {
                    check_expr(ck, match key {
                        PropertyKey::Computed(e) => e,
                        _ => unreachable!(),
                    })?;
                    record.string_index = Some(make_union(vec![record.string_index.clone().unwrap_or_else(well_known::never), ty]));
                }
            }
            ObjectProperty::Shorthand(ident) => {
                let ty = ck
                    .env
                    .lookup_variable(&ident.name)
                    .ok_or(())
                    .or_else(|()| ck.error(ErrorKind::Resolution, diagnostic_codes::UNDEFINED_NAME, format!("Cannot find name '{}'.", ident.name), ident.span))?;
                record.fields.insert(ident.name.clone(), ty);
            }
            ObjectProperty::Method { key, func } => {
                let name = property_key_name(key);
                let ty = check_function_expr(ck, func)?;
                if let Some(name) = name {
                    record.fields.insert(name, ty);
                }
            }
            ObjectProperty::Getter { key, func } => {
                let name = property_key_name(key);
                let ty = check_function_expr(ck, func)?;
                let ret = match &*ty {
                    TypeInfo::Function(f) => f.ret.clone(),
                    _ => well_known::any(),
                };
                if let Some(name) = name {
                    record.fields.insert(name, ret);
                }
            }
            ObjectProperty::Setter { key, func } => {
                let name = property_key_name(key);
                check_function_expr(ck, func)?;
                if let Some(name) = name {
                    record.fields.entry(name).or_insert_with(well_known::any);
                }
            }
            ObjectProperty::Spread(e) => {
                let ty = check_expr(ck, e)?;
                if let TypeInfo::Record(r) = &*ty {
                    for (k, v) in &r.fields {
                        record.fields.insert(k.clone(), v.clone());
                    }
                }
            }
        }
    }
    Ok(TypeInfo::Record(record).rc())
}

fn property_key_name(key: &PropertyKey) -> Option<String> {
    match key {
        PropertyKey::Ident(s) | PropertyKey::StringLiteral(s) | PropertyKey::NumberLiteral(s) => Some(s.clone()),
        PropertyKey::Computed(_) => None,
    }
}

pub(crate) fn build_function_type(ck: &mut Checker, type_params: &[TypeParam], params: &[Param], return_type: &Option<TypeAnnotation>) -> crate::error::CheckResult<(FunctionType, Vec<TypeParamDecl>)> {
    let mut decls = Vec::with_capacity(type_params.len());
    for tp in type_params {
        let constraint = match &tp.constraint {
            Some(ann) => Some(ck.resolve_type(&ann.text, ann.span)?),
            None => None,
        };
        let default = match &tp.default {
            Some(ann) => Some(ck.resolve_type(&ann.text, ann.span)?),
            None => None,
        };
        let decl = TypeParamDecl { name: tp.name.clone(), constraint: constraint.clone(), default: default.clone() };
        ck.env.declare_type_parameter(tp.name.clone(), TypeInfo::TypeParameter { name: tp.name.clone(), constraint, default }.rc());
        decls.push(decl);
    }
    let mut param_types = Vec::with_capacity(params.len());
    let mut min_arity = 0;
    let mut has_rest = false;
    for (i, p) in params.iter().enumerate() {
        let ty = match &p.type_ann {
            Some(ann) => ck.resolve_type(&ann.text, ann.span)?,
            None => well_known::any(),
        };
        if p.is_rest {
            has_rest = true;
        } else if !p.optional && p.default.is_none() {
            min_arity = i + 1;
        }
        param_types.push(ty);
    }
    let ret = match return_type {
        Some(ann) => ck.resolve_type(&ann.text, ann.span)?,
        None => well_known::void(),
    };
    Ok((FunctionType { params: param_types, ret, min_arity, has_rest, this_type: None }, decls))
}

pub(crate) fn check_function_body(ck: &mut Checker, params: &[Param], body: &Option<Vec<Stmt>>, sig: &FunctionType, is_async: bool, is_generator: bool) -> crate::error::CheckResult<()> {
    let Some(body) = body else { return Ok(()) };
    ck.env.push_scope(ScopeKind::Function);
    for (p, ty) in params.iter().zip(sig.params.iter()) {
        let mut names = Vec::new();
        p.pattern.bound_names(&mut names);
        for name in names {
            ck.env.declare_variable(name, ty.clone(), false);
        }
    }
    let declared_ret = if is_async {
        match &*sig.ret {
            TypeInfo::Promise(inner) => inner.clone(),
            _ => sig.ret.clone(),
        }
    } else {
        sig.ret.clone()
    };
    ck.push_function(FunctionContext { return_type: declared_ret, is_async, is_generator });
    let result = crate::stmt::check_block(ck, body);
    ck.pop_function();
    ck.env.pop_scope();
    result
}

fn check_function_expr(ck: &mut Checker, f: &FunctionExpr) -> crate::error::CheckResult<Ty> {
    ck.env.push_scope(ScopeKind::Function);
    let (sig, type_params) = build_function_type(ck, &f.type_params, &f.params, &f.return_type)?;
    check_function_body(ck, &f.params, &f.body, &sig, f.is_async, f.is_generator)?;
    ck.env.pop_scope();
    Ok(if type_params.is_empty() {
        TypeInfo::Function(sig).rc()
    } else {
        TypeInfo::GenericFunction(GenericFunction { type_params, params: sig.params, ret: sig.ret, min_arity: sig.min_arity, has_rest: sig.has_rest, this_type: None }).rc()
    })
}

fn check_arrow_expr(ck: &mut Checker, a: &ArrowExpr, expected: Option<&Ty>) -> crate::error::CheckResult<Ty> {
    ck.env.push_scope(ScopeKind::Function);
    let (mut sig, type_params) = build_function_type(ck, &a.type_params, &a.params, &a.return_type)?;
    if a.return_type.is_none() {
        if let Some(TypeInfo::Function(expected_fn)) = expected.map(|t| &**t) {
            sig.ret = expected_fn.ret.clone();
        }
    }
    match &a.body {
        ArrowBody::Block(stmts) => {
            check_function_body(ck, &a.params, &Some(stmts.clone()), &sig, a.is_async, false)?;
        }
        ArrowBody::Expr(e) => {
            for (p, ty) in a.params.iter().zip(sig.params.iter()) {
                let mut names = Vec::new();
                p.pattern.bound_names(&mut names);
                for name in names {
                    ck.env.declare_variable(name, ty.clone(), false);
                }
            }
            let expected_ret = if a.return_type.is_some() { Some(sig.ret.clone()) } else { None };
            let body_ty = check_expr_contextual(ck, e, expected_ret.as_ref())?;
            if a.return_type.is_none() {
                sig.ret = if a.is_async { TypeInfo::Promise(body_ty).rc() } else { body_ty };
            }
        }
    }
    ck.env.pop_scope();
    Ok(if type_params.is_empty() {
        TypeInfo::Function(sig).rc()
    } else {
        TypeInfo::GenericFunction(GenericFunction { type_params, params: sig.params, ret: sig.ret, min_arity: sig.min_arity, has_rest: sig.has_rest, this_type: None }).rc()
    })
}

fn check_unary(ck: &mut Checker, op: UnaryOp, operand: &Expr, span: Span) -> crate::error::CheckResult<Ty> {
    match op {
        UnaryOp::Typeof => {
            check_expr(ck, operand)?;
            Ok(well_known::string())
        }
        UnaryOp::Void => {
            check_expr(ck, operand)?;
            Ok(well_known::undefined())
        }
        UnaryOp::Delete => {
            check_expr(ck, operand)?;
            Ok(well_known::boolean())
        }
        UnaryOp::Not => {
            check_expr(ck, operand)?;
            Ok(well_known::boolean())
        }
        UnaryOp::Increment | UnaryOp::Decrement => {
            let ty = check_expr(ck, operand)?;
            let _ = ty;
            Ok(well_known::number())
        }
        UnaryOp::Plus | UnaryOp::Minus | UnaryOp::BitNot => {
            let ty = check_expr(ck, operand)?;
            if matches!(&*ty, TypeInfo::BigInt) && op != UnaryOp::Plus {
                Ok(TypeInfo::BigInt.rc())
            } else {
                let _ = span;
                Ok(well_known::number())
            }
        }
    }
}

fn check_binary(ck: &mut Checker, op: BinaryOp, left: &Expr, right: &Expr, span: Span) -> crate::error::CheckResult<Ty> {
    let l = check_expr(ck, left)?;
    let r = check_expr(ck, right)?;
    resolve_binary(op, &l, &r).map_err(|e| {
        crate::error::CheckError(tsc_core_common::Diagnostic {
            category: tsc_core_common::diagnostics::DiagnosticCategory::Error,
            kind: ErrorKind::Type,
            code: diagnostic_codes::NOT_ASSIGNABLE,
            message: e.to_string(),
            location: ck.location(span),
        })
    })
}

fn check_logical(ck: &mut Checker, op: LogicalOp, left: &Expr, right: &Expr, expected: Option<&Ty>) -> crate::error::CheckResult<Ty> {
    match op {
        LogicalOp::And => {
            let n = narrowing::analyze(&ck.env, left);
            let l = check_expr(ck, left)?;
            ck.env.push_scope(ScopeKind::Block);
            for (name, ty) in &n.then {
                ck.env.update_variable(name, ty.clone());
            }
            let r = check_expr_contextual(ck, right, expected);
            ck.env.pop_scope();
            let r = r?;
            Ok(make_union(vec![r, falsy_residual(&l)]))
        }
        LogicalOp::Or => {
            let l = check_expr(ck, left)?;
            let r = check_expr_contextual(ck, right, expected)?;
            Ok(make_union(vec![truthy_residual(&l), r]))
        }
        LogicalOp::NullishCoalescing => {
            let l = check_expr(ck, left)?;
            let r = check_expr_contextual(ck, right, expected)?;
            Ok(make_union(vec![strip_nullish(&l), r]))
        }
    }
}

fn falsy_residual(ty: &Ty) -> Ty {
    match &**ty {
        TypeInfo::Union(members) => make_union(members.iter().filter(|m| is_possibly_falsy(m)).cloned().collect()),
        _ if is_possibly_falsy(ty) => ty.clone(),
        _ => well_known::never(),
    }
}

fn truthy_residual(ty: &Ty) -> Ty {
    match &**ty {
        TypeInfo::Union(members) => make_union(members.iter().filter(|m| !is_definitely_falsy(m)).cloned().collect()),
        _ if !is_definitely_falsy(ty) => ty.clone(),
        _ => well_known::never(),
    }
}

fn is_possibly_falsy(ty: &Ty) -> bool {
    !matches!(&**ty, TypeInfo::BooleanLiteral(true) | TypeInfo::NumberLiteral(_, n) if *n != 0.0) || matches!(&**ty, TypeInfo::StringType | TypeInfo::Primitive(_) | TypeInfo::Unknown | TypeInfo::Any)
}

fn is_definitely_falsy(ty: &Ty) -> bool {
    matches!(&**ty, TypeInfo::Null | TypeInfo::Undefined | TypeInfo::BooleanLiteral(false) | TypeInfo::Void)
        || matches!(&**ty, TypeInfo::NumberLiteral(_, n) if *n == 0.0)
        || matches!(&**ty, TypeInfo::StringLiteral(s) if s.is_empty())
}

fn check_assign(ck: &mut Checker, op: AssignOp, target: &Expr, value: &Expr, span: Span) -> crate::error::CheckResult<Ty> {
    let target_ty = check_expr(ck, target)?;
    if let ExprKind::Ident(id) = &target.kind {
        if ck.env.is_const_binding(&id.name) {
            return ck.error(ErrorKind::Type, diagnostic_codes::NOT_ASSIGNABLE, format!("Cannot assign to '{}' because it is a constant.", id.name), span);
        }
    }

    // `&&=`, `||=`, `??=` only evaluate and assign the right-hand side
    // conditionally, so the result type is a union of "left unchanged" and
    // "right assigned" rather than a binary-operator result.
    if let Some(residual) = logical_assign_residual(op, &target_ty) {
        let value_ty = check_expr_contextual(ck, value, Some(&target_ty))?;
        if !is_assignable(&target_ty, &value_ty) {
            return ck.error(
                ErrorKind::Type,
                diagnostic_codes::NOT_ASSIGNABLE,
                format!("Type '{value_ty}' is not assignable to type '{target_ty}'."),
                span,
            );
        }
        return Ok(make_union(vec![residual, value_ty]));
    }

    let value_ty = if op == AssignOp::Assign { check_expr_contextual(ck, value, Some(&target_ty))? } else { check_expr(ck, value)? };
    let result = if op == AssignOp::Assign {
        value_ty
    } else {
        let bin_op = compound_to_binary(op);
        resolve_binary(bin_op, &target_ty, &value_ty).map_err(|e| {
            crate::error::CheckError(tsc_core_common::Diagnostic {
                category: tsc_core_common::diagnostics::DiagnosticCategory::Error,
                kind: ErrorKind::Type,
                code: diagnostic_codes::NOT_ASSIGNABLE,
                message: e.to_string(),
                location: ck.location(span),
            })
        })?
    };
    if !is_assignable(&target_ty, &result) {
        return ck.error(
            ErrorKind::Type,
            diagnostic_codes::NOT_ASSIGNABLE,
            format!("Type '{result}' is not assignable to type '{target_ty}'."),
            span,
        );
    }
    // Re-assigning a narrowed variable widens it back to its declared type
    // for the remainder of the enclosing flow (SPEC_FULL §2 "Assignment
    // narrowing").
    if let ExprKind::Ident(id) = &target.kind {
        ck.env.update_variable(&id.name, target_ty.clone());
    }
    Ok(result)
}

/// For the logical compound-assignment operators, the part of `target_ty`
/// that survives when the assignment does *not* fire (e.g. `x ??= y` leaves
/// `x` as-is whenever `x` was not nullish).
fn logical_assign_residual(op: AssignOp, target_ty: &Ty) -> Option<Ty> {
    match op {
        AssignOp::AndAssign => Some(falsy_residual(target_ty)),
        AssignOp::OrAssign => Some(truthy_residual(target_ty)),
        AssignOp::NullishAssign => Some(strip_nullish(target_ty)),
        _ => None,
    }
}

fn compound_to_binary(op: AssignOp) -> BinaryOp {
    match op {
        AssignOp::AddAssign => BinaryOp::Add,
        AssignOp::SubAssign => BinaryOp::Sub,
        AssignOp::MulAssign => BinaryOp::Mul,
        AssignOp::DivAssign => BinaryOp::Div,
        AssignOp::ModAssign => BinaryOp::Mod,
        AssignOp::PowAssign => BinaryOp::Pow,
        AssignOp::BitAndAssign => BinaryOp::BitAnd,
        AssignOp::BitOrAssign => BinaryOp::BitOr,
        AssignOp::BitXorAssign => BinaryOp::BitXor,
        AssignOp::ShlAssign => BinaryOp::Shl,
        AssignOp::ShrAssign => BinaryOp::Shr,
        AssignOp::UShrAssign => BinaryOp::UShr,
        _ => unreachable!("logical assignment operators are handled by logical_assign_residual"),
    }
}

fn check_conditional(ck: &mut Checker, test: &Expr, consequent: &Expr, alternate: &Expr, expected: Option<&Ty>) -> crate::error::CheckResult<Ty> {
    let n = narrowing::analyze(&ck.env, test);
    check_expr(ck, test)?;

    ck.env.push_scope(ScopeKind::Block);
    for (name, ty) in &n.then {
        ck.env.update_variable(name, ty.clone());
    }
    let c = check_expr_contextual(ck, consequent, expected);
    ck.env.pop_scope();
    let c = c?;

    ck.env.push_scope(ScopeKind::Block);
    for (name, ty) in &n.els {
        ck.env.update_variable(name, ty.clone());
    }
    let a = check_expr_contextual(ck, alternate, expected);
    ck.env.pop_scope();
    let a = a?;

    Ok(make_union(vec![c, a]))
}

fn eval_args(ck: &mut Checker, args: &[Argument], param_hints: &[Ty]) -> crate::error::CheckResult<Vec<Ty>> {
    let mut out = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        match arg {
            Argument::Normal(e) => out.push(check_expr_contextual(ck, e, param_hints.get(i))?),
            Argument::Spread(e) => {
                let spread_ty = check_expr(ck, e)?;
                match &*spread_ty {
                    TypeInfo::Array(el) => out.push(el.clone()),
                    TypeInfo::Tuple { elements, .. } => {
                        for el in elements {
                            out.push(el.ty.clone());
                        }
                    }
                    _ => out.push(well_known::any()),
                }
            }
        }
    }
    Ok(out)
}

fn check_call(ck: &mut Checker, callee: &Expr, type_args: &[TypeAnnotation], args: &[Argument], _optional: bool, span: Span) -> crate::error::CheckResult<Ty> {
    let callee_ty = check_expr(ck, callee)?;
    if callee_ty.is_any() {
        for arg in args {
            match arg {
                Argument::Normal(e) | Argument::Spread(e) => {
                    check_expr(ck, e)?;
                }
            }
        }
        return Ok(well_known::any());
    }

    let explicit_type_args = type_args
        .iter()
        .map(|ann| ck.resolve_type(&ann.text, ann.span))
        .collect::<crate::error::CheckResult<Vec<_>>>()?;

    match &*callee_ty {
        TypeInfo::Function(f) => {
            let arg_types = eval_args(ck, args, &f.params)?;
            check_call_arity_and_args(ck, f, &arg_types, span)?;
            Ok(f.ret.clone())
        }
        TypeInfo::OverloadedFunction(o) => {
            let arg_types = eval_args(ck, args, &o.implementation.params)?;
            match resolve_overload(&o.signatures, &arg_types) {
                Ok(sig) => Ok(sig.ret.clone()),
                Err(e) => ck.error(ErrorKind::Type, diagnostic_codes::NO_OVERLOAD_MATCHES, e.to_string(), span),
            }
        }
        TypeInfo::GenericFunction(g) => {
            let arg_types = eval_args(ck, args, &g.params)?;
            let bindings = if explicit_type_args.is_empty() {
                inference::infer(&g.type_params, &g.params, &arg_types)
            } else {
                g.type_params.iter().map(|tp| tp.name.clone()).zip(explicit_type_args.iter().cloned()).collect()
            };
            let params: Vec<Ty> = g.params.iter().map(|p| inference::substitute(p, &bindings)).collect();
            let ret = inference::substitute(&g.ret, &bindings);
            let sig = FunctionType { params, ret: ret.clone(), min_arity: g.min_arity, has_rest: g.has_rest, this_type: None };
            check_call_arity_and_args(ck, &sig, &arg_types, span)?;
            Ok(ret)
        }
        TypeInfo::GenericOverloadedFunction(g) => {
            let arg_types = eval_args(ck, args, &g.implementation.params)?;
            let bindings = inference::infer(&g.type_params, &g.implementation.params, &arg_types);
            let substituted: Vec<FunctionType> = g
                .signatures
                .iter()
                .map(|s| FunctionType {
                    params: s.params.iter().map(|p| inference::substitute(p, &bindings)).collect(),
                    ret: inference::substitute(&s.ret, &bindings),
                    min_arity: s.min_arity,
                    has_rest: s.has_rest,
                    this_type: s.this_type.clone(),
                })
                .collect();
            match resolve_overload(&substituted, &arg_types) {
                Ok(sig) => Ok(sig.ret.clone()),
                Err(e) => ck.error(ErrorKind::Type, diagnostic_codes::NO_OVERLOAD_MATCHES, e.to_string(), span),
            }
        }
        TypeInfo::Interface(i) if !i.call_signatures.is_empty() => {
            let sig = &i.call_signatures[0];
            let arg_types = eval_args(ck, args, &sig.params)?;
            check_call_arity_and_args(ck, sig, &arg_types, span)?;
            Ok(sig.ret.clone())
        }
        _ => ck.error(ErrorKind::Type, diagnostic_codes::NOT_ASSIGNABLE, format!("This expression is not callable: type '{callee_ty}' has no call signatures."), span),
    }
}

fn check_call_arity_and_args(ck: &Checker, sig: &FunctionType, args: &[Ty], span: Span) -> crate::error::CheckResult<()> {
    if args.len() < sig.min_arity || (args.len() > sig.params.len() && !sig.has_rest) {
        return ck.error(
            ErrorKind::Type,
            diagnostic_codes::WRONG_ARGUMENT_COUNT,
            format!("Expected {} arguments, but got {}.", sig.min_arity, args.len()),
            span,
        );
    }
    for (i, arg) in args.iter().enumerate() {
        let expected = match sig.params.get(i) {
            Some(p) => p.clone(),
            None if sig.has_rest => {
                let rest = sig.params.last().cloned().unwrap_or_else(well_known::any);
                match &*rest {
                    TypeInfo::Array(el) => el.clone(),
                    _ => rest,
                }
            }
            None => continue,
        };
        if !is_assignable(&expected, arg) {
            return ck.error(
                ErrorKind::Type,
                diagnostic_codes::NOT_ASSIGNABLE,
                format!("Argument of type '{arg}' is not assignable to parameter of type '{expected}'."),
                span,
            );
        }
    }
    Ok(())
}

fn check_new(ck: &mut Checker, callee: &Expr, args: &[Argument], span: Span) -> crate::error::CheckResult<Ty> {
    let callee_ty = check_expr(ck, callee)?;
    match &*callee_ty {
        TypeInfo::Class(c) => {
            if c.is_abstract {
                return ck.error(ErrorKind::Structural, diagnostic_codes::ABSTRACT_CLASS_INSTANTIATION, format!("Cannot create an instance of the abstract class '{}'.", c.name), span);
            }
            let ctor = c.methods.get("constructor").map(MethodSignature::callable);
            let arg_types = eval_args(ck, args, ctor.map(|c| c.params.as_slice()).unwrap_or(&[]))?;
            if let Some(ctor) = ctor {
                check_call_arity_and_args(ck, ctor, &arg_types, span)?;
            }
            Ok(TypeInfo::Instance(callee_ty.clone()).rc())
        }
        TypeInfo::GenericClass(g) => {
            let arg_types = eval_args(ck, args, &[])?;
            let ctor = g.class.methods.get("constructor").map(MethodSignature::callable);
            let bindings = match ctor {
                Some(ctor) => inference::infer(&g.type_params, &ctor.params, &arg_types),
                None => inference::infer(&g.type_params, &[], &[]),
            };
            let definition = TypeInfo::Class(g.class.clone()).rc();
            Ok(TypeInfo::Instance(
                TypeInfo::InstantiatedGeneric(InstantiatedGeneric {
                    definition,
                    type_arguments: g.type_params.iter().map(|tp| bindings.get(&tp.name).cloned().unwrap_or_else(well_known::any)).collect(),
                })
                .rc(),
            )
            .rc())
        }
        TypeInfo::Any => {
            for arg in args {
                match arg {
                    Argument::Normal(e) | Argument::Spread(e) => {
                        check_expr(ck, e)?;
                    }
                }
            }
            Ok(well_known::any())
        }
        _ => ck.error(ErrorKind::Type, diagnostic_codes::NOT_ASSIGNABLE, format!("This expression is not constructable: type '{callee_ty}' has no construct signatures."), span),
    }
}

fn check_member(ck: &mut Checker, object: &Expr, property: &MemberKey, optional: bool, span: Span) -> crate::error::CheckResult<Ty> {
    let object_ty = check_expr(ck, object)?;
    let narrowed = if optional { strip_nullish(&object_ty) } else { object_ty.clone() };
    let name = match property {
        MemberKey::Name(n) | MemberKey::Private(n) => n.clone(),
        MemberKey::Computed(e) => {
            let key_ty = check_expr(ck, e)?;
            match &*key_ty {
                TypeInfo::StringLiteral(s) => s.clone(),
                _ => {
                    return match &*narrowed {
                        TypeInfo::Array(el) => Ok(el.clone()),
                        TypeInfo::Record(r) => Ok(r.string_index.clone().or_else(|| r.number_index.clone()).unwrap_or_else(well_known::any)),
                        _ => Ok(well_known::any()),
                    };
                }
            }
        }
    };
    let resolution = resolve_member(ck, &narrowed, &name, span)?;
    if resolution.is_private {
        if let TypeInfo::Instance(class) = &*narrowed {
            if let Some(owner) = class_owner_name(class, &name) {
                check_accessibility(ck, &owner, Visibility::Private, &name, span)?;
            }
        }
    }
    let _ = resolution.dispatch; // dispatch decisions are consumed by the lowering core, not the checker itself
    if optional {
        Ok(make_union(vec![resolution.ty, well_known::undefined()]))
    } else {
        Ok(resolution.ty)
    }
}

fn class_owner_name(class: &Ty, name: &str) -> Option<String> {
    let TypeInfo::Class(c) = &**class else { return None };
    if c.declared_field_types.contains_key(name) || c.methods.contains_key(name) {
        return Some(c.name.clone());
    }
    c.superclass.as_ref().and_then(|s| class_owner_name(s, name))
}

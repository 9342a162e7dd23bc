//! Enum checking (§4.4): numeric auto-increment, string enums (no
//! auto-increment, every member needs a string initializer), heterogeneous
//! enums, and `const` enums (closed compile-time arithmetic over prior
//! members; never materialized as a runtime object).

use crate::context::Checker;
use crate::error::{CheckError, CheckResult};
use tsc_core_ast::{BinaryOp, EnumDecl, Expr, ExprKind, UnaryOp};
use tsc_core_common::diagnostics::{diagnostic_codes, Diagnostic, DiagnosticCategory, ErrorKind};
use tsc_core_types::model::*;

pub fn check_enum_decl(ck: &mut Checker, decl: &EnumDecl) -> CheckResult<Ty> {
    let mut members = indexmap::IndexMap::new();
    let mut next_numeric = 0.0f64;
    let mut saw_string = false;
    let mut saw_number = false;

    for member in &decl.members {
        let value = match &member.initializer {
            Some(expr) => {
                if decl.is_const {
                    eval_const_expr(ck, expr, &members)?
                } else {
                    eval_expr_loose(ck, expr, &members).unwrap_or(EnumValue::Number(next_numeric))
                }
            }
            None => EnumValue::Number(next_numeric),
        };
        match &value {
            EnumValue::Number(n) => {
                saw_number = true;
                next_numeric = n + 1.0;
            }
            EnumValue::String(_) => {
                saw_string = true;
            }
        }
        members.insert(member.name.clone(), value);
    }

    let kind = match (saw_string, saw_number) {
        (true, true) => EnumKind::Heterogeneous,
        (true, false) => EnumKind::String,
        _ => EnumKind::Numeric,
    };

    Ok(TypeInfo::Enum(EnumType { name: decl.name.name.clone(), members, kind, is_const: decl.is_const }).rc())
}

/// Best-effort evaluation for non-`const` enum initializers: only used to
/// seed reverse-mapping values; falls back to the auto-increment counter on
/// anything not a literal.
fn eval_expr_loose(ck: &Checker, expr: &Expr, prior: &indexmap::IndexMap<String, EnumValue>) -> Option<EnumValue> {
    eval_const_expr(ck, expr, prior).ok()
}

/// Evaluates the closed arithmetic/bitwise subset §4.4 allows inside
/// `const` enum member initializers: literals, references to earlier
/// members of the same enum, and `+ - * / % ** & | ^ << >> ~` over numbers
/// (per the spec's Open Question, `**` is allowed for numbers and an error
/// for strings — which falls out naturally since `**` only matches the
/// numeric arm below).
fn eval_const_expr(ck: &Checker, expr: &Expr, prior: &indexmap::IndexMap<String, EnumValue>) -> CheckResult<EnumValue> {
    match &expr.kind {
        ExprKind::NumberLiteral(text) => Ok(EnumValue::Number(tsc_core_common::numeric::parse_numeric_literal_value(text).unwrap_or(f64::NAN))),
        ExprKind::StringLiteral(s) => Ok(EnumValue::String(s.clone())),
        ExprKind::TemplateLiteral { quasis, exprs } if exprs.is_empty() => Ok(EnumValue::String(quasis.join(""))),
        ExprKind::Ident(id) => prior.get(&id.name).cloned().ok_or_else(|| not_closed(ck, expr, &id.name)),
        ExprKind::Paren(inner) => eval_const_expr(ck, inner, prior),
        ExprKind::Unary { op: UnaryOp::Minus, operand, .. } => {
            let EnumValue::Number(n) = eval_const_expr(ck, operand, prior)? else {
                return Err(not_closed(ck, expr, "non-numeric operand to unary '-'"));
            };
            Ok(EnumValue::Number(-n))
        }
        ExprKind::Unary { op: UnaryOp::Plus, operand, .. } => eval_const_expr(ck, operand, prior),
        ExprKind::Unary { op: UnaryOp::BitNot, operand, .. } => {
            let EnumValue::Number(n) = eval_const_expr(ck, operand, prior)? else {
                return Err(not_closed(ck, expr, "non-numeric operand to '~'"));
            };
            Ok(EnumValue::Number(f64::from(!(n as i32))))
        }
        ExprKind::Binary { op, left, right } => {
            let l = eval_const_expr(ck, left, prior)?;
            let r = eval_const_expr(ck, right, prior)?;
            eval_binary(ck, expr, *op, l, r)
        }
        _ => Err(not_closed(ck, expr, "expression is not a closed constant")),
    }
}

fn eval_binary(ck: &Checker, expr: &Expr, op: BinaryOp, l: EnumValue, r: EnumValue) -> CheckResult<EnumValue> {
    if let (EnumValue::String(a), EnumValue::String(b)) = (&l, &r) {
        if matches!(op, BinaryOp::Add) {
            return Ok(EnumValue::String(format!("{a}{b}")));
        }
        return Err(not_closed(ck, expr, "string enum members only support '+' concatenation"));
    }
    let (EnumValue::Number(a), EnumValue::Number(b)) = (l, r) else {
        return Err(not_closed(ck, expr, "mismatched operand kinds in const enum expression"));
    };
    let n = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        BinaryOp::Pow => a.powf(b),
        BinaryOp::BitAnd => f64::from((a as i32) & (b as i32)),
        BinaryOp::BitOr => f64::from((a as i32) | (b as i32)),
        BinaryOp::BitXor => f64::from((a as i32) ^ (b as i32)),
        BinaryOp::Shl => f64::from((a as i32) << (b as i32)),
        BinaryOp::Shr => f64::from((a as i32) >> (b as i32)),
        BinaryOp::UShr => f64::from(((a as i32) as u32) >> (b as i32)),
        _ => return Err(not_closed(ck, expr, "operator not permitted in a const enum expression")),
    };
    Ok(EnumValue::Number(n))
}

fn not_closed(ck: &Checker, expr: &Expr, detail: &str) -> CheckError {
    CheckError(Diagnostic {
        category: DiagnosticCategory::Error,
        kind: ErrorKind::Structural,
        code: diagnostic_codes::CONST_ENUM_NOT_CLOSED,
        message: format!("const enum member initializer is not a closed constant expression: {detail}"),
        location: ck.location(expr.span),
    })
}

//! Runtime semantics for the binary operators the operator resolver
//! classifies (§4.5, §6). The classification itself is shared with the
//! checker and the emitter (`tsc_core_types::operator::describe`); this
//! module is the interpreter's own business of actually *computing* a
//! result once the checker has already proved the operand types are legal.

use std::rc::Rc;

use tsc_core_ast::BinaryOp;
use tsc_core_types::operator::{describe, OperatorCategory};

use crate::error::{EvalResult, Thrown};
use crate::value::Value;

/// JS's `ToNumber` abstract operation, restricted to the value shapes this
/// core's `Value` can hold.
#[must_use]
pub fn to_number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => *n,
        Value::Boolean(b) => if *b { 1.0 } else { 0.0 },
        Value::Null => 0.0,
        Value::Undefined => f64::NAN,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::BigInt(n) => *n as f64,
        _ => f64::NAN,
    }
}

#[must_use]
pub fn to_int32(v: &Value) -> i32 {
    let n = to_number(v);
    if !n.is_finite() {
        return 0;
    }
    (n as i64 as u32) as i32
}

#[must_use]
pub fn to_uint32(v: &Value) -> u32 {
    let n = to_number(v);
    if !n.is_finite() {
        return 0;
    }
    n as i64 as u32
}

/// JS's loose `==`. Only the comparisons reachable through this core's
/// value shapes are implemented; object identity governs reference types.
#[must_use]
pub fn loose_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null | Value::Undefined, Value::Null | Value::Undefined) => true,
        (Value::Number(_), Value::Number(_))
        | (Value::String(_), Value::String(_))
        | (Value::Boolean(_), Value::Boolean(_)) => strict_equals(a, b),
        (Value::Number(_), Value::String(_)) => strict_equals(a, &Value::Number(to_number(b))),
        (Value::String(_), Value::Number(_)) => strict_equals(&Value::Number(to_number(a)), b),
        (Value::Boolean(_), _) => loose_equals(&Value::Number(to_number(a)), b),
        (_, Value::Boolean(_)) => loose_equals(a, &Value::Number(to_number(b))),
        _ => strict_equals(a, b),
    }
}

#[must_use]
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
        (Value::Symbol(x), Value::Symbol(y)) => Rc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y),
        (Value::Instance(x), Value::Instance(y)) => Rc::ptr_eq(x, y),
        (Value::Closure(x), Value::Closure(y)) => Rc::ptr_eq(x, y),
        (Value::Class(x), Value::Class(y)) => Rc::ptr_eq(x, y),
        (Value::NativeFunction(x), Value::NativeFunction(y)) => Rc::ptr_eq(x, y),
        (Value::Promise(x), Value::Promise(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

fn is_stringish(v: &Value) -> bool {
    matches!(v, Value::String(_))
}

/// Evaluates a binary operator over two already-evaluated operands,
/// dispatching on the shared operator-category classification (§4.5).
pub fn apply_binary(op: BinaryOp, left: Value, right: Value) -> EvalResult {
    let descriptor = describe(op);
    match descriptor.category {
        OperatorCategory::Additive => {
            if is_stringish(&left) || is_stringish(&right) {
                Ok(Value::String(Rc::from(format!("{}{}", left.to_display_string(), right.to_display_string()).as_str())))
            } else if let (Value::BigInt(a), Value::BigInt(b)) = (&left, &right) {
                Ok(Value::BigInt(a + b))
            } else {
                Ok(Value::Number(to_number(&left) + to_number(&right)))
            }
        }
        OperatorCategory::Numeric => apply_numeric(op, &left, &right),
        OperatorCategory::Relational => {
            if let (Value::String(a), Value::String(b)) = (&left, &right) {
                let ord = a.as_ref().cmp(b.as_ref());
                Ok(Value::Boolean(match op {
                    BinaryOp::Lt => ord.is_lt(),
                    BinaryOp::Le => ord.is_le(),
                    BinaryOp::Gt => ord.is_gt(),
                    BinaryOp::Ge => ord.is_ge(),
                    _ => unreachable!(),
                }))
            } else {
                let (a, b) = (to_number(&left), to_number(&right));
                Ok(Value::Boolean(match op {
                    BinaryOp::Lt => a < b,
                    BinaryOp::Le => a <= b,
                    BinaryOp::Gt => a > b,
                    BinaryOp::Ge => a >= b,
                    _ => unreachable!(),
                }))
            }
        }
        OperatorCategory::Equality => {
            let result = match op {
                BinaryOp::Eq => loose_equals(&left, &right),
                BinaryOp::Ne => !loose_equals(&left, &right),
                BinaryOp::StrictEq => strict_equals(&left, &right),
                BinaryOp::StrictNe => !strict_equals(&left, &right),
                _ => unreachable!(),
            };
            Ok(Value::Boolean(result))
        }
        OperatorCategory::In => match &right {
            Value::Object(o) => Ok(Value::Boolean(o.borrow().contains_key(&left.to_display_string()))),
            Value::Instance(i) => {
                let key = left.to_display_string();
                Ok(Value::Boolean(i.fields.borrow().contains_key(&key) || i.class.find_method(&key).is_some()))
            }
            Value::Array(a) => {
                let idx = to_number(&left);
                Ok(Value::Boolean(idx >= 0.0 && (idx as usize) < a.borrow().len()))
            }
            _ => Err(Thrown::type_error("Cannot use 'in' operator on this value")),
        },
        OperatorCategory::Instanceof => match &right {
            Value::Class(class) => Ok(Value::Boolean(match &left {
                Value::Instance(inst) => inst.class.is_subclass_of(class),
                _ => false,
            })),
            _ => Err(Thrown::type_error("Right-hand side of 'instanceof' is not callable")),
        },
    }
}

fn apply_numeric(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    if let (Value::BigInt(a), Value::BigInt(b)) = (left, right) {
        return apply_bigint_numeric(op, *a, *b);
    }
    let (a, b) = (to_number(left), to_number(right));
    let result = match op {
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        BinaryOp::Pow => a.powf(b),
        BinaryOp::BitAnd => f64::from(to_int32(left) & to_int32(right)),
        BinaryOp::BitOr => f64::from(to_int32(left) | to_int32(right)),
        BinaryOp::BitXor => f64::from(to_int32(left) ^ to_int32(right)),
        BinaryOp::Shl => f64::from(to_int32(left).wrapping_shl(to_uint32(right) & 31)),
        BinaryOp::Shr => f64::from(to_int32(left).wrapping_shr(to_uint32(right) & 31)),
        BinaryOp::UShr => f64::from(to_uint32(left).wrapping_shr(to_uint32(right) & 31)),
        _ => unreachable!("apply_numeric called with non-numeric op"),
    };
    Ok(Value::Number(result))
}

fn apply_bigint_numeric(op: BinaryOp, a: i128, b: i128) -> EvalResult {
    let result = match op {
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0 {
                return Err(Thrown::type_error("Division by zero"));
            }
            a / b
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(Thrown::type_error("Division by zero"));
            }
            a % b
        }
        BinaryOp::Pow => a.pow(u32::try_from(b).unwrap_or(0)),
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::Shl => a << (b & 127),
        BinaryOp::Shr => a >> (b & 127),
        // §6: `>>>` is not BigInt-compatible; the checker rejects this
        // before the interpreter ever sees it, but guard anyway.
        BinaryOp::UShr => return Err(Thrown::type_error("BigInts have no unsigned right shift, use >> instead")),
        _ => unreachable!("apply_bigint_numeric called with non-numeric op"),
    };
    Ok(Value::BigInt(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_concatenates_when_either_side_is_string() {
        let result = apply_binary(BinaryOp::Add, Value::Number(1.0), Value::String("x".into())).unwrap();
        assert_eq!(result.to_display_string(), "1x");
    }

    #[test]
    fn plus_adds_numbers() {
        let result = apply_binary(BinaryOp::Add, Value::Number(1.0), Value::Number(2.0)).unwrap();
        assert!(matches!(result, Value::Number(n) if n == 3.0));
    }

    #[test]
    fn strict_equality_does_not_coerce() {
        assert!(!strict_equals(&Value::Number(1.0), &Value::String("1".into())));
        assert!(loose_equals(&Value::Number(1.0), &Value::String("1".into())));
    }

    #[test]
    fn unsigned_right_shift_rejects_bigint() {
        assert!(apply_binary(BinaryOp::UShr, Value::BigInt(4), Value::BigInt(1)).is_err());
    }

    #[test]
    fn bitwise_and_truncates_to_int32() {
        let result = apply_binary(BinaryOp::BitAnd, Value::Number(6.0), Value::Number(3.0)).unwrap();
        assert!(matches!(result, Value::Number(n) if n == 2.0));
    }
}

//! The operator resolver (§4.5): classifies each binary operator into a
//! category and computes its result `TypeInfo`, following the table in §6.

use crate::model::*;
use tsc_core_ast::BinaryOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCategory {
    /// `+`: string concatenation if either side is string-like, numeric
    /// addition otherwise.
    Additive,
    /// `-  *  /  %  **  &  |  ^  <<  >>  >>>`: both operands coerce to the
    /// same numeric kind (number or bigint); result is that kind.
    Numeric,
    Relational,
    Equality,
    In,
    Instanceof,
}

#[derive(Debug, Clone, Copy)]
pub struct OperatorDescriptor {
    pub category: OperatorCategory,
    pub symbol: &'static str,
}

#[must_use]
pub fn describe(op: BinaryOp) -> OperatorDescriptor {
    use BinaryOp::*;
    let (category, symbol) = match op {
        Add => (OperatorCategory::Additive, "+"),
        Sub => (OperatorCategory::Numeric, "-"),
        Mul => (OperatorCategory::Numeric, "*"),
        Div => (OperatorCategory::Numeric, "/"),
        Mod => (OperatorCategory::Numeric, "%"),
        Pow => (OperatorCategory::Numeric, "**"),
        BitAnd => (OperatorCategory::Numeric, "&"),
        BitOr => (OperatorCategory::Numeric, "|"),
        BitXor => (OperatorCategory::Numeric, "^"),
        Shl => (OperatorCategory::Numeric, "<<"),
        Shr => (OperatorCategory::Numeric, ">>"),
        UShr => (OperatorCategory::Numeric, ">>>"),
        Lt => (OperatorCategory::Relational, "<"),
        Le => (OperatorCategory::Relational, "<="),
        Gt => (OperatorCategory::Relational, ">"),
        Ge => (OperatorCategory::Relational, ">="),
        Eq => (OperatorCategory::Equality, "=="),
        Ne => (OperatorCategory::Equality, "!="),
        StrictEq => (OperatorCategory::Equality, "==="),
        StrictNe => (OperatorCategory::Equality, "!=="),
        In => (OperatorCategory::In, "in"),
        Instanceof => (OperatorCategory::Instanceof, "instanceof"),
    };
    OperatorDescriptor { category, symbol }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum OperatorError {
    #[error("operator '{op}' cannot be applied to types '{left}' and '{right}'")]
    Unsupported { op: &'static str, left: String, right: String },
    #[error("operator '**' on bigint requires both operands to be bigint (offending: '{left}' and '{right}')")]
    BigIntMix { left: String, right: String },
    #[error("the right-hand side of 'in' must be an object type, found '{found}'")]
    InRhsNotObject { found: String },
    #[error("the left-hand side of 'in' must be of type string, number, or symbol, found '{found}'")]
    InLhsNotKey { found: String },
    #[error("right-hand side of 'instanceof' must be a constructor type, found '{found}'")]
    NotAConstructor { found: String },
}

fn is_numeric(t: &TypeInfo) -> bool {
    matches!(t, TypeInfo::Primitive(PrimitiveKind::Number) | TypeInfo::NumberLiteral(..))
}

fn is_bigint(t: &TypeInfo) -> bool {
    matches!(t, TypeInfo::BigInt)
}

fn is_stringish(t: &TypeInfo) -> bool {
    matches!(t, TypeInfo::StringType | TypeInfo::StringLiteral(_))
}

fn is_object_like(t: &TypeInfo) -> bool {
    matches!(
        t,
        TypeInfo::Record(_)
            | TypeInfo::Interface(_)
            | TypeInfo::Class(_)
            | TypeInfo::Instance(_)
            | TypeInfo::Array(_)
            | TypeInfo::Tuple { .. }
            | TypeInfo::Namespace(_)
            | TypeInfo::Any
            | TypeInfo::Unknown
    )
}

fn is_constructor_like(t: &TypeInfo) -> bool {
    matches!(t, TypeInfo::Class(_) | TypeInfo::GenericClass(_) | TypeInfo::Any | TypeInfo::Unknown)
}

/// Resolves a binary operator's result type given its already-checked
/// operand types. Returns `well_known::any()` whenever either operand is
/// `any`, matching TypeScript's "any absorbs everything" rule (§4.1 rule 1
/// applies equally here).
pub fn resolve_binary(op: BinaryOp, left: &Ty, right: &Ty) -> Result<Ty, OperatorError> {
    let descriptor = describe(op);
    if left.is_any() || right.is_any() {
        return Ok(well_known::any());
    }

    match descriptor.category {
        OperatorCategory::Additive => {
            if is_stringish(left) || is_stringish(right) {
                return Ok(well_known::string());
            }
            if is_bigint(left) && is_bigint(right) {
                return Ok(TypeInfo::BigInt.rc());
            }
            if is_bigint(left) != is_bigint(right) && (is_bigint(left) || is_numeric(right) || is_bigint(right) || is_numeric(left)) {
                return Err(OperatorError::BigIntMix { left: left.to_string(), right: right.to_string() });
            }
            if is_numeric(left) && is_numeric(right) {
                return Ok(well_known::number());
            }
            Err(OperatorError::Unsupported { op: descriptor.symbol, left: left.to_string(), right: right.to_string() })
        }
        OperatorCategory::Numeric => {
            if is_bigint(left) && is_bigint(right) {
                return Ok(TypeInfo::BigInt.rc());
            }
            if is_bigint(left) || is_bigint(right) {
                return Err(OperatorError::BigIntMix { left: left.to_string(), right: right.to_string() });
            }
            if is_numeric(left) && is_numeric(right) {
                return Ok(well_known::number());
            }
            Err(OperatorError::Unsupported { op: descriptor.symbol, left: left.to_string(), right: right.to_string() })
        }
        OperatorCategory::Relational | OperatorCategory::Equality => Ok(well_known::boolean()),
        OperatorCategory::In => {
            if !is_stringish(left) && !is_numeric(left) && !matches!(&**left, TypeInfo::Symbol) {
                return Err(OperatorError::InLhsNotKey { found: left.to_string() });
            }
            if !is_object_like(right) {
                return Err(OperatorError::InRhsNotObject { found: right.to_string() });
            }
            Ok(well_known::boolean())
        }
        OperatorCategory::Instanceof => {
            if !is_constructor_like(right) {
                return Err(OperatorError::NotAConstructor { found: right.to_string() });
            }
            Ok(well_known::boolean())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_of_two_numbers_is_number() {
        assert_eq!(resolve_binary(BinaryOp::Add, &well_known::number(), &well_known::number()), Ok(well_known::number()));
    }

    #[test]
    fn addition_with_string_concatenates() {
        assert_eq!(resolve_binary(BinaryOp::Add, &well_known::string(), &well_known::number()), Ok(well_known::string()));
    }

    #[test]
    fn subtraction_requires_numeric_operands() {
        assert!(resolve_binary(BinaryOp::Sub, &well_known::string(), &well_known::number()).is_err());
    }

    #[test]
    fn mixing_bigint_and_number_in_arithmetic_errors() {
        let err = resolve_binary(BinaryOp::Mul, &TypeInfo::BigInt.rc(), &well_known::number());
        assert!(matches!(err, Err(OperatorError::BigIntMix { .. })));
    }

    #[test]
    fn relational_always_yields_boolean() {
        assert_eq!(resolve_binary(BinaryOp::Lt, &well_known::string(), &well_known::number()), Ok(well_known::boolean()));
    }

    #[test]
    fn any_absorbs_operator_errors() {
        assert_eq!(resolve_binary(BinaryOp::Sub, &well_known::any(), &well_known::string()), Ok(well_known::any()));
    }

    #[test]
    fn in_requires_object_rhs() {
        let err = resolve_binary(BinaryOp::In, &well_known::string(), &well_known::number());
        assert!(matches!(err, Err(OperatorError::InRhsNotObject { .. })));
    }

    #[test]
    fn instanceof_requires_constructor_rhs() {
        let err = resolve_binary(BinaryOp::Instanceof, &well_known::string(), &well_known::string());
        assert!(matches!(err, Err(OperatorError::NotAConstructor { .. })));
    }
}

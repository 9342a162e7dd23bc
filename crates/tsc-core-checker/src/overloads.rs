//! Overload resolution (§4.3 "Overload resolution") and call-argument
//! specificity scoring.

use tsc_core_types::model::*;
use tsc_core_types::normalize::is_assignable;

#[derive(Debug, Clone, thiserror::Error)]
#[error("no overload matches this call; attempted argument types: {}", argument_types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", "))]
pub struct NoOverloadMatches {
    pub argument_types: Vec<Ty>,
}

/// Picks the best-matching signature among `signatures` for `args`, per
/// §4.3 steps 2-4: filter by arity + assignability, then rank by
/// per-parameter specificity, ties broken by declaration order.
pub fn resolve_overload<'a>(signatures: &'a [FunctionType], args: &[Ty]) -> Result<&'a FunctionType, NoOverloadMatches> {
    let candidates: Vec<&FunctionType> = signatures.iter().filter(|sig| matches_arity_and_args(sig, args)).collect();
    if candidates.is_empty() {
        return Err(NoOverloadMatches { argument_types: args.to_vec() });
    }
    let mut best = candidates[0];
    let mut best_score = specificity_score(best, args);
    for cand in &candidates[1..] {
        let score = specificity_score(cand, args);
        if score > best_score {
            best = cand;
            best_score = score;
        }
    }
    Ok(best)
}

fn matches_arity_and_args(sig: &FunctionType, args: &[Ty]) -> bool {
    if args.len() < sig.min_arity {
        return false;
    }
    if args.len() > sig.params.len() && !sig.has_rest {
        return false;
    }
    for (i, arg) in args.iter().enumerate() {
        let expected = match sig.params.get(i) {
            Some(p) => p,
            None if sig.has_rest => {
                let Some(rest) = sig.params.last() else { return false };
                rest
            }
            None => return false,
        };
        let expected = element_if_array(expected, i >= sig.params.len());
        if !is_assignable(&expected, arg) {
            return false;
        }
    }
    true
}

fn element_if_array(ty: &Ty, is_rest_slot: bool) -> Ty {
    if is_rest_slot {
        if let TypeInfo::Array(el) = &**ty {
            return el.clone();
        }
    }
    ty.clone()
}

/// Per-parameter specificity score, higher is more specific (§4.3 step 3):
/// literal > primitive, primitive > union containing it, non-nullable >
/// nullable, derived class > base class (approximated by nominal depth).
fn specificity_score(sig: &FunctionType, args: &[Ty]) -> i64 {
    let mut score = 0i64;
    for (i, arg) in args.iter().enumerate() {
        let Some(param) = sig.params.get(i) else { continue };
        score += param_specificity(param, arg);
    }
    score
}

fn param_specificity(param: &Ty, arg: &Ty) -> i64 {
    let mut s = 0i64;
    if is_literal(param) {
        s += 100;
    } else if is_widened_primitive(param) {
        s += 50;
    } else if matches!(&**param, TypeInfo::Union(_)) {
        s += 10;
    } else {
        s += 30;
    }
    if !is_nullable(param) {
        s += 5;
    }
    s += class_depth(param, arg);
    s
}

fn is_literal(t: &Ty) -> bool {
    matches!(&**t, TypeInfo::StringLiteral(_) | TypeInfo::NumberLiteral(..) | TypeInfo::BooleanLiteral(_))
}

fn is_widened_primitive(t: &Ty) -> bool {
    matches!(&**t, TypeInfo::StringType | TypeInfo::Primitive(_) | TypeInfo::BigInt)
}

fn is_nullable(t: &Ty) -> bool {
    match &**t {
        TypeInfo::Null | TypeInfo::Undefined => true,
        TypeInfo::Union(members) => members.iter().any(|m| is_nullable(m)),
        _ => false,
    }
}

/// Favors a parameter typed as a more-derived class when the argument is an
/// exact instance of it (depth 0 superclass distance scores highest).
fn class_depth(param: &Ty, arg: &Ty) -> i64 {
    let (TypeInfo::Instance(pc), TypeInfo::Instance(ac)) = (&**param, &**arg) else {
        return 0;
    };
    let mut depth = 0i64;
    let mut cur = ac.clone();
    loop {
        if tsc_core_types::normalize::types_identical(&cur, pc) {
            return 20 - depth;
        }
        let TypeInfo::Class(c) = &*cur else { return 0 };
        match &c.superclass {
            Some(sup) => {
                cur = sup.clone();
                depth += 1;
            }
            None => return 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(params: Vec<Ty>, ret: Ty) -> FunctionType {
        FunctionType { min_arity: params.len(), params, ret, has_rest: false, this_type: None }
    }

    #[test]
    fn literal_overload_preferred_over_primitive() {
        let lit_sig = func(vec![TypeInfo::StringLiteral("a".into()).rc()], TypeInfo::NumberLiteral("1".into(), 1.0).rc());
        let prim_sig = func(vec![well_known::string()], TypeInfo::NumberLiteral("2".into(), 2.0).rc());
        let args = vec![TypeInfo::StringLiteral("a".into()).rc()];
        let chosen = resolve_overload(&[lit_sig.clone(), prim_sig.clone()], &args).unwrap();
        assert_eq!(chosen.ret, TypeInfo::NumberLiteral("1".into(), 1.0).rc());
    }

    #[test]
    fn no_match_reports_all_argument_types() {
        let sig = func(vec![well_known::number()], well_known::void());
        let args = vec![well_known::string()];
        let err = resolve_overload(&[sig], &args).unwrap_err();
        assert_eq!(err.argument_types, args);
    }
}

//! Generic type-argument inference (§4.3.1): structural unification of a
//! generic signature's declared parameter types against the actual
//! argument types, producing bindings for each type parameter.

use rustc_hash::FxHashMap;
use tsc_core_types::model::*;
use tsc_core_types::normalize::{is_assignable, make_union};

pub type Bindings = FxHashMap<String, Ty>;

/// Infers type-parameter bindings for `type_params` from `(declared
/// parameter, argument type)` pairs, then fills in anything left unbound
/// with its declared default, its constraint, or `Any` (§4.3.1 final
/// sentence).
#[must_use]
pub fn infer(type_params: &[TypeParamDecl], params: &[Ty], args: &[Ty]) -> Bindings {
    let mut bindings = Bindings::default();
    let names: std::collections::HashSet<&str> = type_params.iter().map(|p| p.name.as_str()).collect();
    for (param, arg) in params.iter().zip(args.iter()) {
        unify(param, arg, &names, &mut bindings);
    }
    for tp in type_params {
        bindings.entry(tp.name.clone()).or_insert_with(|| {
            tp.default.clone().or_else(|| tp.constraint.clone()).unwrap_or_else(well_known::any)
        });
    }
    bindings
}

/// Structurally recurses `declared` against `actual`, binding any bare type
/// parameter it finds. A parameter bound more than once takes the common
/// supertype of its bindings (§4.3.1: "if compatible, keep the existing
/// binding; if a union subsumes, union").
fn unify(declared: &Ty, actual: &Ty, names: &std::collections::HashSet<&str>, bindings: &mut Bindings) {
    match &**declared {
        TypeInfo::TypeParameter { name, .. } if names.contains(name.as_str()) => {
            bind(bindings, name, actual.clone());
        }
        TypeInfo::Array(el) => {
            if let TypeInfo::Array(actual_el) = &**actual {
                unify(el, actual_el, names, bindings);
            }
        }
        TypeInfo::Function(f) => {
            if let TypeInfo::Function(af) = &**actual {
                // Parameters are inferred contravariantly in principle, but
                // this core follows the spec's simplification and treats
                // them covariantly like the rest of the call (§4.3.1).
                for (dp, ap) in f.params.iter().zip(af.params.iter()) {
                    unify(dp, ap, names, bindings);
                }
                unify(&f.ret, &af.ret, names, bindings);
            }
        }
        TypeInfo::InstantiatedGeneric(g) => {
            if let TypeInfo::InstantiatedGeneric(ag) = &**actual {
                if tsc_core_types::normalize::types_identical(&g.definition, &ag.definition) {
                    for (dt, at) in g.type_arguments.iter().zip(ag.type_arguments.iter()) {
                        unify(dt, at, names, bindings);
                    }
                }
            }
        }
        TypeInfo::Promise(inner) => {
            if let TypeInfo::Promise(a_inner) = &**actual {
                unify(inner, a_inner, names, bindings);
            }
        }
        TypeInfo::Union(members) => {
            for m in members {
                unify(m, actual, names, bindings);
            }
        }
        _ => {}
    }
}

fn bind(bindings: &mut Bindings, name: &str, ty: Ty) {
    match bindings.get(name) {
        None => {
            bindings.insert(name.to_string(), ty);
        }
        Some(existing) => {
            if is_assignable(existing, &ty) {
                // existing already subsumes ty
            } else if is_assignable(&ty, existing) {
                bindings.insert(name.to_string(), ty);
            } else {
                let combined = make_union(vec![existing.clone(), ty]);
                bindings.insert(name.to_string(), combined);
            }
        }
    }
}

/// Substitutes bound type parameters throughout `ty` with their inferred
/// bindings. Anything not naming a bound parameter passes through
/// unchanged (structural sharing via `Rc` means this is cheap when nothing
/// changes).
#[must_use]
pub fn substitute(ty: &Ty, bindings: &Bindings) -> Ty {
    match &**ty {
        TypeInfo::TypeParameter { name, .. } => bindings.get(name).cloned().unwrap_or_else(|| ty.clone()),
        TypeInfo::Array(el) => TypeInfo::Array(substitute(el, bindings)).rc(),
        TypeInfo::Union(members) => make_union(members.iter().map(|m| substitute(m, bindings)).collect()),
        TypeInfo::Intersection(members) => {
            tsc_core_types::normalize::make_intersection(members.iter().map(|m| substitute(m, bindings)).collect())
        }
        TypeInfo::Function(f) => TypeInfo::Function(substitute_function(f, bindings)).rc(),
        TypeInfo::Promise(inner) => TypeInfo::Promise(substitute(inner, bindings)).rc(),
        TypeInfo::Map(k, v) => TypeInfo::Map(substitute(k, bindings), substitute(v, bindings)).rc(),
        TypeInfo::Set(el) => TypeInfo::Set(substitute(el, bindings)).rc(),
        TypeInfo::InstantiatedGeneric(g) => TypeInfo::InstantiatedGeneric(InstantiatedGeneric {
            definition: g.definition.clone(),
            type_arguments: g.type_arguments.iter().map(|t| substitute(t, bindings)).collect(),
        })
        .rc(),
        _ => ty.clone(),
    }
}

fn substitute_function(f: &FunctionType, bindings: &Bindings) -> FunctionType {
    FunctionType {
        params: f.params.iter().map(|p| substitute(p, bindings)).collect(),
        ret: substitute(&f.ret, bindings),
        min_arity: f.min_arity,
        has_rest: f.has_rest,
        this_type: f.this_type.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_identity_type_parameter() {
        let t = TypeParamDecl { name: "T".into(), constraint: None, default: None };
        let param = TypeInfo::TypeParameter { name: "T".into(), constraint: None, default: None }.rc();
        let arg = TypeInfo::NumberLiteral("42".into(), 42.0).rc();
        let bindings = infer(&[t], &[param.clone()], &[arg.clone()]);
        assert_eq!(bindings.get("T"), Some(&arg));
        assert_eq!(substitute(&param, &bindings), arg);
    }

    #[test]
    fn unbound_parameter_falls_back_to_constraint() {
        let constraint = well_known::string();
        let t = TypeParamDecl { name: "T".into(), constraint: Some(constraint.clone()), default: None };
        let bindings = infer(&[t], &[], &[]);
        assert_eq!(bindings.get("T"), Some(&constraint));
    }
}

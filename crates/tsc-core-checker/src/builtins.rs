//! Built-in receiver member types (§4.6 "Built-in receivers ... handled by
//! per-type strategies registered in a type-emitter registry keyed by
//! receiver `TypeInfo` variant").
//!
//! The checker only needs the *type* half of that registry (the back-ends'
//! dispatcher owns the emission half, see `tsc-core-lowering`); this module
//! answers "what type does `receiver.member` have" for the built-ins the
//! managed runtime ships (string, array, Map, Set, Promise, RegExp, Error,
//! Timeout), without modeling their full generic signatures.

use tsc_core_types::model::*;

/// Looks up a member's type on a built-in receiver. Returns `None` if
/// `name` is not a recognized member of that built-in (the caller then
/// falls through to its own "unknown property" diagnostic).
#[must_use]
pub fn builtin_member(receiver: &Ty, name: &str) -> Option<Ty> {
    match &**receiver {
        TypeInfo::StringType | TypeInfo::StringLiteral(_) => string_member(name),
        TypeInfo::Array(el) => array_member(el, name),
        TypeInfo::Tuple { elements, .. } => {
            let el = elements.first().map(|e| e.ty.clone()).unwrap_or_else(well_known::any);
            array_member(&el, name)
        }
        TypeInfo::Map(k, v) => map_member(k, v, name),
        TypeInfo::Set(el) => set_member(el, name),
        TypeInfo::WeakMap(k, v) => map_member(k, v, name),
        TypeInfo::WeakSet(el) => set_member(el, name),
        TypeInfo::Promise(v) => promise_member(v, name),
        TypeInfo::RegExp => regexp_member(name),
        TypeInfo::Error(_) => error_member(name),
        TypeInfo::Date => date_member(name),
        TypeInfo::Buffer => buffer_member(name),
        TypeInfo::Timeout => None,
        _ => None,
    }
}

fn func(params: Vec<Ty>, ret: Ty) -> Ty {
    let min_arity = params.len();
    TypeInfo::Function(FunctionType { params, ret, min_arity, has_rest: false, this_type: None }).rc()
}

fn string_member(name: &str) -> Option<Ty> {
    use well_known::{boolean, number, string};
    Some(match name {
        "length" => number(),
        "toUpperCase" | "toLowerCase" | "trim" | "trimStart" | "trimEnd" | "toString" | "valueOf" => func(vec![], string()),
        "charAt" | "slice" | "substring" | "concat" | "padStart" | "padEnd" | "repeat" | "at" => {
            func(vec![number()], string())
        }
        "charCodeAt" | "indexOf" | "lastIndexOf" | "localeCompare" => func(vec![number()], number()),
        "includes" | "startsWith" | "endsWith" => func(vec![string()], boolean()),
        "split" => func(vec![string()], TypeInfo::Array(string()).rc()),
        "replace" | "replaceAll" => func(vec![string(), string()], string()),
        "match" => func(vec![string()], TypeInfo::Union(vec![TypeInfo::Array(string()).rc(), well_known::null()]).rc()),
        "normalize" => func(vec![], string()),
        _ => return None,
    })
}

fn array_member(el: &Ty, name: &str) -> Option<Ty> {
    use well_known::{boolean, number};
    let array = TypeInfo::Array(el.clone()).rc();
    Some(match name {
        "length" => number(),
        "push" | "unshift" => func(vec![el.clone()], number()),
        "pop" | "shift" | "at" => {
            func(vec![], TypeInfo::Union(vec![el.clone(), well_known::undefined()]).rc())
        }
        "slice" | "concat" | "flat" | "reverse" | "sort" | "toReversed" | "toSorted" | "filter" => {
            func(vec![], array)
        }
        "indexOf" | "lastIndexOf" => func(vec![el.clone()], number()),
        "includes" => func(vec![el.clone()], boolean()),
        "join" => func(vec![], well_known::string()),
        "map" => func(vec![func(vec![el.clone()], well_known::any())], TypeInfo::Array(well_known::any()).rc()),
        "forEach" => func(vec![func(vec![el.clone()], well_known::void())], well_known::void()),
        "find" => func(vec![func(vec![el.clone()], boolean())], TypeInfo::Union(vec![el.clone(), well_known::undefined()]).rc()),
        "findIndex" => func(vec![func(vec![el.clone()], boolean())], number()),
        "reduce" => func(vec![func(vec![well_known::any(), el.clone()], well_known::any())], well_known::any()),
        "every" | "some" => func(vec![func(vec![el.clone()], boolean())], boolean()),
        "flatMap" => func(vec![func(vec![el.clone()], well_known::any())], TypeInfo::Array(well_known::any()).rc()),
        _ => return None,
    })
}

fn map_member(key: &Ty, value: &Ty, name: &str) -> Option<Ty> {
    use well_known::boolean;
    Some(match name {
        "size" => well_known::number(),
        "get" => func(vec![key.clone()], TypeInfo::Union(vec![value.clone(), well_known::undefined()]).rc()),
        "set" => func(vec![key.clone(), value.clone()], TypeInfo::Map(key.clone(), value.clone()).rc()),
        "has" | "delete" => func(vec![key.clone()], boolean()),
        "clear" => func(vec![], well_known::void()),
        _ => return None,
    })
}

fn set_member(el: &Ty, name: &str) -> Option<Ty> {
    use well_known::boolean;
    Some(match name {
        "size" => well_known::number(),
        "add" => func(vec![el.clone()], TypeInfo::Set(el.clone()).rc()),
        "has" | "delete" => func(vec![el.clone()], boolean()),
        "clear" => func(vec![], well_known::void()),
        _ => return None,
    })
}

fn promise_member(value: &Ty, name: &str) -> Option<Ty> {
    Some(match name {
        "then" => func(
            vec![func(vec![value.clone()], well_known::any())],
            TypeInfo::Promise(well_known::any()).rc(),
        ),
        "catch" => func(vec![func(vec![well_known::any()], well_known::any())], TypeInfo::Promise(well_known::any()).rc()),
        "finally" => func(vec![func(vec![], well_known::void())], TypeInfo::Promise(value.clone()).rc()),
        _ => return None,
    })
}

fn regexp_member(name: &str) -> Option<Ty> {
    Some(match name {
        "test" => func(vec![well_known::string()], well_known::boolean()),
        "exec" => func(vec![well_known::string()], well_known::any()),
        "source" | "flags" => well_known::string(),
        "global" | "ignoreCase" | "multiline" => well_known::boolean(),
        "lastIndex" => well_known::number(),
        _ => return None,
    })
}

fn error_member(_name: &str) -> Option<Ty> {
    match _name {
        "message" | "name" | "stack" => Some(well_known::string()),
        _ => None,
    }
}

fn date_member(name: &str) -> Option<Ty> {
    Some(match name {
        "getTime" | "getFullYear" | "getMonth" | "getDate" | "getHours" | "getMinutes" | "getSeconds"
        | "getMilliseconds" | "valueOf" => func(vec![], well_known::number()),
        "toISOString" | "toDateString" | "toString" => func(vec![], well_known::string()),
        _ => return None,
    })
}

fn buffer_member(name: &str) -> Option<Ty> {
    Some(match name {
        "length" => well_known::number(),
        "toString" => func(vec![], well_known::string()),
        "slice" | "subarray" => func(vec![], TypeInfo::Buffer.rc()),
        _ => return None,
    })
}

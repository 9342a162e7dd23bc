//! Global built-ins and the per-receiver built-in method tables (§4.6
//! "Built-in receivers ... are handled by per-type strategies registered in
//! a type-emitter registry keyed by receiver TypeInfo variant").
//!
//! The managed runtime's actual standard-library implementations (JSON,
//! Date, RegExp, Math, collections, Promise combinators) are an external
//! collaborator (§1 Out of scope) — this module provides just enough of
//! `console`, `Array.prototype`, `String.prototype`, and `Object` for
//! checked programs to actually run and observe results, the way a test
//! harness driving this interpreter would need.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::env::Scope;
use crate::error::{EvalResult, Thrown};
use crate::ops::to_number;
use crate::value::{NativeFunction, Value};

fn native(name: &str, arity: usize, f: impl Fn(Option<&Value>, &[Value]) -> Result<Value, Value> + 'static) -> Value {
    Value::NativeFunction(Rc::new(NativeFunction { name: name.to_string(), arity, func: Box::new(f) }))
}

/// Populates the interpreter's global scope with `console`, `Math`,
/// `Object`, and `Array`/`String` static helpers. Instance methods on
/// array/string/map/set receivers are resolved separately by
/// [`call_builtin_method`], consulting `tsc_core_lowering::property_dispatch`'s
/// `BuiltinReceiver` classification the same way the checker and emitter do.
pub fn install_globals(scope: &Rc<RefCell<Scope>>) {
    let console = {
        let mut obj = IndexMap::new();
        obj.insert("log".to_string(), native("log", 0, |_, args| {
            println!("{}", args.iter().map(Value::to_display_string).collect::<Vec<_>>().join(" "));
            Ok(Value::Undefined)
        }));
        obj.insert("warn".to_string(), native("warn", 0, |_, args| {
            eprintln!("{}", args.iter().map(Value::to_display_string).collect::<Vec<_>>().join(" "));
            Ok(Value::Undefined)
        }));
        obj.insert("error".to_string(), native("error", 0, |_, args| {
            eprintln!("{}", args.iter().map(Value::to_display_string).collect::<Vec<_>>().join(" "));
            Ok(Value::Undefined)
        }));
        Value::Object(Rc::new(RefCell::new(obj)))
    };
    scope.borrow_mut().declare("console", console, false);

    let math = {
        let mut obj = IndexMap::new();
        obj.insert("PI".to_string(), Value::Number(std::f64::consts::PI));
        obj.insert("E".to_string(), Value::Number(std::f64::consts::E));
        obj.insert("abs".to_string(), native("abs", 1, |_, a| Ok(Value::Number(to_number(a.first().unwrap_or(&Value::Undefined)).abs()))));
        obj.insert("floor".to_string(), native("floor", 1, |_, a| Ok(Value::Number(to_number(a.first().unwrap_or(&Value::Undefined)).floor()))));
        obj.insert("ceil".to_string(), native("ceil", 1, |_, a| Ok(Value::Number(to_number(a.first().unwrap_or(&Value::Undefined)).ceil()))));
        obj.insert("round".to_string(), native("round", 1, |_, a| Ok(Value::Number(to_number(a.first().unwrap_or(&Value::Undefined)).round()))));
        obj.insert("max".to_string(), native("max", 2, |_, a| Ok(Value::Number(a.iter().map(to_number).fold(f64::NEG_INFINITY, f64::max)))));
        obj.insert("min".to_string(), native("min", 2, |_, a| Ok(Value::Number(a.iter().map(to_number).fold(f64::INFINITY, f64::min)))));
        obj.insert("pow".to_string(), native("pow", 2, |_, a| Ok(Value::Number(to_number(a.first().unwrap_or(&Value::Undefined)).powf(to_number(a.get(1).unwrap_or(&Value::Undefined)))))));
        obj.insert("sqrt".to_string(), native("sqrt", 1, |_, a| Ok(Value::Number(to_number(a.first().unwrap_or(&Value::Undefined)).sqrt()))));
        obj.insert("random".to_string(), native("random", 0, |_, _| Ok(Value::Number(0.5))));
        Value::Object(Rc::new(RefCell::new(obj)))
    };
    scope.borrow_mut().declare("Math", math, false);

    let object_ctor = {
        let mut obj = IndexMap::new();
        obj.insert("keys".to_string(), native("keys", 1, |_, a| match a.first() {
            Some(Value::Object(o)) => Ok(Value::Array(Rc::new(RefCell::new(o.borrow().keys().map(|k| Value::String(k.as_str().into())).collect())))),
            _ => Err(Value::String("Object.keys called on non-object".into())),
        }));
        obj.insert("values".to_string(), native("values", 1, |_, a| match a.first() {
            Some(Value::Object(o)) => Ok(Value::Array(Rc::new(RefCell::new(o.borrow().values().cloned().collect())))),
            _ => Err(Value::String("Object.values called on non-object".into())),
        }));
        obj.insert("entries".to_string(), native("entries", 1, |_, a| match a.first() {
            Some(Value::Object(o)) => Ok(Value::Array(Rc::new(RefCell::new(
                o.borrow()
                    .iter()
                    .map(|(k, v)| Value::Array(Rc::new(RefCell::new(vec![Value::String(k.as_str().into()), v.clone()]))))
                    .collect(),
            )))),
            _ => Err(Value::String("Object.entries called on non-object".into())),
        }));
        obj.insert("assign".to_string(), native("assign", 2, |_, a| {
            let Some(Value::Object(target)) = a.first() else {
                return Err(Value::String("Object.assign target must be an object".into()));
            };
            for source in &a[1..] {
                if let Value::Object(src) = source {
                    for (k, v) in src.borrow().iter() {
                        target.borrow_mut().insert(k.clone(), v.clone());
                    }
                }
            }
            Ok(Value::Object(Rc::clone(target)))
        }));
        Value::Object(Rc::new(RefCell::new(obj)))
    };
    scope.borrow_mut().declare("Object", object_ctor, false);
}

/// Dispatches a call to a built-in receiver's method (`arr.push(...)`,
/// `"x".slice(...)`), used when the lowering dispatcher's
/// `classify_member_dispatch` resolves the receiver to a `BuiltinReceiver`
/// rather than a user class instance.
pub fn call_builtin_method(receiver: &Value, method: &str, args: &[Value]) -> EvalResult {
    match receiver {
        Value::Array(arr) => call_array_method(arr, method, args),
        Value::String(s) => call_string_method(s, method, args),
        _ => Err(Thrown::type_error(format!("{method} is not a function"))),
    }
}

fn call_array_method(arr: &Rc<RefCell<Vec<Value>>>, method: &str, args: &[Value]) -> EvalResult {
    match method {
        "push" => {
            arr.borrow_mut().extend_from_slice(args);
            Ok(Value::Number(arr.borrow().len() as f64))
        }
        "pop" => Ok(arr.borrow_mut().pop().unwrap_or(Value::Undefined)),
        "shift" => {
            let mut a = arr.borrow_mut();
            if a.is_empty() { Ok(Value::Undefined) } else { Ok(a.remove(0)) }
        }
        "unshift" => {
            arr.borrow_mut().splice(0..0, args.iter().cloned());
            Ok(Value::Number(arr.borrow().len() as f64))
        }
        "slice" => {
            let a = arr.borrow();
            let len = a.len() as i64;
            let start = clamp_index(args.first(), 0, len);
            let end = clamp_index(args.get(1), len, len);
            let slice = if start < end { a[start as usize..end as usize].to_vec() } else { vec![] };
            Ok(Value::Array(Rc::new(RefCell::new(slice))))
        }
        "concat" => {
            let mut result = arr.borrow().clone();
            for a in args {
                match a {
                    Value::Array(other) => result.extend(other.borrow().iter().cloned()),
                    other => result.push(other.clone()),
                }
            }
            Ok(Value::Array(Rc::new(RefCell::new(result))))
        }
        "join" => {
            let sep = args.first().map(Value::to_display_string).unwrap_or_else(|| ",".to_string());
            Ok(Value::String(arr.borrow().iter().map(Value::to_display_string).collect::<Vec<_>>().join(&sep).into()))
        }
        "includes" => {
            let needle = args.first().cloned().unwrap_or(Value::Undefined);
            Ok(Value::Boolean(arr.borrow().iter().any(|v| crate::ops::strict_equals(v, &needle))))
        }
        "indexOf" => {
            let needle = args.first().cloned().unwrap_or(Value::Undefined);
            Ok(Value::Number(arr.borrow().iter().position(|v| crate::ops::strict_equals(v, &needle)).map(|i| i as f64).unwrap_or(-1.0)))
        }
        "reverse" => {
            arr.borrow_mut().reverse();
            Ok(Value::Array(Rc::clone(arr)))
        }
        "length" => Ok(Value::Number(arr.borrow().len() as f64)),
        _ => Err(Thrown::type_error(format!("array has no method '{method}'"))),
    }
}

fn clamp_index(arg: Option<&Value>, default: i64, len: i64) -> i64 {
    let Some(v) = arg else { return default };
    let mut n = to_number(v) as i64;
    if n < 0 {
        n += len;
    }
    n.clamp(0, len)
}

fn call_string_method(s: &Rc<str>, method: &str, args: &[Value]) -> EvalResult {
    match method {
        "length" => Ok(Value::Number(s.chars().count() as f64)),
        "toUpperCase" => Ok(Value::String(s.to_uppercase().into())),
        "toLowerCase" => Ok(Value::String(s.to_lowercase().into())),
        "trim" => Ok(Value::String(s.trim().into())),
        "charAt" => {
            let idx = args.first().map(to_number).unwrap_or(0.0) as usize;
            Ok(Value::String(s.chars().nth(idx).map(|c| c.to_string()).unwrap_or_default().into()))
        }
        "indexOf" => {
            let needle = args.first().map(Value::to_display_string).unwrap_or_default();
            Ok(Value::Number(s.find(&needle).map(|i| i as f64).unwrap_or(-1.0)))
        }
        "includes" => {
            let needle = args.first().map(Value::to_display_string).unwrap_or_default();
            Ok(Value::Boolean(s.contains(&needle)))
        }
        "slice" => {
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len() as i64;
            let start = clamp_index(args.first(), 0, len);
            let end = clamp_index(args.get(1), len, len);
            let slice = if start < end { chars[start as usize..end as usize].iter().collect::<String>() } else { String::new() };
            Ok(Value::String(slice.into()))
        }
        "split" => {
            let sep = args.first().map(Value::to_display_string).unwrap_or_default();
            let parts: Vec<Value> = if sep.is_empty() {
                s.chars().map(|c| Value::String(c.to_string().into())).collect()
            } else {
                s.split(sep.as_str()).map(|p| Value::String(p.into())).collect()
            };
            Ok(Value::Array(Rc::new(RefCell::new(parts))))
        }
        "concat" => {
            let mut out = s.to_string();
            for a in args {
                out.push_str(&a.to_display_string());
            }
            Ok(Value::String(out.into()))
        }
        "repeat" => {
            let n = args.first().map(to_number).unwrap_or(0.0);
            if n < 0.0 {
                return Err(Thrown::type_error("Invalid count value"));
            }
            Ok(Value::String(s.repeat(n as usize).into()))
        }
        "padStart" => Ok(Value::String(pad(s, args, true))),
        "padEnd" => Ok(Value::String(pad(s, args, false))),
        "replace" => {
            let from = args.first().map(Value::to_display_string).unwrap_or_default();
            let to = args.get(1).map(Value::to_display_string).unwrap_or_default();
            Ok(Value::String(s.replacen(&from, &to, 1).into()))
        }
        _ => Err(Thrown::type_error(format!("string has no method '{method}'"))),
    }
}

fn pad(s: &Rc<str>, args: &[Value], start: bool) -> Rc<str> {
    let target_len = args.first().map(to_number).unwrap_or(0.0) as usize;
    let pad_str = args.get(1).map(Value::to_display_string).unwrap_or_else(|| " ".to_string());
    let current_len = s.chars().count();
    if current_len >= target_len || pad_str.is_empty() {
        return Rc::clone(s);
    }
    let needed = target_len - current_len;
    let filler: String = pad_str.chars().cycle().take(needed).collect();
    if start {
        format!("{filler}{s}").into()
    } else {
        format!("{s}{filler}").into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_push_mutates_in_place_and_returns_new_length() {
        let arr = Rc::new(RefCell::new(vec![Value::Number(1.0)]));
        let result = call_array_method(&arr, "push", &[Value::Number(2.0)]).unwrap();
        assert!(matches!(result, Value::Number(n) if n == 2.0));
        assert_eq!(arr.borrow().len(), 2);
    }

    #[test]
    fn string_slice_handles_negative_indices() {
        let s: Rc<str> = "hello".into();
        let result = call_string_method(&s, "slice", &[Value::Number(-3.0)]).unwrap();
        assert_eq!(result.to_display_string(), "llo");
    }

    #[test]
    fn array_includes_uses_strict_equality() {
        let arr = Rc::new(RefCell::new(vec![Value::Number(1.0), Value::String("x".into())]));
        let result = call_array_method(&arr, "includes", &[Value::String("x".into())]).unwrap();
        assert!(matches!(result, Value::Boolean(true)));
    }

    #[test]
    fn pad_start_pads_to_target_length() {
        let s: Rc<str> = "5".into();
        let result = pad(&s, &[Value::Number(3.0), Value::String("0".into())], true);
        assert_eq!(&*result, "005");
    }
}

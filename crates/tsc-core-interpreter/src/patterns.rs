//! Binding-pattern destructuring shared by variable declarations, function
//! parameters, and `for`/`catch` targets. The checker has already verified
//! every pattern against its contextual type (§4.3 "Contextual typing");
//! this module only has to perform the runtime decomposition.

use std::cell::RefCell;
use std::rc::Rc;

use tsc_core_ast::{ArrayPattern, ObjectPattern, Pattern};

use crate::env::Scope;
use crate::error::{ExecResult, Thrown};
use crate::value::Value;

/// Binds `value` to `pattern` by declaring every name the pattern exposes
/// into `scope`. `mutable` controls whether the resulting bindings accept
/// reassignment (`let`/`var` vs. `const`, mirroring `VariableDeclKind` at
/// the call site).
pub fn bind_pattern(scope: &Rc<RefCell<Scope>>, pattern: &Pattern, value: Value, mutable: bool, eval_default: &mut dyn FnMut(&tsc_core_ast::Expr) -> ExecResultValue) -> Result<(), Thrown> {
    match pattern {
        Pattern::Ident(id) => {
            scope.borrow_mut().declare(id.name.clone(), value, mutable);
            Ok(())
        }
        Pattern::Assign(inner, default) => {
            let value = if matches!(value, Value::Undefined) { eval_default(default)? } else { value };
            bind_pattern(scope, inner, value, mutable, eval_default)
        }
        Pattern::Array(arr) => bind_array_pattern(scope, arr, value, mutable, eval_default),
        Pattern::Object(obj) => bind_object_pattern(scope, obj, value, mutable, eval_default),
        Pattern::Rest(inner) => bind_pattern(scope, inner, value, mutable, eval_default),
    }
}

type ExecResultValue = Result<Value, Thrown>;

fn bind_array_pattern(
    scope: &Rc<RefCell<Scope>>,
    arr: &ArrayPattern,
    value: Value,
    mutable: bool,
    eval_default: &mut dyn FnMut(&tsc_core_ast::Expr) -> ExecResultValue,
) -> Result<(), Thrown> {
    let Value::Array(items) = value else {
        return Err(Thrown::type_error("value is not iterable"));
    };
    let items = items.borrow().clone();
    for (i, elem) in arr.elements.iter().enumerate() {
        let Some(elem_pattern) = elem else { continue };
        if let Pattern::Rest(inner) = elem_pattern {
            let rest: Vec<Value> = items.iter().skip(i).cloned().collect();
            bind_pattern(scope, inner, Value::Array(Rc::new(RefCell::new(rest))), mutable, eval_default)?;
            break;
        }
        let item = items.get(i).cloned().unwrap_or(Value::Undefined);
        bind_pattern(scope, elem_pattern, item, mutable, eval_default)?;
    }
    Ok(())
}

fn bind_object_pattern(
    scope: &Rc<RefCell<Scope>>,
    obj: &ObjectPattern,
    value: Value,
    mutable: bool,
    eval_default: &mut dyn FnMut(&tsc_core_ast::Expr) -> ExecResultValue,
) -> Result<(), Thrown> {
    let mut taken = Vec::new();
    for prop in &obj.properties {
        if let Pattern::Rest(inner) = &prop.value {
            if let Value::Object(o) = &value {
                let rest: indexmap::IndexMap<String, Value> = o.borrow().iter().filter(|(k, _)| !taken.contains(k)).map(|(k, v)| (k.clone(), v.clone())).collect();
                bind_pattern(scope, inner, Value::Object(Rc::new(RefCell::new(rest))), mutable, eval_default)?;
            }
            continue;
        }
        let field_value = match &value {
            Value::Object(o) => o.borrow().get(&prop.key).cloned().unwrap_or(Value::Undefined),
            Value::Instance(i) => i.fields.borrow().get(&prop.key).cloned().unwrap_or(Value::Undefined),
            _ => Value::Undefined,
        };
        taken.push(prop.key.clone());
        bind_pattern(scope, &prop.value, field_value, mutable, eval_default)?;
    }
    Ok(())
}

/// Convenience wrapper for call sites that have no per-parameter default
/// expression to evaluate (e.g. `catch (e)`), where a defaulted pattern
/// would be a checker-level error anyway.
pub fn bind_pattern_no_defaults(scope: &Rc<RefCell<Scope>>, pattern: &Pattern, value: Value, mutable: bool) -> ExecResult {
    let mut no_default = |_: &tsc_core_ast::Expr| -> ExecResultValue { Err(Thrown::type_error("pattern default not supported in this context")) };
    bind_pattern(scope, pattern, value, mutable, &mut no_default).map(|()| crate::error::Signal::Normal)
}

//! Runtime values (§4.6, §9 "Dynamic typing from the source language").
//!
//! At the interpreter boundary every value is uniformly boxed: there is no
//! unboxed-double fast path here the way the IL emitter has one, since a
//! tree-walker already pays an allocation per AST node visit. The
//! `stack_type` tracker in `tsc-core-lowering` is still consulted (see
//! `Interpreter::eval_expr`) to decide when a *checker-level* optimization
//! applies, e.g. skipping a redundant `typeof` re-check the type checker
//! already proved.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tsc_core_ast::{ArrowExpr, FunctionExpr};

use crate::env::Scope;

pub type ObjectRef = Rc<RefCell<IndexMap<String, Value>>>;
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

#[derive(Clone)]
pub enum Value {
    Number(f64),
    BigInt(i128),
    String(Rc<str>),
    Boolean(bool),
    Null,
    Undefined,
    Symbol(Rc<str>),
    Object(ObjectRef),
    Array(ArrayRef),
    Closure(Rc<Closure>),
    NativeFunction(Rc<NativeFunction>),
    Class(Rc<ClassObject>),
    Instance(Rc<Instance>),
    /// Modeled as an already-settled value (§9 design note on the
    /// interpreter's eager async execution) rather than a real pending
    /// state machine — see `crate::async_rt`.
    Promise(Rc<RefCell<PromiseState>>),
}

#[derive(Debug, Clone)]
pub enum PromiseState {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}

impl Value {
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::BigInt(n) => *n != 0,
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
            Value::Null | Value::Undefined => false,
            _ => true,
        }
    }

    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    #[must_use]
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Symbol(_) => "symbol",
            Value::Object(_) | Value::Array(_) | Value::Instance(_) | Value::Promise(_) => "object",
            Value::Closure(_) | Value::NativeFunction(_) | Value::Class(_) => "function",
        }
    }

    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{n}")
                } else {
                    n.to_string()
                }
            }
            Value::BigInt(n) => n.to_string(),
            Value::String(s) => s.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
            Value::Symbol(s) => format!("Symbol({s})"),
            Value::Array(a) => {
                let items: Vec<String> = a.borrow().iter().map(Value::to_display_string).collect();
                items.join(",")
            }
            Value::Object(_) => "[object Object]".to_string(),
            Value::Instance(i) => format!("[object {}]", i.class.name),
            Value::Closure(_) | Value::NativeFunction(_) => "function".to_string(),
            Value::Class(c) => format!("class {}", c.name),
            Value::Promise(_) => "[object Promise]".to_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

/// A lowered closure record (§4.6 "Closures"): the captured environment
/// plus the function's own parameter list and body. A non-capturing arrow
/// still uses this representation in the interpreter (unlike the IL
/// emitter, which can special-case it to a bare static callable) because
/// tree-walking always needs a body reference to re-enter.
pub struct Closure {
    pub name: Option<String>,
    pub params: Vec<tsc_core_ast::Param>,
    pub body: ClosureBody,
    pub captured_env: Rc<RefCell<Scope>>,
    pub this_value: Option<Value>,
    pub is_async: bool,
    pub is_generator: bool,
    /// Arrow functions never bind their own `this`/`arguments`/`super` —
    /// they resolve those lexically through `captured_env` — so
    /// `Interpreter::call_closure` skips rebinding `this` for these.
    pub is_arrow: bool,
}

pub enum ClosureBody {
    Block(Vec<tsc_core_ast::Stmt>),
    Expr(Box<tsc_core_ast::Expr>),
}

impl Closure {
    #[must_use]
    pub fn from_function(func: &FunctionExpr, env: Rc<RefCell<Scope>>, this_value: Option<Value>) -> Self {
        Closure {
            name: func.name.as_ref().map(|n| n.name.clone()),
            params: func.params.clone(),
            body: ClosureBody::Block(func.body.clone().unwrap_or_default()),
            captured_env: env,
            this_value,
            is_async: func.is_async,
            is_generator: func.is_generator,
            is_arrow: false,
        }
    }

    #[must_use]
    pub fn from_arrow(arrow: &ArrowExpr, env: Rc<RefCell<Scope>>, this_value: Option<Value>) -> Self {
        let body = match &arrow.body {
            tsc_core_ast::ArrowBody::Block(b) => ClosureBody::Block(b.clone()),
            tsc_core_ast::ArrowBody::Expr(e) => ClosureBody::Expr(e.clone()),
        };
        Closure { name: None, params: arrow.params.clone(), body, captured_env: env, this_value, is_async: arrow.is_async, is_generator: false, is_arrow: true }
    }
}

pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: Box<dyn Fn(Option<&Value>, &[Value]) -> Result<Value, Value>>,
}

/// A class's runtime shape: method table (shared across instances) and
/// static members. Nominal identity for `instanceof` is the `Rc` pointer.
pub struct ClassObject {
    pub name: String,
    pub superclass: Option<Rc<ClassObject>>,
    pub methods: FxHashMap<String, Rc<Closure>>,
    pub getters: FxHashMap<String, Rc<Closure>>,
    pub setters: FxHashMap<String, Rc<Closure>>,
    pub static_members: RefCell<IndexMap<String, Value>>,
    pub field_initializers: Vec<(String, Option<tsc_core_ast::Expr>)>,
    pub constructor: Option<Rc<Closure>>,
    /// Private instance field/method names declared directly by this
    /// class, for the brand check (`tsc_core_lowering::private_slots`).
    pub private_slots: rustc_hash::FxHashSet<String>,
    /// The scope the class declaration itself sees, so a field initializer
    /// that is not closed over by any method (e.g. a class with fields but
    /// no methods) still resolves outer names correctly.
    pub defining_scope: Rc<RefCell<Scope>>,
}

impl ClassObject {
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<Rc<Closure>> {
        self.methods.get(name).cloned().or_else(|| self.superclass.as_ref().and_then(|s| s.find_method(name)))
    }

    #[must_use]
    pub fn find_getter(&self, name: &str) -> Option<Rc<Closure>> {
        self.getters.get(name).cloned().or_else(|| self.superclass.as_ref().and_then(|s| s.find_getter(name)))
    }

    #[must_use]
    pub fn find_setter(&self, name: &str) -> Option<Rc<Closure>> {
        self.setters.get(name).cloned().or_else(|| self.superclass.as_ref().and_then(|s| s.find_setter(name)))
    }

    #[must_use]
    pub fn is_subclass_of(self: &Rc<Self>, other: &Rc<ClassObject>) -> bool {
        if Rc::ptr_eq(self, other) {
            return true;
        }
        self.superclass.as_ref().is_some_and(|s| s.is_subclass_of(other))
    }
}

/// An instance's per-object state: public fields in an ordered map (so
/// enumeration order matches declaration/insertion order, matching JS) and
/// a brand map of private-slot values keyed by the *declaring* class's
/// name, since private fields of the same name in unrelated classes never
/// collide (§4.6 "brand checking").
pub struct Instance {
    pub class: Rc<ClassObject>,
    pub fields: RefCell<IndexMap<String, Value>>,
    pub private_slots: RefCell<FxHashMap<String, Value>>,
}

impl Instance {
    #[must_use]
    pub fn has_brand(&self, class_name: &str, slot: &str) -> bool {
        let key = format!("{class_name}#{slot}");
        self.private_slots.borrow().contains_key(&key)
    }
}

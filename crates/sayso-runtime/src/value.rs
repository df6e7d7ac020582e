//! Runtime value representation
//!
//! The dynamic value domain produced by the interpreter:
//! - Numbers are integer or floating-point, chosen lexically at the
//!   literal; integer arithmetic promotes to float on overflow.
//! - Strings and collections are reference-counted (`Rc`) so variable
//!   reads are cheap; the surface language has no element mutation, so
//!   sharing is unobservable.
//! - Mappings preserve insertion order (`IndexMap`).
//! - Equality and ordering are total across value kinds: mismatched kinds
//!   order by a fixed discriminant rank and never raise.

use crate::ast::{FuncDef, LambdaExpr};
use crate::environment::Environment;
use crate::span::Span;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use thiserror::Error;

/// Numeric value: integer or floating-point
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Numeric value as a float
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    /// True for integer zero and float zero (either sign)
    pub fn is_zero(&self) -> bool {
        match self {
            Number::Int(i) => *i == 0,
            Number::Float(f) => *f == 0.0,
        }
    }

    fn binary(self, other: Number, int_op: fn(i64, i64) -> Option<i64>, float_op: fn(f64, f64) -> f64) -> Number {
        match (self, other) {
            // Integer arithmetic stays integral; overflow promotes to float
            (Number::Int(a), Number::Int(b)) => match int_op(a, b) {
                Some(result) => Number::Int(result),
                None => Number::Float(float_op(a as f64, b as f64)),
            },
            (a, b) => Number::Float(float_op(a.as_f64(), b.as_f64())),
        }
    }

    pub fn add(self, other: Number) -> Number {
        self.binary(other, i64::checked_add, |a, b| a + b)
    }

    pub fn sub(self, other: Number) -> Number {
        self.binary(other, i64::checked_sub, |a, b| a - b)
    }

    pub fn mul(self, other: Number) -> Number {
        self.binary(other, i64::checked_mul, |a, b| a * b)
    }

    /// Division always produces a float; the caller rejects zero divisors
    pub fn div(self, other: Number) -> Number {
        Number::Float(self.as_f64() / other.as_f64())
    }

    fn cmp_number(&self, other: &Number) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(b),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()).unwrap_or(Ordering::Equal),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(n) => {
                // Floats always show a decimal point so "5" and "5.0"
                // stay distinguishable in program output
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e16 {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
        }
    }
}

/// Insertion-ordered mapping from value to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    entries: IndexMap<Value, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, keeping the first occurrence's position on duplicate keys
    pub fn insert(&mut self, key: Value, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> indexmap::map::Iter<'_, Value, Value> {
        self.entries.iter()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> indexmap::map::Keys<'_, Value, Value> {
        self.entries.keys()
    }
}

impl FromIterator<(Value, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A named function value. The display name is interior-mutable because
/// `remember f as g` renames the callable it binds.
#[derive(Debug)]
pub struct FunctionValue {
    pub name: RefCell<String>,
    pub decl: Rc<FuncDef>,
}

impl FunctionValue {
    pub fn new(decl: Rc<FuncDef>) -> Self {
        Self {
            name: RefCell::new(decl.name.clone()),
            decl,
        }
    }
}

/// A closure: a lambda plus the environment it was defined in
pub struct ClosureValue {
    pub name: RefCell<String>,
    pub lambda: Rc<LambdaExpr>,
    pub env: Rc<RefCell<Environment>>,
}

impl ClosureValue {
    pub fn new(lambda: Rc<LambdaExpr>, env: Rc<RefCell<Environment>>) -> Self {
        Self {
            name: RefCell::new("lambda".to_string()),
            lambda,
            env,
        }
    }
}

// The captured environment can (through later mutation) hold the closure
// itself, so printing it would recurse forever
impl fmt::Debug for ClosureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureValue")
            .field("name", &self.name.borrow())
            .field("params", &self.lambda.params)
            .finish_non_exhaustive()
    }
}

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// Numeric value (integer or float)
    Number(Number),
    /// String value (reference-counted, immutable)
    String(Rc<String>),
    /// Boolean value
    Bool(bool),
    /// Ordered list of values
    List(Rc<Vec<Value>>),
    /// Insertion-ordered mapping
    Map(Rc<ValueMap>),
    /// Named function definition (no captured scope)
    Function(Rc<FunctionValue>),
    /// Lambda with its captured defining environment
    Closure(Rc<ClosureValue>),
    /// The absence of a value: statement results and calls that never return
    Nothing,
}

impl Value {
    /// Convenience constructor for integer numbers
    pub fn int(i: i64) -> Value {
        Value::Number(Number::Int(i))
    }

    /// Convenience constructor for float numbers
    pub fn float(f: f64) -> Value {
        Value::Number(Number::Float(f))
    }

    /// Convenience constructor for strings
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Rc::new(s.into()))
    }

    /// Convenience constructor for lists
    pub fn list(elements: Vec<Value>) -> Value {
        Value::List(Rc::new(elements))
    }

    /// Name of this value's kind, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::List(_) => "list",
            Value::Map(_) => "mapping",
            Value::Function(_) => "function",
            Value::Closure(_) => "function",
            Value::Nothing => "nothing",
        }
    }

    /// Host truthiness: zero, empty strings/collections, `no`, and
    /// `nothing` are falsy; everything else is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Function(_) | Value::Closure(_) => true,
            Value::Nothing => false,
        }
    }

    /// Display string, as used by `say`, `..`, templates, and `to_string`
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }

    /// Fixed cross-kind rank used when ordering mismatched kinds
    fn rank(&self) -> u8 {
        match self {
            Value::Number(_) => 0,
            Value::String(_) => 1,
            Value::Bool(_) => 2,
            Value::List(_) => 3,
            Value::Map(_) => 4,
            Value::Function(_) => 5,
            Value::Closure(_) => 6,
            Value::Nothing => 7,
        }
    }

    /// Total ordering over the whole value domain. Same-kind values use
    /// their natural ordering; mismatched kinds order by discriminant
    /// rank. Never fails, so cross-type comparisons cannot raise.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.cmp_number(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.total_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Map(a), Value::Map(b)) => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                    let ord = ka.total_cmp(kb).then_with(|| va.total_cmp(vb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Function(a), Value::Function(b)) => a.name.borrow().cmp(&b.name.borrow()),
            (Value::Closure(a), Value::Closure(b)) => a.name.borrow().cmp(&b.name.borrow()),
            (Value::Nothing, Value::Nothing) => Ordering::Equal,
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Function values compare by identity of their definition
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(&a.decl, &b.decl),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Nothing, Value::Nothing) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.rank());
        match self {
            // Int and Float hash through the same f64 image so that
            // numerically equal keys collide (1 == 1.0)
            Value::Number(n) => state.write_u64(n.as_f64().to_bits()),
            Value::String(s) => s.hash(state),
            Value::Bool(b) => b.hash(state),
            Value::List(l) => {
                for v in l.iter() {
                    v.hash(state);
                }
            }
            // Order-insensitive equality forbids hashing entries in order;
            // length alone keeps the Hash/Eq contract
            Value::Map(m) => state.write_usize(m.len()),
            Value::Function(f) => state.write_usize(Rc::as_ptr(&f.decl) as usize),
            Value::Closure(c) => state.write_usize(Rc::as_ptr(c) as usize),
            Value::Nothing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Bool(true) => write!(f, "yes"),
            Value::Bool(false) => write!(f, "no"),
            Value::List(l) => {
                let elements: Vec<String> = l.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", elements.join(", "))
            }
            Value::Map(m) => {
                let entries: Vec<String> =
                    m.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Value::Function(func) => write!(f, "<fn {}>", func.name.borrow()),
            Value::Closure(closure) => write!(f, "<fn {}>", closure.name.borrow()),
            Value::Nothing => write!(f, "nothing"),
        }
    }
}

/// Runtime failure, unwound to the nearest enclosing `try`/`if_it_fails`
/// or to the top level
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// Chain lookup exhausted without finding the name
    #[error("Variable '{name}' not found")]
    UndefinedVariable { name: String, span: Span },
    /// Call to a name with no binding anywhere in the chain
    #[error("Function '{name}' not defined")]
    UndefinedFunction { name: String, span: Span },
    /// Call to a name bound to a non-callable value
    #[error("'{name}' is not a function")]
    NotCallable { name: String, span: Span },
    /// Wrong operand or argument type
    #[error("Type error: {msg}")]
    TypeError { msg: String, span: Span },
    /// Division by exactly zero
    #[error("Division by zero")]
    DivideByZero { span: Span },
    /// Required parameter with neither an argument nor a default
    #[error("Function '{function}' missing required argument: {param}")]
    MissingArgument {
        function: String,
        param: String,
        span: Span,
    },
    /// Bad argument to a builtin function
    #[error("{msg}")]
    InvalidBuiltinArgument { msg: String, span: Span },
    /// Reading program input failed
    #[error("I/O error: {message}")]
    IoError { message: String, span: Span },
}

impl RuntimeError {
    /// Source location of the failure
    pub fn span(&self) -> Span {
        match self {
            RuntimeError::UndefinedVariable { span, .. }
            | RuntimeError::UndefinedFunction { span, .. }
            | RuntimeError::NotCallable { span, .. }
            | RuntimeError::TypeError { span, .. }
            | RuntimeError::DivideByZero { span }
            | RuntimeError::MissingArgument { span, .. }
            | RuntimeError::InvalidBuiltinArgument { span, .. }
            | RuntimeError::IoError { span, .. } => *span,
        }
    }
}

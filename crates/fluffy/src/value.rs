//! Dynamic values flowing through do-blocks.
//!
//! The monadic variants hold the typed instances from [`crate::instances`] instantiated at
//! `Value`, so a `Value::Maybe` is a real [`Maybe<Value>`] and binds exactly like one. The
//! dynamic reader is a [`Function`] from `Value` to [`Fallible`]: evaluation failures inside a
//! reader only surface when it is run.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::error::EvalError;
use crate::instances::{Function, Identity, List, Maybe, Outcome};

pub type Fallible = Result<Value, EvalError>;

/// Reader over dynamic values.
pub type Reader = Function<Value, Fallible>;

pub type NativeFunc = dyn Fn(Vec<Value>) -> Fallible + Send + Sync;

#[derive(Clone, Debug)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Tuple(Vec<Value>),
    Callable(Callable),
    Identity(Arc<Identity<Value>>),
    Maybe(Arc<Maybe<Value>>),
    Outcome(Arc<Outcome<Value>>),
    List(Arc<List<Value>>),
    Function(Reader),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "Unit",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Text(_) => "Text",
            Value::Tuple(_) => "Tuple",
            Value::Callable(_) => "Callable",
            Value::Identity(_) => "Identity",
            Value::Maybe(_) => "Maybe",
            Value::Outcome(_) => "Result",
            Value::List(_) => "List",
            Value::Function(_) => "Function",
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn identity(value: Value) -> Self {
        Value::Identity(Arc::new(Identity(value)))
    }

    pub fn just(value: Value) -> Self {
        Value::Maybe(Arc::new(Maybe::Just(value)))
    }

    pub fn nothing() -> Self {
        Value::Maybe(Arc::new(Maybe::Nothing))
    }

    pub fn success(value: Value) -> Self {
        Value::Outcome(Arc::new(Outcome::Success(value)))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Value::Outcome(Arc::new(Outcome::error(message)))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Arc::new(List::of(items)))
    }

    pub fn reader<F>(f: F) -> Self
    where
        F: Fn(Value) -> Fallible + Send + Sync + 'static,
    {
        Value::Function(Function::new(f))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_maybe(&self) -> Option<&Maybe<Value>> {
        match self {
            Value::Maybe(maybe) => Some(maybe),
            _ => None,
        }
    }

    pub fn as_outcome(&self) -> Option<&Outcome<Value>> {
        match self {
            Value::Outcome(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List<Value>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Supplies `env` to a reader value.
    pub fn run_reader(&self, env: Value) -> Fallible {
        match self {
            Value::Function(reader) => reader.run(env),
            other => Err(EvalError::type_mismatch("Function", other.type_name())),
        }
    }

    /// Truthiness used by `if`, `!`, `&&` and `||`; only `Bool` qualifies.
    pub(crate) fn expect_bool(&self) -> Result<bool, EvalError> {
        self.as_bool()
            .ok_or_else(|| EvalError::type_mismatch("Bool", self.type_name()))
    }

    pub(crate) fn expect_int(&self) -> Result<i64, EvalError> {
        self.as_int()
            .ok_or_else(|| EvalError::type_mismatch("Int", self.type_name()))
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Callable> for Value {
    fn from(value: Callable) -> Self {
        Value::Callable(value)
    }
}

impl From<Identity<Value>> for Value {
    fn from(value: Identity<Value>) -> Self {
        Value::Identity(Arc::new(value))
    }
}

impl From<Maybe<Value>> for Value {
    fn from(value: Maybe<Value>) -> Self {
        Value::Maybe(Arc::new(value))
    }
}

impl From<Outcome<Value>> for Value {
    fn from(value: Outcome<Value>) -> Self {
        Value::Outcome(Arc::new(value))
    }
}

impl From<List<Value>> for Value {
    fn from(value: List<Value>) -> Self {
        Value::List(Arc::new(value))
    }
}

impl From<List<i64>> for Value {
    fn from(value: List<i64>) -> Self {
        Value::List(Arc::new(value.fmap(Value::Int)))
    }
}

impl From<Reader> for Value {
    fn from(value: Reader) -> Self {
        Value::Function(value)
    }
}

/// Structural equality. Readers and callables are opaque and never equal, not even to
/// themselves.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Identity(a), Value::Identity(b)) => a == b,
            (Value::Maybe(a), Value::Maybe(b)) => a == b,
            (Value::Outcome(a), Value::Outcome(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value:?}"),
            Value::Text(value) => write!(f, "\"{}\"", value.escape_debug()),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Callable(callable) => write!(f, "<callable {}>", callable.name()),
            Value::Identity(identity) => write!(f, "{identity}"),
            Value::Maybe(maybe) => write!(f, "{maybe}"),
            Value::Outcome(outcome) => write!(f, "{outcome}"),
            Value::List(list) => write!(f, "{list}"),
            Value::Function(_) => write!(f, "<function>"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Unit => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::Text(value) => serializer.serialize_str(value),
            Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Callable(callable) => {
                serializer.serialize_str(&format!("<callable {}>", callable.name()))
            }
            Value::Identity(identity) => identity.as_ref().serialize(serializer),
            Value::Maybe(maybe) => maybe.as_ref().serialize(serializer),
            Value::Outcome(outcome) => outcome.as_ref().serialize(serializer),
            Value::List(list) => list.as_ref().serialize(serializer),
            Value::Function(_) => serializer.serialize_str("<function>"),
        }
    }
}

/// A named native function with a fixed arity.
///
/// Collaborators enter do-blocks this way: an expression calls the callable with evaluated
/// arguments and gets a `Value` back.
#[derive(Clone)]
pub struct Callable {
    name: String,
    arity: usize,
    func: Arc<NativeFunc>,
}

impl Callable {
    pub fn new<F>(name: impl Into<String>, arity: usize, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fallible + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            arity,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(&self, args: Vec<Value>) -> Fallible {
        if args.len() != self.arity {
            return Err(EvalError::ArityMismatch {
                name: self.name.clone(),
                expected: self.arity,
                found: args.len(),
            });
        }
        (self.func)(args)
    }

    /// Wraps the result in `Success`, and any failure in `Error(message)`.
    ///
    /// Arity is still checked eagerly; only failures raised by the function body are caught.
    pub fn safe(self) -> Callable {
        let name = format!("safe({})", self.name);
        let inner = self.func;
        Callable::new(name, self.arity, move |args| {
            Ok(match inner(args) {
                Ok(value) => Value::success(value),
                Err(EvalError::Call { message, .. }) => Value::error(message),
                Err(err) => Value::error(err.to_string()),
            })
        })
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

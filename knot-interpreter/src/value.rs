//! Runtime value representation for the Knot interpreter.
//!
//! Values are plain data: closures hold their function literal and a copy of
//! the local bindings that were visible when they were created. Global
//! bindings are never captured, which is what makes named recursion late
//! bound. Everything here derives serde so any value, closures included,
//! can be written to a snapshot and read back elsewhere.

use crate::error::{EvaluationError, Result};
use crate::intrinsics::Intrinsic;
use indexmap::IndexMap;
use knot_parser::FunctionLiteral;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Runtime values in the Knot interpreter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    /// Boolean value
    Boolean(bool),
    /// UTF-8 string
    String(String),
    /// Fixed-size tuple; rest parameters collect into one
    Tuple(Vec<Value>),
    /// Unit value (no meaningful result)
    Unit,
    /// User-defined function with its captured locals
    Closure(Rc<Closure>),
    /// Built-in function
    Intrinsic(Intrinsic),
}

/// A function value
#[derive(Clone, Serialize, Deserialize)]
pub struct Closure {
    /// Name given by the first `let` that bound it, for diagnostics only
    pub name: Option<String>,
    pub function: Rc<FunctionLiteral>,
    /// Locals visible at creation time
    pub captured: IndexMap<String, Value>,
    /// Name of the source text the function literal was written in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Rc<str>>,
}

impl Closure {
    pub fn new(function: Rc<FunctionLiteral>, captured: IndexMap<String, Value>) -> Self {
        Self {
            name: None,
            function,
            captured,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: Option<Rc<str>>) -> Self {
        self.origin = origin;
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }

    /// Human readable arity, e.g. `2` or `at least 1`
    pub fn arity_description(&self) -> String {
        if self.function.is_variadic() {
            format!("at least {}", self.function.arity())
        } else {
            self.function.arity().to_string()
        }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name)
            .field("arity", &self.arity_description())
            .field("captured", &self.captured.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Value {
    pub fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    pub fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Boolean(_) => "Boolean",
            Value::String(_) => "String",
            Value::Tuple(_) => "Tuple",
            Value::Unit => "Unit",
            Value::Closure(_) | Value::Intrinsic(_) => "Function",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Closure(_) | Value::Intrinsic(_))
    }

    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Value::Integer(n) => Ok(*n),
            other => Err(EvaluationError::type_mismatch("Integer", other.type_name())),
        }
    }

    pub fn as_boolean(&self) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(EvaluationError::type_mismatch("Boolean", other.type_name())),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(EvaluationError::type_mismatch("String", other.type_name())),
        }
    }

    /// Same value with a name attached, if it is an unnamed closure
    pub fn named(self, name: &str) -> Value {
        match self {
            Value::Closure(closure) if closure.name.is_none() => {
                let mut named = (*closure).clone();
                named.name = Some(name.to_string());
                Value::Closure(Rc::new(named))
            }
            other => other,
        }
    }

    /// Convert to display string for REPL output (strings are quoted)
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => format!("{s:?}"),
            Value::Tuple(items) => format_tuple(items.iter().map(Value::to_display_string)),
            _ => self.to_string(),
        }
    }

    // Arithmetic operations

    pub fn add(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a
                .checked_add(*b)
                .map(Value::Integer)
                .ok_or_else(|| EvaluationError::integer_overflow("+")),
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
            (Value::Tuple(a), Value::Tuple(b)) => {
                Ok(Value::Tuple(a.iter().chain(b.iter()).cloned().collect()))
            }
            _ => Err(self.invalid("+", other)),
        }
    }

    pub fn subtract(&self, other: &Value) -> Result<Value> {
        self.integer_op("-", other, i64::checked_sub)
    }

    pub fn multiply(&self, other: &Value) -> Result<Value> {
        self.integer_op("*", other, i64::checked_mul)
    }

    /// Integer division, truncating toward zero
    pub fn divide(&self, other: &Value) -> Result<Value> {
        if matches!(other, Value::Integer(0)) && matches!(self, Value::Integer(_)) {
            return Err(EvaluationError::division_by_zero());
        }
        self.integer_op("/", other, i64::checked_div)
    }

    pub fn modulo(&self, other: &Value) -> Result<Value> {
        if matches!(other, Value::Integer(0)) && matches!(self, Value::Integer(_)) {
            return Err(EvaluationError::division_by_zero());
        }
        self.integer_op("%", other, i64::checked_rem)
    }

    pub fn negate(&self) -> Result<Value> {
        match self {
            Value::Integer(n) => n
                .checked_neg()
                .map(Value::Integer)
                .ok_or_else(|| EvaluationError::integer_overflow("-")),
            other => Err(EvaluationError::invalid_operation("-", &[other.type_name()])),
        }
    }

    pub fn not(&self) -> Result<Value> {
        match self {
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            other => Err(EvaluationError::invalid_operation("!", &[other.type_name()])),
        }
    }

    fn integer_op(
        &self,
        operation: &str,
        other: &Value,
        op: fn(i64, i64) -> Option<i64>,
    ) -> Result<Value> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => op(*a, *b)
                .map(Value::Integer)
                .ok_or_else(|| EvaluationError::integer_overflow(operation)),
            _ => Err(self.invalid(operation, other)),
        }
    }

    fn invalid(&self, operation: &str, other: &Value) -> EvaluationError {
        EvaluationError::invalid_operation(operation, &[self.type_name(), other.type_name()])
    }

    // Comparison operations

    /// Structural equality; functions compare by identity
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
            }
            (Value::Unit, Value::Unit) => true,
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Intrinsic(a), Value::Intrinsic(b)) => a == b,
            _ => false,
        }
    }

    /// Ordering for integers and strings
    pub fn compare(&self, other: &Value, operation: &str) -> Result<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
            _ => Err(self.invalid(operation, other)),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
            Value::Tuple(items) => f.write_str(&format_tuple(items.iter().map(Value::to_string))),
            Value::Unit => f.write_str("unit"),
            Value::Closure(closure) => {
                write!(f, "Function<{}/{}", closure.display_name(), closure.function.arity())?;
                if closure.function.is_variadic() {
                    f.write_str("+")?;
                }
                f.write_str(">")
            }
            Value::Intrinsic(intrinsic) => write!(f, "Intrinsic<{}>", intrinsic.name()),
        }
    }
}

fn format_tuple(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    if items.len() == 1 {
        format!("({},)", items[0])
    } else {
        format!("({})", items.join(", "))
    }
}

//! Runtime value representation
//!
//! Values are cheap to clone: strings and JSON documents are reference
//! counted, arrays are copy-on-write.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Copy-on-write array. Cheap to clone (refcount bump).
/// Mutations on a shared array clone the inner Vec first (Arc::make_mut).
#[derive(Clone, Debug, Default)]
pub struct ValueArray(Arc<Vec<Value>>);

impl ValueArray {
    pub fn new() -> Self {
        ValueArray(Arc::new(Vec::new()))
    }

    pub fn from_vec(v: Vec<Value>) -> Self {
        ValueArray(Arc::new(v))
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Replace an element; returns false when `index` is out of range
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        let inner = Arc::make_mut(&mut self.0);
        if index < inner.len() {
            inner[index] = value;
            true
        } else {
            false
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl PartialEq for ValueArray {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice() == other.0.as_slice()
    }
}

impl From<Vec<Value>> for ValueArray {
    fn from(v: Vec<Value>) -> Self {
        ValueArray::from_vec(v)
    }
}

impl FromIterator<Value> for ValueArray {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        ValueArray(Arc::new(iter.into_iter().collect()))
    }
}

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(Arc<String>),
    Array(ValueArray),
    Json(Arc<serde_json::Value>),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    /// Create an array value
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(ValueArray::from_vec(values))
    }

    /// Wrap a JSON document
    pub fn json(value: serde_json::Value) -> Self {
        Value::Json(Arc::new(value))
    }

    /// Name of the value's type, as used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Json(_) => "json",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert to a JSON document; NaN and infinite floats become `null`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.as_ref().clone()),
            Value::Array(arr) => serde_json::Value::Array(arr.iter().map(Value::to_json).collect()),
            Value::Json(j) => j.as_ref().clone(),
        }
    }

    /// Quoted form used when a value is printed inside an array
    fn write_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s),
            other => write!(f, "{}", other),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => {
                // Whole floats keep a trailing ".0" so they read as floats
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, value) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    value.write_nested(f)?;
                }
                write!(f, "]")
            }
            Value::Json(json) => write!(f, "{}", json),
        }
    }
}

/// Runtime failure raised while evaluating a unit
///
/// The `Display` text of every variant is stable and part of the public
/// contract: embedders and tests compare it verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Index outside `[0, size)`
    #[error("Array index out of range: Index: {index}, Size: {size}")]
    IndexOutOfRange { index: i64, size: usize },

    /// Failure reported by a native function, message passed through as-is
    #[error("{message}")]
    Native { message: String },

    /// Call target resolved neither in the unit nor in the scope
    #[error("Undefined function: {name}")]
    UndefinedFunction { name: String },

    /// Entry function missing from the invoked unit
    #[error("Function '{name}' is not defined in {file}")]
    FunctionNotFound { name: String, file: String },

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },

    /// `alias:f()` with an alias the unit never imported
    #[error("Undefined package alias: {alias}")]
    UndefinedAlias { alias: String },

    #[error("Incompatible types: {detail}")]
    TypeMismatch { detail: String },

    #[error("Function '{name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("/ by zero")]
    DivideByZero,

    #[error("Stack overflow: maximum call depth of {limit} exceeded")]
    StackOverflow { limit: usize },

    /// The OS refused to start the thread an invocation runs on
    #[error("Failed to start evaluation thread: {reason}")]
    EvaluationThread { reason: String },
}

impl RuntimeError {
    /// Failure raised from inside a native function
    pub fn native(message: impl Into<String>) -> Self {
        RuntimeError::Native {
            message: message.into(),
        }
    }

    pub fn type_mismatch(detail: impl Into<String>) -> Self {
        RuntimeError::TypeMismatch {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::index(RuntimeError::IndexOutOfRange { index: 5, size: 2 }, "Array index out of range: Index: 5, Size: 2")]
    #[case::native(RuntimeError::native("boom"), "boom")]
    #[case::arity(
        RuntimeError::ArityMismatch { name: "f".into(), expected: 1, found: 3 },
        "Function 'f' expects 1 argument(s), got 3"
    )]
    #[case::divide(RuntimeError::DivideByZero, "/ by zero")]
    #[case::overflow(RuntimeError::StackOverflow { limit: 200 }, "Stack overflow: maximum call depth of 200 exceeded")]
    #[case::thread(
        RuntimeError::EvaluationThread { reason: "out of memory".to_string() },
        "Failed to start evaluation thread: out of memory"
    )]
    fn test_error_messages(#[case] error: RuntimeError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_display() {
        let arr = Value::array(vec![Value::string("Lion"), Value::Int(2), Value::Float(3.0)]);
        assert_eq!(arr.to_string(), r#"["Lion", 2, 3.0]"#);
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn test_int_float_equality() {
        assert_eq!(Value::Int(3), Value::Float(3.0));
        assert_ne!(Value::Int(3), Value::string("3"));
    }

    #[test]
    fn test_array_copy_on_write() {
        let original = ValueArray::from_vec(vec![Value::Int(1), Value::Int(2)]);
        let mut copy = original.clone();
        assert!(copy.set(0, Value::Int(9)));
        assert!(!copy.set(5, Value::Int(9)));
        assert_eq!(original.get(0), Some(&Value::Int(1)));
        assert_eq!(copy.get(0), Some(&Value::Int(9)));
    }

    #[test]
    fn test_to_json() {
        let value = Value::array(vec![Value::string("a"), Value::Float(f64::NAN)]);
        assert_eq!(value.to_json(), serde_json::json!(["a", null]));
    }
}

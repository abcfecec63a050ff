//! Native function registration and builder
//!
//! Native functions are Rust closures callable from Ember code under a
//! qualified name (`package:name`). They are registered into a [`SymScope`]
//! and dispatched by the evaluator when a call target resolves only through
//! the scope.
//!
//! ```rust
//! use ember_runtime::native::NativeFunctionBuilder;
//! use ember_runtime::value::{RuntimeError, Value};
//!
//! let upper = NativeFunctionBuilder::new("demo.strings", "upper")
//!     .with_arity(1)
//!     .with_implementation(|args| match &args[0] {
//!         Value::String(s) => Ok(Value::string(s.to_uppercase())),
//!         other => Err(RuntimeError::native(format!(
//!             "upper expects a string, got {}",
//!             other.type_name()
//!         ))),
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(upper.qualified_name(), "demo.strings:upper");
//! ```
//!
//! [`SymScope`]: crate::scope::SymScope

use crate::value::{RuntimeError, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared native implementation
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync>;

/// A host-provided callable with a stable qualified name
#[derive(Clone)]
pub struct NativeFunction {
    package: String,
    name: String,
    /// Required argument count; `None` for variadic functions
    arity: Option<usize>,
    implementation: NativeFn,
}

impl NativeFunction {
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    /// `package:name`
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.package, self.name)
    }

    /// Invoke the function, validating the argument count first
    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        if let Some(expected) = self.arity {
            if args.len() != expected {
                return Err(RuntimeError::ArityMismatch {
                    name: self.qualified_name(),
                    expected,
                    found: args.len(),
                });
            }
        }
        (self.implementation)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("package", &self.package)
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing native functions with arity validation
pub struct NativeFunctionBuilder {
    package: String,
    name: String,
    arity: Option<usize>,
    implementation: Option<NativeFn>,
}

impl NativeFunctionBuilder {
    /// Start a builder for `package:name`
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            arity: None,
            implementation: None,
        }
    }

    /// Require exactly `arity` arguments. Calls with another count fail
    /// before the implementation runs.
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Accept any number of arguments
    pub fn variadic(mut self) -> Self {
        self.arity = None;
        self
    }

    pub fn with_implementation<F>(mut self, implementation: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        self.implementation = Some(Arc::new(implementation));
        self
    }

    /// Build the native function
    pub fn build(self) -> Result<NativeFunction, BuildError> {
        if self.package.is_empty() || self.name.is_empty() {
            return Err(BuildError::EmptyName);
        }
        let implementation = self
            .implementation
            .ok_or_else(|| BuildError::MissingImplementation(format!("{}:{}", self.package, self.name)))?;

        Ok(NativeFunction {
            package: self.package,
            name: self.name,
            arity: self.arity,
            implementation,
        })
    }
}

/// Errors that can occur when building a native function
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Native function '{0}' missing implementation")]
    MissingImplementation(String),
    #[error("Native function package and name must not be empty")]
    EmptyName,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn add() -> NativeFunction {
        NativeFunctionBuilder::new("demo.math", "add")
            .with_arity(2)
            .with_implementation(|args| match (&args[0], &args[1]) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
                _ => Err(RuntimeError::native("add expects ints")),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_fixed_arity() {
        let func = add();
        assert_eq!(func.call(&[Value::Int(10), Value::Int(20)]).unwrap(), Value::Int(30));

        let err = func.call(&[Value::Int(10)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Function 'demo.math:add' expects 2 argument(s), got 1"
        );
    }

    #[test]
    fn test_implementation_error_passes_through() {
        let err = add().call(&[Value::Null, Value::Null]).unwrap_err();
        assert_eq!(err, RuntimeError::native("add expects ints"));
    }

    #[test]
    fn test_builder_variadic() {
        let count = NativeFunctionBuilder::new("demo", "count")
            .variadic()
            .with_implementation(|args| Ok(Value::Int(args.len() as i64)))
            .build()
            .unwrap();
        assert_eq!(count.arity(), None);
        assert_eq!(count.call(&vec![Value::Null; 3]).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_builder_missing_implementation() {
        let err = NativeFunctionBuilder::new("demo", "nothing").build().unwrap_err();
        assert_eq!(err.to_string(), "Native function 'demo:nothing' missing implementation");
    }

    #[test]
    fn test_builder_empty_name() {
        let err = NativeFunctionBuilder::new("", "f")
            .with_implementation(|_| Ok(Value::Null))
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::EmptyName);
    }
}

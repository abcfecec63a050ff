//! Symbol scopes for native function bindings
//!
//! A [`SymScope`] maps qualified names (`package:name`) to native functions.
//! Scopes form a hierarchy: a lookup that misses falls through to the parent.
//! The process-wide root scope is created lazily by [`global_scope`] and comes
//! preloaded with the standard natives; embedders and tests that need
//! isolation build their own root with [`SymScope::new_root`].

use crate::native::{BuildError, NativeFunction};
use crate::stdlib;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Qualified function identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolName {
    pub package: String,
    pub name: String,
}

impl SymbolName {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.package, self.name)
    }
}

/// Registration failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("Native function '{0}' is already registered")]
    DuplicateNative(SymbolName),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Symbol table holding native bindings
#[derive(Debug)]
pub struct SymScope {
    parent: Option<Arc<SymScope>>,
    natives: RwLock<HashMap<SymbolName, Arc<NativeFunction>>>,
}

impl SymScope {
    /// Create an empty scope with no parent
    pub fn new_root() -> Arc<Self> {
        Arc::new(Self {
            parent: None,
            natives: RwLock::new(HashMap::new()),
        })
    }

    /// Create an empty child scope; lookups that miss here consult `parent`
    pub fn with_parent(parent: Arc<SymScope>) -> Arc<Self> {
        Arc::new(Self {
            parent: Some(parent),
            natives: RwLock::new(HashMap::new()),
        })
    }

    pub fn parent(&self) -> Option<&Arc<SymScope>> {
        self.parent.as_ref()
    }

    /// Register a native function under its qualified name.
    ///
    /// Fails if this scope already binds the name. A child scope may shadow
    /// a binding inherited from its parent.
    pub fn add_native(&self, function: NativeFunction) -> Result<(), ScopeError> {
        let symbol = SymbolName::new(function.package(), function.name());
        let mut natives = self.natives.write();
        if natives.contains_key(&symbol) {
            return Err(ScopeError::DuplicateNative(symbol));
        }
        tracing::trace!(native = %symbol, "registered native function");
        natives.insert(symbol, Arc::new(function));
        Ok(())
    }

    /// Resolve a native function, walking up the parent chain
    pub fn lookup(&self, symbol: &SymbolName) -> Option<Arc<NativeFunction>> {
        if let Some(found) = self.natives.read().get(symbol) {
            return Some(Arc::clone(found));
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(symbol))
    }

    /// Convenience wrapper around [`SymScope::lookup`]
    pub fn lookup_native(&self, package: &str, name: &str) -> Option<Arc<NativeFunction>> {
        self.lookup(&SymbolName::new(package, name))
    }

    /// Whether any function is registered under `package`, here or in a parent
    pub fn has_package(&self, package: &str) -> bool {
        self.natives.read().keys().any(|s| s.package == package)
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.has_package(package))
    }

    /// Names bound directly in this scope, sorted
    pub fn symbols(&self) -> Vec<SymbolName> {
        let mut names: Vec<SymbolName> = self.natives.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of bindings held directly by this scope
    pub fn len(&self) -> usize {
        self.natives.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static GLOBAL_SCOPE: Lazy<Arc<SymScope>> = Lazy::new(|| {
    let scope = SymScope::new_root();
    if let Err(err) = stdlib::register_all(&scope) {
        tracing::error!(error = %err, "failed to register standard natives");
    }
    tracing::debug!(natives = scope.len(), "initialized global scope");
    scope
});

/// The process-wide root scope, initialized on first access
pub fn global_scope() -> Arc<SymScope> {
    Arc::clone(&GLOBAL_SCOPE)
}

/// Register `function` into `scope`
pub fn add_native_function(scope: &SymScope, function: NativeFunction) -> Result<(), ScopeError> {
    scope.add_native(function)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeFunctionBuilder;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn constant(package: &str, name: &str, value: i64) -> NativeFunction {
        NativeFunctionBuilder::new(package, name)
            .with_arity(0)
            .with_implementation(move |_| Ok(Value::Int(value)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let scope = SymScope::new_root();
        add_native_function(&scope, constant("demo", "one", 1)).unwrap();

        let found = scope.lookup_native("demo", "one").unwrap();
        assert_eq!(found.call(&[]).unwrap(), Value::Int(1));
        assert!(scope.lookup_native("demo", "two").is_none());
        assert!(scope.has_package("demo"));
        assert!(!scope.has_package("other"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let scope = SymScope::new_root();
        scope.add_native(constant("demo", "one", 1)).unwrap();
        let err = scope.add_native(constant("demo", "one", 2)).unwrap_err();
        assert_eq!(err.to_string(), "Native function 'demo:one' is already registered");
        // First registration wins
        assert_eq!(
            scope.lookup_native("demo", "one").unwrap().call(&[]).unwrap(),
            Value::Int(1)
        );
    }

    #[test]
    fn test_child_falls_through_and_shadows() {
        let root = SymScope::new_root();
        root.add_native(constant("demo", "one", 1)).unwrap();
        root.add_native(constant("demo", "two", 2)).unwrap();

        let child = SymScope::with_parent(Arc::clone(&root));
        child.add_native(constant("demo", "two", 22)).unwrap();

        assert_eq!(child.lookup_native("demo", "one").unwrap().call(&[]).unwrap(), Value::Int(1));
        assert_eq!(child.lookup_native("demo", "two").unwrap().call(&[]).unwrap(), Value::Int(22));
        assert_eq!(root.lookup_native("demo", "two").unwrap().call(&[]).unwrap(), Value::Int(2));
        assert_eq!(child.len(), 1);
        assert!(child.has_package("demo"));
    }

    #[test]
    fn test_global_scope_is_shared_and_preloaded() {
        let a = global_scope();
        let b = global_scope();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.lookup_native("ballerina.lang.json", "getString").is_some());
    }

    #[test]
    fn test_symbols_sorted() {
        let scope = SymScope::new_root();
        scope.add_native(constant("b", "x", 0)).unwrap();
        scope.add_native(constant("a", "y", 0)).unwrap();
        let names: Vec<String> = scope.symbols().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["a:y", "b:x"]);
    }
}

//! Standard native functions
//!
//! Each package module exposes a `register` function; [`register_all`]
//! installs every package into a scope. The global scope is populated this
//! way on first access.

mod arrays;
mod json;
mod system;

use crate::native::NativeFunctionBuilder;
use crate::scope::{ScopeError, SymScope};

pub const JSON_PACKAGE: &str = "ballerina.lang.json";
pub const ARRAYS_PACKAGE: &str = "ballerina.lang.arrays";
pub const SYSTEM_PACKAGE: &str = "ballerina.lang.system";

/// Register every standard package into `scope`
pub fn register_all(scope: &SymScope) -> Result<(), ScopeError> {
    json::register(scope)?;
    arrays::register(scope)?;
    system::register(scope)?;
    Ok(())
}

/// Build and register one native
fn add(scope: &SymScope, builder: NativeFunctionBuilder) -> Result<(), ScopeError> {
    scope.add_native(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_into_fresh_scope() {
        let scope = SymScope::new_root();
        register_all(&scope).unwrap();
        for (package, name) in [
            (JSON_PACKAGE, "getString"),
            (JSON_PACKAGE, "getBoolean"),
            (ARRAYS_PACKAGE, "length"),
            (SYSTEM_PACKAGE, "println"),
        ] {
            assert!(scope.lookup_native(package, name).is_some(), "{}:{}", package, name);
        }
    }

    #[test]
    fn test_register_all_twice_is_rejected() {
        let scope = SymScope::new_root();
        register_all(&scope).unwrap();
        let err = register_all(&scope).unwrap_err();
        assert!(matches!(err, ScopeError::DuplicateNative(_)));
    }
}

//! `ballerina.lang.system`

use crate::native::NativeFunctionBuilder;
use crate::scope::{ScopeError, SymScope};
use crate::stdlib::{add, SYSTEM_PACKAGE};
use crate::value::Value;

pub(super) fn register(scope: &SymScope) -> Result<(), ScopeError> {
    add(
        scope,
        NativeFunctionBuilder::new(SYSTEM_PACKAGE, "println")
            .with_arity(1)
            .with_implementation(|args| {
                println!("{}", args[0]);
                Ok(Value::Null)
            }),
    )
}

//! `ballerina.lang.arrays`

use crate::native::NativeFunctionBuilder;
use crate::scope::{ScopeError, SymScope};
use crate::stdlib::{add, ARRAYS_PACKAGE};
use crate::value::{RuntimeError, Value};

fn length(args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Array(arr) => Ok(Value::Int(arr.len() as i64)),
        Value::Json(json) => match json.as_array() {
            Some(items) => Ok(Value::Int(items.len() as i64)),
            None => Err(RuntimeError::native("length expects an array, got json")),
        },
        other => Err(RuntimeError::native(format!(
            "length expects an array, got {}",
            other.type_name()
        ))),
    }
}

pub(super) fn register(scope: &SymScope) -> Result<(), ScopeError> {
    add(
        scope,
        NativeFunctionBuilder::new(ARRAYS_PACKAGE, "length")
            .with_arity(1)
            .with_implementation(length),
    )
}

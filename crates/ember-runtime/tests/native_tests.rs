//! Registering native functions and calling them from source

use ember_runtime::{
    add_native_function, get_stack_trace, global_scope, parse_source, stdlib, Context, Interpreter,
    NativeFunctionBuilder, RuntimeError, ScopeError, SymScope, SymbolName, Value,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const CALLER: &str = r#"package demo.app;

import host.math as m;

function twice(int n) (int) {
    return m:double(n);
}

function broken() (int) {
    return m:fail(1);
}

function tooMany() (int) {
    return m:double(1, 2);
}
"#;

fn host_scope() -> Arc<SymScope> {
    let scope = SymScope::with_parent(global_scope());
    let double = NativeFunctionBuilder::new("host.math", "double")
        .with_arity(1)
        .with_implementation(|args| match &args[0] {
            Value::Int(n) => Ok(Value::Int(n * 2)),
            other => Err(RuntimeError::native(format!("double expects int, got {}", other.type_name()))),
        })
        .build()
        .unwrap();
    let fail = NativeFunctionBuilder::new("host.math", "fail")
        .variadic()
        .with_implementation(|_| Err(RuntimeError::native("host failure")))
        .build()
        .unwrap();
    add_native_function(&scope, double).unwrap();
    add_native_function(&scope, fail).unwrap();
    scope
}

#[test]
fn test_custom_native_in_child_scope() {
    let unit = parse_source("app.bal", CALLER, host_scope()).unwrap();
    let mut context = Context::new();

    let value = Interpreter::new()
        .invoke_with_args(&unit, "twice", vec![Value::Int(21)], &mut context)
        .unwrap();

    assert_eq!(value, Value::Int(42));
    assert!(context.control_stack().is_empty());
}

#[test]
fn test_child_scope_does_not_leak_into_global() {
    let _ = host_scope();
    assert!(global_scope().lookup_native("host.math", "double").is_none());
}

#[test]
fn test_unit_without_host_scope_cannot_resolve() {
    let unit = parse_source("app.bal", CALLER, global_scope()).unwrap();
    let err = Interpreter::new()
        .invoke_with_args(&unit, "twice", vec![Value::Int(1)], &mut Context::new())
        .unwrap_err();
    assert_eq!(err.to_string(), "Undefined function: m:double");
}

#[test]
fn test_native_error_trace() {
    let unit = parse_source("app.bal", CALLER, host_scope()).unwrap();
    let mut context = Context::new();

    let err = Interpreter::new()
        .invoke(&unit, "broken", Some(&mut context))
        .unwrap_err();

    assert_eq!(err, RuntimeError::native("host failure"));
    assert_eq!(
        get_stack_trace(&context),
        "\t at host.math:fail(<native>:0)\n\
         \t at demo.app:broken(app.bal:10)\n\
         \t at demo.app:<entry>(app.bal:0)\n"
    );
}

#[test]
fn test_native_arity_checked() {
    let unit = parse_source("app.bal", CALLER, host_scope()).unwrap();
    let err = Interpreter::new()
        .invoke(&unit, "tooMany", None)
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::ArityMismatch {
            name: "host.math:double".to_string(),
            expected: 1,
            found: 2,
        }
    );
}

#[test]
fn test_duplicate_registration_rejected() {
    let scope = SymScope::new_root();
    let build = || {
        NativeFunctionBuilder::new("host.math", "double")
            .with_arity(1)
            .with_implementation(|args| Ok(args[0].clone()))
            .build()
            .unwrap()
    };

    add_native_function(&scope, build()).unwrap();
    let err = add_native_function(&scope, build()).unwrap_err();

    assert_eq!(
        err,
        ScopeError::DuplicateNative(SymbolName::new("host.math", "double"))
    );
    assert_eq!(err.to_string(), "Native function 'host.math:double' is already registered");
    assert_eq!(scope.len(), 1);
}

#[test]
fn test_global_scope_is_shared() {
    let first = global_scope();
    let second = global_scope();
    assert!(Arc::ptr_eq(&first, &second));
    for name in ["getString", "getInt", "getFloat", "getBoolean"] {
        assert!(first.lookup_native(stdlib::JSON_PACKAGE, name).is_some(), "{}", name);
    }
    assert!(first.lookup_native(stdlib::ARRAYS_PACKAGE, "length").is_some());
    assert!(first.lookup_native(stdlib::SYSTEM_PACKAGE, "println").is_some());
}

#[test]
fn test_concurrent_lookups() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(|| {
                global_scope()
                    .lookup_native(stdlib::JSON_PACKAGE, "getString")
                    .map(|f| f.qualified_name())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(
            handle.join().unwrap(),
            Some("ballerina.lang.json:getString".to_string())
        );
    }
}

//! Ember Runtime - execution engine for Ember programs
//!
//! This library provides:
//! - Lexing, parsing and loading of source units
//! - The process-wide scope of native functions
//! - Tree-walking evaluation on a caller-owned control stack
//! - Stack trace rendering for failed invocations

/// Ember runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod ast;
pub mod diagnostic;
pub mod interpreter;
pub mod lexer;
pub mod loader;
pub mod native;
pub mod parser;
pub mod scope;
pub mod span;
pub mod stdlib;
pub mod token;
pub mod trace;
pub mod value;

// Re-export commonly used types
pub use diagnostic::{error_codes, Diagnostic, DiagnosticLevel};
pub use interpreter::{
    invoke, invoke_with_args, Context, ControlStack, FrameKind, Interpreter, StackFrame,
};
pub use lexer::Lexer;
pub use loader::{parse_source, parse_unit, ParseError, ParsedUnit, UnitLoader};
pub use native::{BuildError, NativeFn, NativeFunction, NativeFunctionBuilder};
pub use parser::Parser;
pub use scope::{add_native_function, global_scope, ScopeError, SymScope, SymbolName};
pub use span::Span;
pub use token::{Token, TokenKind};
pub use trace::{format_control_stack, get_stack_trace};
pub use value::{RuntimeError, Value, ValueArray};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke() {
        assert_eq!(VERSION, "0.1.0");
    }

    #[test]
    fn test_global_scope_has_stdlib() {
        let scope = global_scope();
        assert!(scope.has_package(stdlib::JSON_PACKAGE));
        assert!(scope.lookup_native(stdlib::JSON_PACKAGE, "getString").is_some());
    }
}

//! Tree-walking evaluator
//!
//! Executes a [`ParsedUnit`]'s functions on the control stack of a caller
//! supplied [`Context`]. Frames are pushed on function entry and popped only
//! on normal return: when evaluation fails the error propagates with `?` and
//! the stack keeps every frame that was live at the raise site, so the caller
//! can format a trace afterwards.
//!
//! Each invocation runs on a scoped thread whose native stack is sized for
//! the effective call depth, so exceeding `max-call-depth` is always reported
//! as [`RuntimeError::StackOverflow`] rather than exhausting the host stack.

mod context;
mod expr;
mod stmt;
mod types;

pub use context::{ControlStack, Context, FrameKind, StackFrame, ENTRY_FUNCTION, NATIVE_FILE};

use crate::ast::{FunctionDecl, TypeRef};
use crate::loader::ParsedUnit;
use crate::native::NativeFunction;
use crate::value::{RuntimeError, Value};
use ember_config::{RuntimeConfig, MAX_CALL_DEPTH_CEILING};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

/// Native stack reserved for the evaluator outside of nested calls
const BASE_EVAL_STACK: usize = 2 * 1024 * 1024;

/// Native stack reserved per permitted call level
const EVAL_STACK_PER_CALL: usize = 64 * 1024;

/// Control flow signal for statement execution
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ControlFlow {
    None,
    Break,
    Return(Value),
}

/// Resolved target of a call expression
pub(crate) enum CallTarget<'a> {
    Interpreted(&'a FunctionDecl),
    Native(Arc<NativeFunction>),
}

/// A declared local and its current value
struct Slot<'a> {
    ty: &'a TypeRef,
    value: Value,
}

/// Lexical scopes of one interpreted activation
#[derive(Default)]
struct Locals<'a> {
    scopes: Vec<HashMap<&'a str, Slot<'a>>>,
}

impl<'a> Locals<'a> {
    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &'a str, ty: &'a TypeRef, value: Value) {
        if self.scopes.is_empty() {
            self.push_scope();
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, Slot { ty, value });
        }
    }

    fn get(&self, name: &str) -> Option<&Slot<'a>> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Slot<'a>> {
        self.scopes.iter_mut().rev().find_map(|scope| scope.get_mut(name))
    }
}

/// Entry point for running units
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: RuntimeConfig,
}

impl Interpreter {
    /// Interpreter with default runtime settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Call depth enforced at run time; configs built without validation are
    /// clamped to [`MAX_CALL_DEPTH_CEILING`]
    pub fn call_depth_limit(&self) -> usize {
        self.config.max_call_depth.min(MAX_CALL_DEPTH_CEILING)
    }

    /// Run `function` with no arguments.
    ///
    /// Uses a fresh context when `context` is `None`; that context, and with
    /// it the failing stack, is discarded when the call returns.
    pub fn invoke(
        &self,
        unit: &ParsedUnit,
        function: &str,
        context: Option<&mut Context>,
    ) -> Result<Value, RuntimeError> {
        match context {
            Some(ctx) => self.invoke_with_args(unit, function, Vec::new(), ctx),
            None => self.invoke_with_args(unit, function, Vec::new(), &mut Context::new()),
        }
    }

    /// Run `function` with arguments on `context`'s control stack
    pub fn invoke_with_args(
        &self,
        unit: &ParsedUnit,
        function: &str,
        args: Vec<Value>,
        context: &mut Context,
    ) -> Result<Value, RuntimeError> {
        let decl = unit
            .function(function)
            .ok_or_else(|| RuntimeError::FunctionNotFound {
                name: function.to_string(),
                file: unit.file_name().to_string(),
            })?;

        tracing::debug!(
            package = %unit.package(),
            function = %function,
            file = %unit.file_name(),
            "invoke"
        );

        let limit = self.call_depth_limit();
        let stack = context.control_stack_mut();
        let base_depth = stack.len();
        stack.push(StackFrame::entry(unit.package(), unit.file_name()));

        let result = run_with_stack(stack_size_for(limit), || {
            let mut evaluator = Evaluator {
                unit,
                config: &self.config,
                limit,
                stack: &mut *stack,
                base_depth,
            };
            let result = evaluator.call_function(decl, args);
            if result.is_ok() {
                evaluator.stack.pop();
            }
            result
        });

        match result {
            Ok(value) => {
                tracing::debug!(function = %function, result = %value, "invoke finished");
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(
                    function = %function,
                    error = %err,
                    depth = stack.len(),
                    "invoke failed"
                );
                Err(err)
            }
        }
    }
}

/// Native stack needed to evaluate `limit` nested calls
fn stack_size_for(limit: usize) -> usize {
    BASE_EVAL_STACK.saturating_add(limit.saturating_mul(EVAL_STACK_PER_CALL))
}

/// Run `eval` on a scoped thread with `stack_size` bytes of native stack.
///
/// The caller blocks until it finishes; a panic inside `eval` resumes on the
/// calling thread.
fn run_with_stack<F>(stack_size: usize, eval: F) -> Result<Value, RuntimeError>
where
    F: FnOnce() -> Result<Value, RuntimeError> + Send,
{
    thread::scope(|scope| {
        let spawned = thread::Builder::new()
            .name("ember-eval".to_string())
            .stack_size(stack_size)
            .spawn_scoped(scope, eval);
        match spawned {
            Ok(handle) => match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            },
            Err(err) => {
                tracing::warn!(stack_size, error = %err, "failed to spawn evaluation thread");
                Err(RuntimeError::EvaluationThread {
                    reason: err.to_string(),
                })
            }
        }
    })
}

/// Run `function` of `unit` with default settings
pub fn invoke(unit: &ParsedUnit, function: &str, context: Option<&mut Context>) -> Result<Value, RuntimeError> {
    Interpreter::new().invoke(unit, function, context)
}

/// Run `function` of `unit` with arguments and default settings
pub fn invoke_with_args(
    unit: &ParsedUnit,
    function: &str,
    args: Vec<Value>,
    context: &mut Context,
) -> Result<Value, RuntimeError> {
    Interpreter::new().invoke_with_args(unit, function, args, context)
}

/// Walks function bodies for one invocation
pub(crate) struct Evaluator<'a> {
    unit: &'a ParsedUnit,
    config: &'a RuntimeConfig,
    /// Effective `max-call-depth`
    limit: usize,
    stack: &'a mut ControlStack,
    /// Stack length before this invocation's entry frame
    base_depth: usize,
}

impl<'a> Evaluator<'a> {
    /// Record the line about to execute in the innermost frame
    fn set_line(&mut self, line: u32) {
        if let Some(frame) = self.stack.top_mut() {
            frame.set_line(line);
        }
    }

    /// Fail before pushing a frame that would exceed `max-call-depth`
    fn check_depth(&self) -> Result<(), RuntimeError> {
        // One slot is taken by the entry frame
        let depth = self.stack.len().saturating_sub(self.base_depth + 1);
        if depth >= self.limit {
            return Err(RuntimeError::StackOverflow { limit: self.limit });
        }
        Ok(())
    }

    /// Enter an interpreted function, run its body and leave it
    fn call_function(&mut self, func: &'a FunctionDecl, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if args.len() != func.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name: func.name.name.clone(),
                expected: func.params.len(),
                found: args.len(),
            });
        }

        let mut locals = Locals::default();
        locals.push_scope();
        for (param, arg) in func.params.iter().zip(args) {
            let value = types::coerce(&param.type_ref, arg).map_err(|found| {
                RuntimeError::type_mismatch(format!(
                    "argument '{}' of '{}' expects {}, found {}",
                    param.name.name, func.name.name, param.type_ref, found
                ))
            })?;
            locals.declare(&param.name.name, &param.type_ref, value);
        }

        self.check_depth()?;
        self.stack.push(StackFrame::interpreted(
            self.unit.package(),
            &func.name.name,
            self.unit.file_name(),
            func.line(),
        ));

        let value = match self.execute_block(&func.body, &mut locals)? {
            ControlFlow::Return(value) => value,
            ControlFlow::None | ControlFlow::Break => Value::Null,
        };

        let value = match func.return_types.as_slice() {
            [ty] => types::coerce(ty, value).map_err(|found| {
                RuntimeError::type_mismatch(format!(
                    "'{}' must return {}, found {}",
                    func.name.name, ty, found
                ))
            })?,
            _ => value,
        };

        self.stack.pop();
        Ok(value)
    }

    /// Run a native function, inside its own frame when configured to
    fn call_native(&mut self, native: &NativeFunction, args: Vec<Value>) -> Result<Value, RuntimeError> {
        tracing::debug!(native = %native.qualified_name(), args = args.len(), "dispatch native");

        if !self.config.native_frames {
            return native.call(&args);
        }

        self.check_depth()?;
        self.stack.push(StackFrame::native(native.package(), native.name()));
        let value = native.call(&args)?;
        self.stack.pop();
        Ok(value)
    }

    fn call(&mut self, target: CallTarget<'a>, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match target {
            CallTarget::Interpreted(func) => self.call_function(func, args),
            CallTarget::Native(native) => self.call_native(&native, args),
        }
    }
}

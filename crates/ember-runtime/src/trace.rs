//! Stack trace formatting

use crate::interpreter::{Context, ControlStack, StackFrame};
use std::fmt::Write;

/// Render `context`'s control stack, innermost frame first.
///
/// Each frame becomes one line of the form
/// `\t at {module}:{function}({file}:{line})\n`. The stack is not modified,
/// so the trace can be taken any number of times after a failure.
pub fn get_stack_trace(context: &Context) -> String {
    format_control_stack(context.control_stack())
}

/// [`get_stack_trace`] for a bare control stack
pub fn format_control_stack(stack: &ControlStack) -> String {
    let mut out = String::new();
    for frame in stack.iter_innermost_first() {
        write_frame(&mut out, frame);
    }
    out
}

fn write_frame(out: &mut String, frame: &StackFrame) {
    // Writing into a String cannot fail
    let _ = writeln!(
        out,
        "\t at {}:{}({}:{})",
        frame.module(),
        frame.function(),
        frame.file(),
        frame.line()
    );
}

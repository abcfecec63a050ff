//! Trace command - show the stack trace of a failing call

use crate::commands::Invocation;
use anyhow::{bail, Result};
use ember_runtime::get_stack_trace;

/// Invoke the function and print the trace it leaves on stdout.
///
/// Fails when the function returns normally, since there is no trace to show.
pub fn run(invocation: &Invocation) -> Result<()> {
    let outcome = invocation.execute()?;

    match outcome.result {
        Ok(_) => bail!(
            "'{}' completed without a runtime error",
            invocation.function
        ),
        Err(err) => {
            tracing::debug!(error = %err, "traced failure");
            print!("{}", get_stack_trace(&outcome.context));
            Ok(())
        }
    }
}

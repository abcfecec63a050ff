//! Run command - invoke a function and print its result

use crate::commands::Invocation;
use anyhow::{anyhow, Result};
use ember_runtime::{get_stack_trace, Value};

/// Run the requested function.
///
/// A non-null result is printed to stdout. A runtime error is reported as
/// `error: <message>` followed by the stack trace, both on stderr.
pub fn run(invocation: &Invocation) -> Result<()> {
    let outcome = invocation.execute()?;

    match outcome.result {
        Ok(value) => {
            if !matches!(value, Value::Null) {
                println!("{}", value);
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("error: {}", err);
            eprint!("{}", get_stack_trace(&outcome.context));
            Err(anyhow!(
                "'{}' in {} failed",
                invocation.function,
                invocation.file.display()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn invocation(path: PathBuf, function: &str) -> Invocation {
        Invocation {
            file: path,
            function: function.to_string(),
            args: Vec::new(),
            config: None,
        }
    }

    #[test]
    fn test_run_returns_ok() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "function main() (int) {{\n    return 1 + 2;\n}}").unwrap();
        assert!(run(&invocation(file.path().to_path_buf(), "main")).is_ok());
    }

    #[test]
    fn test_run_runtime_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "function main() (int) {{\n    return 1 / 0;\n}}").unwrap();
        let err = run(&invocation(file.path().to_path_buf(), "main")).unwrap_err();
        assert!(err.to_string().contains("'main'"));
    }

    #[test]
    fn test_run_missing_file() {
        let result = run(&invocation(PathBuf::from("nonexistent.bal"), "main"));
        assert!(result.is_err());
    }
}

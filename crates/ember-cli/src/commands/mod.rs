//! Subcommand implementations

pub mod run;
pub mod trace;

use anyhow::{anyhow, Context as _, Result};
use ember_config::{ConfigLoader, RuntimeConfig};
use ember_runtime::{global_scope, Context, Interpreter, ParsedUnit, RuntimeError, UnitLoader, Value};
use std::path::{Path, PathBuf};

/// What to load and call
#[derive(Debug, Clone)]
pub struct Invocation {
    pub file: PathBuf,
    pub function: String,
    pub args: Vec<String>,
    pub config: Option<PathBuf>,
}

/// Outcome of invoking a function with its context kept for inspection
pub struct Outcome {
    pub result: Result<Value, RuntimeError>,
    pub context: Context,
}

impl Invocation {
    /// Resolve configuration, load the unit and call the function
    pub fn execute(&self) -> Result<Outcome> {
        let config = self.runtime_config()?;
        let unit = load_unit(&self.file, &config)?;
        let args = self.args.iter().map(|raw| parse_arg(raw)).collect();

        let mut context = Context::new();
        let result = Interpreter::with_config(config).invoke_with_args(
            &unit,
            &self.function,
            args,
            &mut context,
        );
        Ok(Outcome { result, context })
    }

    fn runtime_config(&self) -> Result<RuntimeConfig> {
        let loader = ConfigLoader::new();
        let config = match &self.config {
            Some(path) => loader
                .load_from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => {
                let start = match self.file.parent() {
                    Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
                    _ => std::env::current_dir()?,
                };
                loader
                    .load_from_directory(&start)
                    .context("Failed to load project configuration")?
            }
        };
        tracing::debug!(
            max_call_depth = config.runtime.max_call_depth,
            native_frames = config.runtime.native_frames,
            "runtime configuration"
        );
        Ok(config.runtime)
    }
}

/// Load `path`, printing every diagnostic to stderr on failure
fn load_unit(path: &Path, config: &RuntimeConfig) -> Result<ParsedUnit> {
    UnitLoader::from_config(config)
        .load(path, global_scope())
        .map_err(|err| {
            for diag in &err.diagnostics {
                eprint!("{}", diag.to_human_string());
            }
            anyhow!("Failed to load {}", path.display())
        })
}

/// Interpret a command-line argument as int, float, boolean or, failing those, string
pub fn parse_arg(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Int(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::Float(f);
    }
    match raw {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => Value::string(raw),
    }
}

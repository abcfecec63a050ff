use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

/// Ember program runner.
///
/// Loads an Ember source file, invokes one of its functions and reports the
/// result, or the error and stack trace when the call fails.
///
/// EXAMPLES:
///     ember run main.bal                      Run `main`
///     ember run calc.bal -f sum --arg 10      Run `sum(10)`
///     ember trace main.bal -f broken          Print the trace of a failing call
///
/// ENVIRONMENT VARIABLES:
///     EMBER_MAX_CALL_DEPTH   Override the maximum call depth
///     EMBER_NATIVE_FRAMES    Set to 'false' to hide native frames in traces
///     RUST_LOG               Log filter used when no -v flag is given
#[derive(Parser)]
#[command(name = "ember")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a function from an Ember source file
    ///
    /// Prints the returned value. On a runtime error prints `error: <message>`
    /// and the stack trace to stderr and exits with a non-zero status.
    ///
    /// EXAMPLES:
    ///     ember run main.bal
    ///     ember run calc.bal --function sum --arg 10
    #[command(visible_alias = "r")]
    Run {
        /// Path to the Ember source file
        file: PathBuf,
        /// Function to invoke
        #[arg(long, short = 'f', default_value = "main")]
        function: String,
        /// Argument passed to the function (int, float, boolean or string)
        #[arg(long = "arg", value_name = "VALUE")]
        args: Vec<String>,
        /// Project configuration file (defaults to the nearest ember.toml)
        #[arg(long, short = 'c', env = "EMBER_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print the stack trace left by a failing function
    ///
    /// EXAMPLES:
    ///     ember trace runtime-errors.bal --function testStackTrace
    #[command(visible_alias = "t")]
    Trace {
        /// Path to the Ember source file
        file: PathBuf,
        /// Function to invoke
        #[arg(long, short = 'f')]
        function: String,
        /// Argument passed to the function (int, float, boolean or string)
        #[arg(long = "arg", value_name = "VALUE")]
        args: Vec<String>,
        /// Project configuration file (defaults to the nearest ember.toml)
        #[arg(long, short = 'c', env = "EMBER_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Run {
            file,
            function,
            args,
            config,
        } => {
            commands::run::run(&commands::Invocation {
                file,
                function,
                args,
                config,
            })?;
        }
        Commands::Trace {
            file,
            function,
            args,
            config,
        } => {
            commands::trace::run(&commands::Invocation {
                file,
                function,
                args,
                config,
            })?;
        }
    }

    Ok(())
}

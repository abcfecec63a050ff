//! Log subscriber setup

use tracing_subscriber::EnvFilter;

/// Filter for a `-v` count; without flags `RUST_LOG` decides, defaulting to warnings
fn filter_for(verbosity: u8) -> EnvFilter {
    match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Install the global subscriber; logs go to stderr so program output stays clean
pub fn init(verbosity: u8) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = result {
        eprintln!("warning: logging not initialised: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filters() {
        assert_eq!(filter_for(1).to_string(), "debug");
        assert_eq!(filter_for(2).to_string(), "trace");
        assert_eq!(filter_for(5).to_string(), "trace");
    }
}

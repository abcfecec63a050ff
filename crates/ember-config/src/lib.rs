//! Ember Configuration System
//!
//! Provides configuration management for Ember projects:
//! - Project configuration (`ember.toml`)
//! - Runtime settings resolved from the project file with defaults
//! - Environment variable overrides (`EMBER_*`)
//!
//! # Configuration Hierarchy
//!
//! Configuration is resolved in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Project config (`./ember.toml`, searched upwards)
//! 3. Environment variables (`EMBER_*`)
//! 4. CLI flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use ember_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("max call depth: {}", config.runtime.max_call_depth);
//! ```

pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "ember.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid semver version: {0}")]
    InvalidVersion(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{Config, ConfigLoader};
pub use project::{
    PackageConfig, ProjectConfig, RuntimeConfig, RuntimeSection, DEFAULT_MAX_CALL_DEPTH,
    DEFAULT_PACKAGE, MAX_CALL_DEPTH_CEILING,
};

//! Configuration Loader
//!
//! Handles locating `ember.toml` and merging it with environment overrides.

use crate::project::{ProjectConfig, RuntimeConfig, MAX_CALL_DEPTH_CEILING};
use crate::{ConfigError, ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Sources, lowest priority first:
/// 1. Built-in defaults
/// 2. Project config (./ember.toml)
/// 3. Environment variables (EMBER_*)
#[derive(Debug, Default)]
pub struct ConfigLoader;

/// Merged configuration result
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration as read from disk
    pub project: ProjectConfig,

    /// Effective runtime settings
    pub runtime: RuntimeConfig,

    /// Project root directory (where ember.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find ember.toml. A missing file is not an
    /// error; defaults are used instead.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project) = self.find_project_config(start_dir)?;
        self.resolve(project, project_root)
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let project = ProjectConfig::load_from_file(config_path)?;
        let project_root = config_path.parent().map(|p| p.to_path_buf());
        self.resolve(project, project_root)
    }

    fn resolve(&self, project: ProjectConfig, project_root: Option<PathBuf>) -> ConfigResult<Config> {
        let mut runtime = project.runtime_config();
        self.apply_env_overrides(&mut runtime)?;
        runtime.validate()?;

        Ok(Config {
            project,
            runtime,
            project_root,
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Recognised variables: `EMBER_MAX_CALL_DEPTH`, `EMBER_NATIVE_FRAMES`.
    fn apply_env_overrides(&self, runtime: &mut RuntimeConfig) -> ConfigResult<()> {
        if let Ok(depth) = env::var("EMBER_MAX_CALL_DEPTH") {
            let parsed: usize = depth
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    field: "EMBER_MAX_CALL_DEPTH".to_string(),
                    reason: format!("'{}' is not a positive integer", depth),
                })?;
            if parsed > MAX_CALL_DEPTH_CEILING {
                return Err(ConfigError::InvalidValue {
                    field: "EMBER_MAX_CALL_DEPTH".to_string(),
                    reason: format!("{} exceeds the limit of {}", parsed, MAX_CALL_DEPTH_CEILING),
                });
            }
            runtime.max_call_depth = parsed;
        }

        if let Ok(native_frames) = env::var("EMBER_NATIVE_FRAMES") {
            runtime.native_frames = matches!(
                native_frames.to_lowercase().as_str(),
                "true" | "1" | "yes"
            );
        }

        Ok(())
    }
}

impl Config {
    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Get the package name
    pub fn package_name(&self) -> Option<&str> {
        self.project.package_name()
    }

    /// Check if this is a project (has ember.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::DEFAULT_MAX_CALL_DEPTH;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    #[test]
    #[serial]
    fn test_load_project_config() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[package]
name = "fruits"
version = "1.0.0"

[runtime]
max-call-depth = 32
"#,
        );

        let config = ConfigLoader::new()
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert_eq!(config.package_name(), Some("fruits"));
        assert_eq!(config.runtime.max_call_depth, 32);
        assert!(config.is_project());
    }

    #[test]
    #[serial]
    fn test_find_config_in_parent() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[package]
name = "parent-project"
version = "1.0.0"
"#,
        );

        let sub_dir = temp_dir.path().join("src");
        fs::create_dir(&sub_dir).unwrap();

        let config = ConfigLoader::new().load_from_directory(&sub_dir).unwrap();

        assert_eq!(config.package_name(), Some("parent-project"));
        assert_eq!(config.project_root(), Some(temp_dir.path()));
    }

    #[test]
    #[serial]
    fn test_no_project_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let config = ConfigLoader::new()
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert_eq!(config.package_name(), None);
        assert_eq!(config.runtime, RuntimeConfig::default());
        assert!(!config.is_project());
    }

    #[test]
    #[serial]
    fn test_env_override_call_depth() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[runtime]
max-call-depth = 10
"#,
        );

        env::set_var("EMBER_MAX_CALL_DEPTH", "25");
        let config = ConfigLoader::new().load_from_directory(temp_dir.path());
        env::remove_var("EMBER_MAX_CALL_DEPTH");

        assert_eq!(config.unwrap().runtime.max_call_depth, 25);
    }

    #[test]
    #[serial]
    fn test_env_override_invalid_call_depth() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var("EMBER_MAX_CALL_DEPTH", "lots");
        let result = ConfigLoader::new().load_from_directory(temp_dir.path());
        env::remove_var("EMBER_MAX_CALL_DEPTH");

        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    #[serial]
    fn test_env_override_call_depth_above_ceiling() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var("EMBER_MAX_CALL_DEPTH", "1000000");
        let result = ConfigLoader::new().load_from_directory(temp_dir.path());
        env::remove_var("EMBER_MAX_CALL_DEPTH");

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field, .. }) if field == "EMBER_MAX_CALL_DEPTH"
        ));
    }

    #[test]
    #[serial]
    fn test_call_depth_above_ceiling_in_file() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[runtime]
max-call-depth = 1000000
"#,
        );

        let result = ConfigLoader::new().load_from_directory(temp_dir.path());

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field, .. }) if field == "runtime.max-call-depth"
        ));
    }

    #[test]
    #[serial]
    fn test_env_override_native_frames() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var("EMBER_NATIVE_FRAMES", "no");
        let config = ConfigLoader::new().load_from_directory(temp_dir.path());
        env::remove_var("EMBER_NATIVE_FRAMES");

        let config = config.unwrap();
        assert!(!config.runtime.native_frames);
        assert_eq!(config.runtime.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    #[serial]
    fn test_load_from_specific_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config_file(
            temp_dir.path(),
            r#"
[package]
name = "specific-file"
version = "2.0.0"
"#,
        );

        let config = ConfigLoader::new().load_from_file(&config_path).unwrap();

        assert_eq!(config.package_name(), Some("specific-file"));
    }

    #[test]
    #[serial]
    fn test_invalid_toml_reports_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config_file(temp_dir.path(), "[runtime\n");

        let err = ConfigLoader::new().load_from_file(&config_path).unwrap_err();
        match err {
            ConfigError::TomlParseError { file, .. } => assert_eq!(file, config_path),
            other => panic!("expected TomlParseError, got {:?}", other),
        }
    }
}

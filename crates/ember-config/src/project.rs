//! Project Configuration (ember.toml)
//!
//! Handles project-level configuration stored in `ember.toml` at the project root,
//! and the resolved [`RuntimeConfig`] consumed by the interpreter.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default upper bound on nested function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

/// Largest accepted `max-call-depth`; the interpreter sizes its evaluation
/// stack for this many nested calls
pub const MAX_CALL_DEPTH_CEILING: usize = 1000;

/// Package qualifier used for units without a `package` declaration
pub const DEFAULT_PACKAGE: &str = "default";

/// Project configuration from ember.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Package metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageConfig>,

    /// Runtime settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeSection>,
}

/// Package metadata configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// Package name
    pub name: String,

    /// Package version (semver)
    pub version: String,

    /// Package description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `[runtime]` table as written in ember.toml; every key is optional
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct RuntimeSection {
    /// Maximum number of nested calls before a stack overflow is raised
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_call_depth: Option<usize>,

    /// Whether native calls contribute their own stack frame
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_frames: Option<bool>,

    /// Package qualifier for units that do not declare one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_package: Option<String>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub max_call_depth: usize,
    pub native_frames: bool,
    pub default_package: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            native_frames: true,
            default_package: DEFAULT_PACKAGE.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Overlay the keys present in a `[runtime]` table
    pub fn apply(&mut self, section: &RuntimeSection) {
        if let Some(depth) = section.max_call_depth {
            self.max_call_depth = depth;
        }
        if let Some(native_frames) = section.native_frames {
            self.native_frames = native_frames;
        }
        if let Some(package) = &section.default_package {
            self.default_package = package.clone();
        }
    }

    /// Validate resolved values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_call_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "runtime.max-call-depth".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_call_depth > MAX_CALL_DEPTH_CEILING {
            return Err(ConfigError::InvalidValue {
                field: "runtime.max-call-depth".to_string(),
                reason: format!("must not exceed {}", MAX_CALL_DEPTH_CEILING),
            });
        }
        if !is_valid_package_name(&self.default_package) {
            return Err(ConfigError::InvalidValue {
                field: "runtime.default-package".to_string(),
                reason: format!("invalid package name '{}'", self.default_package),
            });
        }
        Ok(())
    }
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(pkg) = &self.package {
            if pkg.name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "package.name".to_string(),
                    reason: "name cannot be empty".to_string(),
                });
            }

            if !is_valid_version(&pkg.version) {
                return Err(ConfigError::InvalidVersion(pkg.version.clone()));
            }
        }

        self.runtime_config().validate()
    }

    /// Get the package name, if present
    pub fn package_name(&self) -> Option<&str> {
        self.package.as_ref().map(|p| p.name.as_str())
    }

    /// Resolve runtime settings against the defaults
    pub fn runtime_config(&self) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        if let Some(section) = &self.runtime {
            config.apply(section);
        }
        config
    }
}

/// Basic semver validation (simplified)
fn is_valid_version(version: &str) -> bool {
    let main_version = version.split(['-', '+']).next().unwrap_or("");
    if main_version.is_empty() {
        return false;
    }

    // X.Y or X.Y.Z
    let parts: Vec<&str> = main_version.split('.').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return false;
    }

    parts
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

/// Dotted identifier such as `test.lang`
fn is_valid_package_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_parse_minimal_project_config() {
        let toml = r#"
[package]
name = "fruits"
version = "0.1.0"
"#;
        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.package_name(), Some("fruits"));
        assert!(config.runtime.is_none());
        assert_eq!(config.runtime_config(), RuntimeConfig::default());
    }

    #[test]
    fn test_parse_runtime_section() {
        let toml = r#"
[runtime]
max-call-depth = 64
native-frames = false
default-package = "test.lang"
"#;
        let config: ProjectConfig = toml::from_str(toml).unwrap();
        let runtime = config.runtime_config();
        assert_eq!(runtime.max_call_depth, 64);
        assert!(!runtime.native_frames);
        assert_eq!(runtime.default_package, "test.lang");
    }

    #[test]
    fn test_partial_runtime_section_keeps_defaults() {
        let toml = r#"
[runtime]
native-frames = false
"#;
        let config: ProjectConfig = toml::from_str(toml).unwrap();
        let runtime = config.runtime_config();
        assert_eq!(runtime.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        assert_eq!(runtime.default_package, DEFAULT_PACKAGE);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
[runtime]
max-depth = 3
"#;
        assert!(toml::from_str::<ProjectConfig>(toml).is_err());
    }

    #[test]
    fn test_zero_call_depth_rejected() {
        let config = ProjectConfig {
            package: None,
            runtime: Some(RuntimeSection {
                max_call_depth: Some(0),
                ..Default::default()
            }),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "runtime.max-call-depth"
        ));
    }

    #[test]
    fn test_call_depth_ceiling() {
        let at_ceiling = RuntimeConfig {
            max_call_depth: MAX_CALL_DEPTH_CEILING,
            ..RuntimeConfig::default()
        };
        assert!(at_ceiling.validate().is_ok());

        let above = RuntimeConfig {
            max_call_depth: 1_000_000,
            ..RuntimeConfig::default()
        };
        match above.validate() {
            Err(ConfigError::InvalidValue { field, reason }) => {
                assert_eq!(field, "runtime.max-call-depth");
                assert_eq!(reason, format!("must not exceed {}", MAX_CALL_DEPTH_CEILING));
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[rstest]
    #[case("1.0", true)]
    #[case("1.0.0", true)]
    #[case("1.0.0-beta", true)]
    #[case("1", false)]
    #[case("1.a.0", false)]
    #[case("", false)]
    fn test_version_validation(#[case] version: &str, #[case] valid: bool) {
        assert_eq!(is_valid_version(version), valid);
    }

    #[rstest]
    #[case("test.lang", true)]
    #[case("default", true)]
    #[case("a.b_c.d1", true)]
    #[case("", false)]
    #[case("a..b", false)]
    #[case("1abc", false)]
    fn test_package_name_validation(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(is_valid_package_name(name), valid);
    }
}

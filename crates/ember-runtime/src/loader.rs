//! Loading source files into bound, executable units
//!
//! A [`ParsedUnit`] is the immutable result of lexing, parsing and binding
//! one source file against a [`SymScope`]. It is `Send + Sync` and may be
//! shared between threads and reused across invocations.

use crate::ast::{FunctionDecl, Unit};
use crate::diagnostic::{error_codes, Diagnostic, DiagnosticLevel};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::scope::SymScope;
use crate::span::Span;
use ember_config::{RuntimeConfig, DEFAULT_PACKAGE};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Front-end failure; carries every diagnostic reported for the file
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{file}: {} error(s), first: {}", .diagnostics.len(), first_message(.diagnostics))]
pub struct ParseError {
    pub file: String,
    pub diagnostics: Vec<Diagnostic>,
}

fn first_message(diagnostics: &[Diagnostic]) -> &str {
    diagnostics
        .first()
        .map(|d| d.message.as_str())
        .unwrap_or("unknown error")
}

/// A parsed and bound source file
#[derive(Debug)]
pub struct ParsedUnit {
    source_path: PathBuf,
    file_name: String,
    package: String,
    /// alias -> fully qualified package
    imports: HashMap<String, String>,
    functions: HashMap<String, usize>,
    unit: Unit,
    scope: Arc<SymScope>,
}

impl ParsedUnit {
    /// Path or name the unit was loaded from
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Base name of the source file, as shown in stack traces
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Package qualifier of every function in the unit
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.get(name).map(|&i| &self.unit.functions[i])
    }

    /// Declared functions in source order
    pub fn functions(&self) -> &[FunctionDecl] {
        &self.unit.functions
    }

    /// Resolve an import alias to its package
    pub fn import(&self, alias: &str) -> Option<&str> {
        self.imports.get(alias).map(String::as_str)
    }

    pub fn scope(&self) -> &Arc<SymScope> {
        &self.scope
    }

    pub fn ast(&self) -> &Unit {
        &self.unit
    }
}

/// Builds [`ParsedUnit`]s
#[derive(Debug, Clone)]
pub struct UnitLoader {
    default_package: String,
}

impl Default for UnitLoader {
    fn default() -> Self {
        Self {
            default_package: DEFAULT_PACKAGE.to_string(),
        }
    }
}

impl UnitLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader honoring the runtime's `default-package`
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            default_package: config.default_package.clone(),
        }
    }

    /// Read, parse and bind a source file
    pub fn load(&self, path: impl AsRef<Path>, scope: Arc<SymScope>) -> Result<ParsedUnit, ParseError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ParseError {
            file: path.display().to_string(),
            diagnostics: vec![Diagnostic::error_with_code(
                error_codes::READ_FAILED,
                format!("Failed to read {}: {}", path.display(), e),
                Span::dummy(),
            )
            .with_file(path.display().to_string())],
        })?;
        self.load_source(path, &source, scope)
    }

    /// Parse and bind in-memory source text; `name` identifies it in
    /// diagnostics and stack traces
    pub fn load_source(
        &self,
        name: impl AsRef<Path>,
        source: &str,
        scope: Arc<SymScope>,
    ) -> Result<ParsedUnit, ParseError> {
        let name = name.as_ref();
        let source_label = name.display().to_string();

        let (tokens, mut diagnostics) = Lexer::new(source).tokenize();
        let (unit, parse_diagnostics) = Parser::new(tokens).parse();
        diagnostics.extend(parse_diagnostics);

        let (imports, functions) = bind(&unit, &scope, &mut diagnostics);

        if diagnostics.iter().any(|d| d.level == DiagnosticLevel::Error) {
            let lines: Vec<&str> = source.lines().collect();
            let diagnostics = diagnostics
                .into_iter()
                .map(|d| {
                    let snippet = if d.snippet.is_empty() {
                        lines.get(d.line.saturating_sub(1)).copied().unwrap_or("").to_string()
                    } else {
                        d.snippet.clone()
                    };
                    d.with_file(source_label.clone()).with_snippet(snippet)
                })
                .collect();
            tracing::debug!(file = %source_label, "parse failed");
            return Err(ParseError {
                file: source_label,
                diagnostics,
            });
        }

        let package = unit
            .package
            .as_ref()
            .map(|p| p.path.clone())
            .unwrap_or_else(|| self.default_package.clone());
        let file_name = name
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_label.clone());

        tracing::debug!(
            file = %source_label,
            package = %package,
            functions = unit.functions.len(),
            "loaded unit"
        );

        Ok(ParsedUnit {
            source_path: name.to_path_buf(),
            file_name,
            package,
            imports,
            functions,
            unit,
            scope,
        })
    }
}

/// Build the import and function tables, reporting duplicates
fn bind(
    unit: &Unit,
    scope: &SymScope,
    diagnostics: &mut Vec<Diagnostic>,
) -> (HashMap<String, String>, HashMap<String, usize>) {
    let mut imports = HashMap::new();
    for import in &unit.imports {
        if imports.contains_key(&import.alias.name) {
            diagnostics.push(
                Diagnostic::error_with_code(
                    error_codes::DUPLICATE_IMPORT,
                    format!("Duplicate import alias '{}'", import.alias.name),
                    import.span,
                )
                .with_help("use `import a.b.c as other;` to rename one of them"),
            );
            continue;
        }
        if !scope.has_package(&import.path) {
            tracing::warn!(package = %import.path, "imported package has no registered natives");
        }
        imports.insert(import.alias.name.clone(), import.path.clone());
    }

    let mut functions = HashMap::new();
    for (index, func) in unit.functions.iter().enumerate() {
        if functions.contains_key(&func.name.name) {
            diagnostics.push(Diagnostic::error_with_code(
                error_codes::DUPLICATE_FUNCTION,
                format!("Function '{}' is already defined", func.name.name),
                func.name.span,
            ));
            continue;
        }
        functions.insert(func.name.name.clone(), index);
    }

    (imports, functions)
}

/// Read, parse and bind `path` against `scope`
pub fn parse_unit(path: impl AsRef<Path>, scope: Arc<SymScope>) -> Result<ParsedUnit, ParseError> {
    UnitLoader::default().load(path, scope)
}

/// Parse and bind in-memory source against `scope`
pub fn parse_source(
    name: impl AsRef<Path>,
    source: &str,
    scope: Arc<SymScope>,
) -> Result<ParsedUnit, ParseError> {
    UnitLoader::default().load_source(name, source, scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SOURCE: &str = "package demo.app;\n\nimport ballerina.lang.json;\nimport ballerina.lang.arrays as arr;\n\nfunction main() {\n}\n";

    #[test]
    fn test_parse_source_binds_tables() {
        let unit = parse_source("src/app.bal", SOURCE, SymScope::new_root()).unwrap();
        assert_eq!(unit.package(), "demo.app");
        assert_eq!(unit.file_name(), "app.bal");
        assert_eq!(unit.import("json"), Some("ballerina.lang.json"));
        assert_eq!(unit.import("arr"), Some("ballerina.lang.arrays"));
        assert_eq!(unit.import("arrays"), None);
        assert_eq!(unit.function("main").unwrap().line(), 6);
        assert!(unit.function("other").is_none());
    }

    #[test]
    fn test_default_package() {
        let unit = parse_source("a.bal", "function f() {}", SymScope::new_root()).unwrap();
        assert_eq!(unit.package(), "default");

        let config = RuntimeConfig {
            default_package: "scratch".to_string(),
            ..RuntimeConfig::default()
        };
        let unit = UnitLoader::from_config(&config)
            .load_source("a.bal", "function f() {}", SymScope::new_root())
            .unwrap();
        assert_eq!(unit.package(), "scratch");
    }

    #[test]
    fn test_duplicate_function_rejected() {
        let err = parse_source(
            "dup.bal",
            "function f() {}\nfunction f() {}\n",
            SymScope::new_root(),
        )
        .unwrap_err();
        assert_eq!(err.diagnostics.len(), 1);
        let diag = &err.diagnostics[0];
        assert_eq!(diag.code, error_codes::DUPLICATE_FUNCTION);
        assert_eq!(diag.line, 2);
        assert_eq!(diag.file, "dup.bal");
        assert_eq!(diag.snippet, "function f() {}");
    }

    #[test]
    fn test_duplicate_import_alias_rejected() {
        let err = parse_source(
            "dup.bal",
            "import a.json;\nimport b.json;\n",
            SymScope::new_root(),
        )
        .unwrap_err();
        assert_eq!(err.diagnostics[0].message, "Duplicate import alias 'json'");
    }

    #[test]
    fn test_syntax_error_display() {
        let err = parse_source("bad.bal", "function f( {}", SymScope::new_root()).unwrap_err();
        assert!(err.to_string().starts_with("bad.bal: 1 error(s), first: "));
    }

    #[test]
    fn test_break_outside_loop_fails_to_load() {
        let source = "function brk() (int) {\n    break;\n    return 7;\n}";
        let err = parse_source("brk.bal", source, SymScope::new_root()).unwrap_err();
        assert_eq!(err.diagnostics.len(), 1);
        assert_eq!(err.diagnostics[0].code, error_codes::BREAK_OUTSIDE_LOOP);
        assert_eq!(err.diagnostics[0].file, "brk.bal");
    }

    #[test]
    fn test_parse_unit_from_file() {
        let mut file = tempfile::Builder::new().suffix(".bal").tempfile().unwrap();
        file.write_all(SOURCE.as_bytes()).unwrap();

        let unit = parse_unit(file.path(), SymScope::new_root()).unwrap();
        assert_eq!(unit.source_path(), file.path());
        assert!(unit.file_name().ends_with(".bal"));
    }

    #[test]
    fn test_parse_unit_missing_file() {
        let err = parse_unit("/definitely/not/here.bal", SymScope::new_root()).unwrap_err();
        assert_eq!(err.diagnostics[0].code, error_codes::READ_FAILED);
    }
}

//! Shared helpers for runtime integration tests

#![allow(dead_code)]

use ember_runtime::{global_scope, parse_source, parse_unit, ParsedUnit};
use std::path::PathBuf;

/// Path of a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a fixture against the global scope, failing the test on diagnostics
pub fn load_fixture(name: &str) -> ParsedUnit {
    let path = fixture_path(name);
    match parse_unit(&path, global_scope()) {
        Ok(unit) => unit,
        Err(err) => panic!("failed to load {}: {:#?}", path.display(), err.diagnostics),
    }
}

/// Parse in-memory source named `test.bal` against the global scope
pub fn load_source(source: &str) -> ParsedUnit {
    match parse_source("test.bal", source, global_scope()) {
        Ok(unit) => unit,
        Err(err) => panic!("failed to parse source: {:#?}", err.diagnostics),
    }
}

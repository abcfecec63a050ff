//! `ballerina.lang.json`: JSON access by path
//!
//! Paths use a small JSONPath subset: `$` is the root, `.name` and
//! `['name']` select object members, `[n]` selects an array element.

use crate::native::NativeFunctionBuilder;
use crate::scope::{ScopeError, SymScope};
use crate::stdlib::{add, JSON_PACKAGE};
use crate::value::{RuntimeError, Value};

/// Kind of scalar a getter extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    String,
    Int,
    Float,
    Boolean,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Boolean => "boolean",
        }
    }

    fn extract(self, json: &serde_json::Value) -> Option<Value> {
        match (self, json) {
            (Kind::String, serde_json::Value::String(s)) => Some(Value::string(s.clone())),
            (Kind::Int, serde_json::Value::Number(n)) => n.as_i64().map(Value::Int),
            (Kind::Float, serde_json::Value::Number(n)) => n.as_f64().map(Value::Float),
            (Kind::Boolean, serde_json::Value::Bool(b)) => Some(Value::Boolean(*b)),
            _ => None,
        }
    }
}

/// One step of a parsed path
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Parse a path into segments; the error is the reason text only
fn parse_path(path: &str) -> Result<Vec<Segment>, String> {
    if path.is_empty() {
        return Err("Path must not be empty".to_string());
    }
    if !path.starts_with('$') {
        return Err("Path must start with '$'".to_string());
    }
    if path.ends_with('.') {
        return Err("Path must not end with a '.' or '..'".to_string());
    }

    let chars: Vec<char> = path.chars().collect();
    let mut segments = Vec::new();
    let mut i = 1;

    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                if chars.get(i) == Some(&'.') {
                    return Err("Deep scan '..' is not supported".to_string());
                }
                let start = i;
                while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                    i += 1;
                }
                if start == i {
                    return Err(format!("Expected a property name at position {}", start));
                }
                segments.push(Segment::Key(chars[start..i].iter().collect()));
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|offset| i + offset)
                    .ok_or_else(|| format!("Missing closing ']' for '[' at position {}", i))?;
                let inner: String = chars[i + 1..close].iter().collect();
                segments.push(parse_bracket(inner.trim())?);
                i = close + 1;
            }
            other => {
                return Err(format!("Unexpected character '{}' at position {}", other, i));
            }
        }
    }

    Ok(segments)
}

fn parse_bracket(inner: &str) -> Result<Segment, String> {
    for quote in ['\'', '"'] {
        if inner.len() >= 2 && inner.starts_with(quote) && inner.ends_with(quote) {
            return Ok(Segment::Key(inner[1..inner.len() - 1].to_string()));
        }
    }
    inner
        .parse::<usize>()
        .map(Segment::Index)
        .map_err(|_| format!("Invalid array index '{}'", inner))
}

/// Walk `segments` from `root`; `None` when any step is missing
fn select<'a>(root: &'a serde_json::Value, segments: &[Segment]) -> Option<&'a serde_json::Value> {
    segments.iter().try_fold(root, |current, segment| match segment {
        Segment::Key(key) => current.as_object()?.get(key),
        Segment::Index(index) => current.as_array()?.get(*index),
    })
}

/// Shared body of the `getX(json, path)` natives
fn get(kind: Kind, args: &[Value]) -> Result<Value, RuntimeError> {
    let fail = |reason: String| {
        RuntimeError::native(format!("Failed to get {} from json. {}", kind.name(), reason))
    };

    let null = serde_json::Value::Null;
    let document = match &args[0] {
        Value::Json(json) => json.as_ref(),
        Value::Null => &null,
        other => return Err(fail(format!("Expected json, got {}", other.type_name()))),
    };
    let path = match &args[1] {
        Value::String(path) => path.as_str(),
        other => return Err(fail(format!("Path must be a string, got {}", other.type_name()))),
    };

    let segments = parse_path(path).map_err(|reason| fail(format!("Invalid jsonpath: {}", reason)))?;

    match select(document, &segments) {
        None | Some(serde_json::Value::Null) => Ok(Value::Null),
        Some(found) => kind.extract(found).ok_or_else(|| {
            fail(format!("Value at path '{}' is not a {}", path, kind.name()))
        }),
    }
}

fn parse(args: &[Value]) -> Result<Value, RuntimeError> {
    let text = args[0].as_str().ok_or_else(|| {
        RuntimeError::native(format!(
            "Failed to parse json. Expected a string, got {}",
            args[0].type_name()
        ))
    })?;
    serde_json::from_str(text)
        .map(Value::json)
        .map_err(|e| RuntimeError::native(format!("Failed to parse json. {}", e)))
}

fn to_string(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::string(args[0].to_json().to_string()))
}

pub(super) fn register(scope: &SymScope) -> Result<(), ScopeError> {
    let getters = [
        ("getString", Kind::String),
        ("getInt", Kind::Int),
        ("getFloat", Kind::Float),
        ("getBoolean", Kind::Boolean),
    ];
    for (name, kind) in getters {
        add(
            scope,
            NativeFunctionBuilder::new(JSON_PACKAGE, name)
                .with_arity(2)
                .with_implementation(move |args| get(kind, args)),
        )?;
    }

    add(
        scope,
        NativeFunctionBuilder::new(JSON_PACKAGE, "parse")
            .with_arity(1)
            .with_implementation(parse),
    )?;
    add(
        scope,
        NativeFunctionBuilder::new(JSON_PACKAGE, "toString")
            .with_arity(1)
            .with_implementation(to_string),
    )
}

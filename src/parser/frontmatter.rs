//! YAML frontmatter extraction.

use serde_json::{Map, Number, Value};

use crate::error::{MdrcError, Result};

/// Result of extracting frontmatter from a document.
#[derive(Debug)]
pub struct FrontmatterResult {
    /// Parsed frontmatter key-value pairs, in document order
    pub values: Map<String, Value>,
    /// Byte offset where content after frontmatter begins
    pub content_start: usize,
}

/// Extract YAML frontmatter from the beginning of a document.
///
/// The first line must be exactly `---` and the block ends at the next line
/// that is exactly `---`. A document without an opening delimiter, or with
/// an opening delimiter that is never closed, has no frontmatter.
pub fn extract_frontmatter(source: &str) -> Result<FrontmatterResult> {
    let bom = if source.starts_with('\u{feff}') { 3 } else { 0 };

    let Some((yaml, content_start)) = split_block(source, bom) else {
        return Ok(FrontmatterResult {
            values: Map::new(),
            content_start: bom,
        });
    };

    let parsed: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| MdrcError::FrontmatterParse {
            path: None,
            message: format!("invalid YAML: {}", e),
        })?;

    let values = match yaml_to_json(parsed) {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(MdrcError::FrontmatterParse {
                path: None,
                message: format!("expected a mapping, found {}", kind_of(&other)),
            });
        }
    };

    Ok(FrontmatterResult {
        values,
        content_start,
    })
}

/// Locate the YAML between the delimiter lines.
///
/// Returns the YAML text and the offset just past the closing line.
fn split_block(source: &str, start: usize) -> Option<(&str, usize)> {
    let mut lines = source[start..].split_inclusive('\n');

    let opening = lines.next()?;
    if !is_delimiter(opening) {
        return None;
    }

    let yaml_start = start + opening.len();
    let mut offset = yaml_start;

    for line in lines {
        if is_delimiter(line) {
            return Some((&source[yaml_start..offset], offset + line.len()));
        }
        offset += line.len();
    }

    None
}

/// A delimiter line is `---` with nothing but a line ending after it.
fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == "---"
}

/// Convert a YAML value into the JSON data model.
///
/// Mapping order is preserved. Non-string keys are stringified, tags are
/// dropped in favour of their inner value, and non-finite floats become null.
pub fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(key_to_string(&key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn key_to_string(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Tagged(tagged) => key_to_string(&tagged.value),
        complex => serde_yaml::to_string(complex)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

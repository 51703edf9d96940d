//! TypeScript type inference for frontmatter values.

use std::fmt;

use serde_json::Value;

use super::escape::property_key;

/// A declared TypeScript type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsType {
    String,
    Number,
    Boolean,
    Undefined,
    Unknown,
    /// `readonly T[]`
    ReadonlyArray(Box<TsType>),
    /// `{ readonly key: T; ... }` in property order
    Record(Vec<(String, TsType)>),
}

/// Infer the declared type of a JSON value.
///
/// Arrays take the type of their first element; empty arrays are
/// `readonly unknown[]`.
pub fn infer_type(value: &Value) -> TsType {
    match value {
        Value::String(_) => TsType::String,
        Value::Number(_) => TsType::Number,
        Value::Bool(_) => TsType::Boolean,
        Value::Null => TsType::Undefined,
        Value::Array(items) => TsType::ReadonlyArray(Box::new(
            items.first().map(infer_type).unwrap_or(TsType::Unknown),
        )),
        Value::Object(map) => TsType::Record(
            map.iter()
                .map(|(key, value)| (key.clone(), infer_type(value)))
                .collect(),
        ),
    }
}

impl TsType {
    /// Render the type, laying records out over multiple lines.
    ///
    /// `indent` is the nesting depth of the line the type starts on.
    pub fn render(&self, indent: usize) -> String {
        match self {
            TsType::String => "string".to_string(),
            TsType::Number => "number".to_string(),
            TsType::Boolean => "boolean".to_string(),
            TsType::Undefined => "undefined".to_string(),
            TsType::Unknown => "unknown".to_string(),
            TsType::ReadonlyArray(element) => match element.as_ref() {
                TsType::ReadonlyArray(_) => format!("readonly ({})[]", element.render(indent)),
                other => format!("readonly {}[]", other.render(indent)),
            },
            TsType::Record(fields) if fields.is_empty() => "{}".to_string(),
            TsType::Record(fields) => {
                let pad = "  ".repeat(indent + 1);
                let mut out = String::from("{\n");
                for (key, ty) in fields {
                    out.push_str(&format!(
                        "{}readonly {}: {};\n",
                        pad,
                        property_key(key),
                        ty.render(indent + 1)
                    ));
                }
                out.push_str(&"  ".repeat(indent));
                out.push('}');
                out
            }
        }
    }
}

impl fmt::Display for TsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(0))
    }
}

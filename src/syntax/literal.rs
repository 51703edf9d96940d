//! Inline object literals for transformed imports.

use serde_json::Value;

use crate::types::{Fragment, Resource};

use super::ast::{Expr, Property};

/// Build `{ meta, text, fragments }` for a resource.
///
/// This is the same shape as the default export of the generated module, so
/// a transformed import behaves like importing the compiled artifact.
pub fn resource_literal(resource: &Resource) -> Expr {
    let fragments = resource
        .keyed_fragments()
        .into_iter()
        .map(|(key, fragment)| Property::new(key, fragment_literal(fragment)))
        .collect();

    Expr::Object(vec![
        Property::new("meta", json_literal(&Value::Object(resource.frontmatter.clone()))),
        Property::new("text", Expr::String(resource.content.clone())),
        Property::new("fragments", Expr::Object(fragments)),
    ])
}

fn fragment_literal(fragment: &Fragment) -> Expr {
    Expr::Object(vec![
        Property::new("header", Expr::String(fragment.header.clone())),
        Property::new("body", Expr::String(fragment.body.clone())),
        Property::new("text", Expr::String(fragment.text.clone())),
    ])
}

/// Convert a frontmatter value to an expression.
pub fn json_literal(value: &Value) -> Expr {
    match value {
        Value::Null => Expr::Null,
        Value::Bool(b) => Expr::Bool(*b),
        Value::Number(n) => Expr::Number(n.to_string()),
        Value::String(s) => Expr::String(s.clone()),
        Value::Array(items) => Expr::Array(items.iter().map(json_literal).collect()),
        Value::Object(map) => Expr::Object(
            map.iter()
                .map(|(k, v)| Property::new(k.as_str(), json_literal(v)))
                .collect(),
        ),
    }
}

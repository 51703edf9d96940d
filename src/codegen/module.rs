//! `.md.js` module generation.

use serde_json::Value;

use crate::types::{Fragment, Resource};

use super::escape::{property_key, string_literal};
use super::GENERATED_HEADER;

/// Generate the runtime ES module for a resource.
///
/// Exports `meta`, `text` and `fragments`, plus a default export bundling
/// all three.
pub fn generate_module(resource: &Resource) -> String {
    let mut out = String::new();
    out.push_str(GENERATED_HEADER);
    out.push_str("\n\n");

    out.push_str("export const meta = ");
    write_value(&mut out, &Value::Object(resource.frontmatter.clone()), 0);
    out.push_str(";\n\n");

    out.push_str("export const text = ");
    out.push_str(&string_literal(&resource.content));
    out.push_str(";\n\n");

    out.push_str("export const fragments = ");
    write_fragments(&mut out, resource);
    out.push_str(";\n\n");

    out.push_str("export default { meta, text, fragments };\n");
    out
}

fn write_fragments(out: &mut String, resource: &Resource) {
    let keyed = resource.keyed_fragments();
    if keyed.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push_str("{\n");
    for (key, fragment) in keyed {
        out.push_str(&format!("  {}: ", property_key(key)));
        write_fragment(out, fragment);
        out.push_str(",\n");
    }
    out.push('}');
}

fn write_fragment(out: &mut String, fragment: &Fragment) {
    out.push_str("{\n");
    for (key, value) in [
        ("header", &fragment.header),
        ("body", &fragment.body),
        ("text", &fragment.text),
    ] {
        out.push_str(&format!("    {}: {},\n", key, string_literal(value)));
    }
    out.push_str("  }");
}

/// Write a JSON value as a JavaScript literal.
fn write_value(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&string_literal(s)),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) if items.iter().all(is_scalar) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, indent);
            }
            out.push(']');
        }
        Value::Array(items) => {
            let pad = "  ".repeat(indent + 1);
            out.push_str("[\n");
            for item in items {
                out.push_str(&pad);
                write_value(out, item, indent + 1);
                out.push_str(",\n");
            }
            out.push_str(&"  ".repeat(indent));
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            let pad = "  ".repeat(indent + 1);
            out.push_str("{\n");
            for (key, item) in map {
                out.push_str(&format!("{}{}: ", pad, property_key(key)));
                write_value(out, item, indent + 1);
                out.push_str(",\n");
            }
            out.push_str(&"  ".repeat(indent));
            out.push('}');
        }
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

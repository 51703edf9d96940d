//! `.md.d.ts` declaration generation.

use serde_json::Value;

use crate::types::Resource;

use super::escape::property_key;
use super::infer::{infer_type, TsType};
use super::GENERATED_HEADER;

const FRAGMENT_INTERFACE: &str = "export interface Fragment {
  readonly header: string;
  readonly body: string;
  readonly text: string;
}";

const DEFAULT_EXPORT: &str = "declare const resource: {
  readonly meta: typeof meta;
  readonly text: typeof text;
  readonly fragments: typeof fragments;
};
export default resource;";

/// Generate the type declarations for a resource.
///
/// The output depends only on the resource contents, never on where the
/// source file lives.
pub fn generate_declaration(resource: &Resource) -> String {
    let meta = match infer_type(&Value::Object(resource.frontmatter.clone())) {
        TsType::Record(fields) if fields.is_empty() => "{}".to_string(),
        ty => ty.render(0),
    };

    let keyed = resource.keyed_fragments();
    let fragments = if keyed.is_empty() {
        "{}".to_string()
    } else {
        let mut out = String::from("{\n");
        for (key, _) in &keyed {
            out.push_str(&format!("  readonly {}: Fragment;\n", property_key(key)));
        }
        out.push('}');
        out
    };

    let fragment_name = if keyed.is_empty() {
        "never"
    } else {
        "keyof typeof fragments"
    };

    let mut out = String::new();
    out.push_str(GENERATED_HEADER);
    out.push_str("\n\n");
    out.push_str(FRAGMENT_INTERFACE);
    out.push_str("\n\n");
    out.push_str(&format!("export declare const meta: {};\n\n", meta));
    out.push_str("export declare const text: string;\n\n");
    out.push_str(&format!("export declare const fragments: {};\n\n", fragments));
    out.push_str(&format!("export type FragmentName = {};\n\n", fragment_name));
    out.push_str(DEFAULT_EXPORT);
    out.push('\n');
    out
}

//! package.json lookup and `exports` matching.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

/// The package.json fields resolution reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub exports: Option<Value>,
}

impl PackageJson {
    /// Read `<package_dir>/package.json`.
    ///
    /// A missing or malformed manifest reads as an empty one.
    pub fn read(package_dir: &Path) -> Self {
        let path = package_dir.join("package.json");
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(package) => package,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "ignoring unreadable package.json");
                Self::default()
            }
        }
    }
}

/// Split a bare specifier into package name and subpath.
///
/// - `"lodash"` -> `("lodash", None)`
/// - `"lodash/fp.md"` -> `("lodash", Some("fp.md"))`
/// - `"@scope/pkg/docs/a.md"` -> `("@scope/pkg", Some("docs/a.md"))`
pub fn parse_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    let name_end = if specifier.starts_with('@') {
        specifier
            .match_indices('/')
            .nth(1)
            .map(|(i, _)| i)
    } else {
        specifier.find('/')
    };

    match name_end {
        Some(i) if i + 1 < specifier.len() => (&specifier[..i], Some(&specifier[i + 1..])),
        Some(i) => (&specifier[..i], None),
        None => (specifier, None),
    }
}

/// Match a subpath (`"."` or `"./sub"`) against an `exports` value.
///
/// Returns the package-relative target, or `None` when the subpath is not
/// exported under `conditions`.
pub fn resolve_exports(exports: &Value, subpath: &str, conditions: &[&str]) -> Option<String> {
    let Value::Object(map) = exports else {
        // String or array sugar stands for `{ ".": exports }`.
        return (subpath == ".")
            .then(|| resolve_target(exports, None, conditions))
            .flatten();
    };

    if !map.keys().any(|k| k.starts_with('.')) {
        // A bare conditions object is the `"."` entry.
        return (subpath == ".")
            .then(|| resolve_target(exports, None, conditions))
            .flatten();
    }

    if let Some(target) = map.get(subpath) {
        if !subpath.contains('*') {
            return resolve_target(target, None, conditions);
        }
    }

    let (target, capture) = map
        .iter()
        .filter_map(|(key, target)| {
            let (prefix, suffix) = key.split_once('*')?;
            let rest = subpath.strip_prefix(prefix)?;
            let capture = rest.strip_suffix(suffix)?;
            Some((prefix.len(), target, capture))
        })
        .max_by_key(|(prefix_len, _, _)| *prefix_len)
        .map(|(_, target, capture)| (target, capture))?;

    resolve_target(target, Some(capture), conditions)
}

fn resolve_target(target: &Value, capture: Option<&str>, conditions: &[&str]) -> Option<String> {
    match target {
        Value::String(path) => {
            if !path.starts_with("./") {
                return None;
            }
            Some(match capture {
                Some(capture) => path.replace('*', capture),
                None => path.clone(),
            })
        }
        Value::Array(targets) => targets
            .iter()
            .find_map(|t| resolve_target(t, capture, conditions)),
        Value::Object(branches) => branches
            .iter()
            .filter(|(condition, _)| conditions.contains(&condition.as_str()))
            .find_map(|(_, t)| resolve_target(t, capture, conditions)),
        _ => None,
    }
}

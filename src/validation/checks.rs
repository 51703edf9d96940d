//! Individual checks over resources and scripts.

use std::path::Path;

use crate::resolve::PathResolver;
use crate::syntax::{HostAdapter, SourceUnit, ScriptAdapter};
use crate::transform::{find_markdown_imports, UNRESOLVED_IMPORT};
use crate::types::Resource;

use super::warning::{Diagnostic, ValidationResult};

/// Code for headings that map to the same fragment key.
pub const DUPLICATE_FRAGMENT: &str = "mdrc::parse::duplicate-fragment";

/// Code for documents without any H2 section.
pub const NO_FRAGMENTS: &str = "mdrc::check::no-fragments";

/// Warn about headings whose fragment keys collide.
pub fn check_duplicate_fragments(path: &Path, resource: &Resource) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (first, second) in resource.colliding_fragments() {
        result.push(
            Diagnostic::warning(
                DUPLICATE_FRAGMENT,
                format!(
                    "Headings '{}' and '{}' both map to fragment key `{}`; the later one wins",
                    first.heading, second.heading, second.camel_case
                ),
            )
            .with_path(path)
            .with_help("Rename one of the headings so their keys differ"),
        );
    }

    result
}

/// Warn about documents that expose no fragments.
pub fn check_has_fragments(path: &Path, resource: &Resource) -> ValidationResult {
    let mut result = ValidationResult::new();

    if resource.fragments.is_empty() && !resource.content.trim().is_empty() {
        result.push(
            Diagnostic::warning(NO_FRAGMENTS, "Document has content but no `## ` sections")
                .with_path(path)
                .with_help("Only second-level headings become fragments"),
        );
    }

    result
}

/// Report markdown imports in a script that do not resolve.
pub fn check_unresolved_imports(unit: &SourceUnit, resolver: &PathResolver) -> ValidationResult {
    let adapter = ScriptAdapter::new();
    let mut result = ValidationResult::new();
    let containing_file = adapter.source_path(unit);

    for import in find_markdown_imports(&adapter, unit) {
        let specifier = &import.info.module_path;
        if resolver.resolve(specifier, containing_file).is_none() {
            result.push(
                Diagnostic::error(
                    UNRESOLVED_IMPORT,
                    format!("Cannot resolve markdown import '{}'", specifier),
                )
                .with_path(containing_file),
            );
        }
    }

    result
}

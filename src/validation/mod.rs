//! Project checks for `mdrc check`.
//!
//! Checks report diagnostics instead of failing: duplicate fragment keys,
//! documents without sections, and markdown imports that do not resolve.

mod checks;
mod warning;

pub use checks::{
    check_duplicate_fragments, check_has_fragments, check_unresolved_imports, DUPLICATE_FRAGMENT,
    NO_FRAGMENTS,
};
pub use warning::{Diagnostic, Severity, ValidationResult};

use std::path::Path;

use crate::resolve::PathResolver;
use crate::syntax::SourceUnit;
use crate::types::Resource;

/// Run all resource checks.
pub fn validate_resource(path: &Path, resource: &Resource) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(check_duplicate_fragments(path, resource));
    result.merge(check_has_fragments(path, resource));

    result
}

/// Run all script checks.
pub fn validate_script(unit: &SourceUnit, resolver: &PathResolver) -> ValidationResult {
    check_unresolved_imports(unit, resolver)
}

/// Print diagnostics to stderr.
pub fn print_diagnostics(result: &ValidationResult) {
    for d in result.iter() {
        eprintln!("  {}", d);
        if let Some(help) = &d.help {
            eprintln!("    help: {}", help);
        }
    }
}

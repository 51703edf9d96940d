//! Check command implementation.
//!
//! Parses every resource and script and reports diagnostics without
//! writing any files.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::cache::read_resource;
use crate::error::{MdrcError, Result};
use crate::output::{plural, Printer};
use crate::resolve::PathResolver;
use crate::syntax::parse_source;
use crate::validation::{validate_resource, validate_script, Diagnostic, ValidationResult};

/// Diagnostic code for files that fail to parse.
const PARSE_FAILED: &str = "mdrc::check::parse";

/// Check resources and imports without writing anything
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files or directories to check (default: the project sources)
    pub paths: Vec<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: CheckArgs, printer: &Printer) -> Result<()> {
    let discovery = super::discover_inputs(&args.paths)?;
    let manifest = &discovery.manifest;
    let options = manifest.parse_options();
    let resolver = PathResolver::new(manifest.compiler_options.clone());

    let mut result = ValidationResult::new();

    for path in &discovery.scan.resources {
        match read_resource(path, &options) {
            Ok(resource) => result.merge(validate_resource(path, &resource)),
            Err(e) => result.push(Diagnostic::error(PARSE_FAILED, e.to_string()).with_path(path)),
        }
    }

    for path in &discovery.scan.scripts {
        let parsed = fs::read_to_string(path)
            .map_err(|e| MdrcError::Io {
                path: path.clone(),
                message: format!("Failed to read script: {}", e),
            })
            .and_then(|source| parse_source(path, &source));

        match parsed {
            Ok(unit) => result.merge(validate_script(&unit, &resolver)),
            Err(e) => result.push(Diagnostic::error(PARSE_FAILED, e.to_string()).with_path(path)),
        }
    }

    for diagnostic in result.iter() {
        printer.diagnostic(diagnostic);
    }

    let errors = result.error_count();
    let warnings = result.warning_count();
    let failed = errors > 0 || (args.strict && warnings > 0);
    let checked = plural(discovery.scan.total(), "file", "files");

    if failed {
        return Err(MdrcError::Build {
            message: format!(
                "check failed: {}, {}",
                plural(errors, "error", "errors"),
                plural(warnings, "warning", "warnings")
            ),
            help: args
                .strict
                .then(|| "Warnings are errors under --strict".to_string()),
        });
    }

    if warnings > 0 {
        printer.warning("Checked", &format!("{} ({})", checked, plural(warnings, "warning", "warnings")));
    } else {
        printer.status("Checked", &checked);
    }

    Ok(())
}

//! Build command implementation.
//!
//! Compiles each markdown resource to a `.md.js` module and a `.md.d.ts`
//! declaration placed next to it.

use std::path::PathBuf;

use clap::Args;

use crate::codegen::{compile_file, is_up_to_date, write_artifacts};
use crate::error::{MdrcError, Result};
use crate::output::{display_path, plural, Printer};

/// Compile markdown files to modules and declarations
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Files or directories to compile (default: the project sources)
    pub paths: Vec<PathBuf>,

    /// Fail if any generated file is missing or stale instead of writing
    #[arg(long)]
    pub check: bool,
}

pub fn run(args: BuildArgs, printer: &Printer) -> Result<()> {
    let discovery = super::discover_inputs(&args.paths)?;
    let options = discovery.manifest.parse_options();
    let resources = &discovery.scan.resources;

    let mut written = 0;
    let mut stale = Vec::new();

    for path in resources {
        let artifacts = compile_file(path, &options)?;

        if is_up_to_date(path, &artifacts) {
            tracing::debug!(path = %path.display(), "artifacts up to date");
            continue;
        }

        if args.check {
            printer.warning("Stale", &display_path(path));
            stale.push(path.clone());
            continue;
        }

        printer.status("Compiling", &display_path(path));
        write_artifacts(path, &artifacts)?;
        written += 1;
    }

    if !stale.is_empty() {
        return Err(MdrcError::Build {
            message: format!(
                "{} out of date",
                plural(stale.len(), "generated resource is", "generated resources are")
            ),
            help: Some("Run `mdrc build` to regenerate them".to_string()),
        });
    }

    let verb = if args.check { "Checked" } else { "Finished" };
    printer.status(
        verb,
        &format!(
            "{} ({} written)",
            plural(resources.len(), "resource", "resources"),
            written
        ),
    );

    Ok(())
}

//! Transform command implementation.
//!
//! Rewrites markdown imports in script sources into inline constants,
//! either in place, into an output directory, or to stdout.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::cache::ResourceCache;
use crate::error::{MdrcError, Result};
use crate::output::{display_path, plural, Printer};
use crate::resolve::PathResolver;
use crate::transform::{transform_source, UNRESOLVED_IMPORT};

/// Inline markdown imports in script sources
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Script files or directories (default: the project sources)
    pub paths: Vec<PathBuf>,

    /// Write transformed files under this directory instead of in place
    #[arg(long, short)]
    pub out_dir: Option<PathBuf>,

    /// Print transformed sources to stdout
    #[arg(long, conflicts_with = "out_dir")]
    pub stdout: bool,
}

pub fn run(args: TransformArgs, printer: &Printer) -> Result<()> {
    let discovery = super::discover_inputs(&args.paths)?;
    let manifest = &discovery.manifest;
    let out_dir = args.out_dir.clone().or_else(|| manifest.out_dir.clone());

    let resolver = PathResolver::new(manifest.compiler_options.clone());
    let cache = ResourceCache::with_options(manifest.parse_options());

    let mut changed = 0;
    let mut unresolved = 0;

    for path in &discovery.scan.scripts {
        let source = fs::read_to_string(path).map_err(|e| MdrcError::Io {
            path: path.clone(),
            message: format!("Failed to read script: {}", e),
        })?;

        let outcome = transform_source(path, &source, &resolver, &cache)?;
        for diagnostic in &outcome.diagnostics {
            printer.diagnostic(diagnostic);
        }
        unresolved += outcome
            .diagnostics
            .iter()
            .filter(|d| d.code == UNRESOLVED_IMPORT)
            .count();

        if args.stdout {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(outcome.unit.as_bytes())
                .map_err(MdrcError::from)?;
            continue;
        }

        match &out_dir {
            Some(out_dir) => {
                let target = output_path(out_dir, &discovery.root, path);
                write_source(&target, &outcome.unit)?;
                if outcome.changed() {
                    printer.status("Transformed", &format!("{} -> {}", display_path(path), display_path(&target)));
                }
            }
            None if outcome.changed() => {
                write_source(path, &outcome.unit)?;
                printer.status("Transformed", &display_path(path));
            }
            None => {}
        }

        if outcome.changed() {
            changed += 1;
        }
    }

    if !args.stdout {
        let mut summary = format!(
            "{} ({} changed)",
            plural(discovery.scan.scripts.len(), "script", "scripts"),
            changed
        );
        if unresolved > 0 {
            summary.push_str(&format!(", {}", plural(unresolved, "unresolved import", "unresolved imports")));
        }
        printer.status("Finished", &summary);
    }

    Ok(())
}

/// Mirror `path` relative to `root` under `out_dir`.
fn output_path(out_dir: &Path, root: &Path, path: &Path) -> PathBuf {
    let relative = path
        .strip_prefix(root)
        .ok()
        .or_else(|| path.file_name().map(Path::new))
        .unwrap_or(path);
    out_dir.join(relative)
}

fn write_source(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| MdrcError::Io {
            path: parent.to_path_buf(),
            message: format!("Failed to create directory: {}", e),
        })?;
    }
    fs::write(path, contents).map_err(|e| MdrcError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write file: {}", e),
    })
}

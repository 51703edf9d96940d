//! Init command implementation.
//!
//! Generates an `mdrc.yaml` manifest listing the directories that contain
//! markdown resources.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::discovery::{discover, Manifest, MANIFEST_FILENAME};
use crate::error::{MdrcError, Result};
use crate::output::{display_path, plural, Printer};

/// Initialize an mdrc project by generating an mdrc.yaml manifest
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to scan (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing mdrc.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let manifest_path = args.path.join(MANIFEST_FILENAME);

    if manifest_path.exists() && !args.force {
        return Err(MdrcError::Build {
            message: format!("{} already exists", MANIFEST_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    printer.status("Scanning", &display_path(&args.path));
    let discovery = discover(&args.path)?;
    let scan = &discovery.scan;

    // Top-level directories holding resources or scripts.
    let mut source_dirs = BTreeSet::new();
    for file in scan.resources.iter().chain(&scan.scripts) {
        let relative = file.strip_prefix(&discovery.root).unwrap_or(file);
        let top = match relative.components().next() {
            Some(first) if relative.components().count() > 1 => {
                format!("{}/", Path::new(first.as_os_str()).display())
            }
            _ => ".".to_string(),
        };
        source_dirs.insert(top);
    }

    let manifest = Manifest {
        sources: if source_dirs.contains(".") {
            Vec::new()
        } else {
            source_dirs.iter().cloned().collect()
        },
        ..Manifest::default()
    };

    fs::write(&manifest_path, manifest.to_yaml()?).map_err(|e| MdrcError::Io {
        path: manifest_path.clone(),
        message: format!("Failed to write manifest: {}", e),
    })?;

    if !manifest.sources.is_empty() {
        printer.info("Discovered", &manifest.sources.join(", "));
    }

    printer.status(
        "Created",
        &format!(
            "{} ({} found)",
            MANIFEST_FILENAME,
            plural(scan.resources.len(), "resource", "resources")
        ),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn init(path: &Path, force: bool) -> Result<()> {
        run(
            InitArgs {
                path: path.to_path_buf(),
                force,
            },
            &Printer::new(),
        )
    }

    #[test]
    fn test_init_creates_loadable_manifest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("core.md"), "## A\n").unwrap();

        init(dir.path(), false).unwrap();

        let manifest = Manifest::load(&dir.path().join(MANIFEST_FILENAME)).unwrap();
        assert!(manifest.sources.is_empty());
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_init_errors_if_manifest_exists() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "sources: []").unwrap();

        assert!(init(dir.path(), false).is_err());
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "sources: [old/]").unwrap();

        init(dir.path(), true).unwrap();

        let content = fs::read_to_string(dir.path().join(MANIFEST_FILENAME)).unwrap();
        assert!(!content.contains("old/"));
    }

    #[test]
    fn test_init_discovers_source_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("prompts/agents")).unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("prompts/agents/core.md"), "## A\n").unwrap();
        fs::write(dir.path().join("src/main.ts"), "").unwrap();

        init(dir.path(), false).unwrap();

        let manifest = Manifest::load(&dir.path().join(MANIFEST_FILENAME)).unwrap();
        assert_eq!(manifest.sources, vec!["prompts/", "src/"]);
    }
}

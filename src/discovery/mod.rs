//! File discovery for mdrc projects.
//!
//! Finds the markdown resources and script sources of a project directory,
//! either by scanning the whole directory or the sources listed in an
//! `mdrc.yaml` manifest.
//!
//! # Example
//!
//! ```ignore
//! use mdrc::discovery::discover;
//!
//! let result = discover("./my-project")?;
//! println!("Found {} resources", result.scan.resources.len());
//! ```

mod manifest;
mod scanner;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use manifest::{Manifest, DEFAULT_SCRIPT_EXTENSIONS};
pub use scanner::{is_markdown_file, scan_directory, scan_sources, ScanResult};

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "mdrc.yaml";

/// Result of discovering files in a project.
#[derive(Debug)]
pub struct DiscoveryResult {
    /// The project root directory.
    pub root: PathBuf,

    /// The loaded manifest (default if no mdrc.yaml was found).
    pub manifest: Manifest,

    /// Whether a mdrc.yaml manifest was found.
    pub has_manifest: bool,

    pub scan: ScanResult,
}

/// Load the manifest in `root`, if any.
pub fn load_manifest(root: &Path) -> Result<(Manifest, bool)> {
    let manifest_path = root.join(MANIFEST_FILENAME);
    if manifest_path.exists() {
        Ok((Manifest::load(&manifest_path)?, true))
    } else {
        Ok((Manifest::default(), false))
    }
}

/// Discover files in a project directory.
///
/// Uses the manifest's source paths when a `mdrc.yaml` is present,
/// otherwise scans the entire directory.
pub fn discover(root: impl AsRef<Path>) -> Result<DiscoveryResult> {
    let root = root.as_ref().to_path_buf();
    let (manifest, has_manifest) = load_manifest(&root)?;

    let sources = manifest.effective_sources();
    let scan = scan_sources(&sources, &root, &manifest);

    Ok(DiscoveryResult {
        root,
        manifest,
        has_manifest,
        scan,
    })
}

/// Discover files from explicit paths, using `manifest` for filtering.
///
/// Directories are scanned recursively; files are categorized directly.
pub fn discover_paths(paths: &[PathBuf], manifest: Manifest) -> DiscoveryResult {
    let mut scan = ScanResult::new();

    for path in paths {
        if path.is_dir() {
            scan.merge(scan_directory(path, &manifest));
        } else if path.is_file() {
            scan.add_file(path, &manifest);
        }
    }

    let root = paths
        .first()
        .and_then(|p| if p.is_dir() { Some(p.as_path()) } else { p.parent() })
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));

    DiscoveryResult {
        root,
        manifest,
        has_manifest: false,
        scan,
    }
}

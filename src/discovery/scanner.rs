//! File system scanner for markdown resources and scripts.
//!
//! Recursively scans directories for `.md` resources and for script files
//! that may import them. `node_modules` and hidden directories are never
//! entered.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::manifest::Manifest;

/// Result of scanning for project files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Discovered markdown resources.
    pub resources: Vec<PathBuf>,
    /// Discovered script sources.
    pub scripts: Vec<PathBuf>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of discovered files.
    pub fn total(&self) -> usize {
        self.resources.len() + self.scripts.len()
    }

    /// Check if no files were discovered.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Merge another scan result into this one, skipping files already seen.
    pub fn merge(&mut self, other: ScanResult) {
        for path in other.resources {
            if !self.resources.contains(&path) {
                self.resources.push(path);
            }
        }
        for path in other.scripts {
            if !self.scripts.contains(&path) {
                self.scripts.push(path);
            }
        }
    }

    /// Add a single file to the matching category.
    pub fn add_file(&mut self, path: &Path, manifest: &Manifest) {
        let mut single = ScanResult::new();
        if is_markdown_file(path) {
            single.resources.push(path.to_path_buf());
        } else if manifest.is_script(path) {
            single.scripts.push(path.to_path_buf());
        }
        self.merge(single);
    }
}

/// Whether a path names a markdown resource.
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == "node_modules" || name.starts_with('.')
}

/// Scan a directory for resources and scripts.
///
/// Files are returned in a stable, name-sorted order.
pub fn scan_directory(root: &Path, manifest: &Manifest) -> ScanResult {
    let mut result = ScanResult::new();

    if !root.exists() {
        return result;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if manifest.is_excluded(relative) {
            continue;
        }

        if is_markdown_file(path) {
            result.resources.push(path.to_path_buf());
        } else if manifest.is_script(path) {
            result.scripts.push(path.to_path_buf());
        }
    }

    result
}

/// Scan multiple source paths.
pub fn scan_sources(sources: &[String], base_path: &Path, manifest: &Manifest) -> ScanResult {
    let mut result = ScanResult::new();

    for source in sources {
        let source_path = if Path::new(source).is_absolute() {
            PathBuf::from(source)
        } else {
            base_path.join(source)
        };

        result.merge(scan_directory(&source_path, manifest));
    }

    result
}

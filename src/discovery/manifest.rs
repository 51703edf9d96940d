//! Project manifest (mdrc.yaml) parsing.
//!
//! The manifest names the source directories to scan and carries the
//! options shared by every command: resolver settings, the duplicate
//! heading policy and the script extensions to transform.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MdrcError, Result};
use crate::parser::{DuplicatePolicy, ParseOptions};
use crate::resolve::CompilerOptions;

/// Script extensions transformed by default.
pub const DEFAULT_SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Project manifest loaded from mdrc.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Manifest {
    /// Source directories to scan. Defaults to the project root if empty.
    pub sources: Vec<String>,

    /// Patterns to exclude from discovery.
    pub excludes: Vec<String>,

    /// Module resolution settings for markdown imports.
    pub compiler_options: CompilerOptions,

    /// What to do when two headings share a fragment key.
    pub duplicate_headings: DuplicatePolicy,

    /// Script file extensions to transform, without the leading dot.
    pub extensions: Vec<String>,

    /// Directory for transformed scripts. When unset, `mdrc transform`
    /// rewrites files in place.
    pub out_dir: Option<PathBuf>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            sources: vec![],
            excludes: vec![],
            compiler_options: CompilerOptions::default(),
            duplicate_headings: DuplicatePolicy::default(),
            extensions: DEFAULT_SCRIPT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            out_dir: None,
        }
    }
}

impl Manifest {
    /// Load manifest from a mdrc.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MdrcError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| MdrcError::Manifest {
            message: format!("Invalid manifest: {}", e),
            help: Some("Check mdrc.yaml syntax".to_string()),
        })
    }

    /// Render the manifest as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| MdrcError::Manifest {
            message: format!("Failed to serialize manifest: {}", e),
            help: None,
        })
    }

    /// Parse options derived from the manifest.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            duplicate_headings: self.duplicate_headings,
        }
    }

    /// Check if a path should be excluded based on exclude patterns.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.excludes
            .iter()
            .any(|pattern| Self::matches_pattern(&path_str, pattern))
    }

    /// Simple glob pattern matching.
    fn matches_pattern(path: &str, pattern: &str) -> bool {
        if let Some(suffix) = pattern.strip_prefix("**/") {
            // **/dir/* matches anything inside dir anywhere in the path
            if let Some(dir) = suffix.strip_suffix("/*") {
                return path.contains(&format!("/{}/", dir)) || path.starts_with(&format!("{}/", dir));
            }
            return path.contains(suffix);
        }

        if let Some(suffix) = pattern.strip_prefix('*') {
            if !pattern.contains('/') {
                return path.ends_with(suffix);
            }
        }

        if let Some(prefix) = pattern.strip_suffix("/*") {
            return path.starts_with(&format!("{}/", prefix))
                || path.contains(&format!("/{}/", prefix));
        }

        path.contains(pattern)
    }

    /// Whether a file is a script this project transforms.
    ///
    /// Declaration files (`.d.ts`, `.d.mts`, ...) and generated `.md.js`
    /// modules never are.
    pub fn is_script(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let Some((stem, ext)) = name.rsplit_once('.') else {
            return false;
        };
        if stem.ends_with(".d") || stem.ends_with(".md") {
            return false;
        }
        self.extensions.iter().any(|e| e == ext)
    }

    /// Get effective source paths, defaulting to current directory.
    pub fn effective_sources(&self) -> Vec<String> {
        if self.sources.is_empty() {
            vec![".".to_string()]
        } else {
            self.sources.clone()
        }
    }
}

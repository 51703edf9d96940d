//! Standalone artifact generation for markdown resources.
//!
//! Each `name.md` compiles to a pair of files placed next to it:
//!
//! - `name.md.js` - ES module exporting `meta`, `text` and `fragments`
//! - `name.md.d.ts` - matching type declarations
//!
//! Both are pure functions of the parsed `Resource`.

mod declaration;
pub mod escape;
mod infer;
mod module;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MdrcError, Result};
use crate::parser::{parse_resource_with, ParseOptions};
use crate::types::Resource;

pub use declaration::generate_declaration;
pub use infer::{infer_type, TsType};
pub use module::generate_module;

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// Generated by mdrc. DO NOT EDIT.";

/// The generated module and declaration for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub module: String,
    pub declaration: String,
}

impl Artifacts {
    /// Generate both artifacts from a parsed resource.
    pub fn generate(resource: &Resource) -> Self {
        Self {
            module: generate_module(resource),
            declaration: generate_declaration(resource),
        }
    }
}

/// Path of the generated module for a markdown file (`core.md.js`).
pub fn module_path(markdown: &Path) -> PathBuf {
    with_suffix(markdown, ".js")
}

/// Path of the generated declaration for a markdown file (`core.md.d.ts`).
pub fn declaration_path(markdown: &Path) -> PathBuf {
    with_suffix(markdown, ".d.ts")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Read and compile a markdown file.
pub fn compile_file(path: &Path, options: &ParseOptions) -> Result<Artifacts> {
    let source = fs::read_to_string(path).map_err(|e| MdrcError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read file: {}", e),
    })?;

    let resource = parse_resource_with(&source, options).map_err(|e| e.with_path(path))?;
    Ok(Artifacts::generate(&resource))
}

/// Write artifacts next to their markdown source.
///
/// Returns the module and declaration paths.
pub fn write_artifacts(markdown: &Path, artifacts: &Artifacts) -> Result<(PathBuf, PathBuf)> {
    let module = module_path(markdown);
    let declaration = declaration_path(markdown);

    write_file(&module, &artifacts.module)?;
    write_file(&declaration, &artifacts.declaration)?;

    Ok((module, declaration))
}

/// Whether the artifacts on disk already match `artifacts`.
pub fn is_up_to_date(markdown: &Path, artifacts: &Artifacts) -> bool {
    let matches = |path: PathBuf, expected: &str| {
        fs::read_to_string(path)
            .map(|actual| actual == expected)
            .unwrap_or(false)
    };

    matches(module_path(markdown), &artifacts.module)
        && matches(declaration_path(markdown), &artifacts.declaration)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| MdrcError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write file: {}", e),
    })
}

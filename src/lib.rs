//! mdrc - Markdown resource compiler
//!
//! Turns markdown documents with YAML frontmatter into typed JavaScript
//! modules, and rewrites `.md` imports in script sources into inline
//! constants at build time.

pub mod cache;
pub mod cli;
pub mod codegen;
pub mod discovery;
pub mod error;
pub mod output;
pub mod parser;
pub mod resolve;
pub mod syntax;
pub mod transform;
pub mod types;
pub mod validation;

pub use cache::{read_resource, ResourceCache};
pub use codegen::{
    compile_file, generate_declaration, generate_module, infer_type, write_artifacts, Artifacts,
    TsType,
};
pub use discovery::{discover, discover_paths, DiscoveryResult, Manifest, ScanResult};
pub use error::{MdrcError, Result};
pub use parser::{parse_resource, parse_resource_with, DuplicatePolicy, ParseOptions};
pub use resolve::{CompilerOptions, ModuleResolutionKind, PathResolver};
pub use syntax::{HostAdapter, ImportClause, ScriptAdapter, SourceUnit};
pub use transform::{
    find_markdown_imports, transform_source, ImportInfo, ImportKind, TransformOutcome, Transformer,
};
pub use types::{Fragment, Resource};
pub use validation::{Diagnostic, Severity, ValidationResult};

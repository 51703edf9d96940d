pub mod build;
pub mod check;
pub mod completions;
pub mod init;
pub mod transform;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::discovery::{discover, discover_paths, load_manifest, DiscoveryResult};
use crate::error::Result;

/// mdrc - Markdown resource compiler
#[derive(Parser, Debug)]
#[command(name = "mdrc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile markdown files to .md.js modules and .md.d.ts declarations
    Build(build::BuildArgs),

    /// Inline markdown imports in script sources
    Transform(transform::TransformArgs),

    /// Check resources and imports without writing anything
    Check(check::CheckArgs),

    /// Initialize an mdrc project (generates mdrc.yaml)
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Find the files a command operates on.
///
/// With no paths the current project is discovered through its manifest;
/// explicit paths are filtered with the manifest of the current directory.
pub(crate) fn discover_inputs(paths: &[PathBuf]) -> Result<DiscoveryResult> {
    if paths.is_empty() {
        return discover(".");
    }
    let (manifest, has_manifest) = load_manifest(std::path::Path::new("."))?;
    let mut result = discover_paths(paths, manifest);
    result.has_manifest = has_manifest;
    Ok(result)
}

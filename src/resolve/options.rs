//! Compiler options that affect module resolution.

use serde::{Deserialize, Serialize};

/// Host module resolution strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleResolutionKind {
    /// Bare specifiers are never resolved through packages.
    #[serde(alias = "classic")]
    Classic,
    /// Package subpaths are joined directly; `exports` is ignored.
    #[serde(alias = "node10", alias = "node", alias = "Node")]
    Node10,
    #[serde(alias = "node16")]
    Node16,
    #[default]
    #[serde(alias = "nodenext")]
    NodeNext,
    /// Like `NodeNext` without the `node` export condition.
    #[serde(alias = "bundler")]
    Bundler,
}

impl ModuleResolutionKind {
    /// Whether package.json `exports` maps are honored.
    pub fn uses_exports(self) -> bool {
        matches!(self, Self::Node16 | Self::NodeNext | Self::Bundler)
    }

    /// Export conditions, in priority order.
    pub fn conditions(self) -> &'static [&'static str] {
        match self {
            Self::Bundler => &["import", "default"],
            _ => &["import", "node", "default"],
        }
    }
}

/// Options for the path resolver.
///
/// Only `module_resolution` changes resolver behavior; the other fields are
/// carried so a `tsconfig`-style block can be passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    pub module_resolution: ModuleResolutionKind,
    pub target: String,
    pub module: String,
    pub es_module_interop: bool,
    pub allow_synthetic_default_imports: bool,
    pub resolve_json_module: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            module_resolution: ModuleResolutionKind::NodeNext,
            target: "ES2024".to_string(),
            module: "NodeNext".to_string(),
            es_module_interop: true,
            allow_synthetic_default_imports: true,
            resolve_json_module: true,
        }
    }
}

impl CompilerOptions {
    pub fn with_module_resolution(mut self, kind: ModuleResolutionKind) -> Self {
        self.module_resolution = kind;
        self
    }
}

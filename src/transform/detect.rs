//! Detection of imports that target markdown files.

use crate::syntax::{HostAdapter, ImportClause};

/// How an import binds the markdown resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import * as X` or a bound dynamic `import()`
    Namespace,
    /// `import X`
    Default,
    /// `import { a, b as c }`
    Named,
}

/// A markdown import that binds at least one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    /// The primary local binding: the default or namespace name, or the
    /// first named binding.
    pub identifier: String,
    /// Module specifier as written (decoded).
    pub module_path: String,
    pub import_kind: ImportKind,
}

/// A detected import together with its node and bindings.
#[derive(Debug, Clone)]
pub struct MarkdownImport<Id> {
    pub node: Id,
    pub info: ImportInfo,
    pub clause: ImportClause,
}

/// Whether a specifier names a markdown file. The match is case-sensitive.
pub fn is_markdown_specifier(specifier: &str) -> bool {
    specifier.ends_with(".md")
}

/// Find binding imports of `.md` specifiers, in source order.
///
/// Type-only imports, side-effect imports, unbound dynamic imports and
/// imports of other files are skipped.
pub fn find_markdown_imports<A: HostAdapter>(adapter: &A, unit: &A::Unit) -> Vec<MarkdownImport<A::NodeId>> {
    adapter
        .find_import_declarations(unit)
        .into_iter()
        .filter_map(|node| {
            let module_path = adapter.module_specifier_of(unit, node)?;
            if !is_markdown_specifier(module_path) {
                return None;
            }
            let clause = adapter.import_clause_of(unit, node)?;
            let (identifier, import_kind) = primary_binding(&clause)?;

            Some(MarkdownImport {
                node,
                info: ImportInfo {
                    identifier,
                    module_path: module_path.to_string(),
                    import_kind,
                },
                clause,
            })
        })
        .collect()
}

fn primary_binding(clause: &ImportClause) -> Option<(String, ImportKind)> {
    match clause {
        ImportClause::Static { type_only: true, .. } => None,
        ImportClause::Static {
            default: Some(name),
            ..
        } => Some((name.clone(), ImportKind::Default)),
        ImportClause::Static {
            namespace: Some(name),
            ..
        } => Some((name.clone(), ImportKind::Namespace)),
        ImportClause::Static { named, .. } => match named.iter().find(|(imported, _)| imported == "default") {
            Some((_, local)) => Some((local.clone(), ImportKind::Default)),
            None => named
                .first()
                .map(|(_, local)| (local.clone(), ImportKind::Named)),
        },
        ImportClause::Dynamic { binding, .. } => binding
            .as_ref()
            .map(|name| (name.clone(), ImportKind::Namespace)),
    }
}

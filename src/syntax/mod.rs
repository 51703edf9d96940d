//! Script syntax for the import transformer.
//!
//! The transformer only needs a handful of operations from a syntax tree:
//! list import nodes, read their specifier and bindings, and swap a node for
//! generated statements. `HostAdapter` captures those operations so the
//! transformer can run over any syntax tree; `ScriptAdapter` implements it
//! for the lossless tree built by this module's parser.

mod ast;
pub mod lexer;
mod literal;
mod parser;
mod printer;

use std::path::Path;

use crate::error::Result;

pub use ast::{
    Binding, DynamicBinding, DynamicImport, Expr, ImportDeclaration, ImportSpecifier, Node,
    NodeId, Property, SourceUnit, Statement, StringLiteral,
};
pub use literal::{json_literal, resource_literal};
pub use parser::parse_source;
pub use printer::{print_expr, print_statement, print_unit};

/// The bindings an import introduces, independent of the host tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportClause {
    /// `import [type] [X][, * as Y | { ... }] from "..."`
    Static {
        type_only: bool,
        default: Option<String>,
        namespace: Option<String>,
        /// Value (non type-only) named imports as (imported, local).
        named: Vec<(String, String)>,
        /// No bindings at all: `import "..."`.
        side_effect: bool,
    },
    /// `import("...")`, with its binding when declared as
    /// `const X = [await] import("...")`.
    Dynamic {
        binding: Option<String>,
        awaited: bool,
    },
}

/// Operations the transformer needs from a host syntax tree.
pub trait HostAdapter {
    type Unit;
    type NodeId: Copy;

    /// Path of the file the unit was parsed from.
    fn source_path<'u>(&self, unit: &'u Self::Unit) -> &'u Path;

    /// Import nodes in source order, static and dynamic.
    fn find_import_declarations(&self, unit: &Self::Unit) -> Vec<Self::NodeId>;

    /// Decoded module specifier of an import node.
    fn module_specifier_of<'u>(&self, unit: &'u Self::Unit, node: Self::NodeId) -> Option<&'u str>;

    /// Bindings introduced by an import node.
    fn import_clause_of(&self, unit: &Self::Unit, node: Self::NodeId) -> Option<ImportClause>;

    /// Replace an import node with generated statements.
    fn replace_node(&self, unit: &mut Self::Unit, node: Self::NodeId, statements: Vec<Statement>);
}

/// `HostAdapter` over `SourceUnit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptAdapter;

impl ScriptAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Parse a script source into a unit.
    pub fn parse(&self, path: &Path, source: &str) -> Result<SourceUnit> {
        parse_source(path, source)
    }

    /// Print a unit back to source text.
    pub fn print(&self, unit: &SourceUnit) -> String {
        print_unit(unit)
    }
}

impl HostAdapter for ScriptAdapter {
    type Unit = SourceUnit;
    type NodeId = NodeId;

    fn source_path<'u>(&self, unit: &'u SourceUnit) -> &'u Path {
        &unit.path
    }

    fn find_import_declarations(&self, unit: &SourceUnit) -> Vec<NodeId> {
        unit.iter()
            .filter(|(_, node)| matches!(node, Node::Import(_) | Node::DynamicImport(_)))
            .map(|(id, _)| id)
            .collect()
    }

    fn module_specifier_of<'u>(&self, unit: &'u SourceUnit, node: NodeId) -> Option<&'u str> {
        match unit.node(node)? {
            Node::Import(decl) => Some(&decl.source.value),
            Node::DynamicImport(dynamic) => Some(&dynamic.source.value),
            _ => None,
        }
    }

    fn import_clause_of(&self, unit: &SourceUnit, node: NodeId) -> Option<ImportClause> {
        match unit.node(node)? {
            Node::Import(decl) => Some(ImportClause::Static {
                type_only: decl.type_only,
                default: decl.default.clone(),
                namespace: decl.namespace.clone(),
                named: decl
                    .named
                    .iter()
                    .filter(|s| !s.type_only)
                    .map(|s| (s.imported.clone(), s.local.clone()))
                    .collect(),
                side_effect: decl.is_side_effect(),
            }),
            Node::DynamicImport(dynamic) => Some(ImportClause::Dynamic {
                binding: dynamic.binding.as_ref().map(|b| b.name.clone()),
                awaited: dynamic.binding.as_ref().is_some_and(|b| b.awaited),
            }),
            _ => None,
        }
    }

    fn replace_node(&self, unit: &mut SourceUnit, node: NodeId, statements: Vec<Statement>) {
        if let Some(slot) = unit.nodes.get_mut(node.0) {
            *slot = Node::Generated(statements);
        }
    }
}

//! Lossless module syntax tree.
//!
//! A `SourceUnit` is a flat list of nodes that, printed in order, reproduce
//! the original source byte for byte. Import forms are parsed into typed
//! nodes; everything else is kept as verbatim text. Replacement nodes carry
//! generated statements instead of source text.

use std::path::PathBuf;

/// Index of a node within its `SourceUnit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A parsed module.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub nodes: Vec<Node>,
}

/// One piece of a module.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Source text that is not an import.
    Verbatim(String),
    /// `import ... from "..."` or `import "..."`
    Import(ImportDeclaration),
    /// `import("...")`, optionally bound by a variable declaration
    DynamicImport(DynamicImport),
    /// Statements generated to replace an import
    Generated(Vec<Statement>),
}

/// A string literal as written and as decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    pub value: String,
    pub raw: String,
}

/// A static import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    /// Original source text, including the trailing `;` if present.
    pub text: String,
    /// `import type ...`
    pub type_only: bool,
    /// `import X from ...`
    pub default: Option<String>,
    /// `import * as X from ...`
    pub namespace: Option<String>,
    /// `import { a, b as c } from ...`
    pub named: Vec<ImportSpecifier>,
    /// Whether a `{ }` clause was written, even if empty.
    pub has_named_clause: bool,
    pub source: StringLiteral,
}

impl ImportDeclaration {
    /// An import with no bindings, such as `import "./x.md"`.
    pub fn is_side_effect(&self) -> bool {
        self.default.is_none() && self.namespace.is_none() && !self.has_named_clause
    }
}

/// One entry of a named import clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    /// Exported name being imported.
    pub imported: String,
    /// Local binding name.
    pub local: String,
    /// `import { type X } ...`
    pub type_only: bool,
}

/// A dynamic `import()` call with a string literal argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicImport {
    /// Original source text of the node.
    pub text: String,
    /// The variable binding, when written as `const X = [await] import(...)`.
    pub binding: Option<DynamicBinding>,
    pub source: StringLiteral,
}

/// The declaration that binds a dynamic import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicBinding {
    /// `const`, `let` or `var`
    pub keyword: String,
    pub name: String,
    pub awaited: bool,
}

/// A generated statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `const <binding> = <init>;`
    Const { binding: Binding, init: Expr },
}

/// Left-hand side of a generated declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// `X`
    Ident(String),
    /// `{ a, b: c }` as (property, local) pairs
    Object(Vec<(String, String)>),
}

/// A generated expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    /// Numeric literal in source form.
    Number(String),
    String(String),
    Array(Vec<Expr>),
    Object(Vec<Property>),
    Ident(String),
    /// `object.property`
    Member { object: Box<Expr>, property: String },
    /// `callee(args...)`
    Call { callee: Box<Expr>, args: Vec<Expr> },
}

/// An object literal property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: Expr,
}

impl Property {
    pub fn new(key: impl Into<String>, value: Expr) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl Expr {
    /// `Promise.resolve(value)`
    pub fn promise_resolve(value: Expr) -> Self {
        Expr::Call {
            callee: Box::new(Expr::Member {
                object: Box::new(Expr::Ident("Promise".to_string())),
                property: "resolve".to_string(),
            }),
            args: vec![value],
        }
    }
}

impl SourceUnit {
    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Iterate nodes with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }
}

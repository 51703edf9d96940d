//! Module parser producing a lossless `SourceUnit`.

use std::path::Path;

use crate::error::Result;

use super::ast::{
    DynamicBinding, DynamicImport, ImportDeclaration, ImportSpecifier, Node, SourceUnit,
    StringLiteral,
};
use super::lexer::{tokenize_with, Dialect, Token, TokenKind};

/// Parse a module source into a `SourceUnit`.
///
/// Static imports are recognized anywhere the `import` keyword starts a
/// declaration; dynamic `import("...")` calls are recognized at any depth.
/// Anything the parser does not understand is kept as verbatim text.
/// `.jsx`, `.tsx` and `.js` sources are lexed with JSX support.
pub fn parse_source(path: &Path, source: &str) -> Result<SourceUnit> {
    let tokens = tokenize_with(source, Dialect::for_path(path)).map_err(|e| e.with_path(path))?;
    let mut parser = Parser {
        source,
        tokens: &tokens,
        nodes: Vec::new(),
        cursor: 0,
    };
    parser.run();

    Ok(SourceUnit {
        path: path.to_path_buf(),
        nodes: parser.nodes,
    })
}

struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    nodes: Vec<Node>,
    /// Byte offset up to which source text has been emitted.
    cursor: usize,
}

impl<'a> Parser<'a> {
    fn run(&mut self) {
        let mut i = 0;
        while i < self.tokens.len() {
            if !self.is_import_keyword(i) {
                i += 1;
                continue;
            }

            if self.is_punct(i + 1, "(") {
                if let Some((start, end, node)) = self.dynamic_import(i) {
                    self.emit(start, end, Node::DynamicImport(node));
                    i = end;
                    continue;
                }
            } else if let Some((end, decl)) = self.static_import(i) {
                let start = self.tokens[i].start;
                self.emit(start, end, Node::Import(decl));
                i = end;
                continue;
            }

            i += 1;
        }

        if self.cursor < self.source.len() {
            self.nodes
                .push(Node::Verbatim(self.source[self.cursor..].to_string()));
        }
    }

    /// Emit the verbatim gap before `start`, then `node`, which covers the
    /// tokens `[start_token, end_token)`.
    fn emit(&mut self, start_byte: usize, end_token: usize, node: Node) {
        if start_byte > self.cursor {
            self.nodes
                .push(Node::Verbatim(self.source[self.cursor..start_byte].to_string()));
        }
        self.nodes.push(node);
        self.cursor = self.tokens[end_token - 1].end;
    }

    fn token(&self, i: usize) -> Option<&'a Token> {
        self.tokens.get(i)
    }

    fn is_ident(&self, i: usize, name: &str) -> bool {
        self.token(i).is_some_and(|t| t.is_ident(self.source, name))
    }

    fn is_punct(&self, i: usize, punct: &str) -> bool {
        self.token(i).is_some_and(|t| t.is_punct(self.source, punct))
    }

    fn ident_at(&self, i: usize) -> Option<&'a str> {
        self.token(i)
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text(self.source))
    }

    fn string_at(&self, i: usize) -> Option<StringLiteral> {
        match &self.token(i)?.kind {
            TokenKind::Str(value) => Some(StringLiteral {
                value: value.clone(),
                raw: self.tokens[i].text(self.source).to_string(),
            }),
            _ => None,
        }
    }

    fn text_between(&self, first: usize, end: usize) -> String {
        self.source[self.tokens[first].start..self.tokens[end - 1].end].to_string()
    }

    fn on_new_line(&self, i: usize) -> bool {
        match (i.checked_sub(1).and_then(|p| self.token(p)), self.token(i)) {
            (Some(prev), Some(next)) => self.source[prev.end..next.start].contains('\n'),
            _ => false,
        }
    }

    /// `import` used as a keyword rather than a property name.
    fn is_import_keyword(&self, i: usize) -> bool {
        if !self.is_ident(i, "import") || self.tokens[i].start < self.cursor {
            return false;
        }
        let after_dot = i > 0 && (self.is_punct(i - 1, ".") || self.is_punct(i - 1, "?."));
        !after_dot && !self.is_punct(i + 1, ".") && !self.is_punct(i + 1, ":")
    }

    /// Parse a static import starting at token `i`.
    ///
    /// Returns the index one past the last consumed token.
    fn static_import(&self, i: usize) -> Option<(usize, ImportDeclaration)> {
        let mut j = i + 1;
        let mut type_only = false;

        if self.is_ident(j, "type") {
            let next_is_clause = self.is_punct(j + 1, "{")
                || self.is_punct(j + 1, "*")
                || self.ident_at(j + 1).is_some_and(|name| name != "from");
            if next_is_clause {
                type_only = true;
                j += 1;
            }
        }

        let mut default = None;
        let mut namespace = None;
        let mut named = Vec::new();
        let mut has_named_clause = false;

        let source = if let Some(source) = self.string_at(j) {
            j += 1;
            source
        } else {
            if let Some(name) = self.ident_at(j) {
                if !(name == "from" && self.string_at(j + 1).is_some()) {
                    default = Some(name.to_string());
                    j += 1;
                    if self.is_punct(j, ",") {
                        j += 1;
                    } else if !self.is_ident(j, "from") {
                        return None;
                    }
                }
            }

            if self.is_punct(j, "*") {
                if !self.is_ident(j + 1, "as") {
                    return None;
                }
                namespace = Some(self.ident_at(j + 2)?.to_string());
                j += 3;
            } else if self.is_punct(j, "{") {
                has_named_clause = true;
                let (end, specifiers) = self.named_specifiers(j + 1)?;
                named = specifiers;
                j = end;
            } else if default.is_none() {
                return None;
            }

            if !self.is_ident(j, "from") {
                return None;
            }
            let source = self.string_at(j + 1)?;
            j += 2;
            source
        };

        if (self.is_ident(j, "with") || self.is_ident(j, "assert")) && self.is_punct(j + 1, "{") {
            j = self.skip_balanced(j + 1, "{", "}")?;
        }

        if self.is_punct(j, ";") {
            j += 1;
        }

        Some((
            j,
            ImportDeclaration {
                text: self.text_between(i, j),
                type_only,
                default,
                namespace,
                named,
                has_named_clause,
                source,
            },
        ))
    }

    /// Parse `a, b as c, type d }` starting after the `{`.
    fn named_specifiers(&self, mut j: usize) -> Option<(usize, Vec<ImportSpecifier>)> {
        let mut specifiers = Vec::new();

        loop {
            if self.is_punct(j, "}") {
                return Some((j + 1, specifiers));
            }

            let mut type_only = false;
            if self.is_ident(j, "type")
                && (self.string_at(j + 1).is_some()
                    || self.ident_at(j + 1).is_some_and(|name| name != "as"))
            {
                type_only = true;
                j += 1;
            }

            let imported = match self.string_at(j) {
                Some(literal) => literal.value,
                None => self.ident_at(j)?.to_string(),
            };
            j += 1;

            let local = if self.is_ident(j, "as") {
                j += 2;
                self.ident_at(j - 1)?.to_string()
            } else {
                imported.clone()
            };

            specifiers.push(ImportSpecifier {
                imported,
                local,
                type_only,
            });

            if self.is_punct(j, ",") {
                j += 1;
            } else if !self.is_punct(j, "}") {
                return None;
            }
        }
    }

    /// Skip from an opening delimiter at `j` to one past its match.
    fn skip_balanced(&self, mut j: usize, open: &str, close: &str) -> Option<usize> {
        let mut depth = 0usize;
        loop {
            if self.is_punct(j, open) {
                depth += 1;
            } else if self.is_punct(j, close) {
                depth -= 1;
                if depth == 0 {
                    return Some(j + 1);
                }
            }
            self.token(j)?;
            j += 1;
        }
    }

    /// Parse `import("...")` at token `i`, widening the node to the whole
    /// declaration when the call is the entire initializer of a `const`,
    /// `let` or `var` binding.
    fn dynamic_import(&self, i: usize) -> Option<(usize, usize, DynamicImport)> {
        let source = self.string_at(i + 2)?;
        let end = if self.is_punct(i + 3, ")") {
            i + 4
        } else if self.is_punct(i + 3, ",") {
            self.skip_balanced(i + 1, "(", ")")?
        } else {
            return None;
        };

        let (first, binding) = match self.declaration_before(i) {
            Some((first, binding)) if self.ends_statement(end) => (first, Some(binding)),
            _ => (i, None),
        };

        let end = if binding.is_some() && self.is_punct(end, ";") {
            end + 1
        } else {
            end
        };

        if self.tokens[first].start < self.cursor {
            return None;
        }

        Some((
            self.tokens[first].start,
            end,
            DynamicImport {
                text: self.text_between(first, end),
                binding,
                source,
            },
        ))
    }

    /// Match `const|let|var Name = [await]` immediately before token `i`.
    fn declaration_before(&self, i: usize) -> Option<(usize, DynamicBinding)> {
        let awaited = i > 0 && self.is_ident(i - 1, "await");
        let eq = i.checked_sub(if awaited { 2 } else { 1 })?;
        if !self.is_punct(eq, "=") {
            return None;
        }

        let name = self.ident_at(eq.checked_sub(1)?)?;
        let keyword_index = eq.checked_sub(2)?;
        let keyword = self.ident_at(keyword_index)?;
        if !matches!(keyword, "const" | "let" | "var") {
            return None;
        }

        Some((
            keyword_index,
            DynamicBinding {
                keyword: keyword.to_string(),
                name: name.to_string(),
                awaited,
            },
        ))
    }

    /// Whether the expression ending before token `j` ends its statement.
    fn ends_statement(&self, j: usize) -> bool {
        match self.token(j) {
            None => true,
            Some(token) if token.kind == TokenKind::Punct => {
                matches!(token.text(self.source), ";" | "}")
            }
            Some(_) => self.on_new_line(j),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::print_unit;

    fn parse(source: &str) -> SourceUnit {
        parse_source(Path::new("/src/a.ts"), source).unwrap()
    }

    fn imports(unit: &SourceUnit) -> Vec<&ImportDeclaration> {
        unit.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Import(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    fn dynamics(unit: &SourceUnit) -> Vec<&DynamicImport> {
        unit.nodes
            .iter()
            .filter_map(|n| match n {
                Node::DynamicImport(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_print_is_lossless() {
        let source = "// header\nimport * as A from './a.md';\nimport B, { c as d } from \"./b.md\"\n\nconst x = await import('./c.md');\nexport {};\n";

        let unit = parse(source);

        assert_eq!(print_unit(&unit), source);
    }

    #[test]
    fn test_namespace_import() {
        let unit = parse("import * as Core from './core.md';");
        let decl = imports(&unit)[0];

        assert_eq!(decl.namespace.as_deref(), Some("Core"));
        assert_eq!(decl.source.value, "./core.md");
        assert_eq!(decl.text, "import * as Core from './core.md';");
    }

    #[test]
    fn test_default_and_named_import() {
        let unit = parse("import X, { a, b as c, type T } from './x.md'");
        let decl = imports(&unit)[0];

        assert_eq!(decl.default.as_deref(), Some("X"));
        assert_eq!(decl.named.len(), 3);
        assert_eq!(decl.named[1].imported, "b");
        assert_eq!(decl.named[1].local, "c");
        assert!(decl.named[2].type_only);
    }

    #[test]
    fn test_default_and_namespace_import() {
        let unit = parse("import X, * as NS from './x.md';");
        let decl = imports(&unit)[0];

        assert_eq!(decl.default.as_deref(), Some("X"));
        assert_eq!(decl.namespace.as_deref(), Some("NS"));
    }

    #[test]
    fn test_side_effect_import() {
        let unit = parse("import './styles.md';\nimport {} from './empty.md';");
        let decls = imports(&unit);

        assert!(decls[0].is_side_effect());
        assert!(!decls[1].is_side_effect());
        assert!(decls[1].named.is_empty());
    }

    #[test]
    fn test_type_only_import() {
        let unit = parse("import type { Fragment } from './x.md';\nimport type from './y.md';");
        let decls = imports(&unit);

        assert!(decls[0].type_only);
        assert!(!decls[1].type_only);
        assert_eq!(decls[1].default.as_deref(), Some("type"));
    }

    #[test]
    fn test_import_attributes() {
        let unit = parse("import data from './x.md' with { type: 'text' };\nnext();");
        let decl = imports(&unit)[0];

        assert_eq!(decl.text, "import data from './x.md' with { type: 'text' };");
    }

    #[test]
    fn test_import_meta_and_member_are_not_imports() {
        let unit = parse("const u = import.meta.url; obj.import('./x.md'); ({ import: 1 });");

        assert!(imports(&unit).is_empty());
        assert!(dynamics(&unit).is_empty());
    }

    #[test]
    fn test_import_equals_is_verbatim() {
        let unit = parse("import fs = require('fs');");

        assert!(imports(&unit).is_empty());
    }

    #[test]
    fn test_bound_dynamic_import() {
        let unit = parse("async function f() {\n  const Core = await import('./core.md');\n  return Core;\n}");
        let dynamic = dynamics(&unit)[0];

        let binding = dynamic.binding.as_ref().unwrap();
        assert_eq!(binding.name, "Core");
        assert!(binding.awaited);
        assert_eq!(dynamic.text, "const Core = await import('./core.md');");
    }

    #[test]
    fn test_unawaited_dynamic_import() {
        let unit = parse("let p = import('./core.md')\nnext()");
        let dynamic = dynamics(&unit)[0];

        let binding = dynamic.binding.as_ref().unwrap();
        assert_eq!(binding.keyword, "let");
        assert!(!binding.awaited);
        assert_eq!(dynamic.text, "let p = import('./core.md')");
    }

    #[test]
    fn test_chained_dynamic_import_is_unbound() {
        let unit = parse("const t = await import('./core.md').then(m => m.text);");
        let dynamic = dynamics(&unit)[0];

        assert!(dynamic.binding.is_none());
        assert_eq!(dynamic.text, "import('./core.md')");
    }

    #[test]
    fn test_dynamic_import_with_options() {
        let unit = parse("const m = await import('./x.md', { with: { type: 'text' } });");
        let dynamic = dynamics(&unit)[0];

        assert!(dynamic.binding.is_some());
        assert_eq!(dynamic.source.value, "./x.md");
    }

    #[test]
    fn test_import_text_inside_strings_ignored() {
        let unit = parse("const s = \"import * as X from './x.md'\";\nconst t = `import('./y.md')`;");

        assert!(imports(&unit).is_empty());
        assert!(dynamics(&unit).is_empty());
        assert_eq!(unit.nodes.len(), 1);
    }

    #[test]
    fn test_syntax_error_reports_path() {
        let err = parse_source(Path::new("/src/bad.ts"), "const s = 'unterminated\n").unwrap_err();

        assert!(err.to_string().contains("/src/bad.ts"));
    }
}

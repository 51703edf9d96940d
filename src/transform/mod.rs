//! Compile-time rewriting of markdown imports.
//!
//! Each binding import of a `.md` file is replaced by constant declarations
//! holding the parsed resource inline:
//!
//! ```text
//! import * as Core from './core.md';
//! // becomes
//! const Core = { meta: { ... }, text: "...", fragments: { ... } };
//! ```
//!
//! Imports that cannot be resolved are left in place and reported as
//! diagnostics. The output contains no markdown imports, so transforming it
//! again is a no-op.

mod detect;

use std::path::Path;

use crate::cache::ResourceCache;
use crate::error::{MdrcError, Result};
use crate::resolve::PathResolver;
use crate::syntax::{
    resource_literal, Binding, Expr, HostAdapter, ImportClause, ScriptAdapter, SourceUnit,
    Statement,
};
use crate::validation::Diagnostic;

pub use detect::{find_markdown_imports, is_markdown_specifier, ImportInfo, ImportKind, MarkdownImport};

/// Diagnostic code for imports that resolve to no file.
pub const UNRESOLVED_IMPORT: &str = "mdrc::transform::unresolved-import";

/// Diagnostic code for sources that could not be lexed but hold no
/// markdown specifier.
pub const UNPARSED_SOURCE: &str = "mdrc::transform::unparsed-source";

/// Result of transforming one unit.
#[derive(Debug)]
pub struct TransformOutcome<U> {
    pub unit: U,
    /// Number of imports replaced.
    pub replaced: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl<U> TransformOutcome<U> {
    /// Whether the unit was changed.
    pub fn changed(&self) -> bool {
        self.replaced > 0
    }
}

/// Rewrites markdown imports in units of a host syntax tree.
///
/// The resolver and cache are borrowed so one instance of each can be
/// shared across every file (and thread) of a build.
pub struct Transformer<'a, A: HostAdapter> {
    adapter: &'a A,
    resolver: &'a PathResolver,
    cache: &'a ResourceCache,
}

impl<'a, A: HostAdapter> Transformer<'a, A> {
    pub fn new(adapter: &'a A, resolver: &'a PathResolver, cache: &'a ResourceCache) -> Self {
        Self {
            adapter,
            resolver,
            cache,
        }
    }

    /// Transform a unit.
    ///
    /// Fails only when a resolved markdown file cannot be read or parsed.
    pub fn transform(&self, mut unit: A::Unit) -> Result<TransformOutcome<A::Unit>> {
        let imports = find_markdown_imports(self.adapter, &unit);
        let containing_file = self.adapter.source_path(&unit).to_path_buf();
        let mut replaced = 0;
        let mut diagnostics = Vec::new();

        for import in imports {
            let specifier = &import.info.module_path;
            let Some(resolved) = self.resolver.resolve(specifier, &containing_file) else {
                tracing::warn!(
                    specifier = %specifier,
                    file = %containing_file.display(),
                    "unresolved markdown import left in place"
                );
                diagnostics.push(
                    Diagnostic::warning(
                        UNRESOLVED_IMPORT,
                        format!("Cannot resolve markdown import '{}'", specifier),
                    )
                    .with_path(&containing_file)
                    .with_help(
                        "Check that the file exists relative to the importing file or under node_modules",
                    ),
                );
                continue;
            };

            let resource = self.cache.load(&resolved)?;
            let statements = replacement(&import.clause, resource_literal(&resource));
            if statements.is_empty() {
                continue;
            }

            self.adapter.replace_node(&mut unit, import.node, statements);
            replaced += 1;
        }

        if replaced > 0 {
            tracing::debug!(file = %containing_file.display(), replaced, "transformed markdown imports");
        }

        Ok(TransformOutcome {
            unit,
            replaced,
            diagnostics,
        })
    }
}

/// Declarations that bind an import's names to `literal`.
///
/// The default export of a compiled resource is the resource itself, so
/// `{ default as X }` binds `X` to the whole literal.
fn replacement(clause: &ImportClause, literal: Expr) -> Vec<Statement> {
    match clause {
        ImportClause::Static {
            default,
            namespace,
            named,
            ..
        } => {
            let (default_aliases, properties): (Vec<_>, Vec<_>) = named
                .iter()
                .cloned()
                .partition(|(imported, _)| imported == "default");
            let mut aliases: Vec<String> = default.iter().cloned().collect();
            aliases.extend(default_aliases.into_iter().map(|(_, local)| local));
            aliases.extend(namespace.iter().cloned());

            let destructure = |init: Expr| Statement::Const {
                binding: Binding::Object(properties.clone()),
                init,
            };

            match aliases.split_first() {
                Some((primary, rest)) => {
                    let mut statements = vec![constant(primary, literal)];
                    for alias in rest {
                        statements.push(constant(alias, Expr::Ident(primary.clone())));
                    }
                    if !properties.is_empty() {
                        statements.push(destructure(Expr::Ident(primary.clone())));
                    }
                    statements
                }
                None if !properties.is_empty() => vec![destructure(literal)],
                None => Vec::new(),
            }
        }
        ImportClause::Dynamic {
            binding: Some(name),
            awaited,
        } => {
            let init = if *awaited {
                literal
            } else {
                Expr::promise_resolve(literal)
            };
            vec![constant(name, init)]
        }
        ImportClause::Dynamic { binding: None, .. } => Vec::new(),
    }
}

fn constant(name: &str, init: Expr) -> Statement {
    Statement::Const {
        binding: Binding::Ident(name.to_string()),
        init,
    }
}

/// Parse, transform and print a script source.
///
/// A source that fails to lex is returned unchanged, with a warning, as
/// long as its text mentions no `.md` specifier; otherwise the syntax error
/// is returned.
pub fn transform_source(
    path: &Path,
    source: &str,
    resolver: &PathResolver,
    cache: &ResourceCache,
) -> Result<TransformOutcome<String>> {
    let adapter = ScriptAdapter::new();
    let unit = match adapter.parse(path, source) {
        Ok(unit) => unit,
        Err(MdrcError::Syntax { message, .. }) if !mentions_markdown(source) => {
            tracing::warn!(file = %path.display(), "{}; left unchanged", message);
            return Ok(TransformOutcome {
                unit: source.to_string(),
                replaced: 0,
                diagnostics: vec![Diagnostic::warning(
                    UNPARSED_SOURCE,
                    format!("Could not parse script ({}); left unchanged", message),
                )
                .with_path(path)],
            });
        }
        Err(err) => return Err(err),
    };
    let outcome = Transformer::new(&adapter, resolver, cache).transform(unit)?;

    let printed = if outcome.changed() {
        adapter.print(&outcome.unit)
    } else {
        source.to_string()
    };

    Ok(TransformOutcome {
        unit: printed,
        replaced: outcome.replaced,
        diagnostics: outcome.diagnostics,
    })
}

/// Whether any string in `source` could end in `.md`.
fn mentions_markdown(source: &str) -> bool {
    [".md'", ".md\"", ".md`"].iter().any(|end| source.contains(end))
}

/// Transform an already parsed unit with the script adapter.
pub fn transform_unit(
    unit: SourceUnit,
    resolver: &PathResolver,
    cache: &ResourceCache,
) -> Result<TransformOutcome<SourceUnit>> {
    Transformer::new(&ScriptAdapter, resolver, cache).transform(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseOptions;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    struct Project {
        dir: TempDir,
        resolver: PathResolver,
        cache: ResourceCache,
    }

    impl Project {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let resolver = PathResolver::with_cwd(Default::default(), dir.path());
            Self {
                dir,
                resolver,
                cache: ResourceCache::new(),
            }
        }

        fn write(&self, relative: &str, contents: &str) {
            let path = self.dir.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        fn transform(&self, relative: &str, source: &str) -> Result<TransformOutcome<String>> {
            transform_source(
                &self.dir.path().join(relative),
                source,
                &self.resolver,
                &self.cache,
            )
        }
    }

    const CORE: &str = "---\ntitle: Core\n---\n## Rules\nBe brief.\n";
    const CORE_LITERAL: &str = r###"{ meta: { title: "Core" }, text: "## Rules\nBe brief.\n", fragments: { rules: { header: "## Rules", body: "Be brief.", text: "## Rules\n\nBe brief." } } }"###;

    #[test]
    fn test_namespace_import_replaced() {
        let project = Project::new();
        project.write("src/core.md", CORE);

        let outcome = project
            .transform("src/a.ts", "import * as Core from './core.md';\nconsole.log(Core.text);\n")
            .unwrap();

        assert_eq!(outcome.replaced, 1);
        assert_eq!(
            outcome.unit,
            format!("const Core = {};\nconsole.log(Core.text);\n", CORE_LITERAL)
        );
    }

    #[test]
    fn test_default_with_named_and_namespace() {
        let project = Project::new();
        project.write("src/core.md", CORE);

        let named = project
            .transform("src/a.ts", "import Core, { meta, fragments as f } from './core.md'")
            .unwrap();
        let aliased = project
            .transform("src/b.ts", "import Core, * as All from './core.md';")
            .unwrap();

        assert_eq!(
            named.unit,
            format!("const Core = {}; const {{ meta, fragments: f }} = Core;", CORE_LITERAL)
        );
        assert_eq!(
            aliased.unit,
            format!("const Core = {}; const All = Core;", CORE_LITERAL)
        );
    }

    #[test]
    fn test_named_default_binds_whole_resource() {
        let project = Project::new();
        project.write("src/core.md", CORE);

        let outcome = project
            .transform("src/a.ts", "import { default as Core, text } from './core.md';")
            .unwrap();

        assert_eq!(
            outcome.unit,
            format!("const Core = {}; const {{ text }} = Core;", CORE_LITERAL)
        );
    }

    #[test]
    fn test_named_only_import() {
        let project = Project::new();
        project.write("src/core.md", CORE);

        let outcome = project
            .transform("src/a.ts", "import { text } from './core.md';")
            .unwrap();

        assert_eq!(outcome.unit, format!("const {{ text }} = {};", CORE_LITERAL));
    }

    #[test]
    fn test_dynamic_imports_in_nested_scopes() {
        let project = Project::new();
        project.write("src/core.md", CORE);
        let source = "export async function load() {\n  if (ready) {\n    const Core = await import('./core.md');\n    let Later = import('./core.md');\n  }\n}\n";

        let outcome = project.transform("src/a.ts", source).unwrap();

        assert_eq!(outcome.replaced, 2);
        assert_eq!(
            outcome.unit,
            format!(
                "export async function load() {{\n  if (ready) {{\n    const Core = {lit};\n    const Later = Promise.resolve({lit});\n  }}\n}}\n",
                lit = CORE_LITERAL
            )
        );
    }

    #[test]
    fn test_file_without_markdown_imports_is_unchanged() {
        let project = Project::new();
        let source = "import fs from 'node:fs';\n// import x from './x.md'\nconst s = `${a}`;\n";

        let outcome = project.transform("src/a.ts", source).unwrap();

        assert!(!outcome.changed());
        assert_eq!(outcome.unit, source);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_jsx_component_without_imports_is_unchanged() {
        let project = Project::new();
        let source = "export const App = () => <div>Hello</div>;\n";

        let outcome = project.transform("src/App.tsx", source).unwrap();

        assert!(!outcome.changed());
        assert_eq!(outcome.unit, source);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_jsx_component_with_markdown_import() {
        let project = Project::new();
        project.write("src/core.md", CORE);
        let source = "import * as Core from './core.md';\nexport const Tip = () => <p title='x'>Don't panic {Core.meta.title}</p>;\n";

        let outcome = project.transform("src/Tip.jsx", source).unwrap();

        assert_eq!(outcome.replaced, 1);
        assert_eq!(
            outcome.unit,
            format!(
                "const Core = {};\nexport const Tip = () => <p title='x'>Don't panic {{Core.meta.title}}</p>;\n",
                CORE_LITERAL
            )
        );
    }

    #[test]
    fn test_unlexable_source_without_markdown_left_unchanged() {
        let project = Project::new();
        let source = "const s = 'never closed\n";

        let outcome = project.transform("src/a.ts", source).unwrap();

        assert!(!outcome.changed());
        assert_eq!(outcome.unit, source);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].code, UNPARSED_SOURCE);
    }

    #[test]
    fn test_unlexable_source_with_markdown_is_an_error() {
        let project = Project::new();
        project.write("src/core.md", CORE);

        let result = project.transform("src/a.ts", "import Core from './core.md';\nconst s = 'oops\n");

        assert!(matches!(result, Err(MdrcError::Syntax { .. })));
    }

    #[test]
    fn test_regex_after_control_head() {
        let project = Project::new();
        project.write("src/core.md", CORE);
        let source = "if (ok) /'/.test(s);\nimport Core from './core.md';\n";

        let outcome = project.transform("src/a.ts", source).unwrap();

        assert_eq!(outcome.replaced, 1);
        assert_eq!(
            outcome.unit,
            format!("if (ok) /'/.test(s);\nconst Core = {};\n", CORE_LITERAL)
        );
    }

    #[test]
    fn test_transform_is_idempotent() {
        let project = Project::new();
        project.write("src/core.md", CORE);

        let once = project
            .transform("src/a.ts", "import * as Core from './core.md';\n")
            .unwrap();
        let twice = project.transform("src/a.ts", &once.unit).unwrap();

        assert_eq!(twice.unit, once.unit);
        assert_eq!(twice.replaced, 0);
    }

    #[test]
    fn test_unresolved_import_is_left_with_diagnostic() {
        let project = Project::new();
        let source = "import * as Missing from './missing.md';\n";

        let outcome = project.transform("src/a.ts", source).unwrap();

        assert_eq!(outcome.unit, source);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].code, UNRESOLVED_IMPORT);
    }

    #[test]
    fn test_side_effect_import_untouched_and_not_parsed() {
        let project = Project::new();
        project.write("src/broken.md", "---\ntitle: [\n---\n");
        let source = "import './broken.md';\n";

        let outcome = project.transform("src/a.ts", source).unwrap();

        assert_eq!(outcome.unit, source);
        assert!(project.cache.is_empty());
    }

    #[test]
    fn test_invalid_frontmatter_aborts_file() {
        let project = Project::new();
        project.write("src/broken.md", "---\ntitle: [\n---\n");

        let err = project
            .transform("src/a.ts", "import B from './broken.md';")
            .unwrap_err();

        assert!(matches!(err, MdrcError::FrontmatterParse { path: Some(_), .. }));
    }

    #[test]
    fn test_package_import_via_walk_up() {
        let project = Project::new();
        project.write("node_modules/@pkg/prompts/shared.md", "## Shared\nhi");

        let outcome = project
            .transform(
                "src/a.ts",
                "import * as Shared from '@pkg/prompts/shared.md';",
            )
            .unwrap();

        assert_eq!(outcome.replaced, 1);
        assert!(outcome.unit.starts_with("const Shared = { meta: {}, text: \"## Shared\\nhi\""));
    }

    #[test]
    fn test_shared_cache_parses_once() {
        let project = Project::new();
        project.write("src/core.md", CORE);

        project.transform("src/a.ts", "import A from './core.md';").unwrap();
        project.transform("src/b.ts", "import B from './core.md';").unwrap();

        assert_eq!(project.cache.len(), 1);
    }

    #[test]
    fn test_strict_cache_rejects_duplicate_headings() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dup.md"), "## Intro\na\n## Intro\nb\n").unwrap();
        let resolver = PathResolver::default();
        let cache = ResourceCache::with_options(ParseOptions::strict());

        let result = transform_source(
            &dir.path().join("a.ts"),
            "import D from './dup.md';",
            &resolver,
            &cache,
        );

        assert!(matches!(result, Err(MdrcError::DuplicateFragment { .. })));
    }
}

//! End-to-end tests: markdown in, generated modules and rewritten scripts out.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

use mdrc::codegen::{declaration_path, module_path};
use mdrc::{
    compile_file, parse_resource, transform_source, write_artifacts, ParseOptions, PathResolver,
    ResourceCache, Severity,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn write(dir: &TempDir, relative: &str, content: &str) -> PathBuf {
    let path = dir.path().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn compiles_fixture_into_typed_artifacts() {
    let artifacts = compile_file(&fixture("agent.md"), &ParseOptions::default()).unwrap();

    assert!(artifacts.declaration.contains("readonly title: string;"));
    assert!(artifacts.declaration.contains("readonly tags: readonly string[];"));
    assert!(artifacts.declaration.contains("readonly intro: Fragment;"));
    assert!(artifacts.declaration.contains("readonly usage: Fragment;"));
    assert!(artifacts
        .declaration
        .contains("export type FragmentName = keyof typeof fragments;"));

    assert!(artifacts.module.contains(r###"header: "## Intro","###));
    assert!(artifacts.module.contains(r#"body: "You are a helpful assistant.","#));
    assert!(artifacts.module.contains("export default { meta, text, fragments };"));
}

#[test]
fn fixture_declaration_snapshot() {
    let artifacts = compile_file(&fixture("agent.md"), &ParseOptions::default()).unwrap();

    insta::assert_snapshot!("agent_declaration", artifacts.declaration);
}

#[test]
fn empty_resource_has_no_fragments() {
    let dir = tempdir().unwrap();
    let markdown = write(&dir, "empty.md", "");

    let artifacts = compile_file(&markdown, &ParseOptions::default()).unwrap();
    let (module, declaration) = write_artifacts(&markdown, &artifacts).unwrap();

    assert_eq!(module, module_path(&markdown));
    assert_eq!(declaration, declaration_path(&markdown));

    let module_source = fs::read_to_string(module).unwrap();
    let declaration_source = fs::read_to_string(declaration).unwrap();
    assert!(module_source.contains("export const meta = {};"));
    assert!(module_source.contains("export const fragments = {};"));
    assert!(declaration_source.contains("export type FragmentName = never;"));
}

#[test]
fn transforms_fixture_script_inline() {
    let path = fixture("main.ts");
    let source = fs::read_to_string(&path).unwrap();
    let resolver = PathResolver::default();
    let cache = ResourceCache::new();

    let outcome = transform_source(&path, &source, &resolver, &cache).unwrap();

    assert_eq!(outcome.replaced, 2);
    assert!(outcome.diagnostics.is_empty());
    assert!(!outcome.unit.contains("agent.md"));
    assert!(outcome.unit.contains(r#"const Agent = { meta: { title: "Agent", tags: ["assistant", "concise"] }"#));
    assert!(outcome.unit.contains("const { fragments } = {"));
    assert!(outcome
        .unit
        .contains("export function systemPrompt(): string {\n  return Agent.fragments.intro.text"));
    // Both imports share one parse.
    assert_eq!(cache.len(), 1);
}

#[test]
fn package_imports_walk_up_to_node_modules() {
    let dir = tempdir().unwrap();
    write(
        &dir,
        "node_modules/@acme/prompts/package.json",
        r#"{ "name": "@acme/prompts" }"#,
    );
    write(
        &dir,
        "node_modules/@acme/prompts/rules.md",
        "## Tone\nStay calm.\n",
    );
    let script = write(
        &dir,
        "packages/app/src/deep/main.ts",
        "import Rules from '@acme/prompts/rules.md';\nexport default Rules;\n",
    );
    let resolver = PathResolver::with_cwd(Default::default(), dir.path());
    let cache = ResourceCache::new();

    let source = fs::read_to_string(&script).unwrap();
    let outcome = transform_source(&script, &source, &resolver, &cache).unwrap();

    assert_eq!(outcome.replaced, 1);
    assert!(outcome.unit.starts_with("const Rules = { meta: {}, text: \"## Tone\\nStay calm.\\n\""));
    assert!(outcome.unit.ends_with("\nexport default Rules;\n"));
}

#[test]
fn unresolved_import_is_left_in_place() {
    let dir = tempdir().unwrap();
    let source = "import Missing from './missing.md';\n";
    let script = write(&dir, "main.ts", source);
    let resolver = PathResolver::with_cwd(Default::default(), dir.path());

    let outcome = transform_source(&script, source, &resolver, &ResourceCache::new()).unwrap();

    assert_eq!(outcome.replaced, 0);
    assert_eq!(outcome.unit, source);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].severity, Severity::Warning);
}

#[test]
fn duplicate_headings_keep_single_entry() {
    let resource = parse_resource("## Intro\nfirst\n\n## Intro\nsecond\n").unwrap();

    let keyed = resource.keyed_fragments();
    assert_eq!(resource.fragments.len(), 2);
    assert_eq!(keyed.len(), 1);
    assert_eq!(keyed[0].0, "intro");
    assert_eq!(keyed[0].1.body, "second");

    let artifacts = mdrc::Artifacts::generate(&resource);
    assert_eq!(artifacts.module.matches("  intro: {").count(), 1);
    assert_eq!(artifacts.declaration.matches("readonly intro: Fragment;").count(), 1);
}

#[test]
fn strict_parsing_rejects_duplicate_headings() {
    let dir = tempdir().unwrap();
    let markdown = write(&dir, "dup.md", "## Intro\na\n## Intro\nb\n");

    assert!(compile_file(&markdown, &ParseOptions::strict()).is_err());
}

#[test]
fn empty_section_text_keeps_blank_line() {
    let resource = parse_resource("## First\n## Second\nx").unwrap();

    assert_eq!(resource.fragments[0].text, "## First\n\n");

    let artifacts = mdrc::Artifacts::generate(&resource);
    assert!(artifacts.module.contains("    text: \"## First\\n\\n\",\n"));
}

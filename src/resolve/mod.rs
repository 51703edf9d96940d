//! Module specifier resolution for markdown imports.
//!
//! Specifiers are resolved in this order:
//!
//! 1. `./` and `../` relative to the importing file
//! 2. absolute paths as written
//! 3. bare specifiers through the host's package lookup, honoring
//!    package.json `exports` under `Node16`, `NodeNext` and `Bundler`
//! 4. bare specifiers as plain files under ancestor `node_modules`
//!
//! Every returned path is absolute, lexically normalized and names an
//! existing file. Failure to resolve is not an error.

mod options;
mod package;

use std::fmt;
use std::path::{Component, Path, PathBuf};

pub use options::{CompilerOptions, ModuleResolutionKind};
pub use package::{parse_package_specifier, resolve_exports, PackageJson};

/// How a specifier was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mechanism {
    Relative,
    Absolute,
    /// Host package lookup (package.json `exports` or direct subpath).
    Host,
    /// Plain `node_modules/<specifier>` walk-up.
    NodeModules,
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mechanism::Relative => "relative",
            Mechanism::Absolute => "absolute",
            Mechanism::Host => "host",
            Mechanism::NodeModules => "node_modules walk-up",
        };
        f.write_str(name)
    }
}

/// Resolves module specifiers to markdown files.
#[derive(Debug, Clone)]
pub struct PathResolver {
    options: CompilerOptions,
    cwd: PathBuf,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

impl PathResolver {
    /// Create a resolver anchoring relative paths at the current directory.
    pub fn new(options: CompilerOptions) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::with_cwd(options, cwd)
    }

    /// Create a resolver anchoring relative paths at `cwd`.
    pub fn with_cwd(options: CompilerOptions, cwd: impl Into<PathBuf>) -> Self {
        Self {
            options,
            cwd: normalize(&cwd.into()),
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Resolve `module_path` imported from `containing_file`.
    pub fn resolve(&self, module_path: &str, containing_file: &Path) -> Option<PathBuf> {
        self.resolve_with_mechanism(module_path, containing_file)
            .map(|(path, _)| path)
    }

    /// Resolve and report which step succeeded.
    pub fn resolve_with_mechanism(
        &self,
        module_path: &str,
        containing_file: &Path,
    ) -> Option<(PathBuf, Mechanism)> {
        let containing_file = self.absolute(containing_file);
        let from_dir = containing_file.parent().unwrap_or(&self.cwd).to_path_buf();

        let resolved = if is_relative_specifier(module_path) {
            existing_file(normalize(&from_dir.join(module_path))).map(|p| (p, Mechanism::Relative))
        } else if Path::new(module_path).is_absolute() {
            existing_file(normalize(Path::new(module_path))).map(|p| (p, Mechanism::Absolute))
        } else {
            self.resolve_package(module_path, &from_dir)
                .map(|p| (p, Mechanism::Host))
                .or_else(|| walk_node_modules(module_path, &from_dir).map(|p| (p, Mechanism::NodeModules)))
        };

        match &resolved {
            Some((path, mechanism)) => tracing::debug!(
                specifier = module_path,
                from = %containing_file.display(),
                path = %path.display(),
                mechanism = %mechanism,
                "resolved import"
            ),
            None => tracing::debug!(
                specifier = module_path,
                from = %containing_file.display(),
                "import not resolved"
            ),
        }

        resolved
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.cwd.join(path))
        }
    }

    /// Host-style package lookup.
    fn resolve_package(&self, specifier: &str, from_dir: &Path) -> Option<PathBuf> {
        let kind = self.options.module_resolution;
        if kind == ModuleResolutionKind::Classic {
            return None;
        }

        let (name, subpath) = parse_package_specifier(specifier);
        if name.is_empty() {
            return None;
        }

        for dir in from_dir.ancestors() {
            let package_dir = dir.join("node_modules").join(name);
            if !package_dir.is_dir() {
                continue;
            }

            let package = PackageJson::read(&package_dir);
            match (&package.exports, kind.uses_exports()) {
                (Some(exports), true) => {
                    let key = match subpath {
                        Some(sub) => format!("./{}", sub),
                        None => ".".to_string(),
                    };
                    // The nearest package with an `exports` map decides.
                    let target = resolve_exports(exports, &key, kind.conditions())?;
                    return within_package(&package_dir, &target).and_then(existing_file);
                }
                _ => {
                    let candidate = match (subpath, &package.main) {
                        (Some(sub), _) => within_package(&package_dir, sub),
                        (None, Some(main)) => within_package(&package_dir, main),
                        (None, None) => None,
                    };
                    if let Some(found) = candidate.and_then(existing_file) {
                        return Some(found);
                    }
                }
            }
        }

        None
    }
}

/// `<dir>/node_modules/<specifier>` for each ancestor of `from_dir`.
///
/// Specifiers that climb out of `node_modules` are rejected.
fn walk_node_modules(specifier: &str, from_dir: &Path) -> Option<PathBuf> {
    from_dir.ancestors().find_map(|dir| {
        let node_modules = normalize(&dir.join("node_modules"));
        let candidate = normalize(&node_modules.join(specifier));
        if candidate.starts_with(&node_modules) {
            existing_file(candidate)
        } else {
            None
        }
    })
}

/// Join a package-relative target, rejecting targets that leave the package.
fn within_package(package_dir: &Path, target: &str) -> Option<PathBuf> {
    let joined = normalize(&package_dir.join(target));
    joined.starts_with(package_dir).then_some(joined)
}

fn existing_file(path: PathBuf) -> Option<PathBuf> {
    path.is_file().then_some(path)
}

fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
}

/// Lexically normalize a path: drop `.`, fold `..` into its parent.
///
/// Symlinks are not resolved.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

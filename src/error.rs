use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for mdrc operations
#[derive(Error, Diagnostic, Debug)]
pub enum MdrcError {
    #[error("IO error: {0}")]
    #[diagnostic(code(mdrc::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(mdrc::io))]
    Io { path: PathBuf, message: String },

    /// The frontmatter block exists but is not a valid YAML mapping.
    #[error("{}", frontmatter_message(.path, .message))]
    #[diagnostic(
        code(mdrc::parse::frontmatter),
        help("Frontmatter must be a YAML mapping between two `---` lines")
    )]
    FrontmatterParse {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Duplicate fragment key `{key}` (from headings {first:?} and {second:?})")]
    #[diagnostic(
        code(mdrc::parse::duplicate_fragment),
        help("Rename one of the headings so their camelCase keys differ")
    )]
    DuplicateFragment {
        key: String,
        first: String,
        second: String,
    },

    #[error("Syntax error in {path}: {message}")]
    #[diagnostic(code(mdrc::syntax))]
    Syntax { path: PathBuf, message: String },

    #[error("Manifest error: {message}")]
    #[diagnostic(code(mdrc::manifest))]
    Manifest {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Build error: {message}")]
    #[diagnostic(code(mdrc::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },
}

fn frontmatter_message(path: &Option<PathBuf>, message: &str) -> String {
    match path {
        Some(path) => format!("Invalid frontmatter in {}: {}", path.display(), message),
        None => format!("Invalid frontmatter: {}", message),
    }
}

impl MdrcError {
    /// Attach a source path to errors that were raised without one.
    pub fn with_path(self, source_path: impl Into<PathBuf>) -> Self {
        match self {
            MdrcError::FrontmatterParse { path: None, message } => MdrcError::FrontmatterParse {
                path: Some(source_path.into()),
                message,
            },
            MdrcError::Syntax { path, message } if path.as_os_str().is_empty() => {
                MdrcError::Syntax {
                    path: source_path.into(),
                    message,
                }
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, MdrcError>;

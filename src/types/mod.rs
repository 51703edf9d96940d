//! Core domain types for mdrc.
//!
//! - `Resource` - a parsed markdown document (frontmatter, content, fragments)
//! - `Fragment` - one H2-delimited section of a document

mod resource;

pub use resource::{Fragment, Resource};

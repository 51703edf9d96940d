//! Markdown resource parsing.
//!
//! A resource file is markdown with optional YAML frontmatter. Only two
//! structures matter:
//!
//! - YAML frontmatter between `---` lines at the very top of the file
//! - Second-level headings (`## `), which split the content into fragments
//!
//! # Usage
//!
//! ```ignore
//! use mdrc::parser::parse_resource;
//!
//! let source = std::fs::read_to_string("prompts/core.md")?;
//! let resource = parse_resource(&source)?;
//!
//! for fragment in &resource.fragments {
//!     println!("{} -> {}", fragment.heading, fragment.camel_case);
//! }
//! ```

mod document;
mod fragment;
mod frontmatter;
pub mod slug;

pub use document::{parse_resource, parse_resource_with, DuplicatePolicy, ParseOptions};
pub use fragment::split_fragments;
pub use frontmatter::{extract_frontmatter, yaml_to_json, FrontmatterResult};
pub use slug::{camel_case, slugify};

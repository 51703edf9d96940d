//! Whole-document parsing.
//!
//! A document is an optional frontmatter block followed by markdown
//! content; the content is split into H2 fragments.

use serde::{Deserialize, Serialize};

use crate::error::{MdrcError, Result};
use crate::types::Resource;

use super::fragment::split_fragments;
use super::frontmatter::extract_frontmatter;

/// What to do when two headings produce the same fragment key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep every fragment; keyed views see the last one. Logs a warning.
    #[default]
    LastWins,
    /// Fail the parse.
    Reject,
}

/// Options controlling how markdown resources are parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub duplicate_headings: DuplicatePolicy,
}

impl ParseOptions {
    /// Options that reject duplicate fragment keys.
    pub fn strict() -> Self {
        Self {
            duplicate_headings: DuplicatePolicy::Reject,
        }
    }
}

/// Parse a markdown document with default options.
pub fn parse_resource(source: &str) -> Result<Resource> {
    parse_resource_with(source, &ParseOptions::default())
}

/// Parse a markdown document into a `Resource`.
///
/// Fails only when the frontmatter block is not valid YAML (or not a
/// mapping), or when duplicate keys are rejected by `options`.
pub fn parse_resource_with(source: &str, options: &ParseOptions) -> Result<Resource> {
    let frontmatter = extract_frontmatter(source)?;
    let content = &source[frontmatter.content_start..];

    let resource = Resource {
        frontmatter: frontmatter.values,
        content: content.to_string(),
        fragments: split_fragments(content),
    };

    for (first, second) in resource.colliding_fragments() {
        match options.duplicate_headings {
            DuplicatePolicy::Reject => {
                return Err(MdrcError::DuplicateFragment {
                    key: second.camel_case.clone(),
                    first: first.heading.clone(),
                    second: second.heading.clone(),
                });
            }
            DuplicatePolicy::LastWins => {
                tracing::warn!(
                    key = %second.camel_case,
                    first = %first.heading,
                    second = %second.heading,
                    "duplicate fragment key, later section wins"
                );
            }
        }
    }

    Ok(resource)
}

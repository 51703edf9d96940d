//! Parsed markdown resources.
//!
//! A `Resource` is immutable once constructed; the cache hands out shared
//! `Arc<Resource>` values and nothing mutates them afterwards.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::parser::slug::{camel_case, slugify};

/// One H2-delimited section of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    /// Heading text without the `## ` marker.
    pub heading: String,
    /// Strict slug of the heading (`getting-started`).
    pub slug: String,
    /// Property key of the heading (`gettingStarted`).
    pub camel_case: String,
    /// `"## " + heading`
    pub header: String,
    /// Section content, trimmed of surrounding blank lines. Never absent.
    pub body: String,
    /// `header + "\n\n" + body`, even when the body is empty.
    pub text: String,
}

impl Fragment {
    /// Build a fragment, deriving all keys from the heading.
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        let heading = heading.into();
        let body = body.into();
        let header = format!("## {}", heading);
        let text = format!("{}\n\n{}", header, body);

        Self {
            slug: slugify(&heading),
            camel_case: camel_case(&heading),
            heading,
            header,
            body,
            text,
        }
    }
}

/// A parsed markdown document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resource {
    /// Frontmatter values in document order (`{}` when absent).
    pub frontmatter: Map<String, Value>,
    /// Document text with the frontmatter block removed.
    pub content: String,
    /// All H2 sections in document order, duplicates included.
    pub fragments: Vec<Fragment>,
}

impl Resource {
    /// Fragments keyed by camelCase name, one entry per distinct key.
    ///
    /// A repeated key keeps the position of its first occurrence and the
    /// value of its last one, which is how a JavaScript object literal with
    /// duplicate keys evaluates.
    pub fn keyed_fragments(&self) -> Vec<(&str, &Fragment)> {
        let mut keyed: Vec<(&str, &Fragment)> = Vec::with_capacity(self.fragments.len());

        for fragment in &self.fragments {
            let key = fragment.camel_case.as_str();
            match keyed.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = fragment,
                None => keyed.push((key, fragment)),
            }
        }

        keyed
    }

    /// Look up a fragment by camelCase key.
    pub fn fragment(&self, key: &str) -> Option<&Fragment> {
        self.fragments.iter().rev().find(|f| f.camel_case == key)
    }

    /// Distinct fragment keys in document order.
    pub fn fragment_names(&self) -> Vec<&str> {
        self.keyed_fragments().into_iter().map(|(key, _)| key).collect()
    }

    /// Pairs of fragments whose headings collapse to the same key.
    ///
    /// Each pair is (earlier, later) in document order.
    pub fn colliding_fragments(&self) -> Vec<(&Fragment, &Fragment)> {
        let mut collisions = Vec::new();
        for (i, later) in self.fragments.iter().enumerate() {
            if let Some(earlier) = self.fragments[..i]
                .iter()
                .rev()
                .find(|f| f.camel_case == later.camel_case)
            {
                collisions.push((earlier, later));
            }
        }
        collisions
    }

    /// Get a frontmatter value by key.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.frontmatter.get(key)
    }
}

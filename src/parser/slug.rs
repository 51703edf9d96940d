//! Heading key generation.

use once_cell::sync::Lazy;
use regex::Regex;

static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("valid hyphen regex"));

/// Convert a heading to a strict slug.
///
/// Rules:
/// - Lowercase
/// - Whitespace and underscores become hyphens
/// - Anything that is not alphanumeric or a hyphen is removed
/// - Runs of hyphens collapse to one
/// - Leading/trailing hyphens are trimmed
///
/// # Examples
///
/// ```
/// use mdrc::parser::slug::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Rust & Safety"), "rust-safety");
/// ```
pub fn slugify(heading: &str) -> String {
    let cleaned: String = heading
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() || c == '_' {
                Some('-')
            } else if c.is_alphanumeric() || c == '-' {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    HYPHEN_RUNS
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_string()
}

/// Convert a heading to a camelCase property key.
///
/// The heading is split on whitespace, hyphens and underscores; other
/// punctuation is stripped from each word. The first word is lowercased and
/// the rest are capitalized. Keys that would be empty or start with a digit
/// get a leading underscore so they stay valid identifiers.
///
/// ```
/// use mdrc::parser::slug::camel_case;
///
/// assert_eq!(camel_case("Getting Started"), "gettingStarted");
/// assert_eq!(camel_case("API-reference"), "apiReference");
/// ```
pub fn camel_case(heading: &str) -> String {
    let words = heading
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| !word.is_empty());

    let mut key = String::new();
    for (i, word) in words.enumerate() {
        if i == 0 {
            key.push_str(&word.to_lowercase());
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                key.extend(first.to_uppercase());
                key.push_str(&chars.as_str().to_lowercase());
            }
        }
    }

    if key.is_empty() || key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert(0, '_');
    }

    key
}

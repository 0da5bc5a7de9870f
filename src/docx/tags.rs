//! Tag markup scanning.
//!
//! Templates mark insertion points in document text with delimited tags like
//! `|{CustomerName}|`. This module owns the delimiter constants, the pattern
//! used to find tags, and the scan that lists tag names in document order.

use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Literal delimiter that opens a tag.
pub const BEGIN_MARKUP: &str = "|{";

/// Literal delimiter that closes a tag.
pub const END_MARKUP: &str = "}|";

/// Regex-escaped form of [`BEGIN_MARKUP`].
pub const ESCAPED_BEGIN_MARKUP: &str = r"\|\{";

/// Regex-escaped form of [`END_MARKUP`].
pub const ESCAPED_END_MARKUP: &str = r"\}\|";

/// Pattern matching a tag with the default delimiters.
static DEFAULT_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    tag_pattern(ESCAPED_BEGIN_MARKUP, ESCAPED_END_MARKUP)
        .expect("default tag pattern is valid")
});

/// Build the pattern matching a delimited tag.
///
/// The pattern has three capture groups: the opening delimiter, the tag name
/// (matched lazily, so adjacent tags don't merge), and the closing delimiter.
///
/// # Arguments
/// * `begin` - Regex fragment matching the opening delimiter
/// * `end` - Regex fragment matching the closing delimiter
///
/// # Errors
/// Returns an error if either fragment is not a valid regex.
pub fn tag_pattern(begin: &str, end: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!("({})(.*?)({})", begin, end))
}

/// Get the pattern for the default `|{` / `}|` delimiters.
pub fn default_tag_pattern() -> &'static Regex {
    &DEFAULT_TAG_RE
}

/// Wrap a tag name in the default delimiters.
///
/// `mark_tag("Title")` returns `|{Title}|`, the literal form a template
/// author writes in the document.
pub fn mark_tag(name: &str) -> String {
    format!("{}{}{}", BEGIN_MARKUP, name, END_MARKUP)
}

/// Scan block texts for tag names.
///
/// Applies the pattern to each block independently, so a tag whose delimiters
/// fall in different blocks is not matched. Names are returned in order of
/// first appearance, without duplicates.
pub fn scan_tag_names(texts: &[String], pattern: &Regex) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for text in texts {
        for caps in pattern.captures_iter(text) {
            if let Some(name) = caps.get(2) {
                if seen.insert(name.as_str().to_string()) {
                    names.push(name.as_str().to_string());
                }
            }
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_tag() {
        assert_eq!(mark_tag("Title"), "|{Title}|");
        assert_eq!(mark_tag(""), "|{}|");
    }

    #[test]
    fn test_scan_tag_names() {
        let texts = vec![
            "before |{Title}| middle |{Subtitle}| after".to_string(),
            "no tags here".to_string(),
            "|{Title}| again".to_string(),
        ];
        let names = scan_tag_names(&texts, default_tag_pattern()).unwrap();
        assert_eq!(names, vec!["Title", "Subtitle"]);
    }

    #[test]
    fn test_adjacent_tags_do_not_merge() {
        let texts = vec!["|{A}||{B}|".to_string()];
        let names = scan_tag_names(&texts, default_tag_pattern()).unwrap();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_unterminated_tag_is_ignored() {
        let texts = vec!["|{Dangling".to_string()];
        let names = scan_tag_names(&texts, default_tag_pattern()).unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_custom_delimiters() {
        let pattern = tag_pattern("<<", ">>").unwrap();
        let texts = vec!["a <<X>> b <<Y>> c".to_string()];
        let names = scan_tag_names(&texts, &pattern).unwrap();
        assert_eq!(names, vec!["X", "Y"]);
    }

    #[test]
    fn test_invalid_delimiter_pattern() {
        assert!(tag_pattern("*", r"\}\|").is_err());
    }
}

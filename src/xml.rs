//! Shared XML text utilities: entity escaping and byte-range splicing.

use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;
use std::ops::Range;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

// Use LeftmostLongest so longer entities win (e.g. &amp; before &lt;)
static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
        .expect("Failed to build XML unescaper")
});

/// Escape the five XML special characters.
///
/// # Examples
///
/// ```
/// use docxtag::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<t>\"x\"</t>"), "&lt;t&gt;&quot;x&quot;&lt;/t&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Unescape the five predefined XML entities.
///
/// Unknown or malformed entities are left unchanged.
///
/// # Examples
///
/// ```
/// use docxtag::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;"); // &amp; is matched first
/// assert_eq!(unescape_xml("&invalid;"), "&invalid;"); // unknown entity
/// ```
#[inline]
pub fn unescape_xml(s: &str) -> String {
    XML_UNESCAPER.replace_all(s, &["&", "<", ">", "\"", "'"])
}

/// Rebuild an XML byte buffer with the given ranges replaced.
///
/// Edits must be non-overlapping and sorted by start offset; the bytes
/// between edits are copied through untouched.
pub(crate) fn splice(xml: &[u8], edits: &[(Range<usize>, Vec<u8>)]) -> Vec<u8> {
    let added: usize = edits.iter().map(|(_, bytes)| bytes.len()).sum();
    let mut out = Vec::with_capacity(xml.len() + added);
    let mut pos = 0;
    for (range, bytes) in edits {
        out.extend_from_slice(&xml[pos..range.start]);
        out.extend_from_slice(bytes);
        pos = range.end;
    }
    out.extend_from_slice(&xml[pos..]);
    out
}

//! Literal text replacement across run boundaries.
//!
//! Word fragments paragraph text into runs at formatting and revision
//! boundaries, so a search string rarely sits inside a single `<w:t>`. The
//! replacer works on each paragraph's virtual text (the concatenation of its
//! `<w:t>` contents) and redistributes the result: the text slot where a
//! match starts receives the whole replacement, slots the match continues
//! through keep only their unmatched remainder.
//!
//! Only text nodes are rewritten. Runs, their properties, and the paragraph
//! structure stay exactly as they were.

use crate::error::{DocxError, Result};
use crate::xml::{escape_xml, splice, unescape_xml};
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::ops::Range;

/// A `<w:t>` element inside the current paragraph.
struct TextSlot {
    /// Byte range of the opening `<w:t ...>` tag
    tag_span: Range<usize>,
    /// Byte range of the raw content between the tags
    content_span: Range<usize>,
    /// Decoded text content
    text: String,
    /// Whether the tag already declares xml:space="preserve"
    preserve: bool,
}

/// A `<w:t>` element whose end tag has not been reached yet.
struct OpenText {
    tag_span: Range<usize>,
    content_start: usize,
    preserve: bool,
    text: String,
}

/// Replace literal search strings in the document's paragraph text.
///
/// Each pair is a `(needle, replacement)`. Needles are matched literally and
/// case-sensitively against the virtual text of each paragraph, all in one
/// pass: overlapping candidates resolve leftmost-longest, and replacement
/// text is never itself rescanned.
///
/// Returns the rewritten XML and the number of matches replaced, or `None`
/// if nothing matched.
pub(crate) fn replace_literals(
    xml: &[u8],
    pairs: &[(String, String)],
) -> Result<Option<(Vec<u8>, usize)>> {
    if pairs.is_empty() {
        return Ok(None);
    }

    let automaton = AhoCorasickBuilder::new()
        .match_kind(MatchKind::LeftmostLongest)
        .build(pairs.iter().map(|(needle, _)| needle.as_str()))
        .map_err(|e| DocxError::Other(e.to_string()))?;
    let replacements: Vec<&str> = pairs.iter().map(|(_, text)| text.as_str()).collect();

    let mut reader = Reader::from_reader(xml);

    let mut edits: Vec<(Range<usize>, Vec<u8>)> = Vec::new();
    let mut count = 0usize;
    let mut para_slots: Vec<TextSlot> = Vec::new();
    let mut p_depth = 0usize;
    let mut t_open: Option<OpenText> = None;
    let mut buf = Vec::with_capacity(512);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => {
                    // Paragraphs nest through text boxes; the inner ones
                    // contribute to the outermost paragraph's virtual text.
                    p_depth += 1;
                },
                b"t" if p_depth > 0 => {
                    let end_pos = reader.buffer_position() as usize;
                    let start = end_pos - e.len() - 2;
                    let preserve = e
                        .attributes()
                        .flatten()
                        .any(|a| a.key.as_ref() == b"xml:space" && a.value.as_ref() == b"preserve");
                    t_open = Some(OpenText {
                        tag_span: start..end_pos,
                        content_start: end_pos,
                        preserve,
                        text: String::new(),
                    });
                },
                _ => {},
            },
            Ok(Event::Text(e)) => {
                if let Some(open) = t_open.as_mut() {
                    open.text.push_str(std::str::from_utf8(e.as_ref())?);
                }
            },
            Ok(Event::GeneralRef(e)) => {
                if let Some(open) = t_open.as_mut() {
                    open.text.push('&');
                    open.text.push_str(std::str::from_utf8(e.as_ref())?);
                    open.text.push(';');
                }
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => {
                    if let Some(open) = t_open.take() {
                        let end_pos = reader.buffer_position() as usize;
                        let content_end = end_pos - e.len() - 3;
                        para_slots.push(TextSlot {
                            tag_span: open.tag_span,
                            content_span: open.content_start..content_end,
                            text: unescape_xml(&open.text),
                            preserve: open.preserve,
                        });
                    }
                },
                b"p" => {
                    p_depth = p_depth.saturating_sub(1);
                    if p_depth == 0 {
                        count +=
                            rewrite_paragraph(xml, &para_slots, &automaton, &replacements, &mut edits);
                        para_slots.clear();
                    }
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocxError::Xml(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    if count == 0 {
        return Ok(None);
    }

    Ok(Some((splice(xml, &edits), count)))
}

/// Find matches in one paragraph's virtual text and emit the slot edits.
///
/// Returns the number of matches replaced.
fn rewrite_paragraph(
    xml: &[u8],
    slots: &[TextSlot],
    automaton: &AhoCorasick,
    replacements: &[&str],
    edits: &mut Vec<(Range<usize>, Vec<u8>)>,
) -> usize {
    if slots.is_empty() {
        return 0;
    }

    let mut bounds = Vec::with_capacity(slots.len());
    let mut virtual_text = String::new();
    for slot in slots {
        let start = virtual_text.len();
        virtual_text.push_str(&slot.text);
        bounds.push(start..virtual_text.len());
    }

    let matches: Vec<aho_corasick::Match> = automaton.find_iter(&virtual_text).collect();
    if matches.is_empty() {
        return 0;
    }

    for (slot, range) in slots.iter().zip(&bounds) {
        let mut new_text = String::new();
        let mut pos = range.start;
        let mut touched = false;

        for m in &matches {
            if m.end() <= range.start || m.start() >= range.end {
                continue;
            }
            touched = true;
            let seg_start = m.start().max(range.start);
            let seg_end = m.end().min(range.end);
            if seg_start > pos {
                new_text.push_str(&virtual_text[pos..seg_start]);
            }
            if m.start() >= range.start {
                // The slot where the match starts takes the replacement.
                new_text.push_str(replacements[m.pattern().as_usize()]);
            }
            pos = seg_end;
        }

        if !touched {
            continue;
        }

        if pos < range.end {
            new_text.push_str(&virtual_text[pos..range.end]);
        }

        if !slot.preserve && new_text != new_text.trim() {
            // Word drops unprotected edge whitespace when it loads the part.
            let mut tag = Vec::with_capacity(slot.tag_span.len() + 22);
            tag.extend_from_slice(&xml[slot.tag_span.start..slot.tag_span.end - 1]);
            tag.extend_from_slice(br#" xml:space="preserve">"#);
            edits.push((slot.tag_span.clone(), tag));
        }
        edits.push((slot.content_span.clone(), escape_xml(&new_text).into_bytes()));
    }

    matches.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::text::extract_text;
    use proptest::prelude::*;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn doc(body: &str) -> String {
        format!(r#"<w:document {NS}><w:body>{body}</w:body></w:document>"#)
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(n, r)| (n.to_string(), r.to_string()))
            .collect()
    }

    #[test]
    fn test_replace_within_single_run() {
        let xml = doc("<w:p><w:r><w:t>Dear |{Title}|:</w:t></w:r></w:p>");
        let expected = doc("<w:p><w:r><w:t>Dear Ms. Smith:</w:t></w:r></w:p>");

        let (new_xml, count) = replace_literals(xml.as_bytes(), &pairs(&[("|{Title}|", "Ms. Smith")]))
            .unwrap()
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(String::from_utf8(new_xml).unwrap(), expected);
    }

    #[test]
    fn test_replace_across_run_boundary() {
        let xml = doc("<w:p><w:r><w:t>Dear |{Ti</w:t></w:r><w:r><w:t>tle}|:</w:t></w:r></w:p>");
        let expected = doc("<w:p><w:r><w:t>Dear Ms. Smith</w:t></w:r><w:r><w:t>:</w:t></w:r></w:p>");

        let (new_xml, count) = replace_literals(xml.as_bytes(), &pairs(&[("|{Title}|", "Ms. Smith")]))
            .unwrap()
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(String::from_utf8(new_xml).unwrap(), expected);
    }

    #[test]
    fn test_match_spanning_three_runs() {
        let xml = doc(
            "<w:p><w:r><w:t>|{</w:t></w:r><w:r><w:t>Tit</w:t></w:r><w:r><w:t>le}| x</w:t></w:r></w:p>",
        );
        let expected = doc(
            r#"<w:p><w:r><w:t>A</w:t></w:r><w:r><w:t></w:t></w:r><w:r><w:t xml:space="preserve"> x</w:t></w:r></w:p>"#,
        );

        let (new_xml, count) = replace_literals(xml.as_bytes(), &pairs(&[("|{Title}|", "A")]))
            .unwrap()
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(String::from_utf8(new_xml).unwrap(), expected);
    }

    #[test]
    fn test_padded_replacement_gets_space_preserve() {
        let xml = doc("<w:p><w:r><w:t>|{X}|</w:t></w:r></w:p>");
        let expected = doc(r#"<w:p><w:r><w:t xml:space="preserve"> padded </w:t></w:r></w:p>"#);

        let (new_xml, count) = replace_literals(xml.as_bytes(), &pairs(&[("|{X}|", " padded ")]))
            .unwrap()
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(String::from_utf8(new_xml).unwrap(), expected);
    }

    #[test]
    fn test_existing_space_preserve_not_duplicated() {
        let xml = doc(r#"<w:p><w:r><w:t xml:space="preserve">|{X}| tail</w:t></w:r></w:p>"#);
        let expected = doc(r#"<w:p><w:r><w:t xml:space="preserve"> a  tail</w:t></w:r></w:p>"#);

        let (new_xml, _) = replace_literals(xml.as_bytes(), &pairs(&[("|{X}|", " a ")]))
            .unwrap()
            .unwrap();
        assert_eq!(String::from_utf8(new_xml).unwrap(), expected);
    }

    #[test]
    fn test_replacement_text_is_escaped() {
        let xml = doc("<w:p><w:r><w:t>|{X}|</w:t></w:r></w:p>");
        let expected = doc("<w:p><w:r><w:t>A &amp; B &lt;ok&gt;</w:t></w:r></w:p>");

        let (new_xml, _) = replace_literals(xml.as_bytes(), &pairs(&[("|{X}|", "A & B <ok>")]))
            .unwrap()
            .unwrap();
        assert_eq!(String::from_utf8(new_xml).unwrap(), expected);
    }

    #[test]
    fn test_needle_matches_against_decoded_text() {
        let xml = doc("<w:p><w:r><w:t>Q&amp;A |{T}|</w:t></w:r></w:p>");
        let expected = doc("<w:p><w:r><w:t>Q&amp;A done</w:t></w:r></w:p>");

        let (new_xml, _) = replace_literals(xml.as_bytes(), &pairs(&[("|{T}|", "done")]))
            .unwrap()
            .unwrap();
        assert_eq!(String::from_utf8(new_xml).unwrap(), expected);
    }

    #[test]
    fn test_replacements_are_not_rescanned() {
        let xml = doc("<w:p><w:r><w:t>|{A}| and |{B}|</w:t></w:r></w:p>");
        let expected = doc("<w:p><w:r><w:t>see |{B}| and two</w:t></w:r></w:p>");

        let (new_xml, count) = replace_literals(
            xml.as_bytes(),
            &pairs(&[("|{A}|", "see |{B}|"), ("|{B}|", "two")]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(new_xml).unwrap(), expected);
    }

    #[test]
    fn test_repeated_needle_counts_each_match() {
        let xml = doc("<w:p><w:r><w:t>|{X}|, |{X}|</w:t></w:r></w:p>");

        let (new_xml, count) = replace_literals(xml.as_bytes(), &pairs(&[("|{X}|", "v")]))
            .unwrap()
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(extract_text(&new_xml).unwrap(), "v, v");
    }

    #[test]
    fn test_no_match_across_paragraphs() {
        let xml = doc("<w:p><w:r><w:t>|{Ti</w:t></w:r></w:p><w:p><w:r><w:t>tle}|</w:t></w:r></w:p>");

        let result = replace_literals(xml.as_bytes(), &pairs(&[("|{Title}|", "x")])).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_empty_pairs_is_noop() {
        let xml = doc("<w:p><w:r><w:t>|{X}|</w:t></w:r></w:p>");
        assert!(replace_literals(xml.as_bytes(), &[]).unwrap().is_none());
    }

    #[test]
    fn test_text_box_paragraph_joins_outer_text() {
        let xml = doc(
            "<w:p><w:r><w:t>|{Ti</w:t></w:r>\
             <w:r><w:pict><w:txbxContent><w:p><w:r><w:t>tle}|</w:t></w:r></w:p></w:txbxContent></w:pict></w:r></w:p>",
        );

        let (new_xml, count) = replace_literals(xml.as_bytes(), &pairs(&[("|{Title}|", "ok")]))
            .unwrap()
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(extract_text(&new_xml).unwrap(), "ok");
    }

    proptest! {
        #[test]
        fn replaced_text_matches_plain_string_replace(
            prefix in "[a-z ]{0,12}",
            suffix in "[a-z ]{0,12}",
            cut in 0usize..24,
        ) {
            let full = format!("{prefix}|{{Name}}|{suffix}");
            let cut = cut.min(full.len());
            let (left, right) = full.split_at(cut);
            let xml = doc(&format!(
                r#"<w:p><w:r><w:t xml:space="preserve">{left}</w:t></w:r><w:r><w:t xml:space="preserve">{right}</w:t></w:r></w:p>"#
            ));

            let result = replace_literals(xml.as_bytes(), &pairs(&[("|{Name}|", "Alice")]))
                .unwrap()
                .unwrap();
            let (new_xml, count) = result;
            prop_assert_eq!(count, 1);
            prop_assert_eq!(
                extract_text(&new_xml).unwrap(),
                full.replace("|{Name}|", "Alice")
            );
        }
    }
}

//! Text extraction from WordprocessingML XML.
//!
//! Word stores visible text inside `<w:t>` elements, fragmented across runs
//! by formatting and revision boundaries. The functions here reassemble that
//! text, either for the whole document or per block-level element.
//!
//! The readers run without text trimming: `<w:t>` content is significant
//! whitespace included (Word marks padded runs with `xml:space="preserve"`).

use crate::error::{DocxError, Result};
use crate::xml::unescape_xml;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Extract all visible text from a document part.
///
/// Concatenates the content of every `<w:t>` element in document order,
/// with XML entities resolved. No separators are inserted between runs
/// or paragraphs.
pub fn extract_text(xml: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(xml);

    let mut result = String::with_capacity(xml.len() / 8);
    let mut in_text = false;
    let mut buf = Vec::with_capacity(512);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            },
            Ok(Event::Text(e)) if in_text => {
                result.push_str(std::str::from_utf8(e.as_ref())?);
            },
            Ok(Event::GeneralRef(e)) if in_text => {
                // The parser splits entity references out of text events.
                // Reassemble the reference so it resolves with the rest.
                result.push('&');
                result.push_str(std::str::from_utf8(e.as_ref())?);
                result.push(';');
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = false;
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocxError::Xml(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    Ok(unescape_xml(&result))
}

/// Extract the text of each top-level element of the document body.
///
/// Returns one string per direct child of `<w:body>` (paragraph, table,
/// section properties, ...), holding the concatenated content of all `<w:t>`
/// descendants of that child. Children with no text yield an empty string,
/// so block positions stay aligned with the body's element order.
pub fn block_texts(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);

    let mut blocks = Vec::new();
    let mut current = String::new();
    let mut in_body = false;
    let mut in_text = false;
    let mut depth = 0usize;
    let mut buf = Vec::with_capacity(512);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if !in_body {
                    if e.local_name().as_ref() == b"body" {
                        in_body = true;
                    }
                } else {
                    depth += 1;
                    if e.local_name().as_ref() == b"t" {
                        in_text = true;
                    }
                }
            },
            Ok(Event::Empty(_)) if in_body && depth == 0 => {
                blocks.push(String::new());
            },
            Ok(Event::Text(e)) if in_text => {
                current.push_str(std::str::from_utf8(e.as_ref())?);
            },
            Ok(Event::GeneralRef(e)) if in_text => {
                current.push('&');
                current.push_str(std::str::from_utf8(e.as_ref())?);
                current.push(';');
            },
            Ok(Event::End(e)) => {
                if in_body {
                    if depth == 0 {
                        if e.local_name().as_ref() == b"body" {
                            in_body = false;
                        }
                    } else {
                        if e.local_name().as_ref() == b"t" {
                            in_text = false;
                        }
                        depth -= 1;
                        if depth == 0 {
                            blocks.push(unescape_xml(&current));
                            current.clear();
                        }
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocxError::Xml(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    #[test]
    fn test_extract_text() {
        let xml = format!(
            r#"<w:document {NS}><w:body>
                <w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p>
            </w:body></w:document>"#
        );
        assert_eq!(extract_text(xml.as_bytes()).unwrap(), "Hello world");
    }

    #[test]
    fn test_extract_text_resolves_entities() {
        let xml = format!(
            r#"<w:document {NS}><w:body>
                <w:p><w:r><w:t>Tom &amp; Jerry &lt;3</w:t></w:r></w:p>
            </w:body></w:document>"#
        );
        assert_eq!(extract_text(xml.as_bytes()).unwrap(), "Tom & Jerry <3");
    }

    #[test]
    fn test_block_texts_one_per_body_child() {
        let xml = format!(
            r#"<w:document {NS}><w:body>
                <w:p><w:r><w:t>first</w:t></w:r></w:p>
                <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
                <w:p><w:r><w:t>se</w:t></w:r><w:r><w:t>cond</w:t></w:r></w:p>
                <w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>
            </w:body></w:document>"#
        );
        let blocks = block_texts(xml.as_bytes()).unwrap();
        assert_eq!(blocks, vec!["first", "cell", "second", ""]);
    }

    #[test]
    fn test_block_texts_ignores_text_outside_body() {
        let xml = format!(
            r#"<w:document {NS}><w:ignored><w:t>nope</w:t></w:ignored><w:body>
                <w:p><w:r><w:t>yes</w:t></w:r></w:p>
            </w:body></w:document>"#
        );
        let blocks = block_texts(xml.as_bytes()).unwrap();
        assert_eq!(blocks, vec!["yes"]);
    }

    #[test]
    fn test_block_texts_keeps_padded_runs() {
        let xml = format!(
            r#"<w:document {NS}><w:body>
                <w:p><w:r><w:t>a</w:t></w:r><w:r><w:t xml:space="preserve"> b </w:t></w:r><w:r><w:t>c</w:t></w:r></w:p>
            </w:body></w:document>"#
        );
        let blocks = block_texts(xml.as_bytes()).unwrap();
        assert_eq!(blocks, vec!["a b c"]);
    }
}

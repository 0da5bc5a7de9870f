//! Structured document tag (content control) support.
//!
//! Content controls are structured regions in a document, written as
//! `<w:sdt>` elements. Each carries a properties block (`<w:sdtPr>`) that may
//! declare an id, a tag, and an alias (the friendly name shown in Word's
//! properties dialog). Controls nest: a control's content can contain further
//! controls.
//!
//! The scanner here records each control in document order together with the
//! byte span of its `<w:sdt>` element, which is what removal splices out.

use crate::error::{DocxError, Result};
use crate::xml::{splice, unescape_xml};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;
use std::collections::HashSet;
use std::ops::Range;

/// A content control in a Word document.
///
/// All properties are optional at the XML level, including the id. Word
/// writes ids as signed decimal numbers, so the raw string is kept rather
/// than a parsed integer.
#[derive(Debug, Clone)]
pub struct ContentControl {
    /// Control ID from `<w:id w:val="..."/>`
    id: Option<String>,
    /// Control tag from `<w:tag w:val="..."/>`
    tag: Option<String>,
    /// Control alias (friendly name) from `<w:alias w:val="..."/>`
    alias: Option<String>,
}

impl ContentControl {
    /// Get the control ID.
    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Get the control tag.
    #[inline]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Get the control alias.
    #[inline]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// A content control occurrence with the byte span of its `<w:sdt>` element.
#[derive(Debug)]
struct SdtRecord {
    control: ContentControl,
    span: Range<usize>,
}

/// An open `<w:sdt>` element during the scan.
struct Frame {
    /// Index of this control's record
    rec_idx: usize,
    /// Whether the scan is inside this control's `<w:sdtPr>` block
    in_props: bool,
}

/// Capture an id/tag/alias property into the innermost open control.
///
/// Only the first declaration of each property counts; repeats are ignored.
fn capture_prop(records: &mut [SdtRecord], stack: &[Frame], e: &BytesStart<'_>) {
    if let Some(top) = stack.last() {
        if top.in_props {
            if let Some(val) = val_attr(e) {
                let control = &mut records[top.rec_idx].control;
                let slot = match e.local_name().as_ref() {
                    b"id" => &mut control.id,
                    b"tag" => &mut control.tag,
                    _ => &mut control.alias,
                };
                if slot.is_none() {
                    *slot = Some(val);
                }
            }
        }
    }
}

/// Read the `w:val` attribute of an element, entities resolved.
fn val_attr(e: &BytesStart<'_>) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"val" {
            return Some(unescape_xml(&String::from_utf8_lossy(&attr.value)));
        }
    }
    None
}

/// Scan a document part for content controls.
///
/// Returns one record per `<w:sdt>` element in document order (outer controls
/// before the controls nested inside them), each with the byte span covering
/// the element from `<w:sdt` through `</w:sdt>`.
fn scan_controls(xml: &[u8]) -> Result<Vec<SdtRecord>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut records: Vec<SdtRecord> = Vec::new();
    let mut stack: SmallVec<[Frame; 8]> = SmallVec::new();
    let mut buf = Vec::with_capacity(512);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                match e.local_name().as_ref() {
                    b"sdt" => {
                        // The event ends just past '>', so the '<' sits at
                        // (position - content length - 2).
                        let end_pos = reader.buffer_position() as usize;
                        let start = end_pos - e.len() - 2;
                        records.push(SdtRecord {
                            control: ContentControl {
                                id: None,
                                tag: None,
                                alias: None,
                            },
                            span: start..start,
                        });
                        stack.push(Frame {
                            rec_idx: records.len() - 1,
                            in_props: false,
                        });
                    },
                    b"sdtPr" => {
                        if let Some(top) = stack.last_mut() {
                            top.in_props = true;
                        }
                    },
                    b"id" | b"tag" | b"alias" => {
                        capture_prop(&mut records, &stack, &e);
                    },
                    _ => {},
                }
            },
            Ok(Event::Empty(e)) => {
                if matches!(e.local_name().as_ref(), b"id" | b"tag" | b"alias") {
                    capture_prop(&mut records, &stack, &e);
                }
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"sdt" => {
                    if let Some(frame) = stack.pop() {
                        records[frame.rec_idx].span.end = reader.buffer_position() as usize;
                    }
                },
                b"sdtPr" => {
                    if let Some(top) = stack.last_mut() {
                        top.in_props = false;
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

    Ok(records)
}

/// List all content controls in a document part, in document order.
pub(crate) fn content_controls(xml: &[u8]) -> Result<Vec<ContentControl>> {
    Ok(scan_controls(xml)?
        .into_iter()
        .map(|rec| rec.control)
        .collect())
}

/// List the alias names declared by content controls.
///
/// Aliases are returned in document order of their controls, first
/// occurrence only.
pub(crate) fn alias_names(xml: &[u8]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for rec in scan_controls(xml)? {
        if let Some(alias) = rec.control.alias {
            if seen.insert(alias.clone()) {
                names.push(alias);
            }
        }
    }

    Ok(names)
}

/// Remove every content control whose alias is in `names`.
///
/// The whole `<w:sdt>` element is excised, content included, so controls
/// nested inside a removed one disappear with it. A nested match inside an
/// already-removed ancestor is not counted again.
///
/// Returns the rewritten XML and the number of elements excised, or `None`
/// if no control matched.
pub(crate) fn remove_by_alias(
    xml: &[u8],
    names: &HashSet<String>,
) -> Result<Option<(Vec<u8>, usize)>> {
    let records = scan_controls(xml)?;

    let mut edits: Vec<(Range<usize>, Vec<u8>)> = Vec::new();
    let mut last_end = 0usize;

    // Records come in document order, so ascending span starts. A matched
    // span starting inside the previously kept span is a nested control
    // already covered by its ancestor's removal.
    for rec in &records {
        if let Some(alias) = rec.control.alias() {
            if names.contains(alias) && rec.span.start >= last_end {
                last_end = rec.span.end;
                edits.push((rec.span.clone(), Vec::new()));
            }
        }
    }

    if edits.is_empty() {
        return Ok(None);
    }

    let count = edits.len();
    Ok(Some((splice(xml, &edits), count)))
}

//! Tag-oriented document handle.
//!
//! `TagDocument` wraps a backing stream holding a .docx file and exposes the
//! template processing surface: listing delimited tags and content control
//! aliases, substituting tag text, and deleting controls by alias. Every
//! operation loads the package from the stream, works on it, and (for
//! mutations that changed something) writes the package back, so the handle
//! itself holds no parsed state between calls.

use crate::docx::WordPackage;
use crate::docx::sdt::ContentControl;
use crate::docx::tags;
use crate::error::{DocxError, Result};
use crate::stream::DocumentStream;
use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// A .docx document opened for tag and content control processing.
///
/// # Examples
///
/// ```rust,no_run
/// use docxtag::TagDocument;
/// use std::collections::HashMap;
///
/// let mut doc = TagDocument::open("template.docx")?;
///
/// for name in doc.tag_names()? {
///     println!("found tag: {}", name);
/// }
///
/// let mut values = HashMap::new();
/// values.insert("Title".to_string(), "Annual Report".to_string());
/// doc.replace_tags(&values)?;
/// doc.close()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct TagDocument {
    /// Backing storage for the document bytes
    stream: Box<dyn DocumentStream>,
}

impl TagDocument {
    /// Open a document from a file path.
    ///
    /// The file is opened for both reading and writing, and its contents are
    /// validated as a WordprocessingML package before the handle is returned.
    ///
    /// # Errors
    /// * [`DocxError::InvalidArgument`] if the path is empty
    /// * [`DocxError::NotFound`] if no file exists at the path
    /// * [`DocxError::MalformedDocument`] if the file is not a valid .docx
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(DocxError::InvalidArgument(
                "document path is empty".to_string(),
            ));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    DocxError::NotFound(path.to_path_buf())
                } else {
                    DocxError::Io(e)
                }
            })?;

        let mut doc = Self {
            stream: Box::new(file),
        };
        doc.load()?;
        Ok(doc)
    }

    /// Open a document from a stream.
    ///
    /// The stream must contain a complete .docx file starting at offset zero;
    /// it is validated before the handle is returned. Mutating operations
    /// write the updated package back into the same stream.
    ///
    /// # Errors
    /// * [`DocxError::MalformedDocument`] if the stream does not hold a
    ///   valid .docx
    pub fn from_stream<S: DocumentStream + 'static>(stream: S) -> Result<Self> {
        let mut doc = Self {
            stream: Box::new(stream),
        };
        doc.load()?;
        Ok(doc)
    }

    /// Get the raw XML of the main document part as a string.
    pub fn content(&mut self) -> Result<String> {
        self.load()?.content()
    }

    /// Extract all visible text from the main document part.
    pub fn text(&mut self) -> Result<String> {
        self.load()?.text()
    }

    /// List the tag names written with the default `|{` / `}|` delimiters.
    ///
    /// Tags are matched within the text of a single top-level body element;
    /// a tag whose delimiters sit in different paragraphs is not found.
    /// Names come back in order of first appearance, without duplicates.
    pub fn tag_names(&mut self) -> Result<Vec<String>> {
        let blocks = self.load()?.block_texts()?;
        tags::scan_tag_names(&blocks, tags::default_tag_pattern())
    }

    /// List tag names using custom delimiters.
    ///
    /// The delimiters are regex fragments, so literal characters with regex
    /// meaning must arrive escaped (the defaults are
    /// [`tags::ESCAPED_BEGIN_MARKUP`] and [`tags::ESCAPED_END_MARKUP`]).
    ///
    /// # Errors
    /// Returns [`DocxError::Pattern`] if a fragment is not a valid regex.
    pub fn tag_names_with(&mut self, begin: &str, end: &str) -> Result<Vec<String>> {
        let pattern = tags::tag_pattern(begin, end)?;
        let blocks = self.load()?.block_texts()?;
        tags::scan_tag_names(&blocks, &pattern)
    }

    /// List the alias names of the document's content controls.
    ///
    /// Aliases come back in document order of their controls, first
    /// occurrence only.
    pub fn alias_names(&mut self) -> Result<Vec<String>> {
        self.load()?.alias_names()
    }

    /// List all content controls in the document.
    pub fn content_controls(&mut self) -> Result<Vec<ContentControl>> {
        self.load()?.content_controls()
    }

    /// Replace tags with new text.
    ///
    /// Each map key is a tag name; its occurrences as `|{name}|` in the
    /// document text are replaced by the mapped value, matched literally and
    /// case-sensitively even when the tag is split across runs. Keys that
    /// match nothing are skipped. An empty map is a no-op.
    ///
    /// Changes are written back to the backing file or stream before the
    /// call returns. Returns the number of tag occurrences replaced.
    pub fn replace_tags(&mut self, replacements: &HashMap<String, String>) -> Result<usize> {
        if replacements.is_empty() {
            return Ok(0);
        }

        let pairs: Vec<(String, String)> = replacements
            .iter()
            .map(|(name, text)| (tags::mark_tag(name), text.clone()))
            .collect();

        let mut package = self.load()?;
        let count = package.replace_literals(&pairs)?;
        if count > 0 {
            let bytes = package.to_bytes()?;
            self.write_back(&bytes)?;
        }
        Ok(count)
    }

    /// Remove content controls by alias name.
    ///
    /// Every control whose alias is in `names` is removed together with its
    /// content, so controls nested inside a removed one disappear with it.
    /// Names that match nothing are skipped. An empty list is a no-op.
    ///
    /// Changes are written back to the backing file or stream before the
    /// call returns. Returns the number of controls removed.
    pub fn remove_aliases<S: AsRef<str>>(&mut self, names: &[S]) -> Result<usize> {
        if names.is_empty() {
            return Ok(0);
        }

        let names: HashSet<String> = names.iter().map(|n| n.as_ref().to_string()).collect();

        let mut package = self.load()?;
        let count = package.remove_aliases(&names)?;
        if count > 0 {
            let bytes = package.to_bytes()?;
            self.write_back(&bytes)?;
        }
        Ok(count)
    }

    /// Close the document, releasing the backing stream.
    pub fn close(mut self) -> Result<()> {
        self.stream.flush()?;
        Ok(())
    }

    /// Read the full stream and parse it as a Word package.
    fn load(&mut self) -> Result<WordPackage> {
        let bytes = self.read_all()?;
        WordPackage::from_bytes(&bytes)
            .map_err(|e| DocxError::MalformedDocument(e.to_string()))
    }

    /// Read the backing stream from the start.
    fn read_all(&mut self) -> Result<Vec<u8>> {
        self.stream.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        self.stream.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Overwrite the backing stream with the given bytes.
    fn write_back(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.seek(SeekFrom::Start(0))?;
        self.stream.write_all(bytes)?;
        self.stream.set_len(bytes.len() as u64)?;
        self.stream.flush()?;
        Ok(())
    }
}

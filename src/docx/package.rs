//! Package implementation for Word documents.

use crate::docx::replace::replace_literals;
use crate::docx::sdt::{self, ContentControl};
use crate::docx::text;
use crate::error::{DocxError, Result};
use crate::opc::OpcPackage;
use crate::opc::constants::content_type as ct;
use crate::opc::packuri::PackURI;
use std::collections::HashSet;

/// A Word (.docx) package.
///
/// This is the main entry point for working with Word documents. It wraps an
/// OPC package, validates that the main part really is WordprocessingML, and
/// provides the document-level operations: text extraction, content control
/// queries, literal replacement, and control removal.
///
/// # Examples
///
/// ```rust,no_run
/// use docxtag::docx::WordPackage;
///
/// let bytes = std::fs::read("document.docx")?;
/// let pkg = WordPackage::from_bytes(&bytes)?;
/// println!("{}", pkg.text()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct WordPackage {
    /// The underlying OPC package
    opc: OpcPackage,

    /// Partname of the main document part
    main_uri: PackURI,
}

impl WordPackage {
    /// Load a .docx package from serialized bytes.
    ///
    /// # Errors
    /// Fails if the bytes are not a valid OPC package, if the package has no
    /// main document part, or if the main part's content type is not
    /// WordprocessingML.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let opc = OpcPackage::from_bytes(bytes)?;

        let main_uri = opc.main_document_partname()?;
        if !opc.contains_part(&main_uri) {
            return Err(DocxError::MalformedDocument(format!(
                "main document part missing: {}",
                main_uri
            )));
        }

        let content_type = opc.content_type(&main_uri)?;
        if content_type != ct::WML_DOCUMENT_MAIN {
            return Err(DocxError::InvalidContentType {
                expected: ct::WML_DOCUMENT_MAIN.to_string(),
                got: content_type,
            });
        }

        Ok(Self { opc, main_uri })
    }

    /// Serialize the package back to .docx bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.opc.to_bytes()?)
    }

    /// Get the raw XML of the main document part.
    #[inline]
    pub fn document_xml(&self) -> Result<&[u8]> {
        Ok(self.opc.part(&self.main_uri)?.blob())
    }

    /// Get the main document part's XML as a string.
    pub fn content(&self) -> Result<String> {
        let xml = self.document_xml()?;
        String::from_utf8(xml.to_vec()).map_err(|e| DocxError::Utf8(e.utf8_error()))
    }

    /// Extract all visible text from the main document part.
    pub fn text(&self) -> Result<String> {
        text::extract_text(self.document_xml()?)
    }

    /// Get the text of each top-level element of the document body.
    pub fn block_texts(&self) -> Result<Vec<String>> {
        text::block_texts(self.document_xml()?)
    }

    /// List all content controls in the main document part.
    pub fn content_controls(&self) -> Result<Vec<ContentControl>> {
        sdt::content_controls(self.document_xml()?)
    }

    /// List the alias names of the document's content controls.
    pub fn alias_names(&self) -> Result<Vec<String>> {
        sdt::alias_names(self.document_xml()?)
    }

    /// Replace literal search strings in the document's paragraph text.
    ///
    /// Matching is case-sensitive and may span run boundaries within a
    /// paragraph. Returns the number of matches replaced; zero means the
    /// document was left untouched.
    pub fn replace_literals(&mut self, pairs: &[(String, String)]) -> Result<usize> {
        let xml = self.document_xml()?;
        match replace_literals(xml, pairs)? {
            Some((new_xml, count)) => {
                self.opc.part_mut(&self.main_uri)?.set_blob(new_xml);
                Ok(count)
            },
            None => Ok(0),
        }
    }

    /// Remove every content control whose alias is in `names`.
    ///
    /// The whole `<w:sdt>` element is removed with its content; controls
    /// nested inside a removed one go with it. Returns the number of
    /// elements removed; zero means the document was left untouched.
    pub fn remove_aliases(&mut self, names: &HashSet<String>) -> Result<usize> {
        if names.is_empty() {
            return Ok(0);
        }

        let xml = self.document_xml()?;
        match sdt::remove_by_alias(xml, names)? {
            Some((new_xml, count)) => {
                self.opc.part_mut(&self.main_uri)?.set_blob(new_xml);
                Ok(count)
            },
            None => Ok(0),
        }
    }

    /// Get the underlying OPC package.
    ///
    /// This provides access to lower-level package operations.
    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }
}

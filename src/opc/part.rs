//! Open Packaging Convention (OPC) objects related to package parts.
//!
//! Parts are the fundamental units of content in an OPC package, each with a
//! unique partname and a blob of content. Parts hold their content verbatim
//! so an unmodified part writes back byte-identical.

use crate::opc::packuri::PackURI;

/// A part in an OPC package.
///
/// Stores the raw bytes of the package item exactly as read from the
/// archive. The content type is not stored on the part; it is resolved
/// through the package's content type map when needed.
#[derive(Debug, Clone)]
pub struct PackagePart {
    /// The partname (URI) of this part
    partname: PackURI,

    /// The binary content of this part
    blob: Vec<u8>,
}

impl PackagePart {
    /// Create a new PackagePart.
    ///
    /// # Arguments
    /// * `partname` - The partname (URI) of this part
    /// * `blob` - The binary content of this part
    pub fn new(partname: PackURI, blob: Vec<u8>) -> Self {
        Self { partname, blob }
    }

    /// Get the partname of this part.
    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// Get the Zip membername of this part (partname without the leading slash).
    #[inline]
    pub fn membername(&self) -> &str {
        self.partname.membername()
    }

    /// Get the binary content of this part.
    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Replace the binary content of this part.
    pub fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = blob;
    }
}

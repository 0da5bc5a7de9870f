//! Objects that implement reading and writing OPC packages.
//!
//! This module provides the main OpcPackage type, which represents an Open
//! Packaging Convention package in memory. It manages parts, relationships,
//! and content types, and serializes back to ZIP bytes with the original
//! member order intact.

use crate::opc::constants::relationship_type;
use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::PackURI;
use crate::opc::part::PackagePart;
use crate::opc::pkgreader::{ContentTypeMap, PackageReader};
use crate::opc::pkgwriter::PackageWriter;
use crate::opc::rel::Relationships;
use std::collections::HashMap;

/// Main API class for working with OPC packages.
///
/// OpcPackage represents an Open Packaging Convention package in memory,
/// providing access to parts, relationships, and package-level operations.
/// Parts keep their raw bytes, so a package round-trips byte-identical for
/// every part that was not modified.
pub struct OpcPackage {
    /// All parts in the package, in archive order
    parts: Vec<PackagePart>,

    /// Index from partname string to position in `parts`
    index: HashMap<String, usize>,

    /// Content type map parsed from [Content_Types].xml
    content_types: ContentTypeMap,

    /// Package-level relationships
    rels: Relationships,
}

impl OpcPackage {
    /// Load an OPC package from serialized ZIP bytes.
    ///
    /// # Arguments
    /// * `bytes` - The complete package file contents
    ///
    /// # Errors
    /// Returns an error if the bytes are not a valid ZIP archive or the
    /// package is missing its [Content_Types].xml.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = PackageReader::from_bytes(bytes)?;
        let (parts, content_types, rels) = reader.into_package_data();

        let index = parts
            .iter()
            .enumerate()
            .map(|(i, part)| (part.partname().to_string(), i))
            .collect();

        Ok(Self {
            parts,
            index,
            content_types,
            rels,
        })
    }

    /// Serialize the package to ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::write(self)
    }

    /// Get a part by its partname.
    ///
    /// # Arguments
    /// * `partname` - The PackURI of the part to retrieve
    pub fn part(&self, partname: &PackURI) -> Result<&PackagePart> {
        self.index
            .get(partname.as_str())
            .map(|&i| &self.parts[i])
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Get a mutable reference to a part by its partname.
    pub fn part_mut(&mut self, partname: &PackURI) -> Result<&mut PackagePart> {
        match self.index.get(partname.as_str()) {
            Some(&i) => Ok(&mut self.parts[i]),
            None => Err(OpcError::PartNotFound(partname.to_string())),
        }
    }

    /// Check if a part exists in the package.
    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.index.contains_key(partname.as_str())
    }

    /// Get the content type of a part.
    ///
    /// Resolved through the package's content type map, so an Override
    /// declaration wins over an extension Default.
    pub fn content_type(&self, partname: &PackURI) -> Result<String> {
        self.content_types.get(partname)
    }

    /// Get the partname of the main document part.
    ///
    /// This follows the package-level officeDocument relationship, which for
    /// Word documents leads to /word/document.xml (though the partname is
    /// whatever the relationship says, not a hardcoded path).
    pub fn main_document_partname(&self) -> Result<PackURI> {
        let rel = self.rels.part_with_reltype(relationship_type::OFFICE_DOCUMENT)?;
        rel.target_partname()
    }

    /// Get a reference to the main document part.
    pub fn main_document_part(&self) -> Result<&PackagePart> {
        let partname = self.main_document_partname()?;
        self.part(&partname)
    }

    /// Get an iterator over all parts in archive order.
    pub fn parts(&self) -> impl Iterator<Item = &PackagePart> {
        self.parts.iter()
    }

    /// Get the number of parts in the package.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Get a reference to the package-level relationships.
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }
}

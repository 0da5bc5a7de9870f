//! Low-level, read-only API to a serialized Open Packaging Convention (OPC) package.
//!
//! This module provides the PackageReader for parsing OPC packages, including
//! content type mapping and package-level relationship resolution. Every Zip
//! member is kept as a part in archive order, so a package written back with
//! only some parts modified keeps the rest byte-identical.

use crate::opc::constants::target_mode;
use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use crate::opc::part::PackagePart;
use crate::opc::phys_pkg::PhysPkgReader;
use crate::opc::rel::Relationships;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::Cursor;

/// Content type map for looking up content types by part name or extension.
///
/// Implements the OPC content type discovery algorithm using Default and
/// Override elements from [Content_Types].xml. An Override for a specific
/// partname wins over a Default for its extension.
#[derive(Debug)]
pub(crate) struct ContentTypeMap {
    /// Maps file extensions to default content types
    defaults: HashMap<String, String>,

    /// Maps specific partnames to override content types
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    /// Create a new empty content type map.
    fn new() -> Self {
        Self {
            defaults: HashMap::new(),
            overrides: HashMap::new(),
        }
    }

    /// Parse content types from [Content_Types].xml.
    pub(crate) fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self::new();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    match e.local_name().as_ref() {
                        b"Default" => {
                            // <Default Extension="xml" ContentType="application/xml"/>
                            let mut extension = None;
                            let mut content_type = None;

                            for attr in e.attributes() {
                                let attr = attr?;
                                match attr.key.as_ref() {
                                    b"Extension" => {
                                        extension = Some(attr.unescape_value()?.to_string());
                                    },
                                    b"ContentType" => {
                                        content_type = Some(attr.unescape_value()?.to_string());
                                    },
                                    _ => {},
                                }
                            }

                            if let (Some(ext), Some(ct)) = (extension, content_type) {
                                map.add_default(ext, ct);
                            }
                        },
                        b"Override" => {
                            // <Override PartName="/word/document.xml" ContentType="..."/>
                            let mut partname = None;
                            let mut content_type = None;

                            for attr in e.attributes() {
                                let attr = attr?;
                                match attr.key.as_ref() {
                                    b"PartName" => {
                                        partname = Some(attr.unescape_value()?.to_string());
                                    },
                                    b"ContentType" => {
                                        content_type = Some(attr.unescape_value()?.to_string());
                                    },
                                    _ => {},
                                }
                            }

                            if let (Some(pn), Some(ct)) = (partname, content_type) {
                                map.add_override(pn, ct);
                            }
                        },
                        _ => {},
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!(
                        "Content types parse error: {}",
                        e
                    )));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Add a default content type mapping for a file extension.
    ///
    /// Extensions are matched case-insensitively, per the OPC spec.
    fn add_default(&mut self, extension: String, content_type: String) {
        self.defaults.insert(extension.to_lowercase(), content_type);
    }

    /// Add an override content type mapping for a specific partname.
    fn add_override(&mut self, partname: String, content_type: String) {
        self.overrides.insert(partname, content_type);
    }

    /// Get the content type for a partname.
    ///
    /// First checks for an override, then falls back to the default
    /// based on file extension.
    pub(crate) fn get(&self, pack_uri: &PackURI) -> Result<String> {
        // Check override first
        if let Some(ct) = self.overrides.get(pack_uri.as_str()) {
            return Ok(ct.clone());
        }

        // Fall back to default based on extension
        let ext = pack_uri.ext().to_lowercase();
        if let Some(ct) = self.defaults.get(&ext) {
            return Ok(ct.clone());
        }

        Err(OpcError::ContentTypeNotFound(pack_uri.to_string()))
    }
}

/// Parse a .rels file into a Relationships collection.
///
/// # Arguments
/// * `rels_xml` - The raw XML of the .rels part
/// * `base_uri` - Base URI of the relationship source, used to resolve
///   relative target references
pub(crate) fn parse_rels_xml(rels_xml: &[u8], base_uri: &str) -> Result<Relationships> {
    let mut rels = Relationships::new(base_uri.to_string());
    let mut reader = Reader::from_reader(rels_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut r_id = None;
                    let mut reltype = None;
                    let mut target_ref = None;
                    let mut mode = target_mode::INTERNAL.to_string();

                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Id" => r_id = Some(attr.unescape_value()?.to_string()),
                            b"Type" => reltype = Some(attr.unescape_value()?.to_string()),
                            b"Target" => target_ref = Some(attr.unescape_value()?.to_string()),
                            b"TargetMode" => mode = attr.unescape_value()?.to_string(),
                            _ => {},
                        }
                    }

                    if let (Some(id), Some(rt), Some(tr)) = (r_id, reltype, target_ref) {
                        rels.add_relationship(rt, tr, id, mode == target_mode::EXTERNAL);
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpcError::XmlError(format!("Rels parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(rels)
}

/// Package reader that loads every member of a serialized OPC package.
///
/// This is the entry point for reading OPC packages. It keeps all members as
/// parts in archive order and parses the two structural pieces every package
/// carries: the content type map and the package-level relationships.
pub(crate) struct PackageReader {
    /// All parts in the package, in archive order
    parts: Vec<PackagePart>,

    /// Content type map parsed from [Content_Types].xml
    content_types: ContentTypeMap,

    /// Package-level relationships parsed from /_rels/.rels
    pkg_rels: Relationships,
}

impl PackageReader {
    /// Open and parse an OPC package from a byte slice.
    ///
    /// # Errors
    /// Returns an error if the data is not a valid ZIP archive, if the
    /// required [Content_Types].xml member is missing, or if a structural
    /// part fails to parse.
    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut phys_reader = PhysPkgReader::new(Cursor::new(bytes))?;
        let members = phys_reader.read_all()?;

        let mut parts = Vec::with_capacity(members.len());
        let mut content_types = None;
        let mut pkg_rels = None;

        for (name, blob) in members {
            let partname = PackURI::new(format!("/{}", name))?;

            match partname.as_str() {
                CONTENT_TYPES_URI => {
                    content_types = Some(ContentTypeMap::from_xml(&blob)?);
                },
                "/_rels/.rels" => {
                    pkg_rels = Some(parse_rels_xml(&blob, "/")?);
                },
                _ => {},
            }

            parts.push(PackagePart::new(partname, blob));
        }

        let content_types = content_types
            .ok_or_else(|| OpcError::PartNotFound("[Content_Types].xml".to_string()))?;
        let pkg_rels = pkg_rels.unwrap_or_else(|| Relationships::new("/".to_string()));

        Ok(Self {
            parts,
            content_types,
            pkg_rels,
        })
    }

    /// Decompose the reader into its parts, content type map, and
    /// package-level relationships.
    pub(crate) fn into_package_data(self) -> (Vec<PackagePart>, ContentTypeMap, Relationships) {
        (self.parts, self.content_types, self.pkg_rels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::constants::relationship_type;
    use crate::opc::phys_pkg::PhysPkgWriter;

    #[test]
    fn test_content_type_map() {
        let xml = br#"<?xml version="1.0"?>
            <Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
                <Default Extension="xml" ContentType="application/xml"/>
                <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
                <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
            </Types>"#;

        let ct_map = ContentTypeMap::from_xml(xml).unwrap();

        let uri = PackURI::new("/test.xml").unwrap();
        assert_eq!(ct_map.get(&uri).unwrap(), "application/xml");

        let uri = PackURI::new("/word/document.xml").unwrap();
        assert_eq!(
            ct_map.get(&uri).unwrap(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"
        );

        let uri = PackURI::new("/word/media/image1.png").unwrap();
        assert!(matches!(
            ct_map.get(&uri),
            Err(OpcError::ContentTypeNotFound(_))
        ));
    }

    #[test]
    fn test_content_type_extension_case_insensitive() {
        let xml = br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
                <Default Extension="PNG" ContentType="image/png"/>
            </Types>"#;

        let ct_map = ContentTypeMap::from_xml(xml).unwrap();
        let uri = PackURI::new("/word/media/image1.png").unwrap();
        assert_eq!(ct_map.get(&uri).unwrap(), "image/png");
    }

    #[test]
    fn test_parse_rels_xml() {
        let xml = br#"<?xml version="1.0"?>
            <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
                <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
                <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/" TargetMode="External"/>
            </Relationships>"#;

        let rels = parse_rels_xml(xml, "/").unwrap();
        assert_eq!(rels.len(), 2);

        let main = rels.part_with_reltype(relationship_type::OFFICE_DOCUMENT).unwrap();
        assert_eq!(
            main.target_partname().unwrap().as_str(),
            "/word/document.xml"
        );

        let link = rels.get("rId2").unwrap();
        assert!(link.is_external());
    }

    #[test]
    fn test_from_bytes_requires_content_types() {
        let mut writer = PhysPkgWriter::new(Cursor::new(Vec::new()));
        writer.write("word/document.xml", b"<w:document/>").unwrap();
        let zip_data = writer.finish().unwrap().into_inner();

        assert!(matches!(
            PackageReader::from_bytes(&zip_data),
            Err(OpcError::PartNotFound(_))
        ));
    }

    #[test]
    fn test_from_bytes_keeps_member_order() {
        let mut writer = PhysPkgWriter::new(Cursor::new(Vec::new()));
        writer
            .write(
                "[Content_Types].xml",
                br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#,
            )
            .unwrap();
        writer.write("word/document.xml", b"<w:document/>").unwrap();
        writer.write("word/styles.xml", b"<w:styles/>").unwrap();
        let zip_data = writer.finish().unwrap().into_inner();

        let reader = PackageReader::from_bytes(&zip_data).unwrap();
        let (parts, _, _) = reader.into_package_data();
        let names: Vec<&str> = parts.iter().map(|p| p.partname().as_str()).collect();
        assert_eq!(
            names,
            vec![
                "/[Content_Types].xml",
                "/word/document.xml",
                "/word/styles.xml",
            ]
        );
    }
}

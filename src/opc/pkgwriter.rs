//! Serialization of an in-memory OPC package back to ZIP bytes.
//!
//! Parts are written in the order they were read, so an unmodified package
//! serializes with the same member layout it came from. Media parts are
//! stored without compression since image formats are already compressed.

use crate::opc::error::Result;
use crate::opc::package::OpcPackage;
use crate::opc::phys_pkg::PhysPkgWriter;
use std::io::Cursor;

/// Writes an OpcPackage to a ZIP archive.
pub(crate) struct PackageWriter;

impl PackageWriter {
    /// Serialize the package to ZIP bytes.
    pub(crate) fn write(package: &OpcPackage) -> Result<Vec<u8>> {
        let mut writer = PhysPkgWriter::new(Cursor::new(Vec::new()));

        for part in package.parts() {
            let membername = part.membername();
            if Self::is_media(membername) {
                writer.write_stored(membername, part.blob())?;
            } else {
                writer.write(membername, part.blob())?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    /// Check if a membername refers to embedded media.
    #[inline]
    fn is_media(membername: &str) -> bool {
        membername.starts_with("word/media/")
    }
}

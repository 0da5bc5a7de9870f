//! Provides a general interface to a physical OPC package (ZIP file).
//!
//! This module handles the low-level reading and writing of OPC packages as
//! ZIP archives. Reading preserves the archive's entry order so a package can
//! be written back with the same member layout it was read with.

use crate::opc::error::Result;
use std::io::{Read, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Physical package reader that provides access to the members of a ZIP-based
/// OPC package.
pub struct PhysPkgReader<R: Read + Seek> {
    /// The underlying ZIP archive
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> PhysPkgReader<R> {
    /// Create a new PhysPkgReader from a reader positioned at the start of
    /// a ZIP archive.
    ///
    /// # Errors
    /// Returns an error if the data is not a valid ZIP archive.
    pub fn new(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Read every member of the archive in stored order.
    ///
    /// Directory entries are skipped. Each member is returned as a
    /// `(membername, content)` pair, decompressed.
    pub fn read_all(&mut self) -> Result<Vec<(String, Vec<u8>)>> {
        let mut members = Vec::with_capacity(self.archive.len());

        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            members.push((name, blob));
        }

        Ok(members)
    }

    /// Get the number of entries in the archive (including directories).
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Check if the archive is empty.
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }
}

/// Physical package writer for creating OPC packages.
///
/// Writes parts to a ZIP archive in the order they are given.
pub struct PhysPkgWriter<W: Write + Seek> {
    /// The underlying ZIP archive writer
    archive: ZipWriter<W>,
}

impl<W: Write + Seek> PhysPkgWriter<W> {
    /// Create a new package writer over the given sink.
    pub fn new(writer: W) -> Self {
        Self {
            archive: ZipWriter::new(writer),
        }
    }

    /// Write a member to the package with Deflate compression.
    ///
    /// # Arguments
    /// * `membername` - The Zip membername for the part
    /// * `blob` - The binary content to write
    pub fn write(&mut self, membername: &str, blob: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.archive.start_file(membername, options)?;
        self.archive.write_all(blob)?;
        Ok(())
    }

    /// Write a member to the package without compression (stored).
    ///
    /// Used for already-compressed content like images, where deflating
    /// again wastes time for no size gain.
    pub fn write_stored(&mut self, membername: &str, blob: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.archive.start_file(membername, options)?;
        self.archive.write_all(blob)?;
        Ok(())
    }

    /// Finish writing and return the underlying sink.
    pub fn finish(self) -> Result<W> {
        Ok(self.archive.finish()?)
    }
}

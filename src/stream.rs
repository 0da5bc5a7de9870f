//! Backing stream abstraction for document handles.
//!
//! A document handle needs more than `Read + Write + Seek` from its backing
//! storage: writing a smaller package over a larger one must truncate the
//! tail, or stale ZIP bytes would be left past the new end of the file.
//! `DocumentStream` adds that truncation hook.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, Write};

/// A seekable byte store a document can be loaded from and saved back to.
pub trait DocumentStream: Read + Write + Seek {
    /// Truncate or extend the stream to exactly `size` bytes.
    fn set_len(&mut self, size: u64) -> io::Result<()>;
}

impl DocumentStream for File {
    fn set_len(&mut self, size: u64) -> io::Result<()> {
        File::set_len(self, size)
    }
}

impl DocumentStream for Cursor<Vec<u8>> {
    fn set_len(&mut self, size: u64) -> io::Result<()> {
        self.get_mut().resize(size as usize, 0);
        Ok(())
    }
}

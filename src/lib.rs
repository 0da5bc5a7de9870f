//! Docxtag - A Rust library for tag-based .docx template processing
//!
//! This library opens WordprocessingML (.docx) documents and works with the
//! placeholder tags and content controls inside them: list the tags written
//! between `|{` and `}|` delimiters, substitute their values, enumerate
//! content control aliases, and remove controls by alias.
//!
//! # Features
//!
//! - **Tag discovery**: Find `|{name}|` style tags, with custom delimiters
//! - **Tag replacement**: Substitute tag text even when a tag is split
//!   across formatting runs
//! - **Content controls**: List `<w:sdt>` elements with their tag and alias
//!   properties, and delete whole controls by alias
//! - **Faithful round-trip**: Untouched package parts are written back
//!   byte-for-byte, in their original order
//! - **File or stream**: Work on a path or on any seekable byte stream
//!
//! # Example - Filling in a template
//!
//! ```no_run
//! use docxtag::TagDocument;
//! use std::collections::HashMap;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = TagDocument::open("invoice.docx")?;
//!
//! // See which tags the template expects
//! for name in doc.tag_names()? {
//!     println!("tag: {}", name);
//! }
//!
//! // Fill them in
//! let mut values = HashMap::new();
//! values.insert("Customer".to_string(), "ACME Corp".to_string());
//! values.insert("Total".to_string(), "1,024.00".to_string());
//! doc.replace_tags(&values)?;
//! doc.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Removing optional sections
//!
//! ```no_run
//! use docxtag::TagDocument;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = TagDocument::open("contract.docx")?;
//!
//! // Content controls carry author-visible alias names
//! for alias in doc.alias_names()? {
//!     println!("section: {}", alias);
//! }
//!
//! // Drop the sections that do not apply
//! doc.remove_aliases(&["Appendix", "DraftWatermark"])?;
//! doc.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Working in memory
//!
//! ```no_run
//! use docxtag::TagDocument;
//! use std::io::Cursor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes: Vec<u8> = std::fs::read("report.docx")?;
//! let mut doc = TagDocument::from_stream(Cursor::new(bytes))?;
//! println!("{}", doc.text()?);
//! # Ok(())
//! # }
//! ```

/// Tag-oriented document handle
///
/// This module provides `TagDocument`, the main entry point for opening a
/// .docx file and running tag and content control operations against it.
pub mod document;

/// WordprocessingML document processing
///
/// This module parses the main document part: text extraction, tag
/// scanning, run-aware replacement, and content control handling.
pub mod docx;

/// Error types for document processing
pub mod error;

/// OPC (Open Packaging Conventions) package reader and writer
///
/// This module handles the ZIP container that .docx files are stored in,
/// including content types and package relationships.
pub mod opc;

/// Seekable read/write stream abstraction for document storage
pub mod stream;

/// XML escaping and byte-range splicing helpers
pub mod xml;

// Re-export commonly used types for convenience
pub use document::TagDocument;
pub use docx::{ContentControl, WordPackage};
pub use error::{DocxError, Result};
pub use stream::DocumentStream;

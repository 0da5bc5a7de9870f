//! Error types for document operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocxError>;

/// Error types for document operations.
#[derive(Error, Debug)]
pub enum DocxError {
    /// An argument failed validation (e.g., an empty path)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The document file does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The bytes are not a well-formed WordprocessingML package
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The package's main part has an unexpected content type
    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// Invalid tag delimiter pattern
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// OPC package error
    #[error("OPC error: {0}")]
    Opc(#[from] crate::opc::error::OpcError),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// UTF-8 conversion error
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<quick_xml::Error> for DocxError {
    fn from(err: quick_xml::Error) -> Self {
        DocxError::Xml(err.to_string())
    }
}

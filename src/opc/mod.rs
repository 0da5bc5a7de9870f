//! Open Packaging Conventions (OPC) implementation.
//!
//! This module provides the subset of the OPC specification needed to read
//! and rewrite Office Open XML documents:
//!
//! - Package structure (parts, relationships)
//! - Content type management
//! - ZIP-based physical packaging
//!
//! Parts are held as raw bytes in archive order, which keeps serialization
//! faithful: writing a package back only changes the members that were
//! actually modified.

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
mod pkgreader;
mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use error::OpcError;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::PackagePart;
pub use rel::{Relationship, Relationships};

//! Word document (.docx) support.
//!
//! This module provides WordprocessingML-specific functionality on top of
//! the OPC layer: loading and validating packages, extracting text, and the
//! tag and content control operations used for template processing.

pub mod package;
mod replace;
pub mod sdt;
pub mod tags;
pub mod text;

// Re-export commonly used types
pub use package::WordPackage;
pub use sdt::ContentControl;

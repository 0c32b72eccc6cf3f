//! PDF Core - Low-level PDF overlay
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents
//! - Using the standard Helvetica font (no embedding, WinAnsi encoding)
//! - Inserting text at specific coordinates
//! - Word-wrapping text against font metrics
//! - Inserting raster images (PNG, JPEG) with transparency
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{PdfDocument, StandardFont};
//!
//! let mut doc = PdfDocument::open_from_bytes(&template_bytes)?;
//! doc.set_font(StandardFont::Helvetica, 8.0);
//! doc.insert_text("Jane Doe", 1, 164.0, 655.0)?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod image;
mod text;

pub use document::{Color, PdfDocument};
pub use font::StandardFont;
pub use image::{detect_format, scaled_dimensions, ImageFormat, ImageXObject};
pub use text::{generate_text_operators, wrap_text, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("No font selected")]
    FontNotSet,

    #[error("Character {0:?} cannot be encoded in the standard font")]
    UnsupportedCharacter(char),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PdfError::InvalidPage(3, 1).to_string(),
            "Invalid page number: 3 (document has 1 pages)"
        );
        assert_eq!(
            PdfError::UnsupportedCharacter('ส').to_string(),
            "Character 'ส' cannot be encoded in the standard font"
        );
    }
}

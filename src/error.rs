//! Error types for pagemark.

use std::io;
use thiserror::Error;

/// Result type alias for pagemark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting page content to Markdown.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The decoded page stream is not valid JSON or does not match the schema.
    #[error("Invalid page stream: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is not a recognized page stream format.
    #[error("Unknown input format: expected a JSON page document, page array, or JSON Lines")]
    UnknownFormat,

    /// A page has no extractable content. Reported per page; the rest of the
    /// document is still converted.
    #[error("Extraction failed on page {page}: {reason}")]
    Extraction {
        /// Page number (1-indexed)
        page: u32,
        /// What made the page unreadable
        reason: String,
    },

    /// The classified block stream cannot be written as valid Markdown.
    /// Aborts emission of the whole document.
    #[error("Emission failed on page {page} at block {block}: {reason}")]
    Emission {
        /// Page number (1-indexed)
        page: u32,
        /// Index of the offending block within the page
        block: usize,
        /// What was malformed
        reason: String,
    },

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Error during rendering of auxiliary output (JSON, reports).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Create an extraction error for a page.
    pub fn extraction(page: u32, reason: impl Into<String>) -> Self {
        Error::Extraction {
            page,
            reason: reason.into(),
        }
    }

    /// Create an emission error for a block.
    pub fn emission(page: u32, block: usize, reason: impl Into<String>) -> Self {
        Error::Emission {
            page,
            block,
            reason: reason.into(),
        }
    }

    /// Check if this error only affects a single page.
    pub fn is_page_local(&self) -> bool {
        matches!(self, Error::Extraction { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::extraction(3, "no extractable objects");
        assert_eq!(
            err.to_string(),
            "Extraction failed on page 3: no extractable objects"
        );

        let err = Error::emission(2, 7, "duplicate cell at row 1, column 0");
        assert_eq!(
            err.to_string(),
            "Emission failed on page 2 at block 7: duplicate cell at row 1, column 0"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_page_local() {
        assert!(Error::extraction(1, "empty").is_page_local());
        assert!(!Error::emission(1, 0, "bad grid").is_page_local());
        assert!(!Error::UnknownFormat.is_page_local());
    }
}

//! Error types for the PDF tools MCP server.

use thiserror::Error;

/// Errors that can occur in the PDF tools MCP server.
///
/// Variants split into two groups. Rejections describe a bad request
/// (missing input, bad page range) and are answered as ordinary tool text.
/// Everything else is a fault raised by the filesystem or a PDF library and
/// ends the call as a tool error.
#[derive(Debug, Error)]
pub enum PdfToolsError {
    /// A file named by the caller does not exist.
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// The input document of an editing tool does not exist.
    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    /// A requested page range does not fit the document.
    #[error("Invalid page range. PDF has {total} pages.")]
    InvalidPageRange { total: usize },

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// lopdf parse or serialization error.
    #[error("lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),

    /// MuPDF library error.
    #[error("MuPDF error: {0}")]
    MupdfError(#[from] mupdf::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Internal error (unexpected state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfToolsError {
    /// Create an internal error with a message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is a caller-facing rejection rather than a fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. } | Self::InputNotFound { .. } | Self::InvalidPageRange { .. }
        )
    }
}

/// Result type for PDF tools MCP server operations.
pub type Result<T> = std::result::Result<T, PdfToolsError>;

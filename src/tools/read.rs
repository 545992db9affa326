//! Text and metadata extraction.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{PdfToolsError, Result};
use crate::pdf;

/// Placeholder for info fields the document does not set.
const NOT_AVAILABLE: &str = "N/A";

// ============== Read PDF ==============

/// Parameters for reading a PDF.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadPdfParams {
    /// Path to the PDF file to read.
    pub file_path: String,
}

/// Document info fields; missing ones read `"N/A"`.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PdfMetadata {
    pub title: String,
    pub author: String,
    pub creator: String,
}

/// Text of a single page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PageText {
    /// Page number (1-indexed).
    pub page: usize,
    /// Extracted plain text. Layout is not preserved; may be empty.
    pub text: String,
}

/// Result of reading a PDF.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ReadPdfResult {
    /// Total number of pages.
    pub num_pages: usize,
    /// Title, author and creator.
    pub metadata: PdfMetadata,
    /// Per-page text, in page order.
    pub pages: Vec<PageText>,
}

fn or_not_available(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Extract text and metadata from a PDF file.
pub fn read_pdf(params: ReadPdfParams) -> Result<ReadPdfResult> {
    if !Path::new(&params.file_path).exists() {
        return Err(PdfToolsError::FileNotFound {
            path: params.file_path,
        });
    }

    let extracted = pdf::extract_document(&params.file_path)?;
    let num_pages = extracted.page_count();

    let pages = extracted
        .page_texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| PageText { page: i + 1, text })
        .collect();

    let info = extracted.info;
    tracing::info!(file = %params.file_path, num_pages, "Read PDF");

    Ok(ReadPdfResult {
        num_pages,
        metadata: PdfMetadata {
            title: or_not_available(info.title),
            author: or_not_available(info.author),
            creator: or_not_available(info.creator),
        },
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_rejected() {
        let err = read_pdf(ReadPdfParams {
            file_path: "/nonexistent/missing.pdf".to_string(),
        })
        .unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(err.to_string(), "File not found: /nonexistent/missing.pdf");
    }

    #[test]
    fn test_result_wire_shape() {
        let result = ReadPdfResult {
            num_pages: 1,
            metadata: PdfMetadata {
                title: "T".to_string(),
                author: NOT_AVAILABLE.to_string(),
                creator: "C".to_string(),
            },
            pages: vec![PageText {
                page: 1,
                text: "hello".to_string(),
            }],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["num_pages"], 1);
        assert_eq!(value["metadata"]["author"], "N/A");
        assert_eq!(value["pages"][0]["page"], 1);
        assert_eq!(value["pages"][0]["text"], "hello");
    }
}

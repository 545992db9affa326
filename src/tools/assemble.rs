//! Merging documents and extracting page ranges.

use std::path::Path;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::error::{PdfToolsError, Result};
use crate::pdf::{self, PageAssembler};
use crate::state::OutputLocks;

// ============== Merge PDFs ==============

/// Parameters for merging PDFs.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MergePdfsParams {
    /// Paths of the PDF files to merge, in output order.
    pub input_paths: Vec<String>,
    /// Path where the merged PDF will be saved.
    pub output_path: String,
}

/// Concatenate every page of every input into `output_path`.
///
/// The first missing input aborts the call before anything is written.
pub fn merge_pdfs(locks: &OutputLocks, params: MergePdfsParams) -> Result<String> {
    if let Some(missing) = params
        .input_paths
        .iter()
        .find(|path| !Path::new(path.as_str()).exists())
    {
        return Err(PdfToolsError::FileNotFound {
            path: missing.clone(),
        });
    }

    let output = Path::new(&params.output_path);
    locks.with_output(output, || {
        let mut assembler = PageAssembler::new();
        for path in &params.input_paths {
            let source = pdf::load_document(Path::new(path))?;
            assembler.append_all(source)?;
            tracing::debug!(input = %path, pages = assembler.page_count(), "Appended input");
        }

        let num_pages = assembler.page_count();
        let mut merged = assembler.finish();
        pdf::write_document(&mut merged, output)?;
        tracing::info!(
            inputs = params.input_paths.len(),
            num_pages,
            output = %params.output_path,
            "Merged PDFs"
        );
        Ok(())
    })?;

    Ok(format!(
        "PDFs merged successfully. Saved to: {}",
        params.output_path
    ))
}

// ============== Extract Pages ==============

/// Parameters for extracting a page range.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtractPagesParams {
    /// Path to the input PDF file.
    pub input_path: String,
    /// Path where the extracted pages will be saved.
    pub output_path: String,
    /// First page to extract (1-indexed, inclusive).
    pub start_page: i64,
    /// Last page to extract (1-indexed, inclusive).
    pub end_page: i64,
}

/// Check `start..=end` against a document of `total` pages and return the
/// 0-indexed half-open range.
fn checked_range(start: i64, end: i64, total: usize) -> Result<(usize, usize)> {
    let invalid = || PdfToolsError::InvalidPageRange { total };

    if start < 1 || start > end {
        return Err(invalid());
    }
    let end = usize::try_from(end).map_err(|_| invalid())?;
    if end > total {
        return Err(invalid());
    }

    Ok((start as usize - 1, end))
}

/// Copy pages `start_page..=end_page` of `input_path` into `output_path`.
pub fn extract_pages(locks: &OutputLocks, params: ExtractPagesParams) -> Result<String> {
    if !Path::new(&params.input_path).exists() {
        return Err(PdfToolsError::InputNotFound {
            path: params.input_path,
        });
    }

    let output = Path::new(&params.output_path);
    locks.with_output(output, || {
        let source = pdf::load_document(Path::new(&params.input_path))?;
        let total = source.get_pages().len();
        let (start, end) = checked_range(params.start_page, params.end_page, total)?;

        let mut assembler = PageAssembler::new();
        assembler.append_range(source, start, end)?;
        let mut extracted = assembler.finish();
        pdf::write_document(&mut extracted, output)?;

        tracing::info!(
            input = %params.input_path,
            output = %params.output_path,
            start = params.start_page,
            end = params.end_page,
            "Extracted pages"
        );
        Ok(())
    })?;

    Ok(format!(
        "Pages {}-{} extracted successfully. Saved to: {}",
        params.start_page, params.end_page, params.output_path
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_range_valid() {
        assert_eq!(checked_range(2, 3, 5).unwrap(), (1, 3));
        assert_eq!(checked_range(1, 5, 5).unwrap(), (0, 5));
        assert_eq!(checked_range(4, 4, 5).unwrap(), (3, 4));
    }

    #[test]
    fn test_checked_range_bounds() {
        assert!(checked_range(0, 3, 5).is_err());
        assert!(checked_range(1, 6, 5).is_err());
        assert!(checked_range(-2, 1, 5).is_err());
    }

    #[test]
    fn test_checked_range_rejects_reversed() {
        let err = checked_range(4, 2, 5).unwrap_err();
        assert_eq!(err.to_string(), "Invalid page range. PDF has 5 pages.");
    }

    #[test]
    fn test_merge_reports_first_missing_input() {
        let locks = OutputLocks::new();
        let err = merge_pdfs(
            &locks,
            MergePdfsParams {
                input_paths: vec![
                    "/nonexistent/first.pdf".to_string(),
                    "/nonexistent/second.pdf".to_string(),
                ],
                output_path: "/nonexistent/out.pdf".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "File not found: /nonexistent/first.pdf");
    }
}

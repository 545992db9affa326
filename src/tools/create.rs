//! Document creation.

use std::path::Path;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::error::Result;
use crate::pdf;
use crate::state::OutputLocks;

// ============== Create PDF ==============

/// Parameters for creating a PDF.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreatePdfParams {
    /// Path where the PDF will be saved. An existing file is overwritten.
    pub output_path: String,
    /// Text content. Each line break starts a new line; long lines are not wrapped.
    pub text: String,
    /// Title drawn at the top of the page and stored in the document info.
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_title() -> String {
    "Document".to_string()
}

/// Create a one-page letter PDF holding `title` and `text`.
pub fn create_pdf(locks: &OutputLocks, params: CreatePdfParams) -> Result<String> {
    let output = Path::new(&params.output_path);

    locks.with_output(output, || {
        let mut doc = pdf::text_page_document(&params.title, &params.text)?;
        let bytes = pdf::write_document(&mut doc, output)?;
        tracing::info!(output = %params.output_path, bytes, "Created PDF");
        Ok(())
    })?;

    Ok(format!("PDF created successfully at: {}", params.output_path))
}

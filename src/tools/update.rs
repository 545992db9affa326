//! Adding text on top of an existing page.

use std::path::Path;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::error::{PdfToolsError, Result};
use crate::pdf;
use crate::state::OutputLocks;

// ============== Update PDF ==============

/// Parameters for updating a PDF.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdatePdfParams {
    /// Path to the input PDF file.
    pub input_path: String,
    /// Path where the updated PDF will be saved.
    pub output_path: String,
    /// Page to update (1-indexed).
    pub page_number: i64,
    /// Single line of text drawn near the bottom-left corner of the page.
    pub new_text: String,
}

/// Copy `input_path` to `output_path`, drawing `new_text` over one page.
///
/// A `page_number` outside the document matches no page: the document is
/// written unchanged and the call still succeeds.
pub fn update_pdf(locks: &OutputLocks, params: UpdatePdfParams) -> Result<String> {
    if !Path::new(&params.input_path).exists() {
        return Err(PdfToolsError::InputNotFound {
            path: params.input_path,
        });
    }

    let output = Path::new(&params.output_path);
    locks.with_output(output, || {
        let mut doc = pdf::load_document(Path::new(&params.input_path))?;
        let pages = pdf::page_ids(&doc);
        let overlay = pdf::Overlay::footer_line(&params.new_text);

        let target = params
            .page_number
            .checked_sub(1)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| pages.get(index).copied());

        match target {
            Some(page_id) => {
                pdf::apply_overlay(&mut doc, page_id, &overlay)?;
                tracing::debug!(page = params.page_number, "Applied overlay");
            }
            None => tracing::warn!(
                page = params.page_number,
                total = pages.len(),
                "Page number matches no page; writing document unchanged"
            ),
        }

        pdf::write_document(&mut doc, output)?;
        tracing::info!(
            input = %params.input_path,
            output = %params.output_path,
            "Updated PDF"
        );
        Ok(())
    })?;

    Ok(format!(
        "PDF updated successfully. Saved to: {}",
        params.output_path
    ))
}

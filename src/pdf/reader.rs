//! Text and metadata extraction with MuPDF.

use mupdf::{Document, MetadataName, Page, TextPageFlags};

use crate::error::Result;

/// Info dictionary entries surfaced to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoFields {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
}

/// Everything read out of a document in one pass.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Plain text of each page, in page order.
    pub page_texts: Vec<String>,
    pub info: InfoFields,
}

impl ExtractedDocument {
    pub fn page_count(&self) -> usize {
        self.page_texts.len()
    }
}

/// Open `path` as a PDF and extract the text of every page plus its info
/// fields.
///
/// The PDF handler is used whatever the file extension, so any other format
/// surfaces as a MuPDF error. The caller checks existence first.
pub fn extract_document(path: &str) -> Result<ExtractedDocument> {
    let bytes = std::fs::read(path)?;
    let doc = Document::from_bytes(&bytes, "application/pdf")?;
    let page_count = doc.page_count()?;

    let mut page_texts = Vec::with_capacity(page_count.max(0) as usize);
    for index in 0..page_count {
        let page = doc.load_page(index)?;
        page_texts.push(page_plain_text(&page)?);
    }

    Ok(ExtractedDocument {
        page_texts,
        info: info_fields(&doc),
    })
}

fn info_fields(doc: &Document) -> InfoFields {
    InfoFields {
        title: info_value(doc, MetadataName::Title),
        author: info_value(doc, MetadataName::Author),
        creator: info_value(doc, MetadataName::Creator),
    }
}

fn info_value(doc: &Document, name: MetadataName) -> Option<String> {
    doc.metadata(name).ok().filter(|s| !s.is_empty())
}

/// Best-effort plain text: one line per text line, a blank line between
/// blocks. Image-only pages yield an empty string.
fn page_plain_text(page: &Page) -> Result<String> {
    let text_page = page.to_text_page(TextPageFlags::empty())?;

    let mut result = String::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            for ch in line.chars() {
                if let Some(c) = ch.char() {
                    result.push(c);
                }
            }
            result.push('\n');
        }
        result.push('\n');
    }

    let trimmed = result.trim_end_matches('\n').len();
    result.truncate(trimmed);
    Ok(result)
}

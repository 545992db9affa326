//! PDF processing layer
//!
//! MuPDF reads documents; lopdf composes new pages and reassembles existing
//! ones.

pub mod assembly;
pub mod reader;
pub mod writer;

pub use assembly::{apply_overlay, load_document, page_ids, write_document, PageAssembler};
pub use reader::{extract_document, ExtractedDocument, InfoFields};
pub use writer::{text_page_document, Overlay};

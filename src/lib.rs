//! PDF Tools MCP Server library.
//!
//! This library provides an MCP server with five stateless PDF tools:
//! - `create_pdf`: write a one-page PDF holding a title and text
//! - `read_pdf`: extract per-page text and title/author/creator
//! - `update_pdf`: draw a line of text on top of one page
//! - `merge_pdfs`: concatenate several PDFs
//! - `extract_pages`: copy a page range into a new PDF

pub mod error;
pub mod pdf;
pub mod server;
pub mod state;
pub mod tools;

pub use error::{PdfToolsError, Result};
pub use server::PdfToolsServer;
pub use state::OutputLocks;

//! MCP tool implementations for PDF operations.

pub mod assemble;
pub mod create;
pub mod read;
pub mod update;

// Re-export common types
pub use assemble::*;
pub use create::*;
pub use read::*;
pub use update::*;

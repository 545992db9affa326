//! MCP server implementation with tool routing.

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, InitializeResult, JsonObject,
    ListToolsResult, PaginatedRequestParams, ServerCapabilities, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

use crate::error::{PdfToolsError, Result};
use crate::state::OutputLocks;
use crate::tools;

type ToolHandler = fn(&OutputLocks, JsonObject) -> std::result::Result<CallToolResult, McpError>;

/// One registered tool.
struct ToolEntry {
    name: &'static str,
    /// One-line summary for the startup banner.
    summary: &'static str,
    description: &'static str,
    input_schema: fn() -> JsonObject,
    handler: ToolHandler,
}

/// Every tool the server exposes. Fixed at compile time.
static TOOL_TABLE: [ToolEntry; 5] = [
    ToolEntry {
        name: "create_pdf",
        summary: "Create a new PDF with text content",
        description: "Create a one-page PDF at output_path with a bold title and the given text, one line per line break. Overwrites an existing file. Returns a status message.",
        input_schema: schema_of::<tools::CreatePdfParams>,
        handler: handle_create_pdf,
    },
    ToolEntry {
        name: "read_pdf",
        summary: "Extract text and metadata from a PDF",
        description: "Read a PDF and return {num_pages, metadata: {title, author, creator}, pages: [{page, text}]}. Missing metadata fields read \"N/A\". A missing file returns {\"error\": ...}.",
        input_schema: schema_of::<tools::ReadPdfParams>,
        handler: handle_read_pdf,
    },
    ToolEntry {
        name: "update_pdf",
        summary: "Add text to an existing PDF page",
        description: "Copy input_path to output_path, drawing new_text near the bottom of page page_number (1-indexed) on top of the existing content. Returns a status message or \"Error: ...\".",
        input_schema: schema_of::<tools::UpdatePdfParams>,
        handler: handle_update_pdf,
    },
    ToolEntry {
        name: "merge_pdfs",
        summary: "Merge multiple PDFs into one",
        description: "Concatenate all pages of input_paths, in order, into output_path. Nothing is written if any input is missing. Returns a status message or \"Error: ...\".",
        input_schema: schema_of::<tools::MergePdfsParams>,
        handler: handle_merge_pdfs,
    },
    ToolEntry {
        name: "extract_pages",
        summary: "Extract specific pages from a PDF",
        description: "Copy pages start_page..=end_page (1-indexed, inclusive) of input_path into output_path. Returns a status message or \"Error: ...\".",
        input_schema: schema_of::<tools::ExtractPagesParams>,
        handler: handle_extract_pages,
    },
];

fn schema_of<T: JsonSchema>() -> JsonObject {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(Value::Object(map)) => map,
        _ => JsonObject::new(),
    }
}

fn parse_params<T: DeserializeOwned>(args: JsonObject) -> std::result::Result<T, McpError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| McpError::invalid_params(e.to_string(), None))
}

// ============== Replies ==============

fn fault_reply(tool: &str, error: PdfToolsError) -> CallToolResult {
    tracing::error!(tool, error = %error, "Tool failed");
    CallToolResult::error(vec![Content::text(error.to_string())])
}

/// Tools answering with a status line report rejections as `"Error: ..."`.
fn status_reply(tool: &str, result: Result<String>) -> CallToolResult {
    match result {
        Ok(message) => CallToolResult::success(vec![Content::text(message)]),
        Err(e) if e.is_rejection() => {
            tracing::warn!(tool, error = %e, "Request rejected");
            CallToolResult::success(vec![Content::text(format!("Error: {}", e))])
        }
        Err(e) => fault_reply(tool, e),
    }
}

/// `read_pdf` answers with a JSON object and reports rejections as
/// `{"error": ...}`.
fn read_reply(result: Result<tools::ReadPdfResult>) -> CallToolResult {
    let json = match result {
        Ok(read) => serde_json::to_string(&read).map_err(PdfToolsError::from),
        Err(e) if e.is_rejection() => {
            tracing::warn!(tool = "read_pdf", error = %e, "Request rejected");
            Ok(serde_json::json!({ "error": e.to_string() }).to_string())
        }
        Err(e) => Err(e),
    };

    match json {
        Ok(json) => CallToolResult::success(vec![Content::text(json)]),
        Err(e) => fault_reply("read_pdf", e),
    }
}

// ============== Handlers ==============

fn handle_create_pdf(
    locks: &OutputLocks,
    args: JsonObject,
) -> std::result::Result<CallToolResult, McpError> {
    let params = parse_params(args)?;
    Ok(status_reply("create_pdf", tools::create_pdf(locks, params)))
}

fn handle_read_pdf(
    _locks: &OutputLocks,
    args: JsonObject,
) -> std::result::Result<CallToolResult, McpError> {
    let params = parse_params(args)?;
    Ok(read_reply(tools::read_pdf(params)))
}

fn handle_update_pdf(
    locks: &OutputLocks,
    args: JsonObject,
) -> std::result::Result<CallToolResult, McpError> {
    let params = parse_params(args)?;
    Ok(status_reply("update_pdf", tools::update_pdf(locks, params)))
}

fn handle_merge_pdfs(
    locks: &OutputLocks,
    args: JsonObject,
) -> std::result::Result<CallToolResult, McpError> {
    let params = parse_params(args)?;
    Ok(status_reply("merge_pdfs", tools::merge_pdfs(locks, params)))
}

fn handle_extract_pages(
    locks: &OutputLocks,
    args: JsonObject,
) -> std::result::Result<CallToolResult, McpError> {
    let params = parse_params(args)?;
    Ok(status_reply("extract_pages", tools::extract_pages(locks, params)))
}

// ============== Server ==============

/// PDF tools MCP server.
///
/// Stateless apart from the output path locks shared by concurrent calls.
#[derive(Clone, Default)]
pub struct PdfToolsServer {
    locks: OutputLocks,
}

impl PdfToolsServer {
    /// Create a new PDF tools MCP server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tool descriptors as advertised by `tools/list`.
    pub fn tools() -> Vec<Tool> {
        TOOL_TABLE
            .iter()
            .map(|entry| Tool {
                name: Cow::Borrowed(entry.name),
                title: None,
                description: Some(Cow::Borrowed(entry.description)),
                input_schema: Arc::new((entry.input_schema)()),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            })
            .collect()
    }

    /// `(name, summary)` pairs for the startup banner.
    pub fn banner() -> impl Iterator<Item = (&'static str, &'static str)> {
        TOOL_TABLE.iter().map(|entry| (entry.name, entry.summary))
    }

    /// Run the tool `name` with raw JSON arguments.
    ///
    /// PDF work is blocking, so it runs on the blocking thread pool.
    /// Malformed arguments and unknown tools are protocol errors; everything
    /// else comes back as a tool result.
    pub async fn dispatch(
        &self,
        name: &str,
        args: JsonObject,
    ) -> std::result::Result<CallToolResult, McpError> {
        let entry = TOOL_TABLE
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| McpError::invalid_params(format!("Unknown tool: {}", name), None))?;

        tracing::debug!(tool = entry.name, "Dispatching tool call");
        let handler = entry.handler;
        let locks = self.locks.clone();

        tokio::task::spawn_blocking(move || handler(&locks, args))
            .await
            .map_err(|e| McpError::internal_error(format!("Tool task failed: {}", e), None))?
    }
}

impl ServerHandler for PdfToolsServer {
    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: Default::default(),
            server_info: Implementation {
                name: "pdf-tools-mcp-server".to_string(),
                title: Some("PDF Tools MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Create, read, update, merge and split PDF files on the local filesystem. \
                 All paths are file paths; page numbers are 1-indexed. \
                 Tools that write take an output_path and overwrite it."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = std::result::Result<ListToolsResult, McpError>> + Send + '_
    {
        async move {
            Ok(ListToolsResult {
                tools: Self::tools(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = std::result::Result<CallToolResult, McpError>> + Send + '_
    {
        let name = request.name.clone();
        let args = request.arguments.clone().unwrap_or_default();

        async move { self.dispatch(&name, args).await }
    }
}

//! MCP (Model Context Protocol) server implementation.
//!
//! This module exposes repetition detection over the MCP protocol, making it
//! available to AI assistants (Claude Code, Cursor, etc.) via stdio transport.
//!
//! # Architecture
//!
//! The MCP server is a presentation layer. It wraps the same core library
//! that the CLI commands use, and each `#[tool]` method delegates to
//! `redund_core` rather than implementing detection itself.

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use redund_core::analysis::{self, DEFAULT_MAX_INPUT_CHARS, DetectorSettings};
use redund_core::batch::{self, BatchInput, BatchOptions};
use redund_core::error::AnalysisError;

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for the `find_repetitions` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct FindRepetitionsParams {
    /// The text to analyze. Line numbers in the result are 1-based.
    pub text: String,
}

/// A named document for batch analysis.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct DocumentParam {
    /// File name; the extension (.txt, .md, .html, .rtf) selects the extractor.
    pub name: String,
    /// Raw document content.
    pub content: String,
}

/// Parameters for the `find_repetitions_batch` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct FindRepetitionsBatchParams {
    /// Optional inline plain text, analyzed first.
    pub text: Option<String>,
    /// Documents to analyze, each reported separately.
    #[serde(default)]
    pub documents: Vec<DocumentParam>,
}

/// MCP server exposing repetition detection to AI assistants.
///
/// Each `#[tool]` method in the `#[tool_router]` impl block is automatically
/// registered and callable via the MCP protocol.
#[derive(Clone)]
pub struct ProjectServer {
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
    settings: DetectorSettings,
    max_input_chars: Option<usize>,
}

impl Default for ProjectServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl ProjectServer {
    /// Create a server with default thresholds and input limit.
    pub fn new() -> Self {
        Self::with_settings(DetectorSettings::default(), Some(DEFAULT_MAX_INPUT_CHARS))
    }

    /// Create a server with explicit thresholds and input limit.
    pub fn with_settings(settings: DetectorSettings, max_input_chars: Option<usize>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            settings,
            max_input_chars,
        }
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
        });

        let text = if params.format == "json" {
            to_json(&info)?
        } else {
            format!(
                "{} v{}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
            )
        };

        tracing::info!(tool = "get_info", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Find repeated sentences and phrases in a single text.
    #[tool(
        description = "Find sentences and phrases repeated on different lines of a text. Returns sentences, phrases (each with text, count and 1-based lines) and total_repeated."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn find_repetitions(
        &self,
        Parameters(params): Parameters<FindRepetitionsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(
            tool = "find_repetitions",
            text_len = params.text.len(),
            "executing MCP tool"
        );

        let report = analysis::analyze_bounded(&params.text, &self.settings, self.max_input_chars)
            .map_err(analysis_error)?;
        let json = to_json(&report)?;

        tracing::info!(
            tool = "find_repetitions",
            total_repeated = report.total_repeated,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Analyze inline text and named documents in one call.
    #[tool(
        description = "Find repetitions in inline text and/or named documents (.txt, .md, .html, .rtf). Each input is reported separately; a failing document does not stop the others."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn find_repetitions_batch(
        &self,
        Parameters(params): Parameters<FindRepetitionsBatchParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(
            tool = "find_repetitions_batch",
            documents = params.documents.len(),
            inline = params.text.is_some(),
            "executing MCP tool"
        );

        let inputs = params.text.into_iter().map(BatchInput::inline).chain(
            params
                .documents
                .into_iter()
                .map(|doc| BatchInput::document(doc.name, doc.content)),
        );
        let options = BatchOptions {
            settings: self.settings,
            max_input_chars: self.max_input_chars,
        };
        let report = batch::analyze_batch(inputs, &options).map_err(analysis_error)?;
        let json = to_json(&report)?;

        tracing::info!(
            tool = "find_repetitions_batch",
            total_repetitions = report.total_repetitions,
            errors = report.error_count(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

fn analysis_error(err: AnalysisError) -> McpError {
    McpError::invalid_params(err.to_string(), None)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))
}

#[tool_handler]
impl ServerHandler for ProjectServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Use find_repetitions for a single text or \
                 find_repetitions_batch for several documents.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}

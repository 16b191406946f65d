//! MCP server exposing the load-testing tools over stdio

pub mod results;
pub mod runner;
pub mod tools;

pub use results::{ResultStore, TestRecord};
pub use runner::{EngineRunner, RunRequest};
pub use tools::{LoadTestToolRegistry, McpTool, ToolExecutionContext, ToolRegistry};

use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;

use crate::protocol::{
    negotiate_protocol_version, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCapability,
    ToolsListResult, JSONRPC_VERSION,
};
use crate::{McpError, McpResult};

/// Name reported in the initialize result
pub const SERVER_NAME: &str = "stampede-mcp";

/// MCP server for the load-testing tools
#[derive(Clone)]
pub struct McpServer {
    /// Tool registry containing available tools
    tool_registry: Arc<dyn ToolRegistry>,

    /// Whether `initialize` has been handled
    initialized: Arc<RwLock<bool>>,
}

impl McpServer {
    pub fn new(tool_registry: Arc<dyn ToolRegistry>) -> Self {
        Self {
            tool_registry,
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Run the server on the process's stdin and stdout
    pub async fn run_stdio(&self) -> McpResult<()> {
        tracing::info!("Starting MCP server with stdio transport");
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve newline-delimited JSON-RPC messages until `reader` reaches EOF
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> McpResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        let mut request_count = 0u64;

        loop {
            buf.clear();
            let bytes_read = reader.read_until(b'\n', &mut buf).await?;
            if bytes_read == 0 {
                tracing::info!("Received EOF, shutting down MCP server");
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    request_count += 1;
                    tracing::warn!("Discarding message #{} that is not UTF-8: {}", request_count, e);
                    let response = JsonRpcResponse::error(
                        JsonRpcError::parse_error(format!("message is not valid UTF-8: {}", e)),
                        None,
                    );
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            let message = line.trim();
            if message.is_empty() {
                continue;
            }

            request_count += 1;
            tracing::debug!(
                "Received MCP message #{} ({} bytes): {}",
                request_count,
                bytes_read,
                message
            );

            match self.handle_message(message).await {
                Some(response) => {
                    tracing::debug!("Sending MCP response #{}", request_count);
                    write_response(&mut writer, &response).await?;
                }
                None => {
                    tracing::debug!("MCP message #{} was a notification", request_count);
                }
            }
        }

        tracing::info!(
            "MCP server loop terminated after {} messages",
            request_count
        );
        Ok(())
    }

    /// Handle one raw message; `None` when no response is due
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Discarding unparseable message: {}", e);
                return Some(JsonRpcResponse::error(
                    JsonRpcError::parse_error(e.to_string()),
                    None,
                ));
            }
        };

        let id = value.get("id").cloned().filter(|id| !id.is_null());
        let request = match parse_request(value) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("{}", e);
                return Some(JsonRpcResponse::error(
                    JsonRpcError::invalid_request(e.to_string()),
                    id,
                ));
            }
        };

        self.handle_request(request).await
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            self.handle_notification(&request).await;
            return None;
        }

        let request_id = request.id.clone();
        let response = match self.process_request(request).await {
            Ok(result) => JsonRpcResponse::success(result, request_id),
            Err(e) => {
                let json_rpc_error = match e {
                    McpError::MethodNotFound { method } => JsonRpcError::method_not_found(&method),
                    McpError::InvalidParams { details, .. } => {
                        JsonRpcError::invalid_params(details)
                    }
                    McpError::ToolNotFound { .. } => JsonRpcError::invalid_params(e.to_string()),
                    McpError::NotInitialized => JsonRpcError::server_not_initialized(),
                    _ => JsonRpcError::internal_error(e.to_string()),
                };
                JsonRpcResponse::error(json_rpc_error, request_id)
            }
        };
        Some(response)
    }

    /// Process a request (not a notification)
    async fn process_request(&self, request: JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => {
                let params: InitializeParams = match request.params {
                    Some(params) => serde_json::from_value(params)
                        .map_err(|e| McpError::invalid_params("initialize", e.to_string()))?,
                    None => {
                        return Err(McpError::invalid_params(
                            "initialize",
                            "Missing initialization parameters",
                        ))
                    }
                };
                let result = self.handle_initialize(params).await;
                Ok(serde_json::to_value(result)?)
            }

            "ping" => Ok(Value::Object(Default::default())),

            "tools/list" => {
                self.ensure_initialized().await?;
                let result = ToolsListResult {
                    tools: self.tool_registry.list_tools().await?,
                    next_cursor: None,
                };
                Ok(serde_json::to_value(result)?)
            }

            "tools/call" => {
                self.ensure_initialized().await?;
                let request_id = request.id_as_string();
                let params: ToolsCallParams = request
                    .params
                    .ok_or_else(|| McpError::invalid_params("tools/call", "Missing parameters"))
                    .and_then(|params| {
                        serde_json::from_value(params)
                            .map_err(|e| McpError::invalid_params("tools/call", e.to_string()))
                    })?;

                let context = ToolExecutionContext {
                    arguments: params.arguments,
                    request_id,
                };
                let result = self.tool_registry.execute_tool(&params.name, context).await?;
                Ok(serde_json::to_value(result)?)
            }

            method => Err(McpError::MethodNotFound {
                method: method.to_string(),
            }),
        }
    }

    /// Handle a notification (no response expected)
    async fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "initialized" | "notifications/initialized" => {
                let mut initialized = self.initialized.write().await;
                if !*initialized {
                    *initialized = true;
                    tracing::info!("MCP server initialized via notification");
                }
            }
            "notifications/cancelled" => {
                tracing::debug!("Received cancellation notification");
            }
            method => {
                tracing::warn!("Unknown notification method: {}", method);
            }
        }
    }

    async fn handle_initialize(&self, params: InitializeParams) -> InitializeResult {
        let client = params
            .client_info
            .as_ref()
            .map(|info| info.name.as_str())
            .unwrap_or("unknown client");
        let protocol_version = negotiate_protocol_version(&params.protocol_version);
        tracing::info!(
            "Initializing MCP server for {} (requested protocol {}, using {})",
            client,
            params.protocol_version,
            protocol_version
        );

        // Clients that never send the initialized notification still get tools
        *self.initialized.write().await = true;

        InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    async fn ensure_initialized(&self) -> McpResult<()> {
        if *self.initialized.read().await {
            Ok(())
        } else {
            Err(McpError::NotInitialized)
        }
    }
}

/// Write one response as a single line and flush it
async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> McpResult<()>
where
    W: AsyncWrite + Unpin,
{
    let response_json = serde_json::to_string(response)?;
    writer.write_all(response_json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

fn parse_request(value: Value) -> McpResult<JsonRpcRequest> {
    let request: JsonRpcRequest =
        serde_json::from_value(value).map_err(|e| McpError::InvalidJsonRpc {
            details: format!("Failed to parse JSON-RPC request: {}", e),
        })?;
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(McpError::InvalidJsonRpc {
            details: format!("Unsupported jsonrpc version '{}'", request.jsonrpc),
        });
    }
    Ok(request)
}

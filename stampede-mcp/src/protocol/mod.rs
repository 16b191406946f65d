//! MCP protocol implementation: JSON-RPC 2.0 plus the MCP message types

pub mod jsonrpc;
pub mod messages;

pub use jsonrpc::{
    JsonRpcError, JsonRpcErrorCode, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION,
};
pub use messages::{
    ClientInfo, InitializeParams, InitializeResult, ServerCapabilities, ServerInfo, Tool,
    ToolContent, ToolsCallParams, ToolsCallResult, ToolsCapability, ToolsListResult,
};

/// Protocol revisions this server speaks, newest first
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

/// Pick the protocol version to answer `initialize` with.
///
/// A supported client version is echoed back; anything else gets the newest
/// version and the client decides whether to continue.
pub fn negotiate_protocol_version(requested: &str) -> &'static str {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .find(|version| **version == requested)
        .copied()
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
}

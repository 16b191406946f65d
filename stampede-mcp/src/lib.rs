//! # Stampede MCP tool server
//!
//! Exposes load-run tooling to MCP clients over a newline-delimited
//! JSON-RPC 2.0 stdio channel:
//!
//! - **validate_config**: check a template file for the required keys
//! - **run_load_test**: run the external load engine against a template
//! - **create_basic_config**: write a minimal template for a host
//!
//! ```text
//! ┌──────────────┐  stdin/stdout  ┌───────────────┐  subprocess  ┌────────────┐
//! │  MCP client  │ ─────────────▶ │  McpServer    │ ───────────▶ │ load engine│
//! └──────────────┘                │  ToolRegistry │              └────────────┘
//!                                 └───────────────┘
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;

// Re-export commonly used types
pub use config::{EngineCommand, McpServerConfig};
pub use error::{McpError, McpResult, SubprocessFailure, ToolArgumentError};
pub use protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, Tool, ToolContent, ToolsCallParams,
    ToolsCallResult,
};
pub use server::{LoadTestToolRegistry, McpServer, McpTool, ResultStore, TestRecord, ToolRegistry};

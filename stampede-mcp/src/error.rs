//! Error types for MCP operations

use std::time::Duration;
use thiserror::Error;

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

/// A tool was called with missing or wrongly typed arguments
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ToolArgumentError {
    pub tool: String,
    pub message: String,
}

impl ToolArgumentError {
    pub fn new(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn missing(tool: &str, argument: &str) -> Self {
        Self::new(tool, format!("missing required argument `{}`", argument))
    }

    pub fn wrong_type(tool: &str, argument: &str, expected: &str) -> Self {
        Self::new(tool, format!("argument `{}` must be {}", argument, expected))
    }
}

/// The load engine could not be started or waited on
#[derive(Error, Debug)]
#[error("failed to run `{command}`: {source}")]
pub struct SubprocessFailure {
    pub command: String,
    #[source]
    pub source: std::io::Error,
}

/// Error type for MCP operations
#[derive(Error, Debug)]
pub enum McpError {
    /// Invalid JSON-RPC message
    #[error("Invalid JSON-RPC message: {details}")]
    InvalidJsonRpc { details: String },

    /// MCP method not found
    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    /// Invalid method parameters
    #[error("Invalid parameters for method {method}: {details}")]
    InvalidParams { method: String, details: String },

    /// Tool not found
    #[error("Unknown tool: {tool_name}")]
    ToolNotFound { tool_name: String },

    #[error(transparent)]
    ToolArgument(#[from] ToolArgumentError),

    #[error(transparent)]
    Subprocess(#[from] SubprocessFailure),

    /// The load engine exceeded its time budget and was killed
    #[error("Load engine timed out after {} seconds", timeout.as_secs())]
    Timeout { timeout: Duration },

    /// Tool methods called before `initialize`
    #[error("Server not initialized. Send 'initialize' request first.")]
    NotInitialized,

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {details}")]
    Serialization { details: String },
}

impl McpError {
    /// Create a tool not found error
    pub fn tool_not_found(tool_name: impl Into<String>) -> Self {
        Self::ToolNotFound {
            tool_name: tool_name.into(),
        }
    }

    /// Create an invalid params error
    pub fn invalid_params(method: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidParams {
            method: method.into(),
            details: details.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Serialization {
            details: err.to_string(),
        }
    }
}

impl From<stampede_config::ConfigError> for McpError {
    fn from(err: stampede_config::ConfigError) -> Self {
        McpError::Config {
            message: err.to_string(),
        }
    }
}

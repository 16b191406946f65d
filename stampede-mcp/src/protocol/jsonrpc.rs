//! JSON-RPC 2.0 envelopes as read from and written to the stdio transport

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of the `jsonrpc` member on every message
pub const JSONRPC_VERSION: &str = "2.0";

/// Incoming call or notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,

    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Absent on notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// The id rendered for log lines and tool contexts
    pub fn id_as_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Outgoing reply; exactly one of `result` and `error` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// Serialized as `null` when the request id could not be recovered
    pub id: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(result: Value, id: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(error: JsonRpcError, id: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Error member of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    fn with_details(code: JsonRpcErrorCode, details: Option<String>) -> Self {
        Self {
            code: code as i32,
            message: code.message().to_string(),
            data: details.map(Value::String),
        }
    }

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::with_details(JsonRpcErrorCode::ParseError, Some(details.into()))
    }

    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::with_details(JsonRpcErrorCode::InvalidRequest, Some(details.into()))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::with_details(
            JsonRpcErrorCode::MethodNotFound,
            Some(format!("Method '{}' not found", method)),
        )
    }

    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::with_details(JsonRpcErrorCode::InvalidParams, Some(details.into()))
    }

    pub fn internal_error(details: impl Into<String>) -> Self {
        Self::with_details(JsonRpcErrorCode::InternalError, Some(details.into()))
    }

    /// Tool calls that arrive before `initialize`
    pub fn server_not_initialized() -> Self {
        Self::with_details(JsonRpcErrorCode::ServerNotInitialized, None)
    }
}

/// Error codes the server replies with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum JsonRpcErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
    ServerNotInitialized = -32002,
}

impl JsonRpcErrorCode {
    /// Short message sent alongside the code
    pub fn message(self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::ServerNotInitialized => "Server not initialized",
        }
    }
}

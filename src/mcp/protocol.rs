//! JSON-RPC 2.0 envelope types for the MCP protocol.
//!
//! Decoding is deliberately lenient:
//!
//! - The `jsonrpc` member is not checked
//! - A missing or non-integer `id` is treated as `0`
//! - A message without a usable `method` is ignored (no response)
//!
//! Lines that are not JSON objects at all are protocol violations. The
//! caller logs them and moves on; they never produce a response either.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name for capability negotiation.
pub const SERVER_NAME: &str = "access-mcp";

/// Request ID used when the client sends none.
pub const DEFAULT_REQUEST_ID: i64 = 0;

/// A failure to decode a request line.
///
/// These are transport-layer failures. They are logged, never answered.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The line is not valid JSON.
    #[error("JSON parsing error: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The line is JSON but not an object.
    #[error("request is not a JSON object")]
    NotAnObject,

    /// A method that needs `params` was sent without them.
    #[error("missing params for method {method}")]
    MissingParams {
        /// The method that was called.
        method: String,
    },

    /// The `params` object does not have the expected shape.
    #[error("invalid params for method {method}: {message}")]
    InvalidParams {
        /// The method that was called.
        method: String,
        /// What was wrong.
        message: String,
    },
}

/// A decoded request envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    /// The request ID echoed in the response.
    pub id: i64,

    /// The method to invoke. Never empty.
    pub method: String,

    /// Parameters for the method, if present.
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Returns the params, failing if they are absent.
    ///
    /// # Errors
    ///
    /// Returns `MissingParams` if the request carried no `params` member.
    pub fn require_params(&self) -> Result<&Value, ProtocolError> {
        self.params
            .as_ref()
            .filter(|p| !p.is_null())
            .ok_or_else(|| ProtocolError::MissingParams {
                method: self.method.clone(),
            })
    }
}

/// Parameters for a `tools/call` request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    pub arguments: Value,
}

impl ToolCallParams {
    /// Extracts tool call parameters from a request.
    ///
    /// # Errors
    ///
    /// Returns an error if `params`, `params.name` or `params.arguments` is
    /// missing or has the wrong type.
    pub fn from_request(request: &JsonRpcRequest) -> Result<Self, ProtocolError> {
        let params = request.require_params()?;
        serde_json::from_value(params.clone()).map_err(|e| ProtocolError::InvalidParams {
            method: request.method.clone(),
            message: e.to_string(),
        })
    }
}

/// A JSON-RPC 2.0 response.
///
/// Every answered request gets one of these. Application failures travel
/// inside `result`, never as JSON-RPC error objects.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this response corresponds to.
    pub id: i64,

    /// The result of the method call.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Creates a new response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn new(id: i64, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result,
        }
    }
}

/// Decodes one request line.
///
/// Returns `Ok(None)` when the object has no usable `method`; such lines are
/// skipped without a response.
///
/// # Errors
///
/// Returns a `ProtocolError` if the line is not a JSON object.
pub fn parse_request(line: &str) -> Result<Option<JsonRpcRequest>, ProtocolError> {
    let value: Value = serde_json::from_str(line)?;
    let Value::Object(mut obj) = value else {
        return Err(ProtocolError::NotAnObject);
    };

    let method = match obj.get("method").and_then(Value::as_str) {
        Some(method) if !method.is_empty() => method.to_string(),
        _ => return Ok(None),
    };

    let id = obj
        .get("id")
        .and_then(Value::as_i64)
        .unwrap_or(DEFAULT_REQUEST_ID);

    Ok(Some(JsonRpcRequest {
        id,
        method,
        params: obj.remove("params"),
    }))
}

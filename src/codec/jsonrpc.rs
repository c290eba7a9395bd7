//! JSON-RPC 2.0 envelope types
//!
//! The canonical ACP transport is JSON-RPC 2.0 over newline-delimited UTF-8
//! text, one object per line. This module models only the envelope; method
//! dispatch and payload typing live in the codec.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only protocol version JSON-RPC 2.0 allows
pub const JSONRPC_VERSION: &str = "2.0";

/// One JSON-RPC message: request, notification, or response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcEnvelope {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorObject>,
}

/// The `error` member of a failed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcEnvelope {
    /// A request carrying an id
    pub fn request(id: u64, method: &str, params: Value) -> Self {
        JsonRpcEnvelope {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(Value::from(id)),
            method: Some(method.to_string()),
            params: Some(params),
            result: None,
            error: None,
        }
    }

    /// A notification: a request without an id
    pub fn notification(method: &str, params: Value) -> Self {
        JsonRpcEnvelope {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: None,
            method: Some(method.to_string()),
            params: Some(params),
            result: None,
            error: None,
        }
    }

    /// A successful response to the request with `id`
    pub fn response(id: Value, result: Value) -> Self {
        JsonRpcEnvelope {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: None,
            params: None,
            result: Some(result),
            error: None,
        }
    }

    /// Whether this envelope is a response (success or error)
    pub fn is_response(&self) -> bool {
        self.method.is_none() && self.id.is_some()
    }
}

/// Canonical map key for a JSON-RPC id
///
/// Ids may be numbers or strings; both forms get distinct keys so `1` and
/// `"1"` never collide.
pub fn id_key(id: &Value) -> Option<String> {
    match id {
        Value::Number(n) => Some(format!("n:{n}")),
        Value::String(s) => Some(format!("s:{s}")),
        _ => None,
    }
}

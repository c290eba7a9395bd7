//! JSON-RPC 2.0 codec for ACP messages
//!
//! The codec is the boundary between the wire and the domain model: it turns
//! newline-delimited JSON-RPC into [`crate::types::Message`] values and back.
//! The core never sees raw JSON; everything downstream of this module works
//! on decoded values.

mod decoder;
mod encoder;
mod jsonrpc;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use jsonrpc::{id_key, JsonRpcEnvelope, JsonRpcErrorObject, JSONRPC_VERSION};

use thiserror::Error;

use crate::types::Direction;

/// Why a frame could not be decoded or encoded
#[derive(Debug, Error)]
pub enum CodecError {
    /// The line is not valid JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The object is not a JSON-RPC 2.0 message
    #[error("not a JSON-RPC 2.0 message: {0}")]
    NotJsonRpc(String),

    /// The method does not exist in this direction
    #[error("unknown method {method:?} {direction}")]
    UnknownMethod { method: String, direction: Direction },

    /// Params or result did not match the method's schema
    #[error("invalid payload for {method}: {source}")]
    InvalidParams {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    /// A response whose id matches no request and whose shape is ambiguous
    #[error("cannot correlate response id {id}")]
    UncorrelatedResponse { id: String },

    /// A response to a method outside the modeled message set
    #[error("response to {method} is outside the modeled message set")]
    UnmodeledResponse { method: String },

    /// A JSON-RPC error response; these are transport-level failures, not
    /// ACP messages
    #[error("JSON-RPC error response {code}: {message}")]
    ErrorResponse { code: i64, message: String },
}

impl CodecError {
    /// Whether replay should skip this frame rather than report it
    ///
    /// Responses to unmodeled methods (e.g. permission outcomes) are part of
    /// healthy traffic; they are logged and skipped instead of failing a
    /// replay.
    pub fn is_skippable(&self) -> bool {
        matches!(self, CodecError::UnmodeledResponse { .. })
    }
}

//! Decoding JSON-RPC envelopes into ACP messages
//!
//! Requests and notifications dispatch on their method name. Responses carry
//! no method, so the decoder keeps a pending-request table keyed by id; a
//! response whose id was never seen falls back to shape sniffing, which
//! recovers initialize, prompt, and new-session results from trace
//! fragments.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::jsonrpc::{id_key, JsonRpcEnvelope, JSONRPC_VERSION};
use super::CodecError;
use crate::types::{
    AgentMessage, ClientMessage, Direction, InitializeParams, InitializeResult, Message,
    RequestPermissionParams, SessionCancelParams, SessionId, SessionLoadParams, SessionLoadResult,
    SessionNewParams, SessionNewResult, SessionPromptParams, SessionPromptResult,
    SessionUpdateParams, SetSessionModeParams, METHOD_INITIALIZE, METHOD_SESSION_CANCEL,
    METHOD_SESSION_LOAD, METHOD_SESSION_NEW, METHOD_SESSION_PROMPT,
    METHOD_SESSION_REQUEST_PERMISSION, METHOD_SESSION_SET_MODE, METHOD_SESSION_UPDATE,
};

/// A request whose response has not arrived yet
#[derive(Debug, Clone)]
struct PendingRequest {
    method: String,
    /// Session named in the request params, used when the response body
    /// omits it (load and prompt results on the real wire)
    session_id: Option<SessionId>,
}

/// Stateful JSON-RPC to ACP decoder for one connection
#[derive(Debug, Default)]
pub struct Decoder {
    pending: HashMap<String, PendingRequest>,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder::default()
    }

    /// Decode one line of newline-delimited JSON
    pub fn decode_line(&mut self, direction: Direction, line: &str) -> Result<Message, CodecError> {
        let envelope: JsonRpcEnvelope = serde_json::from_str(line)?;
        self.decode(direction, envelope)
    }

    /// Decode one envelope
    pub fn decode(
        &mut self,
        direction: Direction,
        envelope: JsonRpcEnvelope,
    ) -> Result<Message, CodecError> {
        if envelope.jsonrpc != JSONRPC_VERSION {
            return Err(CodecError::NotJsonRpc(format!(
                "jsonrpc version {:?}",
                envelope.jsonrpc
            )));
        }

        if let Some(error) = &envelope.error {
            return Err(CodecError::ErrorResponse {
                code: error.code,
                message: error.message.clone(),
            });
        }

        match envelope.method.clone() {
            Some(method) => self.decode_call(direction, method, envelope),
            None if envelope.is_response() => self.decode_response(direction, envelope),
            None => Err(CodecError::NotJsonRpc(
                "neither method nor response id present".to_string(),
            )),
        }
    }

    fn decode_call(
        &mut self,
        direction: Direction,
        method: String,
        envelope: JsonRpcEnvelope,
    ) -> Result<Message, CodecError> {
        let params = envelope.params.clone().unwrap_or(Value::Null);

        let message = match (direction, method.as_str()) {
            (Direction::FromClient, METHOD_INITIALIZE) => Message::FromClient(
                ClientMessage::Initialize(parse_params::<InitializeParams>(&method, params)?),
            ),
            (Direction::FromClient, METHOD_SESSION_NEW) => {
                // session/new params are all optional; tolerate their absence.
                let params = if params.is_null() {
                    SessionNewParams::default()
                } else {
                    parse_params::<SessionNewParams>(&method, params)?
                };
                Message::FromClient(ClientMessage::SessionNew(params))
            }
            (Direction::FromClient, METHOD_SESSION_LOAD) => Message::FromClient(
                ClientMessage::SessionLoad(parse_params::<SessionLoadParams>(&method, params)?),
            ),
            (Direction::FromClient, METHOD_SESSION_PROMPT) => Message::FromClient(
                ClientMessage::SessionPrompt(parse_params::<SessionPromptParams>(&method, params)?),
            ),
            (Direction::FromClient, METHOD_SESSION_CANCEL) => Message::FromClient(
                ClientMessage::SessionCancel(parse_params::<SessionCancelParams>(&method, params)?),
            ),
            (Direction::FromClient, METHOD_SESSION_SET_MODE) => {
                Message::FromClient(ClientMessage::SetSessionMode(parse_params::<
                    SetSessionModeParams,
                >(&method, params)?))
            }
            (Direction::FromAgent, METHOD_SESSION_UPDATE) => Message::FromAgent(
                AgentMessage::SessionUpdate(parse_params::<SessionUpdateParams>(&method, params)?),
            ),
            (Direction::FromAgent, METHOD_SESSION_REQUEST_PERMISSION) => {
                Message::FromAgent(AgentMessage::RequestPermission(parse_params::<
                    RequestPermissionParams,
                >(
                    &method, params
                )?))
            }
            _ => return Err(CodecError::UnknownMethod { method, direction }),
        };

        // Remember the request so its response can be correlated later.
        if let Some(key) = envelope.id.as_ref().and_then(id_key) {
            self.pending.insert(
                key,
                PendingRequest {
                    method,
                    session_id: message.session_id().cloned(),
                },
            );
        }

        Ok(message)
    }

    fn decode_response(
        &mut self,
        direction: Direction,
        envelope: JsonRpcEnvelope,
    ) -> Result<Message, CodecError> {
        let id = envelope.id.clone().unwrap_or(Value::Null);
        let result = envelope.result.clone().unwrap_or(Value::Null);

        let pending = id_key(&id).and_then(|key| self.pending.remove(&key));
        let Some(pending) = pending else {
            debug!(%id, "response id not correlated, sniffing shape");
            return sniff_response(direction, &id, result);
        };

        match pending.method.as_str() {
            METHOD_INITIALIZE => Ok(Message::FromAgent(AgentMessage::InitializeResult(
                parse_params::<InitializeResult>(&pending.method, result)?,
            ))),
            METHOD_SESSION_NEW => Ok(Message::FromAgent(AgentMessage::SessionNewResult(
                parse_params::<SessionNewResult>(&pending.method, result)?,
            ))),
            METHOD_SESSION_LOAD => {
                // The wire-level load response is empty; the session comes
                // from the request we correlated.
                let session_id = session_id_of(&result)
                    .or(pending.session_id)
                    .ok_or_else(|| CodecError::UncorrelatedResponse { id: id.to_string() })?;
                Ok(Message::FromAgent(AgentMessage::SessionLoadResult(
                    SessionLoadResult { session_id },
                )))
            }
            METHOD_SESSION_PROMPT => {
                let mut result = result;
                if session_id_of(&result).is_none() {
                    if let (Value::Object(map), Some(sid)) = (&mut result, &pending.session_id) {
                        map.insert("sessionId".to_string(), Value::from(sid.as_str()));
                    }
                }
                Ok(Message::FromAgent(AgentMessage::SessionPromptResult(
                    parse_params::<SessionPromptResult>(&pending.method, result)?,
                )))
            }
            method => Err(CodecError::UnmodeledResponse {
                method: method.to_string(),
            }),
        }
    }
}

/// Classify an uncorrelated response by its shape
fn sniff_response(
    direction: Direction,
    id: &Value,
    result: Value,
) -> Result<Message, CodecError> {
    if direction != Direction::FromAgent {
        return Err(CodecError::UncorrelatedResponse { id: id.to_string() });
    }

    let is_initialize = result.get("protocolVersion").is_some();
    let has_stop_reason = result.get("stopReason").is_some();
    let has_session_id = session_id_of(&result).is_some();

    if is_initialize {
        return Ok(Message::FromAgent(AgentMessage::InitializeResult(
            parse_params::<InitializeResult>("initialize", result)?,
        )));
    }
    if has_stop_reason {
        return Ok(Message::FromAgent(AgentMessage::SessionPromptResult(
            parse_params::<SessionPromptResult>("session/prompt", result)?,
        )));
    }
    if has_session_id {
        return Ok(Message::FromAgent(AgentMessage::SessionNewResult(
            parse_params::<SessionNewResult>("session/new", result)?,
        )));
    }

    Err(CodecError::UncorrelatedResponse { id: id.to_string() })
}

fn session_id_of(value: &Value) -> Option<SessionId> {
    value
        .get("sessionId")
        .and_then(Value::as_str)
        .map(SessionId::from)
}

fn parse_params<T: serde::de::DeserializeOwned>(
    method: &str,
    value: Value,
) -> Result<T, CodecError> {
    serde_json::from_value(value).map_err(|source| CodecError::InvalidParams {
        method: method.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StopReason;
    use serde_json::json;

    fn decode(decoder: &mut Decoder, direction: Direction, line: &str) -> Message {
        decoder.decode_line(direction, line).expect("should decode")
    }

    #[test]
    fn test_decode_initialize_request() {
        let mut decoder = Decoder::new();
        let message = decode(
            &mut decoder,
            Direction::FromClient,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":1,"clientCapabilities":{"fs":{"readTextFile":true,"writeTextFile":false},"terminal":false}}}"#,
        );

        match message {
            Message::FromClient(ClientMessage::Initialize(params)) => {
                assert_eq!(params.protocol_version.0, 1);
                assert!(params.client_capabilities.fs.read_text_file);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_correlated_initialize_result() {
        let mut decoder = Decoder::new();
        decode(
            &mut decoder,
            Direction::FromClient,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":1}}"#,
        );
        let message = decode(
            &mut decoder,
            Direction::FromAgent,
            r#"{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":1,"agentCapabilities":{"loadSession":true}}}"#,
        );

        match message {
            Message::FromAgent(AgentMessage::InitializeResult(result)) => {
                assert!(result.agent_capabilities.load_session);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_load_result_uses_request_session() {
        let mut decoder = Decoder::new();
        decode(
            &mut decoder,
            Direction::FromClient,
            r#"{"jsonrpc":"2.0","id":7,"method":"session/load","params":{"sessionId":"s-9"}}"#,
        );
        let message = decode(
            &mut decoder,
            Direction::FromAgent,
            r#"{"jsonrpc":"2.0","id":7,"result":null}"#,
        );

        assert_eq!(
            message,
            Message::FromAgent(AgentMessage::SessionLoadResult(SessionLoadResult {
                session_id: SessionId::from("s-9"),
            }))
        );
    }

    #[test]
    fn test_prompt_result_without_session_id_on_the_wire() {
        let mut decoder = Decoder::new();
        decode(
            &mut decoder,
            Direction::FromClient,
            r#"{"jsonrpc":"2.0","id":3,"method":"session/prompt","params":{"sessionId":"s-1","prompt":[{"type":"text","text":"hi"}]}}"#,
        );
        let message = decode(
            &mut decoder,
            Direction::FromAgent,
            r#"{"jsonrpc":"2.0","id":3,"result":{"stopReason":"end_turn"}}"#,
        );

        match message {
            Message::FromAgent(AgentMessage::SessionPromptResult(result)) => {
                assert_eq!(result.session_id, SessionId::from("s-1"));
                assert_eq!(result.stop_reason, StopReason::EndTurn);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_sniffs_uncorrelated_results() {
        let mut decoder = Decoder::new();

        let message = decode(
            &mut decoder,
            Direction::FromAgent,
            r#"{"jsonrpc":"2.0","id":99,"result":{"sessionId":"s-5"}}"#,
        );
        assert!(matches!(
            message,
            Message::FromAgent(AgentMessage::SessionNewResult(_))
        ));

        let message = decode(
            &mut decoder,
            Direction::FromAgent,
            r#"{"jsonrpc":"2.0","id":98,"result":{"sessionId":"s-5","stopReason":"cancelled"}}"#,
        );
        assert!(matches!(
            message,
            Message::FromAgent(AgentMessage::SessionPromptResult(_))
        ));
    }

    #[test]
    fn test_unknown_method_is_an_error() {
        let mut decoder = Decoder::new();
        let err = decoder
            .decode_line(
                Direction::FromClient,
                r#"{"jsonrpc":"2.0","id":1,"method":"session/fork","params":{}}"#,
            )
            .unwrap_err();
        assert!(matches!(err, CodecError::UnknownMethod { .. }));
    }

    #[test]
    fn test_wrong_direction_is_an_error() {
        let mut decoder = Decoder::new();
        let err = decoder
            .decode_line(
                Direction::FromAgent,
                r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":1}}"#,
            )
            .unwrap_err();
        assert!(matches!(err, CodecError::UnknownMethod { .. }));
    }

    #[test]
    fn test_error_response_is_surfaced() {
        let mut decoder = Decoder::new();
        let err = decoder
            .decode_line(
                Direction::FromAgent,
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"method not found"}}"#,
            )
            .unwrap_err();
        assert!(matches!(err, CodecError::ErrorResponse { code: -32601, .. }));
    }

    #[test]
    fn test_permission_response_is_unmodeled() {
        let mut decoder = Decoder::new();
        decode(
            &mut decoder,
            Direction::FromAgent,
            r#"{"jsonrpc":"2.0","id":12,"method":"session/request_permission","params":{"sessionId":"s-1","toolCall":{"toolCallId":"c-1"},"options":[]}}"#,
        );
        let err = decoder
            .decode_line(
                Direction::FromClient,
                r#"{"jsonrpc":"2.0","id":12,"result":{"outcome":{"outcome":"selected","optionId":"allow"}}}"#,
            )
            .unwrap_err();
        assert!(matches!(err, CodecError::UnmodeledResponse { .. }));
    }

    #[test]
    fn test_update_notification_decodes() {
        let mut decoder = Decoder::new();
        let message = decode(
            &mut decoder,
            Direction::FromAgent,
            r#"{"jsonrpc":"2.0","method":"session/update","params":{"sessionId":"s-1","update":{"sessionUpdate":"agent_message_chunk","content":{"type":"text","text":"hi"}}}}"#,
        );
        assert!(matches!(
            message,
            Message::FromAgent(AgentMessage::SessionUpdate(_))
        ));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let mut decoder = Decoder::new();
        assert!(matches!(
            decoder.decode_line(Direction::FromClient, "{not json"),
            Err(CodecError::Json(_))
        ));
    }
}

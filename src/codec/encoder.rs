//! Encoding ACP messages as JSON-RPC envelopes
//!
//! The encoder owns id assignment: requests get fresh sequential ids, and a
//! result message answers the oldest outstanding request of its method, the
//! way a well-behaved agent drains its queue. Notifications carry no id.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use super::jsonrpc::JsonRpcEnvelope;
use super::CodecError;
use crate::types::{AgentMessage, ClientMessage, Message};

/// Stateful ACP to JSON-RPC encoder for one connection
#[derive(Debug, Default)]
pub struct Encoder {
    next_id: u64,
    /// Outstanding request ids per method, drained FIFO by responses
    open_requests: HashMap<&'static str, VecDeque<u64>>,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder::default()
    }

    /// Encode one message as an envelope
    pub fn encode(&mut self, message: &Message) -> Result<JsonRpcEnvelope, CodecError> {
        match message {
            Message::FromClient(client) => self.encode_client(client),
            Message::FromAgent(agent) => self.encode_agent(agent),
        }
    }

    /// Encode one message as a newline-free JSON line
    pub fn encode_line(&mut self, message: &Message) -> Result<String, CodecError> {
        let envelope = self.encode(message)?;
        Ok(serde_json::to_string(&envelope)?)
    }

    fn encode_client(&mut self, message: &ClientMessage) -> Result<JsonRpcEnvelope, CodecError> {
        let method = message.method();
        let params = match message {
            ClientMessage::Initialize(p) => serde_json::to_value(p)?,
            ClientMessage::SessionNew(p) => serde_json::to_value(p)?,
            ClientMessage::SessionLoad(p) => serde_json::to_value(p)?,
            ClientMessage::SessionPrompt(p) => serde_json::to_value(p)?,
            ClientMessage::SessionCancel(p) => {
                // Notifications never carry an id.
                return Ok(JsonRpcEnvelope::notification(method, serde_json::to_value(p)?));
            }
            ClientMessage::SetSessionMode(p) => serde_json::to_value(p)?,
        };

        Ok(self.request(method, params))
    }

    fn encode_agent(&mut self, message: &AgentMessage) -> Result<JsonRpcEnvelope, CodecError> {
        let method = message.method();
        match message {
            AgentMessage::SessionUpdate(p) => {
                Ok(JsonRpcEnvelope::notification(method, serde_json::to_value(p)?))
            }
            AgentMessage::RequestPermission(p) => {
                let params = serde_json::to_value(p)?;
                Ok(self.request(method, params))
            }
            AgentMessage::InitializeResult(r) => Ok(self.response(method, serde_json::to_value(r)?)),
            AgentMessage::SessionNewResult(r) => Ok(self.response(method, serde_json::to_value(r)?)),
            AgentMessage::SessionLoadResult(r) => Ok(self.response(method, serde_json::to_value(r)?)),
            AgentMessage::SessionPromptResult(r) => {
                Ok(self.response(method, serde_json::to_value(r)?))
            }
        }
    }

    fn request(&mut self, method: &'static str, params: Value) -> JsonRpcEnvelope {
        self.next_id += 1;
        let id = self.next_id;
        self.open_requests.entry(method).or_default().push_back(id);
        JsonRpcEnvelope::request(id, method, params)
    }

    fn response(&mut self, method: &'static str, result: Value) -> JsonRpcEnvelope {
        // Answer the oldest outstanding request; fall back to a fresh id for
        // standalone results so trace fragments still encode.
        let id = match self.open_requests.get_mut(method).and_then(VecDeque::pop_front) {
            Some(id) => id,
            None => {
                self.next_id += 1;
                self.next_id
            }
        };
        JsonRpcEnvelope::response(Value::from(id), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Decoder;
    use crate::types::{
        ClientCapabilities, ContentBlock, Direction, InitializeParams, InitializeResult,
        ProtocolVersion, SessionCancelParams, SessionId, SessionLoadParams, SessionLoadResult,
        SessionNewParams, SessionNewResult, SessionPromptParams, SessionPromptResult,
        SessionUpdate, SessionUpdateParams, StopReason,
    };

    fn happy_trace() -> Vec<Message> {
        vec![
            Message::FromClient(ClientMessage::Initialize(InitializeParams {
                protocol_version: ProtocolVersion::CURRENT,
                client_capabilities: ClientCapabilities::default(),
            })),
            Message::FromAgent(AgentMessage::InitializeResult(InitializeResult {
                protocol_version: ProtocolVersion::CURRENT,
                agent_capabilities: Default::default(),
            })),
            Message::FromClient(ClientMessage::SessionNew(SessionNewParams::default())),
            Message::FromAgent(AgentMessage::SessionNewResult(SessionNewResult {
                session_id: SessionId::from("s-1"),
            })),
            Message::FromClient(ClientMessage::SessionLoad(SessionLoadParams {
                session_id: SessionId::from("s-1"),
                cwd: None,
            })),
            Message::FromAgent(AgentMessage::SessionLoadResult(SessionLoadResult {
                session_id: SessionId::from("s-1"),
            })),
            Message::FromClient(ClientMessage::SessionPrompt(SessionPromptParams {
                session_id: SessionId::from("s-1"),
                prompt: vec![ContentBlock::text("hello")],
            })),
            Message::FromAgent(AgentMessage::SessionUpdate(SessionUpdateParams {
                session_id: SessionId::from("s-1"),
                update: SessionUpdate::AgentMessageChunk(ContentBlock::text("hi")),
            })),
            Message::FromClient(ClientMessage::SessionCancel(SessionCancelParams {
                session_id: SessionId::from("s-1"),
            })),
            Message::FromAgent(AgentMessage::SessionPromptResult(SessionPromptResult {
                session_id: SessionId::from("s-1"),
                stop_reason: StopReason::Cancelled,
                usage: None,
            })),
        ]
    }

    #[test]
    fn test_round_trip_through_the_wire() {
        let mut encoder = Encoder::new();
        let mut decoder = Decoder::new();

        for message in happy_trace() {
            let line = encoder.encode_line(&message).expect("should encode");
            let decoded = decoder
                .decode_line(message.direction(), &line)
                .expect("should decode");
            assert_eq!(decoded, message);
        }
    }

    #[test]
    fn test_notifications_have_no_id() {
        let mut encoder = Encoder::new();
        let envelope = encoder
            .encode(&Message::FromClient(ClientMessage::SessionCancel(
                SessionCancelParams {
                    session_id: SessionId::from("s-1"),
                },
            )))
            .unwrap();
        assert!(envelope.id.is_none());
        assert_eq!(envelope.method.as_deref(), Some("session/cancel"));
    }

    #[test]
    fn test_responses_reuse_request_ids() {
        let mut encoder = Encoder::new();
        let request = encoder
            .encode(&Message::FromClient(ClientMessage::Initialize(
                InitializeParams {
                    protocol_version: ProtocolVersion::CURRENT,
                    client_capabilities: ClientCapabilities::default(),
                },
            )))
            .unwrap();
        let response = encoder
            .encode(&Message::FromAgent(AgentMessage::InitializeResult(
                InitializeResult {
                    protocol_version: ProtocolVersion::CURRENT,
                    agent_capabilities: Default::default(),
                },
            )))
            .unwrap();

        assert_eq!(request.id, response.id);
    }
}

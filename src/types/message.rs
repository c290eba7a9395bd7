//! The ACP message sum
//!
//! Every frame the sentinel evaluates is one [`Message`]: a client-to-agent
//! request/notification or an agent-to-client result/notification. Direction
//! is carried by the top-level variant tag, so the state machine never needs
//! an out-of-band direction flag.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::capabilities::{AgentCapabilities, ClientCapabilities};
use super::content::ContentBlock;
use super::id::{ProtocolVersion, SessionId};
use super::update::{SessionUpdate, StopReason, ToolCallUpdate};
use super::usage::TokenUsage;

/// Method name for `initialize`
pub const METHOD_INITIALIZE: &str = "initialize";
/// Method name for `session/new`
pub const METHOD_SESSION_NEW: &str = "session/new";
/// Method name for `session/load`
pub const METHOD_SESSION_LOAD: &str = "session/load";
/// Method name for `session/prompt`
pub const METHOD_SESSION_PROMPT: &str = "session/prompt";
/// Notification name for `session/cancel`
pub const METHOD_SESSION_CANCEL: &str = "session/cancel";
/// Method name for `session/set_mode`
pub const METHOD_SESSION_SET_MODE: &str = "session/set_mode";
/// Notification name for `session/update`
pub const METHOD_SESSION_UPDATE: &str = "session/update";
/// Method name for `session/request_permission`
pub const METHOD_SESSION_REQUEST_PERMISSION: &str = "session/request_permission";

/// Which side of the connection a frame came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Editor to agent
    FromClient,
    /// Agent to editor
    FromAgent,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::FromClient => f.write_str("fromClient"),
            Direction::FromAgent => f.write_str("fromAgent"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    /// Parse a direction, accepting the aliases found in trace files
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fromclient" | "client" | "c2a" | "c->a" => Ok(Direction::FromClient),
            "fromagent" | "agent" | "a2c" | "a->c" => Ok(Direction::FromAgent),
            other => Err(format!("unrecognized direction: {other:?}")),
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// --- Client-to-agent payloads ---

/// Parameters of the `initialize` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// The latest protocol version supported by the client
    pub protocol_version: ProtocolVersion,
    /// Capabilities supported by the client
    #[serde(default)]
    pub client_capabilities: ClientCapabilities,
}

/// Parameters of the `session/new` request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionNewParams {
    /// Working directory for the new session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

/// Parameters of the `session/load` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLoadParams {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

/// Parameters of the `session/prompt` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPromptParams {
    pub session_id: SessionId,
    /// The blocks of content that compose the user's message
    pub prompt: Vec<ContentBlock>,
}

/// Parameters of the `session/cancel` notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCancelParams {
    pub session_id: SessionId,
}

/// Parameters of the `session/set_mode` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSessionModeParams {
    pub session_id: SessionId,
    pub mode_id: String,
}

// --- Agent-to-client payloads ---

/// Result of the `initialize` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// The negotiated protocol version
    pub protocol_version: ProtocolVersion,
    /// Capabilities supported by the agent
    #[serde(default)]
    pub agent_capabilities: AgentCapabilities,
}

/// Result of the `session/new` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionNewResult {
    pub session_id: SessionId,
}

/// Result of the `session/load` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLoadResult {
    pub session_id: SessionId,
}

/// Result of the `session/prompt` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPromptResult {
    pub session_id: SessionId,
    /// Why the turn ended
    pub stop_reason: StopReason,
    /// Token usage for the turn, when the agent reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Parameters of the `session/update` notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdateParams {
    pub session_id: SessionId,
    pub update: SessionUpdate,
}

/// Parameters of the `session/request_permission` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPermissionParams {
    pub session_id: SessionId,
    /// The tool call that needs authorization
    pub tool_call: ToolCallUpdate,
    /// Options to present to the user
    pub options: Vec<PermissionOption>,
}

/// One choice presented to the user in a permission request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionOption {
    #[serde(rename = "optionId")]
    pub id: String,
    pub name: String,
    pub kind: PermissionOptionKind,
}

/// Hint about the nature of a permission option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionOptionKind {
    AllowOnce,
    AllowAlways,
    RejectOnce,
    RejectAlways,
}

// --- The message sums ---

/// Messages the client sends to the agent
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Initialize(InitializeParams),
    SessionNew(SessionNewParams),
    SessionLoad(SessionLoadParams),
    SessionPrompt(SessionPromptParams),
    SessionCancel(SessionCancelParams),
    SetSessionMode(SetSessionModeParams),
}

/// Messages the agent sends to the client
#[derive(Debug, Clone, PartialEq)]
pub enum AgentMessage {
    InitializeResult(InitializeResult),
    SessionNewResult(SessionNewResult),
    SessionLoadResult(SessionLoadResult),
    SessionPromptResult(SessionPromptResult),
    SessionUpdate(SessionUpdateParams),
    RequestPermission(RequestPermissionParams),
}

/// A decoded ACP message with its direction
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    FromClient(ClientMessage),
    FromAgent(AgentMessage),
}

impl ClientMessage {
    /// JSON-RPC method name of this message
    pub fn method(&self) -> &'static str {
        match self {
            ClientMessage::Initialize(_) => METHOD_INITIALIZE,
            ClientMessage::SessionNew(_) => METHOD_SESSION_NEW,
            ClientMessage::SessionLoad(_) => METHOD_SESSION_LOAD,
            ClientMessage::SessionPrompt(_) => METHOD_SESSION_PROMPT,
            ClientMessage::SessionCancel(_) => METHOD_SESSION_CANCEL,
            ClientMessage::SetSessionMode(_) => METHOD_SESSION_SET_MODE,
        }
    }

    /// The session this message addresses, when it addresses one
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            ClientMessage::Initialize(_) | ClientMessage::SessionNew(_) => None,
            ClientMessage::SessionLoad(p) => Some(&p.session_id),
            ClientMessage::SessionPrompt(p) => Some(&p.session_id),
            ClientMessage::SessionCancel(p) => Some(&p.session_id),
            ClientMessage::SetSessionMode(p) => Some(&p.session_id),
        }
    }
}

impl AgentMessage {
    /// Method name of the request this message answers, or of the
    /// notification itself
    pub fn method(&self) -> &'static str {
        match self {
            AgentMessage::InitializeResult(_) => METHOD_INITIALIZE,
            AgentMessage::SessionNewResult(_) => METHOD_SESSION_NEW,
            AgentMessage::SessionLoadResult(_) => METHOD_SESSION_LOAD,
            AgentMessage::SessionPromptResult(_) => METHOD_SESSION_PROMPT,
            AgentMessage::SessionUpdate(_) => METHOD_SESSION_UPDATE,
            AgentMessage::RequestPermission(_) => METHOD_SESSION_REQUEST_PERMISSION,
        }
    }

    /// The session this message concerns, when it concerns one
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            AgentMessage::InitializeResult(_) => None,
            AgentMessage::SessionNewResult(r) => Some(&r.session_id),
            AgentMessage::SessionLoadResult(r) => Some(&r.session_id),
            AgentMessage::SessionPromptResult(r) => Some(&r.session_id),
            AgentMessage::SessionUpdate(p) => Some(&p.session_id),
            AgentMessage::RequestPermission(p) => Some(&p.session_id),
        }
    }
}

impl Message {
    /// Which side of the connection produced this message
    pub fn direction(&self) -> Direction {
        match self {
            Message::FromClient(_) => Direction::FromClient,
            Message::FromAgent(_) => Direction::FromAgent,
        }
    }

    /// JSON-RPC method name of this message
    pub fn method(&self) -> &'static str {
        match self {
            Message::FromClient(m) => m.method(),
            Message::FromAgent(m) => m.method(),
        }
    }

    /// The session this message addresses, when it addresses one
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Message::FromClient(m) => m.session_id(),
            Message::FromAgent(m) => m.session_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_aliases() {
        for alias in ["fromClient", "CLIENT", "c2a", "C->A"] {
            assert_eq!(alias.parse::<Direction>().unwrap(), Direction::FromClient);
        }
        for alias in ["fromAgent", "agent", "A2C", "a->c"] {
            assert_eq!(alias.parse::<Direction>().unwrap(), Direction::FromAgent);
        }
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_method_names() {
        let msg = Message::FromClient(ClientMessage::SessionPrompt(SessionPromptParams {
            session_id: SessionId::from("s-1"),
            prompt: vec![],
        }));
        assert_eq!(msg.method(), "session/prompt");
        assert_eq!(msg.direction(), Direction::FromClient);

        let msg = Message::FromAgent(AgentMessage::SessionUpdate(SessionUpdateParams {
            session_id: SessionId::from("s-1"),
            update: SessionUpdate::AgentMessageChunk(ContentBlock::text("hi")),
        }));
        assert_eq!(msg.method(), "session/update");
        assert_eq!(msg.direction(), Direction::FromAgent);
    }

    #[test]
    fn test_session_id_extraction() {
        let init = Message::FromClient(ClientMessage::Initialize(InitializeParams {
            protocol_version: ProtocolVersion::CURRENT,
            client_capabilities: ClientCapabilities::default(),
        }));
        assert!(init.session_id().is_none());

        let cancel = Message::FromClient(ClientMessage::SessionCancel(SessionCancelParams {
            session_id: SessionId::from("s-9"),
        }));
        assert_eq!(cancel.session_id().unwrap().as_str(), "s-9");
    }

    #[test]
    fn test_prompt_result_wire_form() {
        let result = SessionPromptResult {
            session_id: SessionId::from("s-1"),
            stop_reason: StopReason::EndTurn,
            usage: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["sessionId"], "s-1");
        assert_eq!(json["stopReason"], "end_turn");
        assert!(json.get("usage").is_none());
    }
}

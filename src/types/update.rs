//! Session update notifications streamed by the agent
//!
//! `session/update` is the agent's streaming channel: message chunks, tool
//! call lifecycle, plans, and bookkeeping updates all arrive here. The update
//! payload is a tagged sum keyed by the `sessionUpdate` field; variants this
//! crate does not know are preserved as [`SessionUpdate::Unknown`] so the
//! validator can still reason about them.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::id::ToolCallId;
use super::usage::TokenUsage;
use crate::types::ContentBlock;

/// The closing classification of a prompt turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The turn ended successfully
    EndTurn,
    /// The agent reached its token budget
    MaxTokens,
    /// The agent reached the allowed number of requests between user turns
    MaxTurnRequests,
    /// The agent refused to continue
    Refusal,
    /// The turn was cancelled by the client
    Cancelled,
}

impl StopReason {
    /// Stable name used in assurance notes
    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::EndTurn => "end_turn",
            StopReason::MaxTokens => "max_tokens",
            StopReason::MaxTurnRequests => "max_turn_requests",
            StopReason::Refusal => "refusal",
            StopReason::Cancelled => "cancelled",
        }
    }
}

/// Execution status of a tool call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    /// Queued, not yet started
    #[default]
    Pending,
    /// Currently running
    InProgress,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

/// Category of a tool call, used for capability checks and UI affordances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Read,
    Edit,
    Delete,
    Move,
    Search,
    Execute,
    Think,
    Fetch,
    SwitchMode,
    #[default]
    Other,
}

impl ToolKind {
    /// Kinds that write through the client's `fs/write_text_file` capability
    pub fn writes_files(self) -> bool {
        matches!(self, ToolKind::Edit | ToolKind::Delete | ToolKind::Move)
    }

    /// Kinds that run through the client's terminal capability
    pub fn uses_terminal(self) -> bool {
        matches!(self, ToolKind::Execute)
    }
}

/// A file location a tool call touches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallLocation {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Notification that a new tool call was initiated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    #[serde(rename = "toolCallId")]
    pub id: ToolCallId,
    pub title: String,
    #[serde(default)]
    pub kind: ToolKind,
    #[serde(default)]
    pub status: ToolCallStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<ToolCallLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_input: Option<Value>,
}

/// Update on the status or results of an existing tool call
///
/// All fields except the id are optional; absent fields leave the previous
/// value untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallUpdate {
    #[serde(rename = "toolCallId")]
    pub id: ToolCallId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ToolKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ToolCallStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<Value>,
}

/// The agent's execution plan for a complex task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub entries: Vec<PlanEntry>,
}

/// A single step in an agent plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub content: String,
    pub priority: PlanEntryPriority,
    pub status: PlanEntryStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanEntryPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanEntryStatus {
    Pending,
    InProgress,
    Completed,
}

/// Session metadata pushed by the agent
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// The payload of a `session/update` notification
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// A chunk of the user's message being streamed back
    UserMessageChunk(ContentBlock),
    /// A chunk of the agent's response
    AgentMessageChunk(ContentBlock),
    /// A chunk of the agent's internal reasoning
    AgentThoughtChunk(ContentBlock),
    /// A new tool call was initiated
    ToolCall(ToolCall),
    /// An existing tool call changed
    ToolCallUpdate(ToolCallUpdate),
    /// The agent's execution plan
    Plan(Plan),
    /// Session metadata changed
    SessionInfoUpdate(SessionInfo),
    /// Cumulative token usage for the current turn
    UsageUpdate(TokenUsage),
    /// A variant this crate does not know; the raw object is preserved
    Unknown { name: String, raw: Value },
}

/// Wire tag field for session updates
const UPDATE_TAG: &str = "sessionUpdate";

/// Derive-backed mirror of the known variants
///
/// Kept private; [`SessionUpdate`] adds the `Unknown` catch-all on top.
#[derive(Serialize, Deserialize)]
#[serde(tag = "sessionUpdate", rename_all = "snake_case")]
enum KnownUpdate {
    UserMessageChunk { content: ContentBlock },
    AgentMessageChunk { content: ContentBlock },
    AgentThoughtChunk { content: ContentBlock },
    ToolCall(ToolCall),
    ToolCallUpdate(ToolCallUpdate),
    Plan(Plan),
    SessionInfoUpdate(SessionInfo),
    UsageUpdate(TokenUsage),
}

impl From<KnownUpdate> for SessionUpdate {
    fn from(known: KnownUpdate) -> Self {
        match known {
            KnownUpdate::UserMessageChunk { content } => SessionUpdate::UserMessageChunk(content),
            KnownUpdate::AgentMessageChunk { content } => SessionUpdate::AgentMessageChunk(content),
            KnownUpdate::AgentThoughtChunk { content } => SessionUpdate::AgentThoughtChunk(content),
            KnownUpdate::ToolCall(call) => SessionUpdate::ToolCall(call),
            KnownUpdate::ToolCallUpdate(update) => SessionUpdate::ToolCallUpdate(update),
            KnownUpdate::Plan(plan) => SessionUpdate::Plan(plan),
            KnownUpdate::SessionInfoUpdate(info) => SessionUpdate::SessionInfoUpdate(info),
            KnownUpdate::UsageUpdate(usage) => SessionUpdate::UsageUpdate(usage),
        }
    }
}

impl SessionUpdate {
    /// Wire name of the update variant
    pub fn name(&self) -> &str {
        match self {
            SessionUpdate::UserMessageChunk(_) => "user_message_chunk",
            SessionUpdate::AgentMessageChunk(_) => "agent_message_chunk",
            SessionUpdate::AgentThoughtChunk(_) => "agent_thought_chunk",
            SessionUpdate::ToolCall(_) => "tool_call",
            SessionUpdate::ToolCallUpdate(_) => "tool_call_update",
            SessionUpdate::Plan(_) => "plan",
            SessionUpdate::SessionInfoUpdate(_) => "session_info_update",
            SessionUpdate::UsageUpdate(_) => "usage_update",
            SessionUpdate::Unknown { name, .. } => name,
        }
    }

    /// The derive-backed mirror for known variants, or the raw object for
    /// unknown ones
    fn to_known(&self) -> Result<KnownUpdate, &Value> {
        Ok(match self {
            SessionUpdate::UserMessageChunk(content) => KnownUpdate::UserMessageChunk {
                content: content.clone(),
            },
            SessionUpdate::AgentMessageChunk(content) => KnownUpdate::AgentMessageChunk {
                content: content.clone(),
            },
            SessionUpdate::AgentThoughtChunk(content) => KnownUpdate::AgentThoughtChunk {
                content: content.clone(),
            },
            SessionUpdate::ToolCall(call) => KnownUpdate::ToolCall(call.clone()),
            SessionUpdate::ToolCallUpdate(update) => KnownUpdate::ToolCallUpdate(update.clone()),
            SessionUpdate::Plan(plan) => KnownUpdate::Plan(plan.clone()),
            SessionUpdate::SessionInfoUpdate(info) => KnownUpdate::SessionInfoUpdate(info.clone()),
            SessionUpdate::UsageUpdate(usage) => KnownUpdate::UsageUpdate(usage.clone()),
            SessionUpdate::Unknown { raw, .. } => return Err(raw),
        })
    }
}

impl Serialize for SessionUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_known() {
            Ok(known) => known.serialize(serializer),
            Err(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SessionUpdate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let name = raw
            .get(UPDATE_TAG)
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::custom(format!("missing `{UPDATE_TAG}` tag")))?
            .to_string();

        match serde_json::from_value::<KnownUpdate>(raw.clone()) {
            Ok(known) => Ok(known.into()),
            Err(_) => Ok(SessionUpdate::Unknown { name, raw }),
        }
    }
}

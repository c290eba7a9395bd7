//! Public domain types for the ACP sentinel
//!
//! This module contains the algebraic model of the protocol: identity
//! primitives, capability vectors, content blocks, the two-sided message sum,
//! and session updates. Everything here is an immutable value with value
//! equality; the state machine and validator consume these types without
//! ever mutating them.

mod capabilities;
mod content;
mod id;
mod message;
mod update;
mod usage;

pub use capabilities::{
    AgentCapabilities, ClientCapabilities, FileSystemCapability, McpCapabilities,
    PromptCapabilities,
};
pub use content::{ContentBlock, EmbeddedResource};
pub use id::{ProtocolVersion, SessionId, ToolCallId};
pub use message::{
    AgentMessage, ClientMessage, Direction, InitializeParams, InitializeResult, Message,
    PermissionOption, PermissionOptionKind, RequestPermissionParams, SessionCancelParams,
    SessionLoadParams, SessionLoadResult, SessionNewParams, SessionNewResult, SessionPromptParams,
    SessionPromptResult, SessionUpdateParams, SetSessionModeParams, METHOD_INITIALIZE,
    METHOD_SESSION_CANCEL, METHOD_SESSION_LOAD, METHOD_SESSION_NEW, METHOD_SESSION_PROMPT,
    METHOD_SESSION_REQUEST_PERMISSION, METHOD_SESSION_SET_MODE, METHOD_SESSION_UPDATE,
};
pub use update::{
    Plan, PlanEntry, PlanEntryPriority, PlanEntryStatus, SessionInfo, SessionUpdate, StopReason,
    ToolCall, ToolCallLocation, ToolCallStatus, ToolCallUpdate, ToolKind,
};
pub use usage::TokenUsage;

//! Capability vectors negotiated during initialization
//!
//! Capabilities are exchanged once per connection: the client advertises its
//! capabilities in the `initialize` request, the agent answers with its own in
//! the result. The semantic lane checks later traffic against both vectors.

use serde::{Deserialize, Serialize};

/// Capabilities advertised by the client in `initialize`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    /// File system operations the client will serve
    #[serde(default)]
    pub fs: FileSystemCapability,

    /// Whether the client serves the `terminal/*` method family
    #[serde(default)]
    pub terminal: bool,
}

/// File system capabilities a client may support
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemCapability {
    /// Whether the client serves `fs/read_text_file` requests
    #[serde(default)]
    pub read_text_file: bool,

    /// Whether the client serves `fs/write_text_file` requests
    #[serde(default)]
    pub write_text_file: bool,
}

/// Capabilities advertised by the agent in the `initialize` result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// Whether the agent supports `session/load`
    #[serde(default)]
    pub load_session: bool,

    /// MCP transports the agent can connect to
    #[serde(default)]
    pub mcp_capabilities: McpCapabilities,

    /// Content block kinds the agent accepts in `session/prompt`
    #[serde(default)]
    pub prompt_capabilities: PromptCapabilities,
}

/// MCP transport support advertised by the agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpCapabilities {
    /// Agent can connect to MCP servers over HTTP
    #[serde(default)]
    pub http: bool,

    /// Agent can connect to MCP servers over SSE
    #[serde(default)]
    pub sse: bool,
}

/// Prompt content kinds the agent accepts beyond the text baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptCapabilities {
    /// Agent accepts audio content blocks
    #[serde(default)]
    pub audio: bool,

    /// Agent accepts image content blocks
    #[serde(default)]
    pub image: bool,

    /// Agent accepts embedded resource context in prompts
    #[serde(default)]
    pub embedded_context: bool,
}

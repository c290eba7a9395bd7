//! Content blocks carried by prompts and streamed message chunks

use serde::{Deserialize, Serialize};

/// A single block of prompt or message content
///
/// Text is the baseline every agent must accept; the other kinds are gated by
/// the agent's `promptCapabilities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text content
    Text { text: String },

    /// Base64-encoded image data
    #[serde(rename_all = "camelCase")]
    Image { data: String, mime_type: String },

    /// Base64-encoded audio data
    #[serde(rename_all = "camelCase")]
    Audio { data: String, mime_type: String },

    /// A link to a resource the agent may fetch on its own
    ResourceLink { uri: String, name: String },

    /// A resource embedded directly in the message
    Resource { resource: EmbeddedResource },
}

/// Resource contents embedded in a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedResource {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentBlock {
    /// Create a text block
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// The text payload, if this is a text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Stable kind name used in capability findings
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Text { .. } => "text",
            ContentBlock::Image { .. } => "image",
            ContentBlock::Audio { .. } => "audio",
            ContentBlock::ResourceLink { .. } => "resource_link",
            ContentBlock::Resource { .. } => "resource",
        }
    }
}

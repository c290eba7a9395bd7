//! Identity primitives for the ACP domain

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque session identifier
///
/// Unique within a connection. Equality is by value; the sentinel never
/// inspects the contents beyond checking for emptiness.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the id is empty (empty ids are never valid on the wire)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        SessionId(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        SessionId(id)
    }
}

/// Opaque tool call identifier
///
/// Unique within a session's active prompt turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolCallId(String);

impl ToolCallId {
    /// Create a new tool call id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        ToolCallId(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolCallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToolCallId {
    fn from(id: &str) -> Self {
        ToolCallId(id.to_string())
    }
}

/// ACP protocol version
///
/// A nonnegative integer; `1` is the contemporary value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProtocolVersion(pub u32);

impl ProtocolVersion {
    /// The protocol version this crate was written against
    pub const CURRENT: ProtocolVersion = ProtocolVersion(1);
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_value_equality() {
        assert_eq!(SessionId::from("s-1"), SessionId::new("s-1"));
        assert_ne!(SessionId::from("s-1"), SessionId::from("s-2"));
    }

    #[test]
    fn test_session_id_empty() {
        assert!(SessionId::new("").is_empty());
        assert!(!SessionId::new("s").is_empty());
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let sid = SessionId::from("s-42");
        assert_eq!(serde_json::to_string(&sid).unwrap(), "\"s-42\"");

        let tid: ToolCallId = serde_json::from_str("\"call-1\"").unwrap();
        assert_eq!(tid.as_str(), "call-1");
    }

    #[test]
    fn test_protocol_version() {
        assert_eq!(ProtocolVersion::CURRENT, ProtocolVersion(1));
        let v: ProtocolVersion = serde_json::from_str("1").unwrap();
        assert_eq!(v, ProtocolVersion::CURRENT);
    }
}

//! One line of a JSONL trace

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::types::Direction;

/// A captured frame: when it was seen, who sent it, and the raw message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub ts: Timestamp,
    pub direction: Direction,
    /// The embedded JSON-RPC message, verbatim
    pub json: String,
}

/// A trace timestamp: ISO-8601 text or Unix milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestamp {
    Millis(i64),
    Iso(DateTime<FixedOffset>),
}

impl Timestamp {
    /// The instant as Unix milliseconds
    pub fn as_millis(&self) -> i64 {
        match self {
            Timestamp::Millis(ms) => *ms,
            Timestamp::Iso(dt) => dt.timestamp_millis(),
        }
    }

    /// The instant in UTC
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Timestamp::Millis(ms) => Utc
                .timestamp_millis_opt(*ms)
                .single()
                .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap()),
            Timestamp::Iso(dt) => dt.with_timezone(&Utc),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Timestamp::Millis(ms) => serializer.serialize_i64(*ms),
            Timestamp::Iso(dt) => serializer.serialize_str(&dt.to_rfc3339()),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_i64()
                .map(Timestamp::Millis)
                .ok_or_else(|| D::Error::custom("timestamp out of range")),
            Value::String(text) => DateTime::parse_from_rfc3339(&text)
                .map(Timestamp::Iso)
                .map_err(|err| D::Error::custom(format!("invalid ISO-8601 timestamp: {err}"))),
            other => Err(D::Error::custom(format!(
                "timestamp must be a number or string, got {other}"
            ))),
        }
    }
}

//! Canonical JSONL trace format
//!
//! A trace file holds one record per line: `{ts, direction, json}` where
//! `ts` is ISO-8601 or Unix milliseconds, `direction` accepts the usual
//! aliases, and `json` is the embedded JSON-RPC message as a string. This is
//! the contract between the sentinel and every tool that captures ACP
//! traffic.

mod record;

pub use record::{TraceRecord, Timestamp};

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::codec::{CodecError, Decoder};
use crate::validate::Frame;

/// Why a trace file could not be loaded
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("cannot read trace file: {0}")]
    Io(#[from] std::io::Error),

    /// A line is not a valid trace record
    #[error("line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A record's embedded message failed to decode
    #[error("line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: CodecError,
    },
}

/// A trace decoded into frames ready for validation
#[derive(Debug, Default)]
pub struct DecodedTrace {
    /// Frames in trace order; `raw_len` is the embedded message's byte length
    pub frames: Vec<Frame>,
    /// 1-based line numbers of records that were skipped as unmodeled
    pub skipped_lines: Vec<usize>,
}

/// Parse the records of a JSONL trace
pub fn parse_records(text: &str) -> Result<Vec<TraceRecord>, TraceError> {
    let mut records = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: TraceRecord =
            serde_json::from_str(line).map_err(|source| TraceError::Record {
                line: number + 1,
                source,
            })?;
        records.push(record);
    }
    Ok(records)
}

/// Decode trace records into validation frames
///
/// Unmodeled responses (e.g. permission outcomes) are healthy traffic the
/// sentinel does not evaluate; they are skipped with a note. Everything else
/// that fails to decode aborts the load.
pub fn decode_records(records: &[TraceRecord]) -> Result<DecodedTrace, TraceError> {
    let mut decoder = Decoder::new();
    let mut decoded = DecodedTrace::default();

    for (number, record) in records.iter().enumerate() {
        let line = number + 1;
        match decoder.decode_line(record.direction, &record.json) {
            Ok(message) => {
                decoded
                    .frames
                    .push(Frame::sized(message, record.json.len()));
            }
            Err(err) if err.is_skippable() => {
                debug!(line, %err, "skipping unmodeled record");
                decoded.skipped_lines.push(line);
            }
            Err(source) => return Err(TraceError::Decode { line, source }),
        }
    }

    if !decoded.skipped_lines.is_empty() {
        warn!(
            skipped = decoded.skipped_lines.len(),
            "trace contained unmodeled records"
        );
    }

    Ok(decoded)
}

/// Read and decode a trace file
pub fn load_trace(path: &Path) -> Result<DecodedTrace, TraceError> {
    let text = fs::read_to_string(path)?;
    let records = parse_records(&text)?;
    decode_records(&records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Message};

    const HANDSHAKE: &str = concat!(
        r#"{"ts":1722500000000,"direction":"c2a","json":"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{\"protocolVersion\":1}}"}"#,
        "\n",
        r#"{"ts":"2026-08-01T09:00:01Z","direction":"agent","json":"{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"protocolVersion\":1}}"}"#,
        "\n",
    );

    #[test]
    fn test_parse_records_with_mixed_timestamps_and_aliases() {
        let records = parse_records(HANDSHAKE).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].direction, Direction::FromClient);
        assert_eq!(records[1].direction, Direction::FromAgent);
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let text = format!("\n{HANDSHAKE}\n\n");
        assert_eq!(parse_records(&text).unwrap().len(), 2);
    }

    #[test]
    fn test_decode_records_produces_sized_frames() {
        let records = parse_records(HANDSHAKE).unwrap();
        let decoded = decode_records(&records).unwrap();

        assert_eq!(decoded.frames.len(), 2);
        assert!(decoded.skipped_lines.is_empty());
        assert_eq!(decoded.frames[0].raw_len, Some(records[0].json.len()));
        assert!(matches!(decoded.frames[0].message, Message::FromClient(_)));
    }

    #[test]
    fn test_bad_record_reports_line_number() {
        let text = format!("{HANDSHAKE}{{\"direction\":\"c2a\"}}\n");
        let err = parse_records(&text).unwrap_err();
        match err {
            TraceError::Record { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_embedded_message_reports_line_number() {
        let text = concat!(
            r#"{"ts":0,"direction":"c2a","json":"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"bogus/method\",\"params\":{}}"}"#,
            "\n",
        );
        let records = parse_records(text).unwrap();
        let err = decode_records(&records).unwrap_err();
        match err {
            TraceError::Decode { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected {other:?}"),
        }
    }
}

//! Findings: the validator's output vocabulary
//!
//! A finding is a lane-and-severity-tagged verdict about one subject. Error
//! and warning findings carry a `Failure` with a stable dotted code; info
//! findings carry a human-readable note. The `traceIndex`, when present,
//! indexes the ordered input sequence consumed so far.

use std::fmt;

use serde::Serialize;

use crate::protocol::ProtocolError;
use crate::types::{SessionId, ToolCallId};

/// Category of validation rules a finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Protocol,
    Session,
    Transport,
    Semantic,
    Capability,
    Eval,
    Assurance,
}

impl Lane {
    /// Canonical ordering rank within one trace index
    ///
    /// Protocol findings come first, then transport, then semantic and
    /// capability together, then eval. Assurance findings are
    /// connection-level and sort after everything indexed. The driver sorts
    /// every report by `(trace_index, rank)` before returning it.
    pub fn rank(self) -> u8 {
        match self {
            Lane::Protocol => 0,
            Lane::Session => 1,
            Lane::Transport => 2,
            Lane::Semantic | Lane::Capability => 3,
            Lane::Eval => 4,
            Lane::Assurance => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Lane::Protocol => "protocol",
            Lane::Session => "session",
            Lane::Transport => "transport",
            Lane::Semantic => "semantic",
            Lane::Capability => "capability",
            Lane::Eval => "eval",
            Lane::Assurance => "assurance",
        }
    }
}

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// What a finding is about
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Subject {
    /// The connection as a whole
    Connection,
    /// One session
    Session(SessionId),
    /// The n-th prompt turn of a session (1-based)
    PromptTurn(SessionId, u32),
    /// The message at a trace index, identified by its method name
    MessageAt(usize, String),
    /// One tool call
    ToolCall(ToolCallId),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Connection => f.write_str("connection"),
            Subject::Session(sid) => write!(f, "session {sid}"),
            Subject::PromptTurn(sid, n) => write!(f, "turn {n} of {sid}"),
            Subject::MessageAt(i, method) => write!(f, "message {i}: {method}"),
            Subject::ToolCall(id) => write!(f, "tool call {id}"),
        }
    }
}

/// The coded part of an error or warning finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Stable dotted code, e.g. `ACP.PROTOCOL.UNKNOWN_SESSION`
    pub code: &'static str,
    /// Human-facing description; may change between releases
    pub message: String,
}

/// One validation verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub lane: Lane,
    pub severity: Severity,
    pub subject: Subject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_index: Option<usize>,
}

impl Finding {
    /// An error finding with a coded failure
    pub fn error(lane: Lane, subject: Subject, code: &'static str, message: impl Into<String>) -> Self {
        Finding {
            lane,
            severity: Severity::Error,
            subject,
            failure: Some(Failure {
                code,
                message: message.into(),
            }),
            note: None,
            trace_index: None,
        }
    }

    /// A warning finding with a coded failure
    pub fn warning(
        lane: Lane,
        subject: Subject,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Finding {
            severity: Severity::Warning,
            ..Finding::error(lane, subject, code, message)
        }
    }

    /// An info finding carrying a note
    pub fn info(lane: Lane, subject: Subject, note: impl Into<String>) -> Self {
        Finding {
            lane,
            severity: Severity::Info,
            subject,
            failure: None,
            note: Some(note.into()),
            trace_index: None,
        }
    }

    /// Attach the trace index this finding was derived from
    pub fn at(mut self, index: usize) -> Self {
        self.trace_index = Some(index);
        self
    }

    /// The failure code, when this finding carries one
    pub fn code(&self) -> Option<&'static str> {
        self.failure.as_ref().map(|f| f.code)
    }

    /// Key used to drop duplicate findings within one run
    ///
    /// Coded findings collapse on their code; note-only findings keep their
    /// note text in the key so distinct connection facts never collapse
    /// into one.
    pub fn dedup_key(
        &self,
    ) -> (
        Lane,
        Severity,
        Option<&'static str>,
        Option<String>,
        Subject,
        Option<usize>,
    ) {
        (
            self.lane,
            self.severity,
            self.code(),
            self.note.clone(),
            self.subject.clone(),
            self.trace_index,
        )
    }
}

impl fmt::Display for Finding {
    /// Renders as `[lane/severity] code (subject) message`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}]", self.lane.as_str(), self.severity.as_str())?;
        match (&self.failure, &self.note) {
            (Some(failure), _) => {
                write!(f, " {} ({}) {}", failure.code, self.subject, failure.message)
            }
            (None, Some(note)) => write!(f, " ({}) {}", self.subject, note),
            (None, None) => write!(f, " ({})", self.subject),
        }
    }
}

/// Map a state machine rejection to its Protocol-lane finding
///
/// This is a pure function of the error, the offending message's method, and
/// its index: identical inputs always produce identical findings.
pub fn of_protocol_error(error: &ProtocolError, method: &str, index: usize) -> Finding {
    let subject = match error.session_id() {
        Some(sid) => Subject::Session(sid.clone()),
        None => Subject::MessageAt(index, method.to_string()),
    };
    Finding::error(Lane::Protocol, subject, error.code(), error.to_string()).at(index)
}

//! Protocol rejection errors
//!
//! The machine's errors are a closed sum of values, never exceptions. Each
//! variant maps one-to-one to a stable dotted code; the codes are the
//! compatibility surface, the display messages are human-facing and may
//! change.

use thiserror::Error;

use super::phase::PhaseKind;
use crate::types::SessionId;

/// Why the state machine rejected a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The message is not legal in the current phase
    #[error("unexpected {method} while {phase}")]
    UnexpectedMessage {
        phase: PhaseKind,
        method: &'static str,
    },

    /// A second `initialize` request after the first
    #[error("duplicate initialize request")]
    DuplicateInitialize,

    /// An `initialize` result with no pending `initialize` request
    #[error("initialize result without a pending initialize request")]
    InitializeResultWithoutRequest,

    /// The message names a session this connection has never seen
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    /// A `session/new` result re-used an existing session id
    #[error("session already exists: {0}")]
    SessionAlreadyExists(SessionId),

    /// A second prompt while one is already awaiting its result
    #[error("prompt already in flight for session {0}")]
    PromptAlreadyInFlight(SessionId),

    /// Turn-closing traffic for a session that is idle
    #[error("no prompt in flight for session {0}")]
    NoPromptInFlight(SessionId),
}

impl ProtocolError {
    /// The canonical dotted code for this error
    ///
    /// Two identical errors on identical inputs always yield identical
    /// codes.
    pub fn code(&self) -> &'static str {
        match self {
            ProtocolError::UnexpectedMessage { .. } => "ACP.PROTOCOL.UNEXPECTED_MESSAGE",
            ProtocolError::DuplicateInitialize => "ACP.PROTOCOL.DUPLICATE_INITIALIZE",
            ProtocolError::InitializeResultWithoutRequest => {
                "ACP.PROTOCOL.INITIALIZE_RESULT_WITHOUT_REQUEST"
            }
            ProtocolError::UnknownSession(_) => "ACP.PROTOCOL.UNKNOWN_SESSION",
            ProtocolError::SessionAlreadyExists(_) => "ACP.PROTOCOL.SESSION_ALREADY_EXISTS",
            ProtocolError::PromptAlreadyInFlight(_) => "ACP.PROTOCOL.PROMPT_ALREADY_IN_FLIGHT",
            ProtocolError::NoPromptInFlight(_) => "ACP.PROTOCOL.NO_PROMPT_IN_FLIGHT",
        }
    }

    /// The session the error concerns, when it concerns one
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            ProtocolError::UnknownSession(sid)
            | ProtocolError::SessionAlreadyExists(sid)
            | ProtocolError::PromptAlreadyInFlight(sid)
            | ProtocolError::NoPromptInFlight(sid) => Some(sid),
            _ => None,
        }
    }

    /// Every `(variant, code)` pair, in a stable order
    ///
    /// The `codes` subcommand prints this table; tests pin it.
    pub fn code_table() -> &'static [(&'static str, &'static str)] {
        &[
            ("UnexpectedMessage", "ACP.PROTOCOL.UNEXPECTED_MESSAGE"),
            ("DuplicateInitialize", "ACP.PROTOCOL.DUPLICATE_INITIALIZE"),
            (
                "InitializeResultWithoutRequest",
                "ACP.PROTOCOL.INITIALIZE_RESULT_WITHOUT_REQUEST",
            ),
            ("UnknownSession", "ACP.PROTOCOL.UNKNOWN_SESSION"),
            ("SessionAlreadyExists", "ACP.PROTOCOL.SESSION_ALREADY_EXISTS"),
            (
                "PromptAlreadyInFlight",
                "ACP.PROTOCOL.PROMPT_ALREADY_IN_FLIGHT",
            ),
            ("NoPromptInFlight", "ACP.PROTOCOL.NO_PROMPT_IN_FLIGHT"),
        ]
    }
}

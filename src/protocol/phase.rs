//! Connection phase and session turn state
//!
//! A connection carries exactly one [`Phase`], created at connection open and
//! discarded at close. Phases are immutable values: stepping the machine
//! produces a fresh phase and never mutates the one the caller holds.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{InitializeParams, InitializeResult, SessionId, StopReason};

/// Connection-level protocol phase
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Nothing received yet; only `initialize` is legal
    AwaitingInitialize,
    /// Client sent `initialize`; waiting for the agent's result
    WaitingForInitializeResult(InitializeParams),
    /// Handshake complete; session traffic is legal
    Ready(ReadyContext),
}

/// Discriminant of [`Phase`], used in error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    AwaitingInitialize,
    WaitingForInitializeResult,
    Ready,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseKind::AwaitingInitialize => "awaiting-initialize",
            PhaseKind::WaitingForInitializeResult => "waiting-for-initialize-result",
            PhaseKind::Ready => "ready",
        };
        f.write_str(name)
    }
}

impl Phase {
    /// The discriminant of this phase
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::AwaitingInitialize => PhaseKind::AwaitingInitialize,
            Phase::WaitingForInitializeResult(_) => PhaseKind::WaitingForInitializeResult,
            Phase::Ready(_) => PhaseKind::Ready,
        }
    }

    /// The ready context, if the handshake has completed
    pub fn ready(&self) -> Option<&ReadyContext> {
        match self {
            Phase::Ready(ctx) => Some(ctx),
            _ => None,
        }
    }
}

/// Everything the connection knows once the handshake completed
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyContext {
    /// The client's `initialize` request
    pub client_init: InitializeParams,
    /// The agent's `initialize` result
    pub agent_init: InitializeResult,
    /// All sessions seen on this connection, keyed by id
    ///
    /// This map is the sole source of session truth: a session id missing
    /// here fails any update, cancel, or permission traffic.
    pub sessions: BTreeMap<SessionId, SessionState>,
}

impl ReadyContext {
    /// Build the context produced by a completed handshake
    pub fn new(client_init: InitializeParams, agent_init: InitializeResult) -> Self {
        ReadyContext {
            client_init,
            agent_init,
            sessions: BTreeMap::new(),
        }
    }

    /// Look up a session by id
    pub fn session(&self, id: &SessionId) -> Option<&SessionState> {
        self.sessions.get(id)
    }

    /// Clone this context with one session replaced or inserted
    pub fn with_session(&self, state: SessionState) -> Self {
        let mut next = self.clone();
        next.sessions.insert(state.session_id.clone(), state);
        next
    }
}

/// Per-session state within a ready connection
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub session_id: SessionId,
    pub turn: TurnState,
}

impl SessionState {
    /// A fresh session with no turn history
    pub fn idle(session_id: SessionId) -> Self {
        SessionState {
            session_id,
            turn: TurnState::Idle { last_stop: None },
        }
    }
}

/// The prompt-turn state of one session
///
/// Transitions only along `Idle -> PromptInFlight -> Idle`; the cancelled
/// flag may flip only while a prompt is in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnState {
    /// No prompt in flight; remembers how the previous turn ended
    Idle { last_stop: Option<StopReason> },
    /// A prompt is awaiting its result
    PromptInFlight { cancelled: bool },
}

impl TurnState {
    /// Whether a prompt is currently awaiting its result
    pub fn is_in_flight(&self) -> bool {
        matches!(self, TurnState::PromptInFlight { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientCapabilities, ProtocolVersion};

    fn ready() -> ReadyContext {
        ReadyContext::new(
            InitializeParams {
                protocol_version: ProtocolVersion::CURRENT,
                client_capabilities: ClientCapabilities::default(),
            },
            InitializeResult {
                protocol_version: ProtocolVersion::CURRENT,
                agent_capabilities: Default::default(),
            },
        )
    }

    #[test]
    fn test_phase_kind() {
        assert_eq!(Phase::AwaitingInitialize.kind(), PhaseKind::AwaitingInitialize);
        assert_eq!(Phase::Ready(ready()).kind(), PhaseKind::Ready);
        assert!(Phase::AwaitingInitialize.ready().is_none());
    }

    #[test]
    fn test_with_session_does_not_mutate_original() {
        let ctx = ready();
        let next = ctx.with_session(SessionState::idle(SessionId::from("s-1")));

        assert!(ctx.sessions.is_empty());
        assert_eq!(next.sessions.len(), 1);
        assert!(next.session(&SessionId::from("s-1")).is_some());
    }

    #[test]
    fn test_turn_state() {
        assert!(!TurnState::Idle { last_stop: None }.is_in_flight());
        assert!(TurnState::PromptInFlight { cancelled: false }.is_in_flight());
    }
}

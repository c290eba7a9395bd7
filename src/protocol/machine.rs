//! The pure protocol transition function
//!
//! `step` is a total function of `(Phase, Message)`: no I/O, no clocks, no
//! randomness. It enforces exactly the ACP ordering rules; any combination it
//! does not recognize rejects with a typed [`ProtocolError`] and leaves the
//! caller's phase untouched.

use super::error::ProtocolError;
use super::phase::{Phase, ReadyContext, SessionState, TurnState};
use crate::types::{AgentMessage, ClientMessage, Message, SessionId};

/// The machine presented as data: an initial phase and a step function
///
/// Tests and alternative front-ends drive the machine through this record
/// without coupling to the validator.
#[derive(Debug, Clone, Copy)]
pub struct ProtocolSpec {
    pub initial: fn() -> Phase,
    pub step: fn(&Phase, &Message) -> Result<Phase, ProtocolError>,
}

/// The ACP connection machine
pub const ACP: ProtocolSpec = ProtocolSpec {
    initial: initial_phase,
    step,
};

/// The phase of a freshly opened connection
pub fn initial_phase() -> Phase {
    Phase::AwaitingInitialize
}

/// Apply one message to the connection phase
pub fn step(phase: &Phase, message: &Message) -> Result<Phase, ProtocolError> {
    match (phase, message) {
        // Handshake: initialize is legal exactly once, first.
        (Phase::AwaitingInitialize, Message::FromClient(ClientMessage::Initialize(params))) => {
            Ok(Phase::WaitingForInitializeResult(params.clone()))
        }
        (
            Phase::WaitingForInitializeResult(_) | Phase::Ready(_),
            Message::FromClient(ClientMessage::Initialize(_)),
        ) => Err(ProtocolError::DuplicateInitialize),
        (
            Phase::WaitingForInitializeResult(client_init),
            Message::FromAgent(AgentMessage::InitializeResult(result)),
        ) => Ok(Phase::Ready(ReadyContext::new(
            client_init.clone(),
            result.clone(),
        ))),
        (_, Message::FromAgent(AgentMessage::InitializeResult(_))) => {
            Err(ProtocolError::InitializeResultWithoutRequest)
        }

        // Session traffic requires a completed handshake.
        (Phase::Ready(ctx), message) => step_ready(ctx, message),
        (phase, message) => Err(ProtocolError::UnexpectedMessage {
            phase: phase.kind(),
            method: message.method(),
        }),
    }
}

fn step_ready(ctx: &ReadyContext, message: &Message) -> Result<Phase, ProtocolError> {
    match message {
        // Session creation requests carry no state; the agent's result does.
        Message::FromClient(ClientMessage::SessionNew(_))
        | Message::FromClient(ClientMessage::SessionLoad(_)) => Ok(Phase::Ready(ctx.clone())),

        Message::FromAgent(AgentMessage::SessionNewResult(result)) => {
            if ctx.session(&result.session_id).is_some() {
                return Err(ProtocolError::SessionAlreadyExists(result.session_id.clone()));
            }
            Ok(Phase::Ready(
                ctx.with_session(SessionState::idle(result.session_id.clone())),
            ))
        }

        // Load is idempotent: ensure the session exists, leave it unchanged
        // otherwise.
        Message::FromAgent(AgentMessage::SessionLoadResult(result)) => {
            if ctx.session(&result.session_id).is_some() {
                return Ok(Phase::Ready(ctx.clone()));
            }
            Ok(Phase::Ready(
                ctx.with_session(SessionState::idle(result.session_id.clone())),
            ))
        }

        Message::FromClient(ClientMessage::SessionPrompt(params)) => {
            let session = known_session(ctx, &params.session_id)?;
            if session.turn.is_in_flight() {
                return Err(ProtocolError::PromptAlreadyInFlight(params.session_id.clone()));
            }
            Ok(Phase::Ready(ctx.with_session(SessionState {
                session_id: params.session_id.clone(),
                turn: TurnState::PromptInFlight { cancelled: false },
            })))
        }

        Message::FromAgent(AgentMessage::SessionPromptResult(result)) => {
            let session = known_session(ctx, &result.session_id)?;
            if !session.turn.is_in_flight() {
                return Err(ProtocolError::NoPromptInFlight(result.session_id.clone()));
            }
            Ok(Phase::Ready(ctx.with_session(SessionState {
                session_id: result.session_id.clone(),
                turn: TurnState::Idle {
                    last_stop: Some(result.stop_reason),
                },
            })))
        }

        // Cancel marks the in-flight turn; the final prompt result still
        // closes it.
        Message::FromClient(ClientMessage::SessionCancel(params)) => {
            let session = known_session(ctx, &params.session_id)?;
            if !session.turn.is_in_flight() {
                return Err(ProtocolError::NoPromptInFlight(params.session_id.clone()));
            }
            Ok(Phase::Ready(ctx.with_session(SessionState {
                session_id: params.session_id.clone(),
                turn: TurnState::PromptInFlight { cancelled: true },
            })))
        }

        // Updates are legal in any turn state: they cover both live
        // streaming and replay on load.
        Message::FromAgent(AgentMessage::SessionUpdate(params)) => {
            known_session(ctx, &params.session_id)?;
            Ok(Phase::Ready(ctx.clone()))
        }

        Message::FromAgent(AgentMessage::RequestPermission(params)) => {
            let session = known_session(ctx, &params.session_id)?;
            if !session.turn.is_in_flight() {
                return Err(ProtocolError::NoPromptInFlight(params.session_id.clone()));
            }
            Ok(Phase::Ready(ctx.clone()))
        }

        Message::FromClient(ClientMessage::SetSessionMode(params)) => {
            known_session(ctx, &params.session_id)?;
            Ok(Phase::Ready(ctx.clone()))
        }

        // Handshake traffic is dispatched in step; answering here too keeps
        // step_ready total without a panic path.
        Message::FromClient(ClientMessage::Initialize(_)) => {
            Err(ProtocolError::DuplicateInitialize)
        }
        Message::FromAgent(AgentMessage::InitializeResult(_)) => {
            Err(ProtocolError::InitializeResultWithoutRequest)
        }
    }
}

fn known_session<'a>(
    ctx: &'a ReadyContext,
    id: &SessionId,
) -> Result<&'a SessionState, ProtocolError> {
    ctx.session(id)
        .ok_or_else(|| ProtocolError::UnknownSession(id.clone()))
}

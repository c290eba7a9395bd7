//! Trace runner: fold the machine over an ordered message sequence
//!
//! The runner supports two policies. Fail-fast halts at the first rejection
//! and reports the index, the error, and the phase immediately before the
//! offending message. Continue records the rejection and resumes from the
//! unchanged phase, so one trace can surface multiple independent errors
//! without cascading.

use tracing::debug;

use super::error::ProtocolError;
use super::machine::ProtocolSpec;
use super::phase::Phase;
use crate::types::Message;

/// What happened when one message was applied
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The machine advanced to a new phase
    Advanced(Phase),
    /// The machine rejected the message; the phase did not change
    Rejected(ProtocolError),
}

/// One step of a trace run
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Index of the message in the input trace
    pub index: usize,
    /// The phase immediately before the message was applied
    pub phase_before: Phase,
    /// The message that was applied
    pub message: Message,
    /// The step outcome
    pub outcome: StepOutcome,
}

/// The result of folding a trace through the machine
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRun {
    /// The phase after the last evaluated message
    pub final_phase: Phase,
    /// Per-step records, in trace order
    pub steps: Vec<StepRecord>,
    /// Index of the rejection that halted a fail-fast run
    pub halted_at: Option<usize>,
}

impl TraceRun {
    /// All rejections, with their trace indices
    pub fn rejections(&self) -> impl Iterator<Item = (usize, &ProtocolError)> {
        self.steps.iter().filter_map(|step| match &step.outcome {
            StepOutcome::Rejected(err) => Some((step.index, err)),
            StepOutcome::Advanced(_) => None,
        })
    }
}

/// Fold `messages` through `spec` from its initial phase
pub fn run_trace(spec: &ProtocolSpec, messages: &[Message], stop_on_error: bool) -> TraceRun {
    run_trace_from(spec, (spec.initial)(), messages, stop_on_error)
}

/// Fold `messages` through `spec` starting from a caller-supplied phase
///
/// This is the primitive the runtime adapter builds on: a single-message
/// slice starting from the embedding application's current phase.
pub fn run_trace_from(
    spec: &ProtocolSpec,
    initial: Phase,
    messages: &[Message],
    stop_on_error: bool,
) -> TraceRun {
    let mut phase = initial;
    let mut steps = Vec::with_capacity(messages.len());
    let mut halted_at = None;

    for (index, message) in messages.iter().enumerate() {
        let phase_before = phase.clone();

        match (spec.step)(&phase_before, message) {
            Ok(next) => {
                debug!(index, method = message.method(), "step advanced");
                steps.push(StepRecord {
                    index,
                    phase_before,
                    message: message.clone(),
                    outcome: StepOutcome::Advanced(next.clone()),
                });
                phase = next;
            }
            Err(err) => {
                debug!(index, method = message.method(), code = err.code(), "step rejected");
                steps.push(StepRecord {
                    index,
                    phase_before,
                    message: message.clone(),
                    outcome: StepOutcome::Rejected(err),
                });
                // The machine does not advance on error; the phase stays as
                // it was before the offending message.
                if stop_on_error {
                    halted_at = Some(index);
                    break;
                }
            }
        }
    }

    TraceRun {
        final_phase: phase,
        steps,
        halted_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::machine::ACP;
    use crate::protocol::phase::PhaseKind;
    use crate::types::{
        AgentMessage, ClientCapabilities, ClientMessage, ContentBlock, InitializeParams,
        InitializeResult, ProtocolVersion, SessionId, SessionNewResult, SessionPromptParams,
    };

    fn handshake() -> Vec<Message> {
        vec![
            Message::FromClient(ClientMessage::Initialize(InitializeParams {
                protocol_version: ProtocolVersion::CURRENT,
                client_capabilities: ClientCapabilities::default(),
            })),
            Message::FromAgent(AgentMessage::InitializeResult(InitializeResult {
                protocol_version: ProtocolVersion::CURRENT,
                agent_capabilities: Default::default(),
            })),
        ]
    }

    fn prompt(sid: &str) -> Message {
        Message::FromClient(ClientMessage::SessionPrompt(SessionPromptParams {
            session_id: SessionId::from(sid),
            prompt: vec![ContentBlock::text("hi")],
        }))
    }

    #[test]
    fn test_empty_trace() {
        let run = run_trace(&ACP, &[], true);
        assert_eq!(run.final_phase.kind(), PhaseKind::AwaitingInitialize);
        assert!(run.steps.is_empty());
        assert!(run.halted_at.is_none());
    }

    #[test]
    fn test_fail_fast_halts_at_first_rejection() {
        let mut trace = handshake();
        trace.push(prompt("s-404"));
        trace.push(prompt("s-405"));

        let run = run_trace(&ACP, &trace, true);
        assert_eq!(run.halted_at, Some(2));
        assert_eq!(run.steps.len(), 3);
        assert_eq!(run.final_phase.kind(), PhaseKind::Ready);

        // The halting record carries the phase before the offending message.
        let last = run.steps.last().unwrap();
        assert_eq!(last.phase_before.kind(), PhaseKind::Ready);
        assert!(matches!(last.outcome, StepOutcome::Rejected(_)));
    }

    #[test]
    fn test_continue_collects_independent_rejections() {
        let mut trace = handshake();
        trace.push(prompt("s-404"));
        trace.push(Message::FromAgent(AgentMessage::SessionNewResult(
            SessionNewResult {
                session_id: SessionId::from("s-1"),
            },
        )));
        trace.push(prompt("s-405"));

        let run = run_trace(&ACP, &trace, false);
        assert!(run.halted_at.is_none());
        assert_eq!(run.steps.len(), 5);

        let rejected: Vec<usize> = run.rejections().map(|(i, _)| i).collect();
        assert_eq!(rejected, vec![2, 4]);

        // The rejection at index 2 did not derail the session creation at
        // index 3.
        let ctx = run.final_phase.ready().unwrap();
        assert!(ctx.session(&SessionId::from("s-1")).is_some());
    }

    #[test]
    fn test_run_from_caller_phase() {
        let ready = run_trace(&ACP, &handshake(), true).final_phase;
        let run = run_trace_from(&ACP, ready, &[prompt("s-404")], true);
        assert_eq!(run.halted_at, Some(0));
    }
}

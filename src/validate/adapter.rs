//! Runtime adapter: per-frame validation for embedding applications
//!
//! Streaming hosts cannot hold a whole trace; they hold the evolving phase
//! and hand the sentinel one frame at a time. Each entry point is equivalent
//! to running the trace driver on a single-message sequence starting from
//! the caller-supplied phase. Connection summaries are omitted; they belong
//! to whole-trace runs.

use super::driver::{Frame, ValidationReport, Validator};
use super::finding::Finding;
use crate::protocol::Phase;
use crate::types::{AgentMessage, ClientMessage, Message};

/// The result of validating one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// The phase to carry into the next frame
    pub phase: Phase,
    /// Findings for this frame, in canonical lane order
    pub findings: Vec<Finding>,
    /// The message that was evaluated
    pub message: Message,
}

impl FrameReport {
    fn from_run(report: ValidationReport, message: Message) -> Self {
        FrameReport {
            phase: report.final_phase,
            findings: report.findings,
            message,
        }
    }
}

impl Validator {
    /// Validate one client-to-agent frame
    pub fn validate_inbound(
        &self,
        phase: &Phase,
        message: ClientMessage,
        raw_len: Option<usize>,
    ) -> FrameReport {
        self.validate_frame(phase, Message::FromClient(message), raw_len)
    }

    /// Validate one agent-to-client frame
    pub fn validate_outbound(
        &self,
        phase: &Phase,
        message: AgentMessage,
        raw_len: Option<usize>,
    ) -> FrameReport {
        self.validate_frame(phase, Message::FromAgent(message), raw_len)
    }

    fn validate_frame(&self, phase: &Phase, message: Message, raw_len: Option<usize>) -> FrameReport {
        let frame = Frame {
            message: message.clone(),
            raw_len,
        };
        let report = self.validate_trace_from(phase.clone(), std::slice::from_ref(&frame), true);
        FrameReport::from_run(report, message)
    }
}

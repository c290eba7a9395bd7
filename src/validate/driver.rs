//! The validator driver
//!
//! The driver composes the state machine with the validation lanes: for each
//! frame it consults the current phase, runs the transport rules, steps the
//! machine, runs the post-step lanes, and appends findings in the canonical
//! order. The final finding list is a deterministic function of the input
//! trace and the profiles.

use std::collections::BTreeMap;
use std::collections::HashSet;

use tracing::debug;

use super::finding::{of_protocol_error, Finding, Severity};
use super::lanes::{assurance, LaneCx, ADVANCED_LANES, UNCONDITIONAL_LANES};
use super::profile::{EvalProfile, RuntimeProfile};
use crate::protocol::{initial_phase, step, Phase};
use crate::types::{ClientMessage, Message, SessionId};

/// One decoded message with its transport context
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub message: Message,
    /// Encoded byte length, when the transport knows it
    pub raw_len: Option<usize>,
}

impl Frame {
    /// A frame with no transport context
    pub fn new(message: Message) -> Self {
        Frame {
            message,
            raw_len: None,
        }
    }

    /// A frame with a known encoded length
    pub fn sized(message: Message, raw_len: usize) -> Self {
        Frame {
            message,
            raw_len: Some(raw_len),
        }
    }
}

/// The outcome of validating a trace
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// Phase after the last evaluated frame
    pub final_phase: Phase,
    /// Ordered, deduplicated findings
    pub findings: Vec<Finding>,
    /// Number of frames evaluated
    pub frames_evaluated: usize,
    /// Index of the rejection that halted a fail-fast run
    pub halted_at: Option<usize>,
}

impl ValidationReport {
    /// Whether any finding has error severity
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }
}

/// The sentinel validator
///
/// Holds the profiles for a run; all evaluation state lives on the stack of
/// [`Validator::validate_trace`], so one validator can serve many traces.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    pub runtime: RuntimeProfile,
    pub eval: EvalProfile,
}

impl Validator {
    pub fn new(runtime: RuntimeProfile, eval: EvalProfile) -> Self {
        Validator { runtime, eval }
    }

    /// Validate a whole trace from a fresh connection
    pub fn validate_trace(&self, frames: &[Frame], stop_on_error: bool) -> ValidationReport {
        let mut run = RunState::new(initial_phase());
        for frame in frames {
            if !self.consume(&mut run, frame, stop_on_error) {
                break;
            }
        }
        self.finish(run)
    }

    /// Validate a trace continuing from a caller-supplied phase
    ///
    /// Used by the runtime adapter: the caller holds the evolving phase and
    /// feeds one frame at a time. Connection summaries are not appended
    /// here; they belong to whole-trace runs.
    pub fn validate_trace_from(
        &self,
        initial: Phase,
        frames: &[Frame],
        stop_on_error: bool,
    ) -> ValidationReport {
        let mut run = RunState::new(initial);
        for frame in frames {
            if !self.consume(&mut run, frame, stop_on_error) {
                break;
            }
        }
        ValidationReport {
            final_phase: run.phase,
            findings: finalize(run.findings),
            frames_evaluated: run.index,
            halted_at: run.halted_at,
        }
    }

    /// Evaluate one frame; returns false when a fail-fast run must halt
    fn consume(&self, run: &mut RunState, frame: &Frame, stop_on_error: bool) -> bool {
        let index = run.index;
        let phase_before = run.phase.clone();
        let outcome = step(&phase_before, &frame.message);

        let turn_number = match (&outcome, &frame.message) {
            (Ok(_), Message::FromClient(ClientMessage::SessionPrompt(params))) => {
                let count = run
                    .turn_ordinals
                    .entry(params.session_id.clone())
                    .or_insert(0);
                *count += 1;
                Some(*count)
            }
            _ => None,
        };

        // Protocol lane first.
        if let Err(error) = &outcome {
            run.findings
                .push(of_protocol_error(error, frame.message.method(), index));
        }

        let phase_after = outcome.as_ref().ok();
        let cx = LaneCx {
            index,
            message: &frame.message,
            raw_len: frame.raw_len,
            phase_before: &phase_before,
            phase_after,
            turn_number,
            runtime: &self.runtime,
            eval: &self.eval,
        };

        // Transport rules run whether or not the machine advanced.
        for lane in UNCONDITIONAL_LANES {
            run.findings.extend(lane(&cx));
        }

        match &outcome {
            Ok(next) => {
                for lane in ADVANCED_LANES {
                    run.findings.extend(lane(&cx));
                }
                if let Message::FromAgent(crate::types::AgentMessage::SessionPromptResult(
                    result,
                )) = &frame.message
                {
                    run.stats.record_stop(result.stop_reason);
                    if let Some(usage) = &result.usage {
                        run.stats.record_usage(usage);
                    }
                }
                run.phase = next.clone();
            }
            Err(error) => {
                debug!(index, code = error.code(), "frame rejected");
                // Continue mode resumes from the unchanged phase so one bad
                // frame cannot cascade into spurious findings.
                if stop_on_error {
                    run.index += 1;
                    run.halted_at = Some(index);
                    return false;
                }
            }
        }

        run.index += 1;
        true
    }

    fn finish(&self, run: RunState) -> ValidationReport {
        let mut findings = run.findings;
        findings.extend(assurance::summarize(&run.phase, &run.stats));

        ValidationReport {
            final_phase: run.phase,
            findings: finalize(findings),
            frames_evaluated: run.index,
            halted_at: run.halted_at,
        }
    }
}

struct RunState {
    phase: Phase,
    findings: Vec<Finding>,
    index: usize,
    halted_at: Option<usize>,
    turn_ordinals: BTreeMap<SessionId, u32>,
    stats: assurance::ConnectionStats,
}

impl RunState {
    fn new(phase: Phase) -> Self {
        RunState {
            phase,
            findings: Vec::new(),
            index: 0,
            halted_at: None,
            turn_ordinals: BTreeMap::new(),
            stats: assurance::ConnectionStats::default(),
        }
    }
}

/// Enforce the canonical ordering, then drop duplicates
///
/// Findings sort by ascending trace index with lane rank breaking ties
/// within one index; connection-level findings (no index) go last. The sort
/// is stable, so emission order survives within one lane. Duplicates keep
/// their first occurrence.
fn finalize(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by_key(|finding| {
        (
            finding.trace_index.unwrap_or(usize::MAX),
            finding.lane.rank(),
        )
    });

    let mut seen = HashSet::new();
    findings
        .into_iter()
        .filter(|finding| seen.insert(finding.dedup_key()))
        .collect()
}

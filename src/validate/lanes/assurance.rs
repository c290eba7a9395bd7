//! Assurance lane: derived connection-level facts
//!
//! Unlike the other lanes, assurance does not judge individual messages. It
//! summarizes what the run established: negotiated versions, session count,
//! closed turns, stop-reason distribution. Everything here is informational;
//! the lane defines no error codes.

use std::collections::BTreeMap;

use crate::protocol::Phase;
use crate::types::{StopReason, TokenUsage};
use crate::validate::finding::{Finding, Lane, Subject};

/// Counters the driver accumulates across a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionStats {
    /// Number of prompt turns closed by a `session/prompt` result
    pub closed_turns: u32,
    /// How each closed turn ended
    pub stop_reasons: BTreeMap<&'static str, u32>,
    /// Token usage summed over every turn that reported it
    pub usage: TokenUsage,
}

impl ConnectionStats {
    /// Record the stop reason of one closed turn
    pub fn record_stop(&mut self, reason: StopReason) {
        self.closed_turns += 1;
        *self.stop_reasons.entry(reason.as_str()).or_insert(0) += 1;
    }

    /// Add one turn's reported token usage to the connection total
    pub fn record_usage(&mut self, usage: &TokenUsage) {
        self.usage.add(usage);
    }
}

/// Summarize a finished run as info findings
///
/// An untouched connection yields nothing, so an empty trace still produces
/// an empty finding list.
pub fn summarize(phase: &Phase, stats: &ConnectionStats) -> Vec<Finding> {
    let mut findings = Vec::new();
    let note = |text: String| Finding::info(Lane::Assurance, Subject::Connection, text);

    match phase {
        Phase::AwaitingInitialize => return findings,
        Phase::WaitingForInitializeResult(client_init) => {
            findings.push(note(format!(
                "initialize protocolVersion {}",
                client_init.protocol_version
            )));
        }
        Phase::Ready(ctx) => {
            findings.push(note(format!(
                "initialize protocolVersion {}",
                ctx.client_init.protocol_version
            )));
            findings.push(note(format!(
                "negotiated protocolVersion {}",
                ctx.agent_init.protocol_version
            )));
            findings.push(note(format!("{} session(s)", ctx.sessions.len())));
            findings.push(note(format!("{} closed prompt turn(s)", stats.closed_turns)));

            if !stats.stop_reasons.is_empty() {
                let distribution = stats
                    .stop_reasons
                    .iter()
                    .map(|(reason, count)| format!("{reason}={count}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                findings.push(note(format!("stop reasons: {distribution}")));
            }

            if !stats.usage.is_empty() {
                findings.push(note(format!(
                    "token usage: {} in, {} out ({} total)",
                    stats.usage.input_tokens,
                    stats.usage.output_tokens,
                    stats.usage.total()
                )));
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ReadyContext;
    use crate::types::{
        ClientCapabilities, InitializeParams, InitializeResult, ProtocolVersion,
    };
    use crate::validate::Severity;

    #[test]
    fn test_untouched_connection_yields_nothing() {
        let stats = ConnectionStats::default();
        assert!(summarize(&Phase::AwaitingInitialize, &stats).is_empty());
    }

    #[test]
    fn test_ready_connection_summary() {
        let ctx = ReadyContext::new(
            InitializeParams {
                protocol_version: ProtocolVersion::CURRENT,
                client_capabilities: ClientCapabilities::default(),
            },
            InitializeResult {
                protocol_version: ProtocolVersion::CURRENT,
                agent_capabilities: Default::default(),
            },
        );

        let mut stats = ConnectionStats::default();
        stats.record_stop(StopReason::EndTurn);
        stats.record_stop(StopReason::EndTurn);
        stats.record_stop(StopReason::Cancelled);
        stats.record_usage(&TokenUsage {
            input_tokens: 400,
            output_tokens: 100,
            ..Default::default()
        });
        stats.record_usage(&TokenUsage {
            input_tokens: 12,
            output_tokens: 8,
            ..Default::default()
        });

        let findings = summarize(&Phase::Ready(ctx), &stats);
        assert_eq!(findings.len(), 6);
        assert!(findings
            .iter()
            .all(|f| f.lane == Lane::Assurance && f.severity == Severity::Info));

        let notes: Vec<&str> = findings.iter().filter_map(|f| f.note.as_deref()).collect();
        assert!(notes.contains(&"0 session(s)"));
        assert!(notes.contains(&"3 closed prompt turn(s)"));
        assert!(notes.contains(&"token usage: 412 in, 108 out (520 total)"));
        assert!(notes
            .iter()
            .any(|n| n.contains("cancelled=1") && n.contains("end_turn=2")));
    }

    #[test]
    fn test_unreported_usage_is_omitted() {
        let ctx = ReadyContext::new(
            InitializeParams {
                protocol_version: ProtocolVersion::CURRENT,
                client_capabilities: ClientCapabilities::default(),
            },
            InitializeResult {
                protocol_version: ProtocolVersion::CURRENT,
                agent_capabilities: Default::default(),
            },
        );

        let findings = summarize(&Phase::Ready(ctx), &ConnectionStats::default());
        assert!(findings
            .iter()
            .filter_map(|f| f.note.as_deref())
            .all(|n| !n.starts_with("token usage")));
    }

    #[test]
    fn test_stop_distribution_is_deterministic() {
        let mut a = ConnectionStats::default();
        a.record_stop(StopReason::Refusal);
        a.record_stop(StopReason::EndTurn);

        let mut b = ConnectionStats::default();
        b.record_stop(StopReason::EndTurn);
        b.record_stop(StopReason::Refusal);

        assert_eq!(a, b);
    }
}

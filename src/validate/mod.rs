//! The sentinel validator
//!
//! A message-trace evaluator that composes the protocol state machine with
//! lane-tagged, severity-tagged validation rules and yields an ordered list
//! of findings correlated to trace positions. Rules never raise; each emits
//! zero or one finding. The whole module is synchronous and pure: callers
//! may share returned reports freely across threads.

mod adapter;
mod driver;
mod finding;
pub mod lanes;
mod profile;

pub use adapter::FrameReport;
pub use driver::{Frame, ValidationReport, Validator};
pub use finding::{of_protocol_error, Failure, Finding, Lane, Severity, Subject};
pub use profile::{EvalProfile, MetadataPolicy, RuntimeProfile, TransportPolicy};

/// Every non-protocol rule code, paired with its lane
///
/// The protocol codes live in [`crate::protocol::ProtocolError::code_table`];
/// together the two tables are the tool's compatibility surface.
pub fn rule_code_table() -> &'static [(Lane, &'static str)] {
    &[
        (Lane::Transport, lanes::transport::MAX_MESSAGE_BYTES_EXCEEDED),
        (Lane::Capability, lanes::semantic::WRITE_TEXT_FILE_DISABLED),
        (Lane::Capability, lanes::semantic::TERMINAL_DISABLED),
        (Lane::Capability, lanes::semantic::LOAD_SESSION_UNSUPPORTED),
        (Lane::Capability, lanes::semantic::PROMPT_IMAGE_UNSUPPORTED),
        (Lane::Capability, lanes::semantic::PROMPT_AUDIO_UNSUPPORTED),
        (
            Lane::Capability,
            lanes::semantic::PROMPT_EMBEDDED_CONTEXT_UNSUPPORTED,
        ),
        (Lane::Semantic, lanes::semantic::UNKNOWN_UPDATE_VARIANT),
        (Lane::Eval, lanes::eval::EMPTY_INSTRUCTION),
        (Lane::Eval, lanes::eval::FSHARP_UNCLOSED_STRING),
        (Lane::Eval, lanes::eval::FSHARP_UNCLOSED_COMMENT),
        (Lane::Eval, lanes::eval::FSHARP_UNKNOWN_TOKENS),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_codes_are_prefixed_by_lane() {
        for (lane, code) in rule_code_table() {
            let prefix = match lane {
                Lane::Transport => "ACP.TRANSPORT.",
                Lane::Capability => "ACP.CAPABILITY.",
                Lane::Semantic => "ACP.SEMANTIC.",
                Lane::Eval => "ACP.EVAL.",
                other => panic!("unexpected lane in rule table: {other:?}"),
            };
            assert!(code.starts_with(prefix), "{code} lacks prefix {prefix}");
        }
    }

    #[test]
    fn test_rule_codes_are_unique() {
        let mut codes: Vec<&str> = rule_code_table().iter().map(|(_, c)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), rule_code_table().len());
    }
}

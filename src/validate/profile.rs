//! Caller-supplied configuration for a validation run
//!
//! Profiles enable or disable rule packs and set thresholds. Every field has
//! a sensible default so `Validator::default()` is a usable strict-ish
//! configuration.

use serde::{Deserialize, Serialize};

/// How to treat metadata and message variants this crate does not know
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataPolicy {
    /// Pass unknown variants through, surfacing them as informational notes
    #[default]
    AllowOpaque,
    /// Flag unknown variants as warnings
    RejectUnknown,
}

/// Transport-level expectations for a connection
///
/// `max_message_bytes` drives the transport lane; the separator and frame
/// limit are enforced by the framing layer and tracked here so embedders can
/// carry one policy object end to end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransportPolicy {
    /// Expected line separator; the canonical ACP transport uses `\n`
    pub line_separator: Option<String>,
    /// Maximum bytes per transport frame
    pub max_frame_bytes: Option<usize>,
    /// Maximum bytes per decoded message
    pub max_message_bytes: Option<usize>,
    /// Whether messages are wrapped in a metadata envelope
    pub meta_envelope: Option<bool>,
}

/// Connection-level validation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeProfile {
    pub metadata: MetadataPolicy,
    pub transport: TransportPolicy,
}

/// Configuration for the heuristic eval lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvalProfile {
    /// Warn when a user prompt carries no instruction text
    pub require_non_empty_instruction: bool,
    /// Run lexical checks on F# code fragments found in prompts
    pub fsharp_lex_checks: bool,
    /// Unknown-token ratio above which a code fragment is flagged
    pub max_unknown_token_ratio: f64,
}

impl Default for EvalProfile {
    fn default() -> Self {
        EvalProfile {
            require_non_empty_instruction: true,
            fsharp_lex_checks: true,
            max_unknown_token_ratio: 0.4,
        }
    }
}

impl EvalProfile {
    /// A profile with every heuristic disabled
    pub fn disabled() -> Self {
        EvalProfile {
            require_non_empty_instruction: false,
            fsharp_lex_checks: false,
            ..EvalProfile::default()
        }
    }
}

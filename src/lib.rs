//! ACP Sentinel
//!
//! A reference implementation of Agent Client Protocol (ACP) validation: a
//! pure protocol state machine, a trace runner, and a sentinel validator
//! that composes lane-tagged rules over message traces.
//!
//! ## Architecture
//!
//! - [`types`] - the algebraic domain model: ids, capabilities, the
//!   two-sided message sum, session updates
//! - [`protocol`] - the pure `(Phase, Message) -> Phase` transition function
//!   and the trace runner
//! - [`validate`] - lanes, profiles, the validator driver, and the per-frame
//!   runtime adapter
//! - [`codec`], [`trace`], [`transport`] - JSON-RPC wire handling, the JSONL
//!   trace format, and the newline-delimited stdin tap
//! - [`cli`], [`commands`], [`telemetry`] - the thin binary around the core
//!
//! ## Quick start
//!
//! ```
//! use acp_sentinel::protocol::initial_phase;
//! use acp_sentinel::validate::Validator;
//!
//! let validator = Validator::default();
//! let report = validator.validate_trace(&[], false);
//! assert!(report.findings.is_empty());
//! assert_eq!(report.final_phase, initial_phase());
//! ```
//!
//! The core performs no I/O and never panics on protocol input; every
//! rejection is a typed value with a stable dotted code.

pub mod cli;
pub mod codec;
pub mod commands;
pub mod protocol;
pub mod telemetry;
pub mod trace;
pub mod transport;
pub mod types;
pub mod validate;

pub use cli::Cli;
pub use codec::{CodecError, Decoder, Encoder};
pub use protocol::{Phase, ProtocolError, TraceRun};
pub use types::Message;
pub use validate::{Finding, Frame, Lane, Severity, ValidationReport, Validator};

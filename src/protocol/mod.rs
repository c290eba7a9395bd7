//! The pure ACP connection state machine
//!
//! The machine is a transition function over a phase/session lattice: the
//! connection moves `AwaitingInitialize -> WaitingForInitializeResult ->
//! Ready` with no back-edges, and each session's turn moves `Idle ->
//! PromptInFlight -> Idle`. Rejections are values; nothing here performs I/O
//! or panics.

mod error;
mod machine;
mod phase;
mod runner;

pub use error::ProtocolError;
pub use machine::{initial_phase, step, ProtocolSpec, ACP};
pub use phase::{Phase, PhaseKind, ReadyContext, SessionState, TurnState};
pub use runner::{run_trace, run_trace_from, StepOutcome, StepRecord, TraceRun};

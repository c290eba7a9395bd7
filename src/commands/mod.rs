//! CLI subcommand implementations
//!
//! Each subcommand renders findings on stdout as
//! `[lane/severity] code (subject) message` and reports a nonzero exit code
//! iff any finding has error severity.

mod codes;
mod replay;
mod watch;

use crate::cli::{Cli, Command};

/// Dispatch the parsed CLI to its subcommand
///
/// Returns the process exit code: 0 for a clean run, 1 when the findings
/// contain errors.
pub async fn run(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Command::Replay { file, options } => replay::run(file, options),
        Command::Watch {
            options,
            max_frame_bytes,
        } => watch::run(options, *max_frame_bytes).await,
        Command::Codes => codes::run(),
    }
}

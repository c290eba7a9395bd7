//! ACP Sentinel binary
//!
//! Run with: cargo run -- replay trace.jsonl
//!
//! For help: cargo run -- --help

use clap::Parser;

use acp_sentinel::{cli::Cli, commands, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init(&cli)?;

    let result = commands::run(&cli).await;

    // Shutdown OpenTelemetry to flush all pending spans
    telemetry::shutdown_otel();

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Findings go to stdout; operational errors go to stderr.
            eprintln!("Error: {e:#}");

            if atty::is(atty::Stream::Stdin) {
                eprintln!("\nFor debugging, run with --diagnostic to log to a file.");
                eprintln!("Or use -v/-vv/-vvv for more verbose logging.");
            }

            std::process::exit(2);
        }
    }
}

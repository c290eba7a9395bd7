//! Command-line interface definitions
//!
//! Provides CLI argument parsing using clap for the ACP sentinel.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::validate::{EvalProfile, MetadataPolicy, RuntimeProfile, TransportPolicy, Validator};

/// ACP Sentinel - validate Agent Client Protocol traffic
#[derive(Parser, Debug, Clone)]
#[command(name = "acp-sentinel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable diagnostic mode (auto-log to temp file)
    #[arg(short, long, global = true)]
    pub diagnostic: bool,

    /// Log directory (implies diagnostic mode)
    #[arg(short = 'l', long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log file name (implies diagnostic mode)
    #[arg(short = 'f', long, global = true, value_name = "FILE")]
    pub log_file: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    /// Note: RUST_LOG env var takes priority over this flag
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors)
    /// Note: RUST_LOG env var takes priority over this flag
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// OpenTelemetry OTLP endpoint (e.g., http://localhost:4317)
    /// When the otel feature is disabled, this argument is accepted but ignored.
    #[arg(long, global = true, value_name = "URL", env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otel_endpoint: Option<String>,

    /// OpenTelemetry service name
    #[arg(long, global = true, value_name = "NAME", default_value = "acp-sentinel")]
    pub otel_service_name: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Replay a JSONL trace file through the validator
    Replay {
        /// Path to the trace file
        file: PathBuf,

        #[command(flatten)]
        options: ValidateOptions,
    },

    /// Validate JSONL trace records streamed on stdin
    Watch {
        #[command(flatten)]
        options: ValidateOptions,

        /// Maximum bytes per transport frame
        #[arg(long, value_name = "BYTES")]
        max_frame_bytes: Option<usize>,
    },

    /// Print the canonical error code table
    Codes,
}

/// Flags shared by the validating subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Halt at the first protocol error instead of collecting all findings
    #[arg(long)]
    pub stop_on_error: bool,

    /// Warn when a decoded message exceeds this many bytes
    #[arg(long, value_name = "BYTES")]
    pub max_message_bytes: Option<usize>,

    /// Flag unknown update variants as warnings instead of notes
    #[arg(long)]
    pub reject_unknown: bool,

    /// Disable the heuristic eval lane
    #[arg(long)]
    pub no_eval: bool,
}

impl ValidateOptions {
    /// Build the validator these flags describe
    pub fn validator(&self) -> Validator {
        let runtime = RuntimeProfile {
            metadata: if self.reject_unknown {
                MetadataPolicy::RejectUnknown
            } else {
                MetadataPolicy::AllowOpaque
            },
            transport: TransportPolicy {
                line_separator: Some("\n".to_string()),
                max_message_bytes: self.max_message_bytes,
                ..Default::default()
            },
        };
        let eval = if self.no_eval {
            EvalProfile::disabled()
        } else {
            EvalProfile::default()
        };
        Validator::new(runtime, eval)
    }
}

impl Cli {
    /// Check if diagnostic mode is enabled (output to file)
    ///
    /// Returns true if `--diagnostic` is set, or if `--log-dir` or `--log-file` is specified.
    pub fn is_diagnostic(&self) -> bool {
        self.diagnostic || self.log_dir.is_some() || self.log_file.is_some()
    }

    /// Check if OpenTelemetry tracing is enabled
    #[cfg(feature = "otel")]
    pub fn is_otel_enabled(&self) -> bool {
        self.otel_endpoint.is_some()
    }

    /// Check if OpenTelemetry tracing is enabled (always false without otel feature)
    #[cfg(not(feature = "otel"))]
    pub fn is_otel_enabled(&self) -> bool {
        if self.otel_endpoint.is_some() {
            tracing::warn!("--otel-endpoint specified but otel feature is not enabled, ignoring");
        }
        false
    }

    /// Get the log level based on CLI arguments
    ///
    /// - `--quiet`: ERROR
    /// - default: INFO
    /// - `-v`: DEBUG
    /// - `-vv` or more: TRACE
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else {
            match self.verbose {
                0 => tracing::Level::INFO,
                1 => tracing::Level::DEBUG,
                _ => tracing::Level::TRACE,
            }
        }
    }

    /// Get the log file path for diagnostic mode
    ///
    /// Uses the specified log directory and file name, or defaults to:
    /// - Directory: system temp directory
    /// - File: `acp-sentinel-{timestamp}.log`
    pub fn log_path(&self) -> PathBuf {
        let dir = self.log_dir.clone().unwrap_or_else(std::env::temp_dir);

        let filename = self.log_file.clone().unwrap_or_else(|| {
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            format!("acp-sentinel-{timestamp}.log")
        });

        dir.join(filename)
    }
}

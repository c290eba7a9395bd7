//! `acp-sentinel replay` - validate a recorded JSONL trace

use std::path::Path;

use tracing::info;

use crate::cli::ValidateOptions;
use crate::trace;

pub fn run(file: &Path, options: &ValidateOptions) -> anyhow::Result<i32> {
    let decoded = trace::load_trace(file)?;
    info!(
        frames = decoded.frames.len(),
        skipped = decoded.skipped_lines.len(),
        "trace loaded"
    );

    let validator = options.validator();
    let report = validator.validate_trace(&decoded.frames, options.stop_on_error);

    for finding in &report.findings {
        println!("{finding}");
    }

    let verdict = if report.has_errors() { "FAIL" } else { "OK" };
    eprintln!(
        "{verdict}: {} frame(s) evaluated, {} finding(s), final phase {}",
        report.frames_evaluated,
        report.findings.len(),
        report.final_phase.kind()
    );
    if let Some(index) = report.halted_at {
        eprintln!("halted at trace index {index}");
    }

    Ok(i32::from(report.has_errors()))
}

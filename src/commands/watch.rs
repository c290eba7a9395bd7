//! `acp-sentinel watch` - validate trace records streamed on stdin
//!
//! Holds the evolving phase and runs every record through the per-frame
//! runtime adapter, the same way an embedding application would. Malformed
//! records are reported and skipped; the stream keeps going.

use tracing::{debug, warn};

use crate::cli::ValidateOptions;
use crate::codec::Decoder;
use crate::protocol::initial_phase;
use crate::trace::TraceRecord;
use crate::transport::{FrameTap, TransportError};
use crate::types::Message;
use crate::validate::Severity;

pub async fn run(options: &ValidateOptions, max_frame_bytes: Option<usize>) -> anyhow::Result<i32> {
    let stdin = tokio::io::stdin();
    let mut tap = FrameTap::new(stdin, max_frame_bytes);

    let validator = options.validator();
    let mut decoder = Decoder::new();
    let mut phase = initial_phase();

    let mut frames = 0usize;
    let mut errors = 0usize;

    while let Some(result) = tap.next_frame().await {
        let tap_frame = match result {
            Ok(frame) => frame,
            Err(TransportError::FrameTooLong { max_frame_bytes }) => {
                warn!(max_frame_bytes, "dropping oversized frame");
                continue;
            }
            Err(TransportError::Io(err)) => return Err(err.into()),
        };

        let record: TraceRecord = match serde_json::from_str(&tap_frame.line) {
            Ok(record) => record,
            Err(err) => {
                warn!(%err, "skipping malformed trace record");
                continue;
            }
        };

        let message = match decoder.decode_line(record.direction, &record.json) {
            Ok(message) => message,
            Err(err) if err.is_skippable() => {
                debug!(%err, "skipping unmodeled record");
                continue;
            }
            Err(err) => {
                warn!(%err, "skipping undecodable record");
                continue;
            }
        };

        let raw_len = Some(record.json.len());
        let report = match message {
            Message::FromClient(client) => validator.validate_inbound(&phase, client, raw_len),
            Message::FromAgent(agent) => validator.validate_outbound(&phase, agent, raw_len),
        };

        for finding in &report.findings {
            println!("{finding}");
            if finding.severity == Severity::Error {
                errors += 1;
            }
        }

        phase = report.phase;
        frames += 1;

        if errors > 0 && options.stop_on_error {
            break;
        }
    }

    eprintln!(
        "{}: {frames} frame(s) validated, {errors} error finding(s), final phase {}",
        if errors > 0 { "FAIL" } else { "OK" },
        phase.kind()
    );

    Ok(i32::from(errors > 0))
}

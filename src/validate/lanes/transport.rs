//! Transport lane: frame-size policy
//!
//! Size violations are warnings, never fatal: the machine still steps, the
//! embedding transport already accepted the bytes.

use super::LaneCx;
use crate::validate::finding::{Finding, Lane, Subject};

/// Code emitted when a decoded message exceeds the configured byte budget
pub const MAX_MESSAGE_BYTES_EXCEEDED: &str = "ACP.TRANSPORT.MAX_MESSAGE_BYTES_EXCEEDED";

pub fn check(cx: &LaneCx<'_>) -> Vec<Finding> {
    let Some(limit) = cx.runtime.transport.max_message_bytes else {
        return Vec::new();
    };
    let Some(raw_len) = cx.raw_len else {
        return Vec::new();
    };

    if raw_len <= limit {
        return Vec::new();
    }

    vec![
        Finding::warning(
            Lane::Transport,
            Subject::MessageAt(cx.index, cx.message.method().to_string()),
            MAX_MESSAGE_BYTES_EXCEEDED,
            format!("message is {raw_len} bytes, policy allows {limit}"),
        )
        .at(cx.index),
    ]
}

//! `acp-sentinel codes` - print the canonical error code table
//!
//! The codes are the tool's compatibility surface; this output is stable
//! enough to diff between releases.

use crate::protocol::ProtocolError;
use crate::validate::rule_code_table;

pub fn run() -> anyhow::Result<i32> {
    for (variant, code) in ProtocolError::code_table() {
        println!("{code:<52} protocol    {variant}");
    }
    for (lane, code) in rule_code_table() {
        println!("{code:<52} {}", lane.as_str());
    }
    Ok(0)
}

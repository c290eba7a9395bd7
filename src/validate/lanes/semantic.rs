//! Semantic and capability lane
//!
//! After a successful step, traffic is checked for consistency with the
//! capability vectors negotiated during the handshake. Capability violations
//! are errors but never halt the machine; unknown update variants surface
//! according to the metadata policy.

use super::LaneCx;
use crate::protocol::ReadyContext;
use crate::types::{
    AgentMessage, ClientMessage, ContentBlock, Message, SessionId, SessionUpdate, ToolCallId,
    ToolKind,
};
use crate::validate::finding::{Finding, Lane, Subject};
use crate::validate::profile::MetadataPolicy;

/// Agent sent a file-writing tool call but the client disabled `fs/write_text_file`
pub const WRITE_TEXT_FILE_DISABLED: &str = "ACP.CAPABILITY.WRITE_TEXT_FILE_DISABLED";
/// Agent sent a terminal tool call but the client disabled terminals
pub const TERMINAL_DISABLED: &str = "ACP.CAPABILITY.TERMINAL_DISABLED";
/// Client sent `session/load` but the agent does not support it
pub const LOAD_SESSION_UNSUPPORTED: &str = "ACP.CAPABILITY.LOAD_SESSION_UNSUPPORTED";
/// Prompt carried an image block the agent did not opt into
pub const PROMPT_IMAGE_UNSUPPORTED: &str = "ACP.CAPABILITY.PROMPT_IMAGE_UNSUPPORTED";
/// Prompt carried an audio block the agent did not opt into
pub const PROMPT_AUDIO_UNSUPPORTED: &str = "ACP.CAPABILITY.PROMPT_AUDIO_UNSUPPORTED";
/// Prompt embedded a resource the agent did not opt into
pub const PROMPT_EMBEDDED_CONTEXT_UNSUPPORTED: &str =
    "ACP.CAPABILITY.PROMPT_EMBEDDED_CONTEXT_UNSUPPORTED";
/// Session update variant this crate does not know
pub const UNKNOWN_UPDATE_VARIANT: &str = "ACP.SEMANTIC.UNKNOWN_UPDATE_VARIANT";

pub fn check(cx: &LaneCx<'_>) -> Vec<Finding> {
    // Capability context exists only once the handshake completed.
    let Some(ctx) = cx.phase_after.and_then(|phase| phase.ready()) else {
        return Vec::new();
    };

    let mut findings = Vec::new();

    match cx.message {
        Message::FromClient(ClientMessage::SessionLoad(params)) => {
            if !ctx.agent_init.agent_capabilities.load_session {
                findings.push(
                    Finding::error(
                        Lane::Capability,
                        Subject::Session(params.session_id.clone()),
                        LOAD_SESSION_UNSUPPORTED,
                        "agent did not advertise loadSession",
                    )
                    .at(cx.index),
                );
            }
        }

        Message::FromClient(ClientMessage::SessionPrompt(params)) => {
            check_prompt_content(cx, ctx, &params.session_id, &params.prompt, &mut findings);
        }

        Message::FromAgent(AgentMessage::SessionUpdate(params)) => match &params.update {
            SessionUpdate::ToolCall(call) => {
                check_tool_kind(cx, ctx, &call.id, call.kind, &mut findings);
            }
            SessionUpdate::ToolCallUpdate(update) => {
                if let Some(kind) = update.kind {
                    check_tool_kind(cx, ctx, &update.id, kind, &mut findings);
                }
            }
            SessionUpdate::Unknown { name, .. } => {
                findings.push(unknown_update(cx, &params.session_id, name));
            }
            _ => {}
        },

        Message::FromAgent(AgentMessage::RequestPermission(params)) => {
            if let Some(kind) = params.tool_call.kind {
                check_tool_kind(cx, ctx, &params.tool_call.id, kind, &mut findings);
            }
        }

        _ => {}
    }

    findings
}

fn check_prompt_content(
    cx: &LaneCx<'_>,
    ctx: &ReadyContext,
    session_id: &SessionId,
    prompt: &[ContentBlock],
    findings: &mut Vec<Finding>,
) {
    let caps = ctx.agent_init.agent_capabilities.prompt_capabilities;
    let subject = || match cx.turn_number {
        Some(n) => Subject::PromptTurn(session_id.clone(), n),
        None => Subject::Session(session_id.clone()),
    };

    for block in prompt {
        let violation = match block {
            ContentBlock::Image { .. } if !caps.image => {
                Some((PROMPT_IMAGE_UNSUPPORTED, "image"))
            }
            ContentBlock::Audio { .. } if !caps.audio => {
                Some((PROMPT_AUDIO_UNSUPPORTED, "audio"))
            }
            ContentBlock::Resource { .. } if !caps.embedded_context => {
                Some((PROMPT_EMBEDDED_CONTEXT_UNSUPPORTED, "embedded resource"))
            }
            _ => None,
        };

        if let Some((code, kind)) = violation {
            findings.push(
                Finding::error(
                    Lane::Capability,
                    subject(),
                    code,
                    format!("prompt contains a {kind} block the agent did not opt into"),
                )
                .at(cx.index),
            );
        }
    }
}

fn check_tool_kind(
    cx: &LaneCx<'_>,
    ctx: &ReadyContext,
    id: &ToolCallId,
    kind: ToolKind,
    findings: &mut Vec<Finding>,
) {
    let caps = &ctx.client_init.client_capabilities;

    if kind.writes_files() && !caps.fs.write_text_file {
        findings.push(
            Finding::error(
                Lane::Capability,
                Subject::ToolCall(id.clone()),
                WRITE_TEXT_FILE_DISABLED,
                "tool call writes files but the client disabled fs.writeTextFile",
            )
            .at(cx.index),
        );
    }

    if kind.uses_terminal() && !caps.terminal {
        findings.push(
            Finding::error(
                Lane::Capability,
                Subject::ToolCall(id.clone()),
                TERMINAL_DISABLED,
                "tool call uses the terminal but the client disabled it",
            )
            .at(cx.index),
        );
    }
}

fn unknown_update(cx: &LaneCx<'_>, session_id: &SessionId, name: &str) -> Finding {
    let subject = Subject::Session(session_id.clone());
    match cx.runtime.metadata {
        MetadataPolicy::AllowOpaque => Finding::info(
            Lane::Semantic,
            subject,
            format!("unknown session update variant {name:?} passed through"),
        )
        .at(cx.index),
        MetadataPolicy::RejectUnknown => Finding::warning(
            Lane::Semantic,
            subject,
            UNKNOWN_UPDATE_VARIANT,
            format!("unknown session update variant {name:?}"),
        )
        .at(cx.index),
    }
}

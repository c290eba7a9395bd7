//! End-to-end validation scenarios through the public API

use pretty_assertions::assert_eq;

use acp_sentinel::protocol::{PhaseKind, TurnState};
use acp_sentinel::types::{
    AgentCapabilities, AgentMessage, ClientCapabilities, ClientMessage, ContentBlock,
    FileSystemCapability, InitializeParams, InitializeResult, Message, ProtocolVersion,
    SessionCancelParams, SessionId, SessionNewParams, SessionNewResult, SessionPromptParams,
    SessionPromptResult, SessionUpdate, SessionUpdateParams, StopReason, ToolCall, ToolCallId,
    ToolCallStatus, ToolKind,
};
use acp_sentinel::validate::{Frame, Severity, Validator};

fn initialize(client: ClientCapabilities) -> Frame {
    Frame::new(Message::FromClient(ClientMessage::Initialize(
        InitializeParams {
            protocol_version: ProtocolVersion::CURRENT,
            client_capabilities: client,
        },
    )))
}

fn initialize_result(agent: AgentCapabilities) -> Frame {
    Frame::new(Message::FromAgent(AgentMessage::InitializeResult(
        InitializeResult {
            protocol_version: ProtocolVersion::CURRENT,
            agent_capabilities: agent,
        },
    )))
}

fn session_new() -> Frame {
    Frame::new(Message::FromClient(ClientMessage::SessionNew(
        SessionNewParams::default(),
    )))
}

fn session_new_result(sid: &str) -> Frame {
    Frame::new(Message::FromAgent(AgentMessage::SessionNewResult(
        SessionNewResult {
            session_id: SessionId::from(sid),
        },
    )))
}

fn prompt(sid: &str, text: &str) -> Frame {
    Frame::new(Message::FromClient(ClientMessage::SessionPrompt(
        SessionPromptParams {
            session_id: SessionId::from(sid),
            prompt: vec![ContentBlock::text(text)],
        },
    )))
}

fn cancel(sid: &str) -> Frame {
    Frame::new(Message::FromClient(ClientMessage::SessionCancel(
        SessionCancelParams {
            session_id: SessionId::from(sid),
        },
    )))
}

fn prompt_result(sid: &str, stop: StopReason) -> Frame {
    Frame::new(Message::FromAgent(AgentMessage::SessionPromptResult(
        SessionPromptResult {
            session_id: SessionId::from(sid),
            stop_reason: stop,
            usage: None,
        },
    )))
}

fn failure_codes(report: &acp_sentinel::ValidationReport) -> Vec<(&'static str, Option<usize>)> {
    report
        .findings
        .iter()
        .filter(|f| f.severity != Severity::Info)
        .map(|f| (f.code().unwrap(), f.trace_index))
        .collect()
}

#[test]
fn happy_handshake_yields_ready_and_no_failures() {
    let report = Validator::default().validate_trace(
        &[
            initialize(ClientCapabilities {
                fs: FileSystemCapability {
                    read_text_file: true,
                    write_text_file: false,
                },
                terminal: false,
            }),
            initialize_result(AgentCapabilities {
                load_session: true,
                ..Default::default()
            }),
        ],
        true,
    );

    assert_eq!(report.final_phase.kind(), PhaseKind::Ready);
    assert!(report.final_phase.ready().unwrap().sessions.is_empty());
    assert_eq!(failure_codes(&report), vec![]);
}

#[test]
fn duplicate_initialize_leaves_waiting_phase_intact() {
    let frames = [
        initialize(ClientCapabilities::default()),
        initialize(ClientCapabilities::default()),
    ];
    let report = Validator::default().validate_trace(&frames, false);

    assert_eq!(report.final_phase.kind(), PhaseKind::WaitingForInitializeResult);
    assert_eq!(
        failure_codes(&report),
        vec![("ACP.PROTOCOL.DUPLICATE_INITIALIZE", Some(1))]
    );

    // The phase is exactly the one after message 0.
    let after_first = Validator::default().validate_trace(&frames[..1], false);
    assert_eq!(report.final_phase, after_first.final_phase);
}

#[test]
fn prompt_without_session_is_exactly_one_unknown_session() {
    let report = Validator::default().validate_trace(
        &[
            initialize(ClientCapabilities::default()),
            initialize_result(AgentCapabilities::default()),
            prompt("s-1", "hello"),
        ],
        false,
    );

    assert_eq!(
        failure_codes(&report),
        vec![("ACP.PROTOCOL.UNKNOWN_SESSION", Some(2))]
    );
    // No side effect on the session map.
    assert!(report.final_phase.ready().unwrap().sessions.is_empty());
}

#[test]
fn cancel_then_stop_closes_the_turn_cleanly() {
    let report = Validator::default().validate_trace(
        &[
            initialize(ClientCapabilities::default()),
            initialize_result(AgentCapabilities::default()),
            session_new(),
            session_new_result("s-1"),
            prompt("s-1", "do the thing"),
            cancel("s-1"),
            prompt_result("s-1", StopReason::Cancelled),
        ],
        false,
    );

    assert_eq!(failure_codes(&report), vec![]);

    let session = report
        .final_phase
        .ready()
        .unwrap()
        .session(&SessionId::from("s-1"))
        .unwrap();
    assert_eq!(
        session.turn,
        TurnState::Idle {
            last_stop: Some(StopReason::Cancelled)
        }
    );
}

#[test]
fn double_prompt_is_rejected_and_turn_stays_uncancelled() {
    let report = Validator::default().validate_trace(
        &[
            initialize(ClientCapabilities::default()),
            initialize_result(AgentCapabilities::default()),
            session_new(),
            session_new_result("s-1"),
            prompt("s-1", "first"),
            prompt("s-1", "second"),
        ],
        false,
    );

    assert_eq!(
        failure_codes(&report),
        vec![("ACP.PROTOCOL.PROMPT_ALREADY_IN_FLIGHT", Some(5))]
    );

    let session = report
        .final_phase
        .ready()
        .unwrap()
        .session(&SessionId::from("s-1"))
        .unwrap();
    assert_eq!(session.turn, TurnState::PromptInFlight { cancelled: false });
}

#[test]
fn write_tool_call_against_disabled_fs_capability() {
    let tool_call = Frame::new(Message::FromAgent(AgentMessage::SessionUpdate(
        SessionUpdateParams {
            session_id: SessionId::from("s-1"),
            update: SessionUpdate::ToolCall(ToolCall {
                id: ToolCallId::from("call-1"),
                title: "Write config".to_string(),
                kind: ToolKind::Edit,
                status: ToolCallStatus::Pending,
                locations: vec![],
                raw_input: None,
            }),
        },
    )));

    let report = Validator::default().validate_trace(
        &[
            initialize(ClientCapabilities {
                fs: FileSystemCapability {
                    read_text_file: true,
                    write_text_file: false,
                },
                terminal: true,
            }),
            initialize_result(AgentCapabilities::default()),
            session_new(),
            session_new_result("s-1"),
            prompt("s-1", "edit it"),
            tool_call,
        ],
        false,
    );

    assert_eq!(
        failure_codes(&report),
        vec![("ACP.CAPABILITY.WRITE_TEXT_FILE_DISABLED", Some(5))]
    );

    // The capability violation did not stop the machine.
    let session = report
        .final_phase
        .ready()
        .unwrap()
        .session(&SessionId::from("s-1"))
        .unwrap();
    assert!(session.turn.is_in_flight());
}

#[test]
fn session_ids_never_disappear_within_a_run() {
    let report = Validator::default().validate_trace(
        &[
            initialize(ClientCapabilities::default()),
            initialize_result(AgentCapabilities::default()),
            session_new_result("s-1"),
            session_new_result("s-2"),
            prompt("s-1", "a"),
            prompt_result("s-1", StopReason::EndTurn),
            prompt("s-2", "b"),
            prompt_result("s-2", StopReason::Refusal),
        ],
        false,
    );

    let ctx = report.final_phase.ready().unwrap();
    assert_eq!(ctx.sessions.len(), 2);
    assert!(ctx.session(&SessionId::from("s-1")).is_some());
    assert!(ctx.session(&SessionId::from("s-2")).is_some());
}

#[test]
fn run_is_deterministic_across_invocations() {
    let frames = [
        initialize(ClientCapabilities::default()),
        initialize(ClientCapabilities::default()),
        initialize_result(AgentCapabilities::default()),
        session_new_result("s-1"),
        prompt("s-1", ""),
        prompt_result("s-1", StopReason::EndTurn),
    ];

    let a = Validator::default().validate_trace(&frames, false);
    let b = Validator::default().validate_trace(&frames, false);
    assert_eq!(a, b);
}

#[test]
fn exit_policy_contract_has_errors() {
    let clean = Validator::default().validate_trace(
        &[
            initialize(ClientCapabilities::default()),
            initialize_result(AgentCapabilities::default()),
        ],
        false,
    );
    assert!(!clean.has_errors());

    let broken = Validator::default().validate_trace(
        &[initialize(ClientCapabilities::default()), initialize(ClientCapabilities::default())],
        false,
    );
    assert!(broken.has_errors());
}

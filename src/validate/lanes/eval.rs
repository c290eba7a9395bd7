//! Eval lane: heuristic checks on prompt content
//!
//! These rules inspect the text the user is about to send. They are
//! heuristics: always warnings, configurable off per profile, and the code
//! paths stay in place even when disabled. The lexical checks target F#
//! fragments because that is what the tool's users paste; prose is left
//! alone.

use once_cell::sync::Lazy;
use regex::Regex;

use super::LaneCx;
use crate::types::{ClientMessage, ContentBlock, Message};
use crate::validate::finding::{Finding, Lane, Subject};

/// User prompt carries no instruction text
pub const EMPTY_INSTRUCTION: &str = "ACP.EVAL.EMPTY_INSTRUCTION";
/// A code fragment leaves a string literal open
pub const FSHARP_UNCLOSED_STRING: &str = "ACP.EVAL.FSHARP_UNCLOSED_STRING";
/// A code fragment leaves a block comment open
pub const FSHARP_UNCLOSED_COMMENT: &str = "ACP.EVAL.FSHARP_UNCLOSED_COMMENT";
/// A code fragment is mostly tokens the lexer cannot classify
pub const FSHARP_UNKNOWN_TOKENS: &str = "ACP.EVAL.FSHARP_UNKNOWN_TOKENS";

/// Ratio checks need at least this many tokens to mean anything
const MIN_TOKENS_FOR_RATIO: usize = 8;

static FSHARP_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(let|module|namespace|match|type|open|member|mutable|rec|yield)\b")
        .expect("hint pattern compiles")
});

static KNOWN_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z_][A-Za-z0-9_']*|\d+(?:\.\d+)?|[-+*/<>=|&^%!?:;,.()\[\]{}@#~$]+)$")
        .expect("token pattern compiles")
});

pub fn check(cx: &LaneCx<'_>) -> Vec<Finding> {
    let Message::FromClient(ClientMessage::SessionPrompt(params)) = cx.message else {
        return Vec::new();
    };

    let subject = match cx.turn_number {
        Some(n) => Subject::PromptTurn(params.session_id.clone(), n),
        None => Subject::Session(params.session_id.clone()),
    };

    let texts: Vec<&str> = params.prompt.iter().filter_map(ContentBlock::as_text).collect();
    let mut findings = Vec::new();

    if cx.eval.require_non_empty_instruction && texts.iter().all(|t| t.trim().is_empty()) {
        findings.push(
            Finding::warning(
                Lane::Eval,
                subject.clone(),
                EMPTY_INSTRUCTION,
                "prompt contains no instruction text",
            )
            .at(cx.index),
        );
    }

    if cx.eval.fsharp_lex_checks {
        let mut report = LexReport::default();
        for text in &texts {
            for fragment in code_fragments(text) {
                report.merge(scan_fragment(fragment));
            }
        }

        if report.unclosed_string {
            findings.push(
                Finding::warning(
                    Lane::Eval,
                    subject.clone(),
                    FSHARP_UNCLOSED_STRING,
                    "code fragment leaves a string literal unterminated",
                )
                .at(cx.index),
            );
        }
        if report.unclosed_comment {
            findings.push(
                Finding::warning(
                    Lane::Eval,
                    subject.clone(),
                    FSHARP_UNCLOSED_COMMENT,
                    "code fragment leaves a block comment unterminated",
                )
                .at(cx.index),
            );
        }
        if report.total_tokens >= MIN_TOKENS_FOR_RATIO {
            let ratio = report.unknown_tokens as f64 / report.total_tokens as f64;
            if ratio > cx.eval.max_unknown_token_ratio {
                findings.push(
                    Finding::warning(
                        Lane::Eval,
                        subject,
                        FSHARP_UNKNOWN_TOKENS,
                        format!(
                            "{:.0}% of {} tokens are unclassifiable",
                            ratio * 100.0,
                            report.total_tokens
                        ),
                    )
                    .at(cx.index),
                );
            }
        }
    }

    findings
}

/// Extract the parts of a prompt text worth lexing
///
/// Fenced blocks are always code; unfenced text only counts when it carries
/// an F# keyword, so prose never reaches the lexer.
fn code_fragments(text: &str) -> Vec<&str> {
    if text.contains("```") {
        return text
            .split("```")
            .skip(1)
            .step_by(2)
            .map(strip_fence_header)
            .collect();
    }

    if FSHARP_HINT.is_match(text) {
        return vec![text];
    }

    Vec::new()
}

/// Drop the language tag line of a fenced block, if any
fn strip_fence_header(block: &str) -> &str {
    match block.split_once('\n') {
        Some((first, rest)) if !first.trim().is_empty() && !first.contains(' ') => rest,
        _ => block,
    }
}

#[derive(Debug, Default)]
struct LexReport {
    unclosed_string: bool,
    unclosed_comment: bool,
    total_tokens: usize,
    unknown_tokens: usize,
}

impl LexReport {
    fn merge(&mut self, other: LexReport) {
        self.unclosed_string |= other.unclosed_string;
        self.unclosed_comment |= other.unclosed_comment;
        self.total_tokens += other.total_tokens;
        self.unknown_tokens += other.unknown_tokens;
    }
}

/// Single-pass scan of one code fragment
///
/// Tracks F# string literals (backslash escapes), nesting `(* *)` block
/// comments, and `//` line comments. Whatever remains is tokenized on
/// whitespace and classified against the known-token pattern.
fn scan_fragment(fragment: &str) -> LexReport {
    let mut code_only = String::with_capacity(fragment.len());
    let mut in_string = false;
    let mut in_line_comment = false;
    let mut comment_depth = 0usize;

    let mut chars = fragment.chars().peekable();
    while let Some(c) = chars.next() {
        if in_line_comment {
            if c == '\n' {
                in_line_comment = false;
                code_only.push('\n');
            }
            continue;
        }

        if in_string {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        if comment_depth > 0 {
            match c {
                '(' if chars.peek() == Some(&'*') => {
                    chars.next();
                    comment_depth += 1;
                }
                '*' if chars.peek() == Some(&')') => {
                    chars.next();
                    comment_depth -= 1;
                }
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '(' if chars.peek() == Some(&'*') => {
                chars.next();
                comment_depth = 1;
            }
            '/' if chars.peek() == Some(&'/') => {
                chars.next();
                in_line_comment = true;
            }
            _ => code_only.push(c),
        }
    }

    let mut report = LexReport {
        unclosed_string: in_string,
        unclosed_comment: comment_depth > 0,
        ..LexReport::default()
    };

    for token in code_only.split_whitespace() {
        report.total_tokens += 1;
        if !KNOWN_TOKEN.is_match(token) {
            report.unknown_tokens += 1;
        }
    }

    report
}

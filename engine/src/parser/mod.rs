//! Agent book parser
//!
//! Turns raw book text into the agent name, an ordered list of commitments
//! and the leftover free-text lines. Parsing never fails: anything that is
//! not recognised is free text.
//!
//! Rules:
//! - The first non-blank line is the agent name.
//! - An un-indented line starting with a known keyword opens a commitment.
//! - Content continues on following lines until a blank line, the next
//!   commitment line or the end of input.
//! - A fenced block (```) opened inside a commitment belongs to it up to the
//!   closing fence, blank lines and keyword-like lines included.
//! - Fenced blocks in free text stay free text and are never scanned for
//!   keywords.

use crate::commitments::{match_commitment_line, CommitmentType};
use crate::tags::extract_tags;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

const FENCE: &str = "```";

/// One commitment as written in the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCommitment {
    #[serde(rename = "type")]
    pub kind: CommitmentType,
    /// Keyword or alias exactly as written
    pub keyword: &'static str,
    pub content: String,
    /// Position among all parsed commitments, DELETEs included
    pub ordinal: usize,
    /// 1-based source line of the keyword
    pub line: usize,
    /// Normalized tag names carried by the content
    pub tags: BTreeSet<String>,
}

impl ParsedCommitment {
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }
}

/// Parser output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAgentSource {
    /// `None` for a blank book
    pub agent_name: Option<String>,
    pub commitments: Vec<ParsedCommitment>,
    pub non_commitment_lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fence {
    None,
    /// Inside a fence owned by the open commitment
    Commitment,
    /// Inside a fence in free text
    FreeText,
}

struct OpenCommitment {
    kind: CommitmentType,
    keyword: &'static str,
    line: usize,
    lines: Vec<String>,
}

struct ParserState {
    result: ParsedAgentSource,
    open: Option<OpenCommitment>,
    fence: Fence,
}

impl ParserState {
    fn new() -> Self {
        Self {
            result: ParsedAgentSource::default(),
            open: None,
            fence: Fence::None,
        }
    }

    fn close_commitment(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        let ordinal = self.result.commitments.len();
        let content = open.lines.join("\n").trim().to_string();
        debug!(
            "Parsed {} (ordinal {}, line {}): {} bytes",
            open.kind,
            ordinal,
            open.line,
            content.len()
        );
        self.result.commitments.push(ParsedCommitment {
            kind: open.kind,
            keyword: open.keyword,
            tags: extract_tags(&content),
            content,
            ordinal,
            line: open.line,
        });
    }

    fn push_free_text(&mut self, line: &str) {
        self.result.non_commitment_lines.push(line.to_string());
    }

    fn push_content(&mut self, line: &str) {
        if let Some(open) = self.open.as_mut() {
            open.lines.push(line.to_string());
        }
    }

    fn finish(mut self) -> ParsedAgentSource {
        self.close_commitment();
        self.result
    }
}

/// Parse an agent book
pub fn parse_agent_source(source: &str) -> ParsedAgentSource {
    let mut state = ParserState::new();
    let mut lines = source.lines().enumerate();

    for (_, line) in lines.by_ref() {
        let name = line.trim();
        if !name.is_empty() {
            state.result.agent_name = Some(name.to_string());
            break;
        }
    }

    for (index, line) in lines {
        let line_number = index + 1;

        match state.fence {
            Fence::Commitment => {
                state.push_content(line);
                if is_fence(line) {
                    state.fence = Fence::None;
                }
                continue;
            }
            Fence::FreeText => {
                state.push_free_text(line);
                if is_fence(line) {
                    state.fence = Fence::None;
                }
                continue;
            }
            Fence::None => {}
        }

        if let Some(matched) = match_commitment_line(line) {
            state.close_commitment();
            if opens_fence(matched.rest) {
                state.fence = Fence::Commitment;
            }
            state.open = Some(OpenCommitment {
                kind: matched.kind,
                keyword: matched.keyword,
                line: line_number,
                lines: vec![matched.rest.to_string()],
            });
            continue;
        }

        if line.trim().is_empty() {
            state.close_commitment();
            state.push_free_text(line);
            continue;
        }

        if state.open.is_some() {
            if opens_fence(line) {
                state.fence = Fence::Commitment;
            }
            state.push_content(line);
        } else {
            if opens_fence(line) {
                state.fence = Fence::FreeText;
            }
            state.push_free_text(line);
        }
    }

    state.finish()
}

/// A fence delimiter line
fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with(FENCE)
}

/// Text that starts a fence without closing it on the same line
fn opens_fence(text: &str) -> bool {
    let text = text.trim_start();
    text.starts_with(FENCE) && text.matches(FENCE).count() % 2 == 1
}

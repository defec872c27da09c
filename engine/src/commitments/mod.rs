//! Commitment registry
//!
//! Every directive keyword of the agent book language maps to exactly one
//! [`CommitmentType`]. The set is closed: a keyword that is not listed here
//! is plain text. Each type carries its canonical keyword, its aliases and
//! its `apply` logic, which turns the accumulated requirements plus the
//! commitment content into new requirements.
//!
//! Two kinds are recognised by the parser but have no definition:
//! - `DELETE` and its aliases are meta-commitments consumed by the
//!   deletion filter before folding.
//! - `MCP` lines are extracted from the raw source by the post-processor.

pub mod access;
pub mod agents;
pub mod knowledge;
pub mod text;
pub mod tools;

use folio_sdk::{AgentModelRequirements, EngineError, ImportFetcher, KnowledgeUploader};
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Closed set of commitment kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitmentType {
    Persona,
    Rule,
    Note,
    Knowledge,
    Goal,
    Style,
    Sample,
    Model,
    Meta,
    InitialMessage,
    UseTime,
    UseSearchEngine,
    UseImageGenerator,
    UseBrowser,
    From,
    Import,
    Team,
    Mcp,
    Closed,
    Open,
    Delete,
}

impl CommitmentType {
    /// Every commitment type, in vocabulary order
    pub const ALL: [CommitmentType; 21] = [
        Self::Persona,
        Self::Rule,
        Self::Note,
        Self::Knowledge,
        Self::Goal,
        Self::Style,
        Self::Sample,
        Self::Model,
        Self::Meta,
        Self::InitialMessage,
        Self::UseTime,
        Self::UseSearchEngine,
        Self::UseImageGenerator,
        Self::UseBrowser,
        Self::From,
        Self::Import,
        Self::Team,
        Self::Mcp,
        Self::Closed,
        Self::Open,
        Self::Delete,
    ];

    /// Canonical keyword as written in a book
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Persona => "PERSONA",
            Self::Rule => "RULE",
            Self::Note => "NOTE",
            Self::Knowledge => "KNOWLEDGE",
            Self::Goal => "GOAL",
            Self::Style => "STYLE",
            Self::Sample => "SAMPLE",
            Self::Model => "MODEL",
            Self::Meta => "META",
            Self::InitialMessage => "INITIAL MESSAGE",
            Self::UseTime => "USE TIME",
            Self::UseSearchEngine => "USE SEARCH ENGINE",
            Self::UseImageGenerator => "USE IMAGE GENERATOR",
            Self::UseBrowser => "USE BROWSER",
            Self::From => "FROM",
            Self::Import => "IMPORT",
            Self::Team => "TEAM",
            Self::Mcp => "MCP",
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
            Self::Delete => "DELETE",
        }
    }

    /// Alternative spellings accepted by the parser
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Rule => &["RULES"],
            Self::Note => &["NOTES"],
            Self::Sample => &["EXAMPLE"],
            Self::UseTime => &["CURRENT TIME", "DATE", "TIME"],
            Self::UseSearchEngine => &["USE SEARCH"],
            Self::UseImageGenerator => &["USE IMAGE GENERATION", "USE IMAGE"],
            Self::Delete => &["CANCEL", "DISCARD", "REMOVE"],
            _ => &[],
        }
    }

    /// Look up a keyword or alias (case-sensitive)
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        KEYWORD_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == keyword)
            .map(|(_, kind)| *kind)
    }

    /// DELETE-family meta-commitment
    pub fn is_deletion(self) -> bool {
        self == Self::Delete
    }

    /// Only takes effect as the last commitment of the filtered sequence
    pub fn is_terminal(self) -> bool {
        self == Self::Closed
    }

    /// Content goes through the reference resolver before `apply`
    pub fn needs_reference_resolution(self) -> bool {
        matches!(self, Self::From | Self::Import | Self::Team)
    }

    /// Whether the fold engine has anything to apply for this kind
    pub fn has_definition(self) -> bool {
        !matches!(self, Self::Mcp | Self::Delete)
    }

    /// Apply this commitment to `requirements`, producing new requirements.
    ///
    /// `requirements` is never modified; on `Err` the caller keeps using it.
    pub async fn apply(
        self,
        requirements: &AgentModelRequirements,
        content: &str,
        ctx: &ApplyContext<'_>,
    ) -> Result<AgentModelRequirements, EngineError> {
        let current = requirements.clone();
        match self {
            Self::Persona => text::apply_persona(current, content),
            Self::Rule => text::apply_rule(current, content),
            Self::Note => text::apply_note(current, content),
            Self::Goal => text::apply_goal(current, content),
            Self::Style => text::apply_style(current, content),
            Self::Sample => text::apply_sample(current, content),
            Self::Model => text::apply_model(current, content),
            Self::Meta => text::apply_meta(current, content),
            Self::InitialMessage => text::apply_initial_message(current, content),
            Self::Knowledge => {
                knowledge::apply_knowledge(current, content, ctx.knowledge_uploader).await
            }
            Self::UseTime => tools::apply_use_time(current, content),
            Self::UseSearchEngine => tools::apply_use_search_engine(current, content),
            Self::UseImageGenerator => tools::apply_use_image_generator(current, content),
            Self::UseBrowser => tools::apply_use_browser(current, content),
            Self::From => agents::apply_from(current, content),
            Self::Import => agents::apply_import(current, content, ctx.import_fetcher).await,
            Self::Team => agents::apply_team(current, content),
            Self::Closed => access::apply_closed(current, content),
            Self::Open => access::apply_open(current, content),
            Self::Mcp | Self::Delete => Ok(current),
        }
    }
}

impl fmt::Display for CommitmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Collaborators available to commitment definitions
#[derive(Default, Clone, Copy)]
pub struct ApplyContext<'a> {
    pub knowledge_uploader: Option<&'a dyn KnowledgeUploader>,
    pub import_fetcher: Option<&'a dyn ImportFetcher>,
}

/// Keywords and aliases, longest first so `USE SEARCH ENGINE` wins over `USE SEARCH`
static KEYWORD_TABLE: LazyLock<Vec<(&'static str, CommitmentType)>> = LazyLock::new(|| {
    let mut table: Vec<(&'static str, CommitmentType)> = CommitmentType::ALL
        .iter()
        .flat_map(|kind| {
            std::iter::once((kind.keyword(), *kind))
                .chain(kind.aliases().iter().map(move |alias| (*alias, *kind)))
        })
        .collect();
    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    table
});

/// A line recognised as the start of a commitment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitmentLine<'a> {
    pub kind: CommitmentType,
    /// Keyword or alias exactly as written
    pub keyword: &'static str,
    /// Text after the keyword, leading whitespace removed
    pub rest: &'a str,
}

/// Match an un-indented line against the vocabulary.
///
/// The keyword must be followed by whitespace or the end of the line.
pub fn match_commitment_line(line: &str) -> Option<CommitmentLine<'_>> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }

    KEYWORD_TABLE.iter().find_map(|(keyword, kind)| {
        let rest = line.strip_prefix(keyword)?;
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            Some(CommitmentLine {
                kind: *kind,
                keyword: *keyword,
                rest: rest.trim_start(),
            })
        } else {
            None
        }
    })
}

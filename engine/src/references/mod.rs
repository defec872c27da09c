//! Agent reference resolution
//!
//! [`DirectoryReferenceResolver`] rewrites `{Name}` and `@Name` tokens in
//! FROM, IMPORT and TEAM content into agent URLs taken from a name table,
//! falling back to `<base_url>/agents/<name>`. Tokens that sit inside a URL
//! already present in the content are left alone.

use crate::config::ReferencesConfig;
use crate::knowledge::find_url_spans;
use crate::tags::{find_tag_tokens, normalize_tag};
use async_trait::async_trait;
use folio_sdk::{AgentReferenceResolver, EngineError};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use tracing::debug;

/// Characters escaped in a generated agent path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Resolves agent references against a static directory
#[derive(Debug, Clone, Default)]
pub struct DirectoryReferenceResolver {
    /// Normalized name -> URL
    agents: HashMap<String, String>,
    base_url: Option<String>,
}

impl DirectoryReferenceResolver {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a resolver from the `[references]` config section
    pub fn from_config(config: &ReferencesConfig) -> Self {
        let resolver = config
            .agents
            .iter()
            .fold(Self::new(), |resolver, (name, url)| {
                resolver.with_agent(name, url)
            });
        match &config.base_url {
            Some(base_url) => resolver.with_base_url(base_url),
            None => resolver,
        }
    }

    /// Register an agent under a name (matched case-insensitively)
    pub fn with_agent(mut self, name: &str, url: impl Into<String>) -> Self {
        self.agents.insert(normalize_tag(name), url.into());
        self
    }

    /// Fallback for names missing from the table
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Resolve one agent name to a URL
    pub fn resolve_name(&self, name: &str) -> Result<String, EngineError> {
        if let Some(url) = self.agents.get(&normalize_tag(name)) {
            return Ok(url.clone());
        }
        match &self.base_url {
            Some(base) => Ok(format!(
                "{}/agents/{}",
                base,
                utf8_percent_encode(name.trim(), PATH_SEGMENT)
            )),
            None => Err(EngineError::UnknownAgent(name.trim().to_string())),
        }
    }

    /// Replace every reference token in `content`
    pub fn resolve_content(&self, content: &str) -> Result<String, EngineError> {
        let url_spans = find_url_spans(content);
        let mut resolved = String::with_capacity(content.len());
        let mut cursor = 0;

        for token in find_tag_tokens(content) {
            // Tokens overlapping an earlier replacement or a URL stay literal
            if token.start < cursor
                || url_spans
                    .iter()
                    .any(|span| token.start < span.end && span.start < token.end)
            {
                continue;
            }
            let url = self.resolve_name(&token.name)?;
            debug!("Resolved agent reference '{}' to {}", token.name, url);
            resolved.push_str(&content[cursor..token.start]);
            resolved.push_str(&url);
            cursor = token.end;
        }

        resolved.push_str(&content[cursor..]);
        Ok(resolved)
    }
}

#[async_trait]
impl AgentReferenceResolver for DirectoryReferenceResolver {
    async fn resolve_commitment_content(
        &self,
        _commitment: &str,
        content: &str,
    ) -> Result<String, EngineError> {
        self.resolve_content(content)
    }
}

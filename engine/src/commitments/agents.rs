//! Agent relationships: FROM, IMPORT and TEAM
//!
//! Content reaching these functions has already been through the reference
//! resolver (or passed through literally when none is configured).
//!
//! IMPORT merges fetched documents as plain text. An imported book is not
//! compiled: its name line and keyword lines land in the system message as
//! written, and only the final comment strip touches them.

use crate::knowledge::extract_urls;
use folio_sdk::{AgentModelRequirements, EngineError, ImportFetcher, ToolDescriptor};
use tracing::debug;

pub const TEAMMATE_TOOL: &str = "ask_teammate";

/// Parent markers that clear inheritance
const NO_PARENT: &[&str] = &["VOID", "NONE"];

pub fn apply_from(
    mut requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let parent = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| EngineError::commitment("FROM", "no parent agent given"))?;

    requirements.parent_agent_url = if NO_PARENT
        .iter()
        .any(|marker| parent.eq_ignore_ascii_case(marker))
    {
        None
    } else {
        Some(parent.to_string())
    };
    Ok(requirements)
}

/// Fetch every referenced document (one per line) and append its text
/// verbatim, trimmed.
///
/// All references are fetched before anything is merged; one failure fails
/// the whole commitment so the caller keeps the previous requirements.
pub async fn apply_import(
    requirements: AgentModelRequirements,
    content: &str,
    fetcher: Option<&dyn ImportFetcher>,
) -> Result<AgentModelRequirements, EngineError> {
    let references: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if references.is_empty() {
        return Err(EngineError::commitment("IMPORT", "nothing to import"));
    }
    let fetcher = fetcher.ok_or(EngineError::ImportUnavailable)?;

    let mut fetched = Vec::with_capacity(references.len());
    for reference in &references {
        let text = fetcher.fetch(reference).await?;
        debug!("Imported {} bytes from {}", text.len(), reference);
        fetched.push((reference.to_string(), text));
    }

    let mut next = requirements;
    for (reference, text) in fetched {
        next = next.with_system_section(text.trim());
        next.imports.push(reference);
    }
    Ok(next)
}

/// Register teammates and the tool used to consult them
pub fn apply_team(
    mut requirements: AgentModelRequirements,
    content: &str,
) -> Result<AgentModelRequirements, EngineError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(EngineError::commitment("TEAM", "no teammates given"));
    }

    let urls = extract_urls(content);
    let members = if urls.is_empty() {
        vec![content.to_string()]
    } else {
        urls
    };

    let mut added = Vec::new();
    for member in members {
        if !requirements.team.contains(&member) {
            requirements.team.push(member.clone());
            added.push(member);
        }
    }
    if added.is_empty() {
        return Ok(requirements);
    }

    let tool = ToolDescriptor::new(TEAMMATE_TOOL, "Delegate a question to a teammate agent")
        .with_string_param("teammate", "URL of the teammate to ask", true)
        .with_string_param("question", "Question for the teammate", true);

    let listing = added
        .iter()
        .map(|member| format!("- {}", member))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(requirements
        .with_tool(tool)
        .with_system_section(&format!(
            "You can consult these teammates with the `ask_teammate` tool:\n{}",
            listing
        )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn base() -> AgentModelRequirements {
        AgentModelRequirements::basic("Agent")
    }

    struct MapFetcher(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl ImportFetcher for MapFetcher {
        async fn fetch(&self, reference: &str) -> Result<String, EngineError> {
            self.0
                .get(reference)
                .map(|text| text.to_string())
                .ok_or_else(|| EngineError::import(reference, "not found"))
        }
    }

    #[test]
    fn test_from_sets_parent() {
        let req = apply_from(base(), "https://agents.example/parent\n").unwrap();
        assert_eq!(
            req.parent_agent_url.as_deref(),
            Some("https://agents.example/parent")
        );
    }

    #[test]
    fn test_from_void_clears_parent() {
        let req = apply_from(base(), "https://agents.example/parent").unwrap();
        let req = apply_from(req, "VOID").unwrap();
        assert!(req.parent_agent_url.is_none());
    }

    #[test]
    fn test_from_empty_fails() {
        assert!(apply_from(base(), "   ").is_err());
    }

    #[tokio::test]
    async fn test_import_appends_content() {
        let fetcher = MapFetcher(HashMap::from([
            ("rules.book", "Rule: never share prices"),
            ("https://x.example/faq", "FAQ: we ship worldwide"),
        ]));
        let req = apply_import(base(), "rules.book\nhttps://x.example/faq", Some(&fetcher))
            .await
            .unwrap();
        assert_eq!(
            req.system_message,
            "Rule: never share prices\n\nFAQ: we ship worldwide"
        );
        assert_eq!(req.imports, vec!["rules.book", "https://x.example/faq"]);
    }

    #[tokio::test]
    async fn test_imported_book_is_not_compiled() {
        let fetcher = MapFetcher(HashMap::from([(
            "shipping.book",
            "  Shipping Desk\nRULE Ship within 2 days\n",
        )]));
        let req = apply_import(base(), "shipping.book", Some(&fetcher))
            .await
            .unwrap();
        assert_eq!(req.system_message, "Shipping Desk\nRULE Ship within 2 days");
        assert!(req.tools.is_empty());
    }

    #[tokio::test]
    async fn test_import_failure_is_atomic() {
        let fetcher = MapFetcher(HashMap::from([("rules.book", "Rule: be brief")]));
        let err = apply_import(base(), "rules.book\nmissing.book", Some(&fetcher))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Import { .. }));
    }

    #[tokio::test]
    async fn test_import_without_fetcher() {
        let err = apply_import(base(), "rules.book", None).await.unwrap_err();
        assert!(matches!(err, EngineError::ImportUnavailable));
    }

    #[test]
    fn test_team_with_urls() {
        let req = apply_team(
            base(),
            "https://agents.example/lawyer and https://agents.example/accountant",
        )
        .unwrap();
        assert_eq!(req.team.len(), 2);
        assert!(req.has_tool(TEAMMATE_TOOL));
        assert!(req.system_message.contains("- https://agents.example/lawyer"));
    }

    #[test]
    fn test_team_literal_and_dedupe() {
        let req = apply_team(base(), "{Lawyer}").unwrap();
        assert_eq!(req.team, vec!["{Lawyer}"]);
        let again = apply_team(req.clone(), "{Lawyer}").unwrap();
        assert_eq!(again, req);
    }
}

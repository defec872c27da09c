//! KNOWLEDGE

use crate::knowledge::resolve_knowledge_content;
use folio_sdk::{AgentModelRequirements, EngineError, KnowledgeUploader};
use tracing::warn;

/// Add the URLs found in `content` and, when prose remains, one inline source.
///
/// With an uploader the inline text is persisted externally and the returned
/// URL is cited instead; a failed upload keeps the self-contained reference.
pub async fn apply_knowledge(
    mut requirements: AgentModelRequirements,
    content: &str,
    uploader: Option<&dyn KnowledgeUploader>,
) -> Result<AgentModelRequirements, EngineError> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(requirements);
    }

    let resolved = resolve_knowledge_content(content);

    for url in resolved.url_knowledge_sources {
        requirements = requirements.with_system_section(&format!("Knowledge Source URL: {}", url));
        requirements.knowledge_sources.push(url);
    }

    if let Some(inline) = resolved.inline_knowledge_source {
        let source = match uploader {
            Some(uploader) => match uploader.upload_inline_knowledge(content).await {
                Ok(url) => url,
                Err(e) => {
                    warn!("Knowledge upload failed, keeping inline source: {}", e);
                    inline
                }
            },
            None => inline,
        };
        requirements = requirements.with_system_section("Knowledge Source Inline");
        requirements.knowledge_sources.push(source);
    }

    Ok(requirements)
}

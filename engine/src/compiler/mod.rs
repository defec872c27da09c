//! Book compiler
//!
//! Pipeline: parse, filter deletions, fold, post-process.
//!
//! The fold applies commitments strictly in order onto fresh requirements.
//! A failing commitment is logged and skipped; the previous requirements are
//! kept. CLOSED only takes effect when it is the last commitment left after
//! deletion filtering. Compilation itself never fails.
//!
//! # Example
//!
//! ```
//! use folio_engine::compiler::{compile, CompileOptions};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let requirements = compile(
//!     "Support Bot\nPERSONA A patient support agent\nUSE TIME\nCLOSED",
//!     &CompileOptions::default(),
//! )
//! .await;
//!
//! assert!(requirements.system_message.starts_with("A patient support agent"));
//! assert_eq!(requirements.is_closed, Some(true));
//! # }
//! ```

pub mod postprocess;

use crate::commitments::ApplyContext;
use crate::deletion::filter_deletions;
use crate::parser::{parse_agent_source, ParsedCommitment};
use folio_sdk::{
    AgentModelRequirements, AgentReferenceResolver, FolioErrorExt, ImportFetcher,
    KnowledgeUploader, ModelInfo, ModelSelector,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-call compilation inputs
#[derive(Clone, Default)]
pub struct CompileOptions {
    /// Set before folding; a MODEL commitment can still override it
    pub model_name: Option<String>,
    /// Offered models when the book does not name one
    pub available_models: Vec<ModelInfo>,
    pub reference_resolver: Option<Arc<dyn AgentReferenceResolver>>,
    pub knowledge_uploader: Option<Arc<dyn KnowledgeUploader>>,
    pub import_fetcher: Option<Arc<dyn ImportFetcher>>,
    pub model_selector: Option<Arc<dyn ModelSelector>>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn with_available_models(mut self, models: Vec<ModelInfo>) -> Self {
        self.available_models = models;
        self
    }

    pub fn with_reference_resolver(mut self, resolver: Arc<dyn AgentReferenceResolver>) -> Self {
        self.reference_resolver = Some(resolver);
        self
    }

    pub fn with_knowledge_uploader(mut self, uploader: Arc<dyn KnowledgeUploader>) -> Self {
        self.knowledge_uploader = Some(uploader);
        self
    }

    pub fn with_import_fetcher(mut self, fetcher: Arc<dyn ImportFetcher>) -> Self {
        self.import_fetcher = Some(fetcher);
        self
    }

    pub fn with_model_selector(mut self, selector: Arc<dyn ModelSelector>) -> Self {
        self.model_selector = Some(selector);
        self
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field("model_name", &self.model_name)
            .field("available_models", &self.available_models)
            .field("reference_resolver", &self.reference_resolver.is_some())
            .field("knowledge_uploader", &self.knowledge_uploader.is_some())
            .field("import_fetcher", &self.import_fetcher.is_some())
            .field("model_selector", &self.model_selector.is_some())
            .finish()
    }
}

/// Compiler bound to one set of options
#[derive(Debug, Clone, Default)]
pub struct BookCompiler {
    options: CompileOptions,
}

impl BookCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub async fn compile(&self, source: &str) -> AgentModelRequirements {
        compile(source, &self.options).await
    }
}

/// Compile an agent book into model requirements
pub async fn compile(source: &str, options: &CompileOptions) -> AgentModelRequirements {
    let parsed = parse_agent_source(source);
    let agent_name = parsed.agent_name.unwrap_or_default();
    let commitments = filter_deletions(&parsed.commitments);

    info!(
        "Compiling agent '{}': {} commitment(s), {} after deletions",
        agent_name,
        parsed.commitments.len(),
        commitments.len()
    );

    let requirements = fold_commitments(&agent_name, &commitments, options).await;
    let requirements = postprocess::apply_mcp_servers(requirements, source);
    let mut requirements =
        postprocess::append_free_text(requirements, &parsed.non_commitment_lines);
    requirements.system_message = postprocess::strip_comment_lines(&requirements.system_message);

    if requirements.model_name.is_none() && !options.available_models.is_empty() {
        requirements.model_name =
            Some(select_default_model(&requirements.system_message, options).await);
    }

    info!(
        "Compiled agent '{}': {} tool(s), {} knowledge source(s)",
        agent_name,
        requirements.tools.len(),
        requirements.knowledge_sources.len()
    );

    requirements
}

/// Apply filtered commitments in order onto fresh requirements
pub async fn fold_commitments(
    agent_name: &str,
    commitments: &[ParsedCommitment],
    options: &CompileOptions,
) -> AgentModelRequirements {
    let mut requirements = AgentModelRequirements::basic(agent_name);
    if let Some(model_name) = &options.model_name {
        requirements.model_name = Some(model_name.clone());
    }

    let ctx = ApplyContext {
        knowledge_uploader: options.knowledge_uploader.as_deref(),
        import_fetcher: options.import_fetcher.as_deref(),
    };
    let last_index = commitments.len().saturating_sub(1);

    for (index, commitment) in commitments.iter().enumerate() {
        if commitment.kind.is_terminal() && index != last_index {
            debug!(
                "Skipping {} at line {}: not the last commitment",
                commitment.kind, commitment.line
            );
            continue;
        }
        if !commitment.kind.has_definition() {
            continue;
        }

        let content = if commitment.kind.needs_reference_resolution() {
            resolve_references(commitment, options.reference_resolver.as_deref()).await
        } else {
            commitment.content.clone()
        };

        match commitment.kind.apply(&requirements, &content, &ctx).await {
            Ok(next) => {
                debug!("Applied {} from line {}", commitment.kind, commitment.line);
                requirements = next;
            }
            Err(e) => {
                warn!(
                    "Failed to apply {} at line {}: {} ({})",
                    commitment.kind,
                    commitment.line,
                    e,
                    e.user_hint()
                );
            }
        }
    }

    requirements
}

/// Resolved content, or the literal content when resolution is unavailable
async fn resolve_references(
    commitment: &ParsedCommitment,
    resolver: Option<&dyn AgentReferenceResolver>,
) -> String {
    let Some(resolver) = resolver else {
        return commitment.content.clone();
    };

    match resolver
        .resolve_commitment_content(commitment.kind.keyword(), &commitment.content)
        .await
    {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(
                "Could not resolve references in {} at line {}, using literal content: {}",
                commitment.kind, commitment.line, e
            );
            commitment.content.clone()
        }
    }
}

/// Model for books that do not name one. Falls back to the first offered
/// model when there is no selector or it fails.
async fn select_default_model(system_message: &str, options: &CompileOptions) -> String {
    let fallback = options
        .available_models
        .first()
        .map(|m| m.name.clone())
        .unwrap_or_default();

    let Some(selector) = options.model_selector.as_deref() else {
        return fallback;
    };

    match selector
        .select_model(system_message, &options.available_models)
        .await
    {
        Ok(name) if options.available_models.iter().any(|m| m.name == name) => name,
        Ok(name) => {
            warn!("Model selector picked unavailable model '{}', using '{}'", name, fallback);
            fallback
        }
        Err(e) => {
            warn!("Model selection failed, using '{}': {}", fallback, e);
            fallback
        }
    }
}

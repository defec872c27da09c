//! Collaborator traits consumed by the compiler
//!
//! The compiler never reaches out to agent directories, storage, the network
//! or an LLM on its own. Hosting applications inject implementations of these
//! traits per compilation call; every one of them is optional.

use crate::errors::EngineError;
use crate::types::ModelInfo;
use async_trait::async_trait;

/// Rewrites compact agent references (`{Name}`, `@Name`) into URLs.
///
/// Called before FROM, IMPORT and TEAM commitments are applied, with the
/// canonical commitment keyword and the raw content. An `Err` leaves the
/// content unresolved.
#[async_trait]
pub trait AgentReferenceResolver: Send + Sync {
    async fn resolve_commitment_content(
        &self,
        commitment: &str,
        content: &str,
    ) -> Result<String, EngineError>;
}

/// Persists inline knowledge externally and returns the URL to cite instead
#[async_trait]
pub trait KnowledgeUploader: Send + Sync {
    async fn upload_inline_knowledge(&self, text: &str) -> Result<String, EngineError>;
}

/// Loads the content referenced by an IMPORT commitment
#[async_trait]
pub trait ImportFetcher: Send + Sync {
    /// Fetch a single reference (URL or path) as text
    async fn fetch(&self, reference: &str) -> Result<String, EngineError>;
}

/// Picks a default model when the source does not name one
#[async_trait]
pub trait ModelSelector: Send + Sync {
    /// Return the name of one of `models`
    async fn select_model(
        &self,
        system_message: &str,
        models: &[ModelInfo],
    ) -> Result<String, EngineError>;
}

//! Folio SDK
//!
//! Shared library providing the compiled requirements model, error types and
//! collaborator traits. This crate is used by the engine and by hosting
//! applications that inject their own collaborators.

/// Collaborator traits
pub mod collaborators;

/// Error types and handling
pub mod errors;

/// Compiled requirements types
pub mod types;

// Re-export commonly used types
pub use collaborators::{AgentReferenceResolver, ImportFetcher, KnowledgeUploader, ModelSelector};
pub use errors::{EngineError, FolioErrorExt};
pub use types::{AgentModelRequirements, ModelInfo, ToolDescriptor};

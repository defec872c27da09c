//! Error types and handling
//!
//! This module provides the error types used throughout the Folio compiler.
//! All errors implement the `FolioErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! Compilation itself never fails on account of these errors: commitment and
//! collaborator failures are logged and degraded by the engine. They surface
//! directly only from configuration loading and from the CLI.

use thiserror::Error;

/// Trait for Folio error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait FolioErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and does not echo the raw
    /// agent source or collaborator payloads.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors typically require fixing the configuration or the environment.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration
/// - **Commitment**: A single directive could not be applied
/// - **Collaborators**: Reference resolution, imports, uploads, model selection
/// - **Transport**: Network and file system failures
///
/// # Examples
///
/// ```
/// use folio_sdk::errors::{EngineError, FolioErrorExt};
///
/// let error = EngineError::commitment("MODEL", "model name is empty");
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::Config("bad log level".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Commitment errors
    #[error("Commitment {commitment} failed: {reason}")]
    Commitment { commitment: String, reason: String },

    // Collaborator errors
    #[error("Reference resolution failed: {0}")]
    ReferenceResolution(String),

    #[error("Unknown agent reference: {0}")]
    UnknownAgent(String),

    #[error("Import failed for {reference}: {reason}")]
    Import { reference: String, reason: String },

    #[error("No import fetcher configured")]
    ImportUnavailable,

    #[error("Knowledge upload failed: {0}")]
    KnowledgeUpload(String),

    #[error("Model selection failed: {0}")]
    ModelSelection(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Build a commitment failure for the given canonical keyword
    pub fn commitment(commitment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Commitment {
            commitment: commitment.into(),
            reason: reason.into(),
        }
    }

    /// Build an import failure for the given reference
    pub fn import(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Import {
            reference: reference.into(),
            reason: reason.into(),
        }
    }
}

impl FolioErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            // Configuration errors
            Self::Config(_) => "Check your config.toml file for errors",

            // Commitment errors
            Self::Commitment { .. } => "The directive was skipped. Check its content",

            // Collaborator errors
            Self::ReferenceResolution(_) => "Agent reference left unresolved",
            Self::UnknownAgent(_) => "Add the agent to [references.agents] or set a base URL",
            Self::Import { .. } => "Imported content could not be loaded",
            Self::ImportUnavailable => "Imports are disabled in this context",
            Self::KnowledgeUpload(_) => "Knowledge kept inline instead of uploaded",
            Self::ModelSelection(_) => "Falling back to the first available model",

            // Network errors
            Self::Network(_) => "Network operation failed. Check your connection",
            Self::Timeout(_) => "Remote source took too long to respond. Try again",

            // Generic IO error
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::Config(_) | Self::ImportUnavailable => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}

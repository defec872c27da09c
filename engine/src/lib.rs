//! Folio Engine Library
//!
//! Compiles agent books into [`folio_sdk::AgentModelRequirements`].
//! It is used by both the main binary and integration tests.
//!
//! Pipeline: [`parser`] -> [`deletion`] -> fold in [`compiler`] (dispatching
//! to [`commitments`]) -> [`compiler::postprocess`].

/// Tag parameters (`{name}`, `@name`)
pub mod tags;

/// Commitment registry and definitions
pub mod commitments;

/// Book parser
pub mod parser;

/// Retroactive DELETE filter
pub mod deletion;

/// Knowledge resolver and uploader
pub mod knowledge;

/// Agent reference resolution
pub mod references;

/// IMPORT fetchers
pub mod import;

/// Default model selection
pub mod models;

/// Fold engine and compile entry point
pub mod compiler;

/// Configuration management module
pub mod config;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;

pub use compiler::{compile, BookCompiler, CompileOptions};

//! CLI interface for Folio
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Folio agent book compiler
///
/// Compiles agent books into the model requirements consumed by an LLM runtime.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a book into model requirements
    Compile {
        /// Book file, or `-` for stdin
        file: PathBuf,

        /// Model to use unless the book names one
        #[arg(short, long)]
        model: Option<String>,

        /// Do not resolve references, fetch imports or upload knowledge
        #[arg(long)]
        offline: bool,
    },

    /// Show how a book is parsed, before deletions and folding
    Parse {
        /// Book file, or `-` for stdin
        file: PathBuf,
    },

    /// List the commitment vocabulary
    Commitments,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate,
}

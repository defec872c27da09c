//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - compile: Compile a book and print the requirements
//! - parse: Show parsed commitments and free text
//! - commitments: List the vocabulary
//! - config show / validate

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

use crate::commitments::CommitmentType;
use crate::compiler::{BookCompiler, CompileOptions};
use crate::config::Config;
use crate::import::{CompositeImportFetcher, FileImportFetcher, HttpImportFetcher};
use crate::knowledge::{is_inline_knowledge, HttpKnowledgeUploader};
use crate::models::FirstAvailableModelSelector;
use crate::parser::parse_agent_source;
use crate::references::DirectoryReferenceResolver;
use folio_sdk::AgentModelRequirements;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Build compile options from configuration.
///
/// `model` overrides `compiler.default_model`. Offline mode leaves out every
/// collaborator that touches the directory, the filesystem or the network.
pub fn build_compile_options(
    config: &Config,
    model: Option<String>,
    offline: bool,
) -> Result<CompileOptions> {
    let mut options = CompileOptions::new()
        .with_available_models(config.compiler.available_models.clone())
        .with_model_selector(Arc::new(FirstAvailableModelSelector));

    if let Some(model) = model.or_else(|| config.compiler.default_model.clone()) {
        options = options.with_model_name(model);
    }

    if offline {
        return Ok(options);
    }

    options = options.with_reference_resolver(Arc::new(DirectoryReferenceResolver::from_config(
        &config.references,
    )));

    let mut fetcher =
        CompositeImportFetcher::new().with_files(FileImportFetcher::new(config.import.base_dir.clone()));
    if config.import.allow_network {
        let http = HttpImportFetcher::new(config.import.timeout_secs)
            .context("Failed to create HTTP import client")?;
        fetcher = fetcher.with_http(http);
    }
    options = options.with_import_fetcher(Arc::new(fetcher));

    if let Some(endpoint) = &config.knowledge.upload_endpoint {
        let uploader = HttpKnowledgeUploader::new(endpoint, config.import.timeout_secs)
            .context("Failed to create knowledge upload client")?;
        options = options.with_knowledge_uploader(Arc::new(uploader));
    }

    Ok(options)
}

/// Read a book from a file, or stdin for `-`
pub async fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        tokio::io::stdin()
            .read_to_string(&mut source)
            .await
            .context("Failed to read book from stdin")?;
        return Ok(source);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read book {}", path.display()))
}

/// Compile a book and print the requirements
pub async fn handle_compile(
    file: &Path,
    model: Option<String>,
    offline: bool,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let source = read_source(file).await?;
    let options = build_compile_options(config, model, offline)?;
    let requirements = BookCompiler::new(options).compile(&source).await;

    match format {
        OutputFormat::Text => print_requirements(&requirements),
        OutputFormat::Json => println!("{}", requirements.to_json()),
    }

    Ok(())
}

fn print_requirements(requirements: &AgentModelRequirements) {
    println!("Agent:   {}", requirements.agent_name().unwrap_or("(unnamed)"));
    println!(
        "Model:   {}",
        requirements.model_name.as_deref().unwrap_or("(not set)")
    );
    println!(
        "Access:  {}",
        match requirements.is_closed {
            Some(true) => "closed",
            Some(false) => "open",
            None => "open (default)",
        }
    );
    if let Some(parent) = &requirements.parent_agent_url {
        println!("Parent:  {}", parent);
    }

    if !requirements.tools.is_empty() {
        println!();
        println!("Tools:");
        for tool in &requirements.tools {
            println!("  {} - {}", tool.name, tool.description);
        }
    }

    if !requirements.knowledge_sources.is_empty() {
        println!();
        println!("Knowledge:");
        for source in &requirements.knowledge_sources {
            if is_inline_knowledge(source) {
                println!("  (inline, {} bytes encoded)", source.len());
            } else {
                println!("  {}", source);
            }
        }
    }

    if !requirements.team.is_empty() {
        println!();
        println!("Team:");
        for member in &requirements.team {
            println!("  {}", member);
        }
    }

    if !requirements.mcp_servers.is_empty() {
        println!();
        println!("MCP servers:");
        for server in &requirements.mcp_servers {
            println!("  {}", server);
        }
    }

    println!();
    println!("System message:");
    println!("{}", requirements.system_message);
}

/// Print parsed commitments
pub async fn handle_parse(file: &Path, format: OutputFormat) -> Result<()> {
    let source = read_source(file).await?;
    let parsed = parse_agent_source(&source);

    match format {
        OutputFormat::Text => {
            println!("Agent: {}", parsed.agent_name.as_deref().unwrap_or("(unnamed)"));
            println!();
            println!("Commitments:");
            for commitment in &parsed.commitments {
                let tags = commitment.tags();
                let first_line = commitment.content.lines().next().unwrap_or("");
                println!(
                    "  #{:<3} line {:<4} {:<20} {}{}",
                    commitment.ordinal,
                    commitment.line,
                    commitment.keyword,
                    first_line,
                    if tags.is_empty() {
                        String::new()
                    } else {
                        format!(
                            "  [tags: {}]",
                            tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
                        )
                    }
                );
            }
            println!();
            println!(
                "Free text lines: {}",
                parsed
                    .non_commitment_lines
                    .iter()
                    .filter(|l| !l.trim().is_empty())
                    .count()
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
    }

    Ok(())
}

/// List the commitment vocabulary
pub fn handle_commitments(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Commitments:");
            println!();
            for kind in CommitmentType::ALL {
                let aliases = kind.aliases();
                if aliases.is_empty() {
                    println!("  {}", kind.keyword());
                } else {
                    println!("  {} (aliases: {})", kind.keyword(), aliases.join(", "));
                }
            }
        }
        OutputFormat::Json => {
            let output: Vec<_> = CommitmentType::ALL
                .iter()
                .map(|kind| {
                    json!({
                        "type": kind,
                        "keyword": kind.keyword(),
                        "aliases": kind.aliases(),
                        "appliedByFold": kind.has_definition(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// Print the effective configuration
pub fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", config.to_toml()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

/// Validate a configuration file
pub fn handle_config_validate(path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()?,
    };

    let result = Config::load_from_path(&path);

    match format {
        OutputFormat::Text => match &result {
            Ok(_) => println!("Configuration is valid: {}", path.display()),
            Err(e) => println!("Configuration is invalid: {}", e),
        },
        OutputFormat::Json => {
            let output = json!({
                "path": path,
                "valid": result.is_ok(),
                "error": result.as_ref().err().map(|e| e.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    result
        .map(|_| ())
        .with_context(|| format!("Invalid configuration {}", path.display()))
}

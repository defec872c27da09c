// Folio agent book compiler
// Main entry point for the folio binary

use clap::Parser;
use folio_engine::cli::{Cli, Command, ConfigAction};
use folio_engine::config::Config;
use folio_engine::handlers::{
    handle_commitments, handle_compile, handle_config_show, handle_config_validate, handle_parse,
    OutputFormat,
};
use folio_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Validation reports problems itself instead of failing to load
    if let Command::Config {
        action: ConfigAction::Validate,
    } = &cli.command
    {
        init_telemetry_with_level(cli.log.as_deref().unwrap_or("info"));
        return handle_config_validate(cli.config.as_deref(), format);
    }

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // CLI flag wins over the configured level; RUST_LOG wins over both
    init_telemetry_with_level(cli.log.as_deref().unwrap_or(&config.core.log_level));

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::debug!("Folio v{} ({} - {})", version, commit, timestamp);

    // Handle commands
    match cli.command {
        Command::Compile {
            file,
            model,
            offline,
        } => {
            tracing::debug!("Compiling {}", file.display());
            handle_compile(&file, model, offline, &config, format).await
        }

        Command::Parse { file } => {
            tracing::debug!("Parsing {}", file.display());
            handle_parse(&file, format).await
        }

        Command::Commitments => handle_commitments(format),

        Command::Config { action } => match action {
            ConfigAction::Show => handle_config_show(&config, format),
            ConfigAction::Validate => handle_config_validate(cli.config.as_deref(), format),
        },
    }
}

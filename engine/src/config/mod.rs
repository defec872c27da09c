//! Configuration management
//!
//! This module handles loading, validation, and management of the Folio configuration.
//! Configuration is stored in TOML format at ~/.folio/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level
//! - **compiler**: Default model and the models offered for selection
//! - **references**: Agent directory used to resolve `{Name}` / `@Name`
//! - **import**: Where IMPORT reads local books and whether it may use the network
//! - **knowledge**: Optional upload endpoint for inline knowledge
//!
//! # Path Expansion
//!
//! `~` in `import.base_dir` is expanded to the user's home directory.
//!
//! # Examples
//!
//! ```no_run
//! use folio_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from default location
//! let config = Config::load_or_create()?;
//!
//! println!("Log level: {}", config.core.log_level);
//! println!("Imports from: {:?}", config.import.base_dir);
//! # Ok(())
//! # }
//! ```

use folio_sdk::{EngineError, ModelInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    pub core: CoreConfig,

    /// Compiler defaults
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Agent reference directory
    #[serde(default)]
    pub references: ReferencesConfig,

    /// IMPORT settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Knowledge upload settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Compiler defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Model used when neither the CLI nor the book names one
    #[serde(default)]
    pub default_model: Option<String>,

    /// Models offered to the model selector
    #[serde(default)]
    pub available_models: Vec<ModelInfo>,
}

/// Agent reference directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferencesConfig {
    /// Fallback for names missing from `agents`: `<base_url>/agents/<name>`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Agent name -> URL
    #[serde(default)]
    pub agents: BTreeMap<String, String>,
}

/// IMPORT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Directory relative imports are read from (supports ~ expansion)
    #[serde(default = "default_import_dir")]
    pub base_dir: PathBuf,

    /// Allow `http(s)://` imports
    #[serde(default = "default_true")]
    pub allow_network: bool,

    /// Timeout for network imports and uploads
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Knowledge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Endpoint inline knowledge is POSTed to; kept inline when unset
    #[serde(default)]
    pub upload_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_import_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            base_dir: default_import_dir(),
            allow_network: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.folio/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default_config();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.folio/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".folio").join("config.toml"))
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            core: CoreConfig {
                log_level: default_log_level(),
            },
            compiler: CompilerConfig::default(),
            references: ReferencesConfig::default(),
            import: ImportConfig::default(),
            knowledge: KnowledgeConfig::default(),
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate and process configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The log level is unknown
    /// - `import.timeout_secs` is zero
    /// - A reference or upload URL is not absolute http(s)
    /// - Path expansion fails
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.import.timeout_secs == 0 {
            return Err(EngineError::Config(
                "import.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(base_url) = &self.references.base_url {
            validate_http_url("references.base_url", base_url)?;
        }
        for (name, url) in &self.references.agents {
            validate_http_url(&format!("references.agents.{}", name), url)?;
        }
        if let Some(endpoint) = &self.knowledge.upload_endpoint {
            validate_http_url("knowledge.upload_endpoint", endpoint)?;
        }

        if let Some(model) = &self.compiler.default_model {
            if model.trim().is_empty() || model.contains(char::is_whitespace) {
                return Err(EngineError::Config(format!(
                    "Invalid default_model '{}'. Must be a single model name",
                    model
                )));
            }
        }

        self.import.base_dir = expand_path(&self.import.base_dir)?;

        Ok(())
    }
}

fn validate_http_url(field: &str, url: &str) -> Result<(), EngineError> {
    let lower = url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        _ => Err(EngineError::Config(format!(
            "{} must be an absolute http(s) URL, got '{}'",
            field, url
        ))),
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

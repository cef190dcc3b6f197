use crate::cli::{Cli, VerbosityLevel};
use crate::sanitizer::HtmlPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub files: FileConfig,
    pub schema: SchemaConfig,
    pub rules: RulesConfig,
    pub output: OutputConfig,
}

/// File discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// File extensions to process, without the leading dot
    pub extensions: Vec<String>,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Maximum traversal depth (None = unlimited)
    pub max_depth: Option<usize>,
}

/// Schema compilation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchemaConfig {
    /// Reject schema authoring mistakes instead of ignoring them
    pub strict: bool,
}

/// Content and field rules applied after the schema check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    /// Run the HTML content security check
    pub content_security: bool,
    /// Run the empty optional field check
    pub field_shape: bool,
    /// Fields allowed to carry allow-listed HTML
    pub rich_text_fields: Vec<String>,
    /// Fields that must not contain any markup
    pub plain_text_fields: Vec<String>,
    /// Optional fields that must not be empty or null when present
    pub non_empty_fields: Vec<String>,
    /// Allow-list applied to rich-text fields
    pub html: HtmlPolicy,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (failures only)
    pub quiet: bool,
    /// Debug mode (implies verbose)
    pub debug: bool,
    /// Colorize output when writing to a terminal
    pub color: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["yml".to_string(), "yaml".to_string()],
            recursive: true,
            follow_symlinks: false,
            max_depth: None,
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            content_security: true,
            field_shape: true,
            rich_text_fields: vec!["details".to_string()],
            plain_text_fields: vec!["summary".to_string()],
            non_empty_fields: vec!["start".to_string(), "end".to_string()],
            html: HtmlPolicy::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            quiet: false,
            debug: false,
            color: true,
        }
    }
}

impl OutputConfig {
    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.debug {
            VerbosityLevel::Debug
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        let config = if let Some(config_path) = &cli.config {
            Self::load_from_file(config_path).await?
        } else if let Some(found_config) = Self::find_config_file().await? {
            found_config
        } else {
            Config::default()
        };

        let config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let config_names = [
            "validate-yaml.toml",
            "validate-yaml.json",
            ".validate-yaml.toml",
            ".validate-yaml.json",
        ];

        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                tracing::debug!(path = %path.display(), "using configuration file");
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("validate-yaml");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    tracing::debug!(path = %path.display(), "using configuration file");
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence when given)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        // File settings
        if let Some(extensions) = cli.get_extensions() {
            config.files.extensions = extensions;
        }
        if cli.flat {
            config.files.recursive = false;
        }

        // Schema settings
        if cli.lenient_schema {
            config.schema.strict = false;
        }

        // Rule settings
        if !cli.rich_text_fields.is_empty() {
            config.rules.rich_text_fields = cli.rich_text_fields.clone();
        }
        if !cli.plain_text_fields.is_empty() {
            config.rules.plain_text_fields = cli.plain_text_fields.clone();
        }
        if !cli.non_empty_fields.is_empty() {
            config.rules.non_empty_fields = cli.non_empty_fields.clone();
        }
        if cli.skip_content_security {
            config.rules.content_security = false;
        }
        if cli.skip_field_shape {
            config.rules.field_shape = false;
        }

        // Output settings
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.debug {
            config.output.debug = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
            config.output.debug = false;
        }
        if cli.no_color {
            config.output.color = false;
        }

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.files.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "At least one file extension must be specified".to_string(),
            ));
        }

        for ext in &config.files.extensions {
            if ext.is_empty() || ext.contains('/') || ext.contains('\\') || ext.contains('.') {
                return Err(ConfigError::Validation(format!(
                    "Invalid file extension: {}",
                    ext
                )));
            }
        }

        if (config.output.verbose || config.output.debug) && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        let rules = &config.rules;
        for field in rules
            .rich_text_fields
            .iter()
            .chain(&rules.plain_text_fields)
            .chain(&rules.non_empty_fields)
        {
            if field.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "Field names must not be empty".to_string(),
                ));
            }
        }

        if let Some(field) = rules
            .rich_text_fields
            .iter()
            .find(|field| rules.plain_text_fields.contains(field))
        {
            return Err(ConfigError::Validation(format!(
                "Field '{}' cannot be both rich-text and plain-text",
                field
            )));
        }

        rules.html.validate().map_err(ConfigError::Validation)?;

        Ok(())
    }
}

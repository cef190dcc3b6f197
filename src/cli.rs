use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbosityLevel {
    /// Only failing files and the summary
    Quiet,
    /// Every file and every check
    #[default]
    Normal,
    /// Also timings and the effective configuration
    Verbose,
    /// All available debugging information
    Debug,
}

impl VerbosityLevel {
    /// Default `tracing` filter directive for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "info",
            VerbosityLevel::Debug => "debug",
        }
    }
}

/// Validate YAML data files against a JSON Schema and content rules
#[derive(Parser, Debug, Clone)]
#[command(name = "validate-yaml")]
#[command(
    about = "Validate YAML files against a JSON Schema, HTML safety and empty-field rules"
)]
#[command(version)]
pub struct Cli {
    /// Directory to scan for YAML files
    #[arg(help = "Directory (or single file) to validate")]
    pub folder: PathBuf,

    /// JSON Schema describing the expected document shape
    #[arg(help = "Path to the JSON Schema file")]
    pub schema: PathBuf,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// File extensions to process (comma-separated)
    #[arg(
        short = 'e',
        long = "extensions",
        help = "File extensions to process (e.g., 'yml,yaml')"
    )]
    pub extensions: Option<String>,

    /// Only scan the direct children of the folder
    #[arg(long = "flat")]
    pub flat: bool,

    /// Field allowed to carry allow-listed HTML
    #[arg(long = "rich-text-field", action = clap::ArgAction::Append)]
    pub rich_text_fields: Vec<String>,

    /// Field that must not contain any markup
    #[arg(long = "plain-text-field", action = clap::ArgAction::Append)]
    pub plain_text_fields: Vec<String>,

    /// Optional field that must not be empty or null when present
    #[arg(long = "non-empty-field", action = clap::ArgAction::Append)]
    pub non_empty_fields: Vec<String>,

    /// Disable the HTML content security check
    #[arg(long = "skip-content-security")]
    pub skip_content_security: bool,

    /// Disable the empty optional field check
    #[arg(long = "skip-field-shape")]
    pub skip_field_shape: bool,

    /// Tolerate schema authoring mistakes such as unknown keywords
    #[arg(long = "lenient-schema")]
    pub lenient_schema: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (failures only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Debug output: timestamps, error chains and debug logging
    #[arg(long = "debug", conflicts_with = "quiet")]
    pub debug: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Cli {
    pub fn get_extensions(&self) -> Option<Vec<String>> {
        self.extensions.as_ref().map(|extensions| {
            extensions
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }

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

//! # validate-yaml Library
//!
//! Validates folders of YAML data files against a JSON Schema, checks rich-text
//! fields for unsafe HTML and plain-text fields for any markup, and rejects
//! optional fields that are present but empty.

pub mod checks;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod error_reporter;
pub mod file_discovery;
pub mod output;
pub mod sanitizer;
pub mod schema_loader;
pub mod validator;

pub use checks::{
    CheckKind, ContentSecurityCheck, DocumentCheck, FieldShapeCheck, SchemaCheck,
    SchemaValidator, Violation,
};
pub use cli::{Cli, VerbosityLevel};
pub use config::{Config, ConfigError, ConfigManager};
pub use document::{Document, DocumentDecoder, DocumentLoader, YamlDecoder};
pub use error::{DecodeError, GuardError};
pub use error_reporter::ErrorReporter;
pub use file_discovery::FileDiscovery;
pub use output::Output;
pub use sanitizer::{AmmoniaSanitizer, HtmlPolicy, HtmlSanitizer};
pub use schema_loader::{CompiledSchema, SchemaLoader};
pub use validator::{
    CheckOutcome, FileStatus, FileValidationResult, ValidationEngine, ValidationResults,
};

use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("{0}")]
    Usage(String),

    #[error("Failed to load schema {path}: {details}")]
    SchemaLoad { path: PathBuf, details: String },

    #[error("Schema compilation failed: {path} - {details}")]
    SchemaCompile { path: PathBuf, details: String },

    #[error("Cannot read directory {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error in {file}: {details}")]
    Parse { file: PathBuf, details: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure to turn document text into a [`crate::document::Document`]
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("document root must be a mapping, found {found}")]
    NotAMapping { found: &'static str },
}

impl From<crate::config::ConfigError> for GuardError {
    fn from(err: crate::config::ConfigError) -> Self {
        GuardError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_guard_error_display() {
        let schema_error = GuardError::SchemaLoad {
            path: PathBuf::from("schemas/banner.json"),
            details: "expected value at line 1 column 1".to_string(),
        };
        assert!(schema_error.to_string().contains("Failed to load schema"));
        assert!(schema_error.to_string().contains("banner.json"));
        assert!(schema_error.to_string().contains("line 1 column 1"));

        let parse_error = GuardError::Parse {
            file: PathBuf::from("data/broken.yml"),
            details: "did not find expected key".to_string(),
        };
        assert!(parse_error.to_string().contains("YAML parse error"));
        assert!(parse_error.to_string().contains("broken.yml"));
    }

    #[test]
    fn test_usage_error_is_passed_through() {
        let usage = GuardError::Usage("missing <SCHEMA>".to_string());
        assert_eq!(usage.to_string(), "missing <SCHEMA>");
    }

    #[test]
    fn test_filesystem_error_source_chain() {
        use std::error::Error;

        let err = GuardError::Filesystem {
            path: PathBuf::from("/nope"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        assert_eq!(err.source().unwrap().to_string(), "No such file");
        assert!(err.to_string().contains("/nope"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: GuardError = ConfigError::Validation("bad".to_string()).into();
        match err {
            GuardError::Config(msg) => assert!(msg.contains("bad")),
            _ => panic!("Expected GuardError::Config"),
        }
    }

    #[test]
    fn test_not_a_mapping_message() {
        let err = DecodeError::NotAMapping { found: "a sequence" };
        assert_eq!(
            err.to_string(),
            "document root must be a mapping, found a sequence"
        );
    }
}

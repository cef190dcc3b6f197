//! YAML document loading
//!
//! Decoding is format-only: no schema knowledge is applied here.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{DecodeError, GuardError, Result};

/// A parsed YAML document: a mapping from field names to JSON-compatible values
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Wrap a decoded value, which must be a mapping
    pub fn from_value(value: Value) -> std::result::Result<Self, DecodeError> {
        match value {
            Value::Object(_) => Ok(Self { root: value }),
            other => Err(DecodeError::NotAMapping {
                found: describe(&other),
            }),
        }
    }

    /// The whole document, for schema evaluation
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn fields(&self) -> &Map<String, Value> {
        match &self.root {
            Value::Object(map) => map,
            _ => unreachable!("Document root is always a mapping"),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields().get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields().contains_key(field)
    }

    /// The field's value when it is a non-empty string
    pub fn non_empty_str(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "an empty document",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Narrow seam over the document format decoder
pub trait DocumentDecoder {
    fn decode(&self, text: &str) -> std::result::Result<Document, DecodeError>;
}

/// [`DocumentDecoder`] backed by `serde_yaml`
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlDecoder;

impl DocumentDecoder for YamlDecoder {
    fn decode(&self, text: &str) -> std::result::Result<Document, DecodeError> {
        let value: Value = serde_yaml::from_str(text)?;
        Document::from_value(value)
    }
}

/// Reads files from disk and decodes them into [`Document`]s
pub struct DocumentLoader {
    decoder: Box<dyn DocumentDecoder>,
}

impl DocumentLoader {
    pub fn new(decoder: Box<dyn DocumentDecoder>) -> Self {
        Self { decoder }
    }

    /// Read and decode one file. Both read and decode failures are reported as
    /// [`GuardError::Parse`] so the caller can record them per file.
    pub async fn load(&self, path: &Path) -> Result<Document> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| parse_error(path, format!("failed to read file: {}", e)))?;

        self.decoder
            .decode(&text)
            .map_err(|e| parse_error(path, e.to_string()))
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new(Box::new(YamlDecoder))
    }
}

fn parse_error(path: &Path, details: String) -> GuardError {
    GuardError::Parse {
        file: PathBuf::from(path),
        details,
    }
}

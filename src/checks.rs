//! The per-document checks combined by the validation engine.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::sanitizer::HtmlSanitizer;

/// Any `<...>` on a single line
static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| Regex::new(r"<.*?>").expect("Failed to compile tag regex"))
}

/// Which check produced a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckKind {
    Schema,
    ContentSecurity,
    FieldShape,
}

impl CheckKind {
    pub fn label(&self) -> &'static str {
        match self {
            CheckKind::Schema => "Schema",
            CheckKind::ContentSecurity => "Content security",
            CheckKind::FieldShape => "Optional fields",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One failed constraint in one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub check: CheckKind,
    /// Field name, or JSON pointer for schema violations
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(check: CheckKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Narrow seam over the JSON Schema implementation
pub trait SchemaValidator {
    fn validate(&self, document: &Document) -> Vec<Violation>;
}

/// A single rule applied to every parsed document
pub trait DocumentCheck {
    fn kind(&self) -> CheckKind;

    /// Violations found in `document`; empty means the check passed
    fn check(&self, document: &Document) -> Vec<Violation>;
}

/// Structural conformance against the compiled schema
pub struct SchemaCheck {
    validator: Box<dyn SchemaValidator>,
}

impl SchemaCheck {
    pub fn new(validator: Box<dyn SchemaValidator>) -> Self {
        Self { validator }
    }
}

impl DocumentCheck for SchemaCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Schema
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        self.validator.validate(document)
    }
}

/// HTML safety of rich-text fields and absence of markup in plain-text fields
pub struct ContentSecurityCheck {
    sanitizer: Box<dyn HtmlSanitizer>,
    rich_text_fields: Vec<String>,
    plain_text_fields: Vec<String>,
}

impl ContentSecurityCheck {
    pub fn new(
        sanitizer: Box<dyn HtmlSanitizer>,
        rich_text_fields: Vec<String>,
        plain_text_fields: Vec<String>,
    ) -> Self {
        Self {
            sanitizer,
            rich_text_fields,
            plain_text_fields,
        }
    }
}

impl DocumentCheck for ContentSecurityCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::ContentSecurity
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        let mut violations = Vec::new();

        for field in &self.rich_text_fields {
            if let Some(html) = document.non_empty_str(field)
                && self.sanitizer.sanitize(html) != html
            {
                violations.push(Violation::new(
                    CheckKind::ContentSecurity,
                    field.as_str(),
                    format!(
                        "unsafe HTML content found in '{}' (disallowed tag, attribute or URL scheme)",
                        field
                    ),
                ));
            }
        }

        for field in &self.plain_text_fields {
            if let Some(text) = document.non_empty_str(field)
                && get_tag_regex().is_match(text)
            {
                violations.push(Violation::new(
                    CheckKind::ContentSecurity,
                    field.as_str(),
                    format!("'{}' must not contain HTML tags", field),
                ));
            }
        }

        violations
    }
}

/// Optional fields must be omitted or hold a value, never be empty or null
pub struct FieldShapeCheck {
    fields: Vec<String>,
}

impl FieldShapeCheck {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

impl DocumentCheck for FieldShapeCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::FieldShape
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        self.fields
            .iter()
            .filter_map(|field| {
                let empty = match document.get(field)? {
                    Value::Null => true,
                    Value::String(s) => s.is_empty(),
                    _ => false,
                };
                empty.then(|| {
                    Violation::new(
                        CheckKind::FieldShape,
                        field.as_str(),
                        format!(
                            "field '{}' is present but empty; omit it or give it a value",
                            field
                        ),
                    )
                })
            })
            .collect()
    }
}

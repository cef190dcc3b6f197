use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::checks::{CheckKind, SchemaValidator, Violation};
use crate::document::Document;
use crate::error::{GuardError, Result};

/// Keywords understood by the supported JSON Schema drafts
const KNOWN_KEYWORDS: &[&str] = &[
    // core
    "$schema",
    "$id",
    "id",
    "$ref",
    "$defs",
    "definitions",
    "$comment",
    "$anchor",
    "$dynamicRef",
    "$dynamicAnchor",
    "$recursiveRef",
    "$recursiveAnchor",
    "$vocabulary",
    // annotations
    "title",
    "description",
    "default",
    "examples",
    "deprecated",
    "readOnly",
    "writeOnly",
    // validation
    "type",
    "enum",
    "const",
    "multipleOf",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "format",
    "maxItems",
    "minItems",
    "uniqueItems",
    "maxContains",
    "minContains",
    "maxProperties",
    "minProperties",
    "required",
    "dependentRequired",
    "dependencies",
    // applicators
    "items",
    "prefixItems",
    "additionalItems",
    "unevaluatedItems",
    "contains",
    "properties",
    "patternProperties",
    "additionalProperties",
    "unevaluatedProperties",
    "propertyNames",
    "dependentSchemas",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "if",
    "then",
    "else",
    // content
    "contentEncoding",
    "contentMediaType",
    "contentSchema",
];

/// `$schema` URIs with a bundled meta-schema, without the trailing `#`
const KNOWN_META_SCHEMAS: &[&str] = &[
    "https://json-schema.org/draft/2020-12/schema",
    "https://json-schema.org/draft/2019-09/schema",
    "http://json-schema.org/draft-07/schema",
    "http://json-schema.org/draft-06/schema",
    "http://json-schema.org/draft-04/schema",
];

/// Keywords whose value is a single subschema
const SCHEMA_KEYWORDS: &[&str] = &[
    "additionalItems",
    "unevaluatedItems",
    "contains",
    "additionalProperties",
    "unevaluatedProperties",
    "propertyNames",
    "not",
    "if",
    "then",
    "else",
    "contentSchema",
];

/// Keywords whose value is an array of subschemas
const SCHEMA_ARRAY_KEYWORDS: &[&str] = &["prefixItems", "allOf", "anyOf", "oneOf"];

/// Keywords whose value maps names to subschemas
const SCHEMA_MAP_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "$defs",
    "definitions",
    "dependentSchemas",
];

/// Loads a JSON Schema file and compiles it once for the whole run
#[derive(Debug, Clone, Copy)]
pub struct SchemaLoader {
    strict: bool,
}

impl SchemaLoader {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Read, parse and compile the schema at `path`
    pub async fn load(&self, path: &Path) -> Result<CompiledSchema> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GuardError::SchemaLoad {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;

        let schema: Value = serde_json::from_str(&text).map_err(|e| GuardError::SchemaLoad {
            path: path.to_path_buf(),
            details: format!("invalid JSON: {}", e),
        })?;

        tracing::debug!(path = %path.display(), strict = self.strict, "compiling schema");
        self.compile(&schema, path)
    }

    /// Compile an already parsed schema; `path` is used for error reporting
    pub fn compile(&self, schema: &Value, path: &Path) -> Result<CompiledSchema> {
        let compile_error = |details: String| GuardError::SchemaCompile {
            path: path.to_path_buf(),
            details,
        };

        // Custom meta-schemas would need retrieval, which is not available
        if let Some(uri) = unknown_meta_schema(schema) {
            return Err(compile_error(format!("unsupported $schema '{}'", uri)));
        }

        if self.strict {
            jsonschema::meta::validate(schema)
                .map_err(|e| compile_error(format!("schema does not match its meta-schema: {}", e)))?;

            let unknown = find_unknown_keywords(schema);
            if !unknown.is_empty() {
                return Err(compile_error(format!(
                    "unknown keyword(s): {}",
                    unknown.join(", ")
                )));
            }
        }

        let validator = jsonschema::options()
            .should_validate_formats(true)
            .should_ignore_unknown_formats(!self.strict)
            .with_format("date-time", is_date_time)
            .build(schema)
            .map_err(|e| compile_error(e.to_string()))?;

        Ok(CompiledSchema {
            validator,
            path: path.to_path_buf(),
        })
    }
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

/// A compiled schema, immutable for the lifetime of the run
pub struct CompiledSchema {
    validator: jsonschema::Validator,
    path: PathBuf,
}

impl CompiledSchema {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaValidator for CompiledSchema {
    fn validate(&self, document: &Document) -> Vec<Violation> {
        self.validator
            .iter_errors(document.as_value())
            .map(|error| {
                let pointer = error.instance_path.to_string();
                let field = if pointer.is_empty() {
                    "/".to_string()
                } else {
                    pointer
                };
                Violation::new(CheckKind::Schema, field, error.to_string())
            })
            .collect()
    }
}

/// The declared `$schema` when it names no bundled meta-schema
fn unknown_meta_schema(schema: &Value) -> Option<&str> {
    let uri = schema.get("$schema")?.as_str()?;
    if KNOWN_META_SCHEMAS.contains(&uri.trim_end_matches('#')) {
        None
    } else {
        Some(uri)
    }
}

/// ISO-8601 / RFC 3339 date-time, e.g. `2024-01-01T00:00:00Z`
fn is_date_time(value: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(value).is_ok()
}

/// Collect `path: keyword` entries for keywords no supported draft defines
fn find_unknown_keywords(schema: &Value) -> Vec<String> {
    let mut unknown = Vec::new();
    walk_schema(schema, "#", &mut unknown);
    unknown
}

fn walk_schema(schema: &Value, location: &str, unknown: &mut Vec<String>) {
    let Value::Object(map) = schema else {
        return;
    };

    for (keyword, value) in map {
        if !KNOWN_KEYWORDS.contains(&keyword.as_str()) {
            unknown.push(format!("{}/{}", location, keyword));
            continue;
        }

        let keyword_location = format!("{}/{}", location, keyword);
        match value {
            Value::Object(entries) if SCHEMA_MAP_KEYWORDS.contains(&keyword.as_str()) => {
                for (name, subschema) in entries {
                    walk_schema(subschema, &format!("{}/{}", keyword_location, name), unknown);
                }
            }
            Value::Array(items)
                if SCHEMA_ARRAY_KEYWORDS.contains(&keyword.as_str()) || keyword == "items" =>
            {
                for (index, subschema) in items.iter().enumerate() {
                    walk_schema(subschema, &format!("{}/{}", keyword_location, index), unknown);
                }
            }
            Value::Object(_) if SCHEMA_KEYWORDS.contains(&keyword.as_str()) || keyword == "items" => {
                walk_schema(value, &keyword_location, unknown);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentDecoder, YamlDecoder};
    use serde_json::json;
    use tempfile::TempDir;

    fn banner_schema() -> Value {
        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "required": ["title"],
            "additionalProperties": false,
            "properties": {
                "title": { "type": "string", "minLength": 1 },
                "summary": { "type": "string" },
                "details": { "type": "string" },
                "start": { "type": "string", "format": "date-time" },
                "end": { "type": "string", "format": "date-time" },
                "priority": { "type": "integer", "minimum": 0 }
            }
        })
    }

    fn compile(schema: &Value) -> CompiledSchema {
        SchemaLoader::default()
            .compile(schema, Path::new("banner.schema.json"))
            .unwrap()
    }

    fn violations(schema: &CompiledSchema, yaml: &str) -> Vec<Violation> {
        schema.validate(&YamlDecoder.decode(yaml).unwrap())
    }

    #[test]
    fn test_conforming_document_has_no_violations() {
        let schema = compile(&banner_schema());
        let found = violations(
            &schema,
            "title: Maintenance\nstart: 2024-01-01T00:00:00Z\nend: 2024-01-02T08:30:00+02:00\n",
        );
        assert!(found.is_empty(), "unexpected violations: {found:?}");
    }

    #[test]
    fn test_missing_required_field() {
        let schema = compile(&banner_schema());
        let found = violations(&schema, "summary: no title here\n");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field, "/");
        assert!(found[0].message.contains("title"));
        assert_eq!(found[0].check, CheckKind::Schema);
    }

    #[test]
    fn test_type_mismatch_names_field() {
        let schema = compile(&banner_schema());
        let found = violations(&schema, "title: X\npriority: high\n");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field, "/priority");
    }

    #[test]
    fn test_additional_property_is_reported() {
        let schema = compile(&banner_schema());
        let found = violations(&schema, "title: X\ncolour: red\n");

        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("colour"));
    }

    #[test]
    fn test_all_errors_are_reported() {
        let schema = compile(&banner_schema());
        let found = violations(&schema, "title: ''\npriority: -1\nstart: tomorrow\n");

        let fields: Vec<&str> = found.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"/title"));
        assert!(fields.contains(&"/priority"));
        assert!(fields.contains(&"/start"));
    }

    #[test]
    fn test_date_time_format_is_enforced() {
        let schema = compile(&banner_schema());

        assert!(violations(&schema, "title: X\nstart: 2024-01-01T00:00:00Z\n").is_empty());
        assert_eq!(violations(&schema, "title: X\nstart: 2024-13-01\n").len(), 1);
        assert_eq!(violations(&schema, "title: X\nstart: ''\n").len(), 1);
    }

    #[test]
    fn test_is_date_time() {
        assert!(is_date_time("2024-01-01T00:00:00Z"));
        assert!(is_date_time("2024-06-30T23:59:59.123+05:30"));
        assert!(!is_date_time("2024-01-01"));
        assert!(!is_date_time(""));
        assert!(!is_date_time("not a date"));
    }

    #[test]
    fn test_strict_mode_rejects_unknown_keyword() {
        let schema = json!({
            "type": "object",
            "properties": {
                "start": { "type": "string", "fromat": "date-time" }
            }
        });

        let err = SchemaLoader::new(true)
            .compile(&schema, Path::new("s.json"))
            .err()
            .expect("strict compile should fail");
        assert!(matches!(err, GuardError::SchemaCompile { .. }));
        assert!(err.to_string().contains("#/properties/start/fromat"));

        assert!(
            SchemaLoader::new(false)
                .compile(&schema, Path::new("s.json"))
                .is_ok()
        );
    }

    #[test]
    fn test_strict_mode_rejects_meta_schema_violation() {
        let schema = json!({ "type": "object", "required": "title" });

        assert!(
            SchemaLoader::new(true)
                .compile(&schema, Path::new("s.json"))
                .is_err()
        );
    }

    fn assert_compile_error(schema: &Value, strict: bool) -> String {
        match SchemaLoader::new(strict).compile(schema, Path::new("s.json")) {
            Err(err @ GuardError::SchemaCompile { .. }) => err.to_string(),
            Err(other) => panic!("Expected SchemaCompile error, got {other:?}"),
            Ok(_) => panic!("schema compiled but should not have (strict = {strict})"),
        }
    }

    #[test]
    fn test_unknown_meta_schema_is_compile_error() {
        let schema = json!({ "$schema": "https://example.com/custom", "type": "object" });

        for strict in [true, false] {
            let message = assert_compile_error(&schema, strict);
            assert!(message.contains("unsupported $schema 'https://example.com/custom'"));
        }
    }

    #[test]
    fn test_known_meta_schema_with_fragment_is_accepted() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object"
        });

        assert!(SchemaLoader::new(true).compile(&schema, Path::new("s.json")).is_ok());
        assert_eq!(unknown_meta_schema(&schema), None);
    }

    #[test]
    fn test_remote_reference_is_compile_error() {
        let schema = json!({
            "type": "object",
            "properties": { "title": { "$ref": "https://example.com/title.json" } }
        });

        for strict in [true, false] {
            assert_compile_error(&schema, strict);
        }
    }

    #[test]
    fn test_invalid_pattern_is_compile_error() {
        let schema = json!({
            "type": "object",
            "properties": { "code": { "type": "string", "pattern": "(unclosed" } }
        });

        for strict in [true, false] {
            assert_compile_error(&schema, strict);
        }
    }

    #[test]
    fn test_find_unknown_keywords_walks_subschemas() {
        let schema = json!({
            "type": "object",
            "allOf": [{ "typo": 1 }],
            "items": { "minLenght": 2 },
            "$defs": { "date": { "format": "date-time", "exmaple": "x" } },
            "properties": { "title": { "type": "string" } }
        });

        let mut found = find_unknown_keywords(&schema);
        found.sort();
        assert_eq!(
            found,
            vec![
                "#/$defs/date/exmaple".to_string(),
                "#/allOf/0/typo".to_string(),
                "#/items/minLenght".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("schema.json");
        tokio::fs::write(&path, banner_schema().to_string())
            .await
            .unwrap();

        let schema = SchemaLoader::default().load(&path).await.unwrap();
        assert_eq!(schema.path(), path.as_path());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = SchemaLoader::default()
            .load(Path::new("/nonexistent/schema.json"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, GuardError::SchemaLoad { .. }));
    }

    #[tokio::test]
    async fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("schema.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = SchemaLoader::default().load(&path).await.err().unwrap();
        assert!(matches!(err, GuardError::SchemaLoad { .. }));
        assert!(err.to_string().contains("invalid JSON"));
    }
}

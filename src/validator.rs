//! Sequential Validation Engine
//!
//! Loads each discovered file, runs every active check against it and folds the
//! outcomes into [`ValidationResults`]. Files are processed one at a time; the
//! results value is the only accumulator and is returned to the caller.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::checks::{
    CheckKind, ContentSecurityCheck, DocumentCheck, FieldShapeCheck, SchemaCheck, Violation,
};
use crate::config::RulesConfig;
use crate::document::{Document, DocumentLoader};
use crate::error::GuardError;
use crate::sanitizer::AmmoniaSanitizer;
use crate::schema_loader::CompiledSchema;

/// Status of a single file validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    /// Every check passed
    Passed,
    /// At least one check reported a violation
    Failed { violation_count: usize },
    /// The file could not be read or decoded; no checks were run
    ParseError { message: String },
}

impl FileStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, FileStatus::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileStatus::Failed { .. })
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, FileStatus::ParseError { .. })
    }
}

/// Outcome of one check against one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub kind: CheckKind,
    pub violations: Vec<Violation>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Result of validating a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileValidationResult {
    /// Path to the validated file
    pub path: PathBuf,
    pub status: FileStatus,
    /// One entry per check run, in pipeline order; empty on parse errors
    pub checks: Vec<CheckOutcome>,
    pub duration: Duration,
}

impl FileValidationResult {
    /// Combine check outcomes; the file passes only if every check passed
    pub fn from_checks(path: PathBuf, checks: Vec<CheckOutcome>, duration: Duration) -> Self {
        let violation_count: usize = checks.iter().map(|c| c.violations.len()).sum();
        let status = if violation_count == 0 {
            FileStatus::Passed
        } else {
            FileStatus::Failed { violation_count }
        };

        Self {
            path,
            status,
            checks,
            duration,
        }
    }

    pub fn parse_error(path: PathBuf, error: GuardError, duration: Duration) -> Self {
        let message = match error {
            GuardError::Parse { details, .. } => details,
            other => other.to_string(),
        };

        Self {
            path,
            status: FileStatus::ParseError { message },
            checks: Vec::new(),
            duration,
        }
    }

    /// Base name used in report lines
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.checks.iter().flat_map(|c| c.violations.iter())
    }
}

/// Aggregated results of validating every discovered file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResults {
    pub total_files: usize,
    pub passed_files: usize,
    pub failed_files: usize,
    pub parse_error_files: usize,
    pub total_duration: Duration,
    pub file_results: Vec<FileValidationResult>,
}

impl ValidationResults {
    /// Aggregate individual file results into a summary
    pub fn aggregate(file_results: Vec<FileValidationResult>) -> Self {
        let mut results = Self::default();
        for result in file_results {
            results.record(result);
        }
        results
    }

    /// Fold one more file into the results
    pub fn record(&mut self, result: FileValidationResult) {
        self.total_files += 1;
        match result.status {
            FileStatus::Passed => self.passed_files += 1,
            FileStatus::Failed { .. } => self.failed_files += 1,
            FileStatus::ParseError { .. } => self.parse_error_files += 1,
        }
        self.total_duration += result.duration;
        self.file_results.push(result);
    }

    /// True when any file failed a check or could not be parsed
    pub fn has_failures(&self) -> bool {
        self.failed_files > 0 || self.parse_error_files > 0
    }

    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }

    /// Process exit status: 1 on any failure, 0 otherwise (including no files)
    pub fn exit_status(&self) -> u8 {
        if self.has_failures() { 1 } else { 0 }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

/// Runs the document loader and every active check over a set of files
pub struct ValidationEngine {
    loader: DocumentLoader,
    checks: Vec<Box<dyn DocumentCheck>>,
}

impl ValidationEngine {
    pub fn new(loader: DocumentLoader, checks: Vec<Box<dyn DocumentCheck>>) -> Self {
        Self { loader, checks }
    }

    /// Build the standard pipeline: schema check, then the rule checks enabled
    /// in `rules`
    pub fn from_config(schema: CompiledSchema, rules: &RulesConfig) -> Self {
        let mut checks: Vec<Box<dyn DocumentCheck>> =
            vec![Box::new(SchemaCheck::new(Box::new(schema)))];

        if rules.content_security {
            checks.push(Box::new(ContentSecurityCheck::new(
                Box::new(AmmoniaSanitizer::new(rules.html.clone())),
                rules.rich_text_fields.clone(),
                rules.plain_text_fields.clone(),
            )));
        }

        if rules.field_shape {
            checks.push(Box::new(FieldShapeCheck::new(rules.non_empty_fields.clone())));
        }

        Self::new(DocumentLoader::default(), checks)
    }

    /// Check kinds in pipeline order
    pub fn active_checks(&self) -> Vec<CheckKind> {
        self.checks.iter().map(|c| c.kind()).collect()
    }

    /// Run every check against an already parsed document
    pub fn check_document(&self, document: &Document) -> Vec<CheckOutcome> {
        self.checks
            .iter()
            .map(|check| CheckOutcome {
                kind: check.kind(),
                violations: check.check(document),
            })
            .collect()
    }

    /// Load and check one file; never fails, errors are recorded in the result
    pub async fn validate_file(&self, path: &Path) -> FileValidationResult {
        let start_time = Instant::now();

        let document = match self.loader.load(path).await {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "document failed to load");
                return FileValidationResult::parse_error(
                    path.to_path_buf(),
                    e,
                    start_time.elapsed(),
                );
            }
        };

        let checks = self.check_document(&document);
        FileValidationResult::from_checks(path.to_path_buf(), checks, start_time.elapsed())
    }

    /// Validate files one after another, reporting each as soon as it is done
    pub async fn validate_files(
        &self,
        files: Vec<PathBuf>,
        on_file: &mut dyn FnMut(&FileValidationResult),
    ) -> ValidationResults {
        let mut results = ValidationResults::default();

        for file_path in files {
            let result = self.validate_file(&file_path).await;
            on_file(&result);
            results.record(result);
        }

        results
    }
}

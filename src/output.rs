//! Human-readable Output
//!
//! Formats the scan header, per-file blocks and the final summary. Every
//! function returns a `String` so `main` decides where it is written.

use std::path::Path;
use std::time::Duration;

use crate::cli::VerbosityLevel;
use crate::validator::{CheckOutcome, FileStatus, FileValidationResult, ValidationResults};

const GREEN: &str = "32";
const RED: &str = "31";
const YELLOW: &str = "33";
const BOLD: &str = "1";

/// Output formatter for validation progress and results
pub struct Output {
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    /// Colors are used only when enabled and stdout is a terminal
    pub fn new(verbosity: VerbosityLevel, color: bool) -> Self {
        Self {
            verbosity,
            show_colors: color && atty::is(atty::Stream::Stdout),
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_scanning(&self, folder: &Path, recursive: bool) -> String {
        let mode = if recursive { "recursively" } else { "top level only" };
        format!("Scanning {} for YAML files ({})...", folder.display(), mode)
    }

    pub fn format_discovered(&self, count: usize, folder: &Path) -> String {
        if count == 0 {
            self.colorize(
                &format!("⚠ No YAML files found in {}.", folder.display()),
                YELLOW,
            )
        } else {
            format!(
                "Found {} YAML file{} to validate.",
                count,
                if count == 1 { "" } else { "s" }
            )
        }
    }

    /// Quiet mode hides files that passed
    pub fn should_show(&self, result: &FileValidationResult) -> bool {
        self.verbosity != VerbosityLevel::Quiet || !result.status.is_passed()
    }

    pub fn format_file_result(&self, result: &FileValidationResult) -> String {
        let file_name = result.file_name();
        let mut output = format!(
            "{} {}\n",
            self.colorize("Validating", BOLD),
            result.path.display()
        );

        match &result.status {
            FileStatus::ParseError { message } => {
                output.push_str(&format!(
                    "  {} {}\n",
                    self.colorize("⚠ YAML parse error:", YELLOW),
                    message
                ));
            }
            FileStatus::Passed | FileStatus::Failed { .. } => {
                for outcome in &result.checks {
                    output.push_str(&self.format_check(&file_name, outcome));
                }
            }
        }

        let verdict = if result.status.is_passed() {
            self.colorize(&format!("✓ {} passed all checks.", file_name), GREEN)
        } else {
            self.colorize(&format!("✗ {} failed validation.", file_name), RED)
        };

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&format!(
                "  {} ({})",
                verdict,
                format_duration(result.duration)
            ));
        } else {
            output.push_str(&format!("  {}", verdict));
        }

        output
    }

    fn format_check(&self, file_name: &str, outcome: &CheckOutcome) -> String {
        if outcome.passed() {
            return format!(
                "  {} {} passed\n",
                self.colorize("✓", GREEN),
                outcome.kind
            );
        }

        let mut output = format!(
            "  {} {} failed\n",
            self.colorize("✗", RED),
            outcome.kind
        );
        for violation in &outcome.violations {
            output.push_str(&format!("    • {}: {}\n", file_name, violation));
        }
        output
    }

    pub fn format_summary(&self, results: &ValidationResults) -> String {
        let mut output = String::new();
        output.push_str("Validation Summary:\n");
        output.push_str(&format!("  Total files: {}\n", results.total_files));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Passed:", GREEN),
            results.passed_files
        ));

        if results.failed_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Failed:", RED),
                results.failed_files
            ));
        }
        if results.parse_error_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Parse errors:", YELLOW),
                results.parse_error_files
            ));
        }

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&format!(
                "  Duration: {}\n",
                format_duration(results.total_duration)
            ));
        }

        if results.has_failures() {
            let bad = results.failed_files + results.parse_error_files;
            output.push_str(&self.colorize(
                &format!(
                    "Validation failed: {} of {} file{} had errors.",
                    bad,
                    results.total_files,
                    if results.total_files == 1 { "" } else { "s" }
                ),
                RED,
            ));
        } else if results.is_empty() {
            output.push_str(&self.colorize("No YAML files were validated.", YELLOW));
        } else {
            output.push_str(&self.colorize("All YAML files passed validation.", GREEN));
        }

        output
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}

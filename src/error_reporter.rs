use crate::cli::VerbosityLevel;
use crate::error::GuardError;

/// Reports run-stopping errors on stderr with configurable verbosity
pub struct ErrorReporter {
    verbosity: VerbosityLevel,
    show_timestamps: bool,
}

impl ErrorReporter {
    /// Create a new error reporter with specified verbosity
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_timestamps: verbosity == VerbosityLevel::Debug,
        }
    }

    pub fn with_timestamps(mut self, show_timestamps: bool) -> Self {
        self.show_timestamps = show_timestamps;
        self
    }

    /// Print a fatal error; every level prints at least one line
    pub fn report(&self, error: &GuardError) {
        eprintln!("{}", self.format_error(error));
    }

    pub fn format_error(&self, error: &GuardError) -> String {
        // Usage text is already formatted by the argument parser
        if let GuardError::Usage(message) = error {
            return message.trim_end().to_string();
        }

        match self.verbosity {
            VerbosityLevel::Quiet => self.format_error_brief(error),
            VerbosityLevel::Normal | VerbosityLevel::Verbose => self.format_error_verbose(error),
            VerbosityLevel::Debug => self.format_error_debug(error),
        }
    }

    /// Format error for brief output (quiet mode)
    fn format_error_brief(&self, error: &GuardError) -> String {
        format!("{}Error: {}", self.timestamp(), error)
    }

    /// Error line followed by a suggestion when one applies
    fn format_error_verbose(&self, error: &GuardError) -> String {
        let mut output = self.format_error_brief(error);
        if let Some(suggestion) = suggestion_for(error) {
            output.push_str(&format!("\nSuggestion: {}", suggestion));
        }
        output
    }

    /// Format error for debug output
    fn format_error_debug(&self, error: &GuardError) -> String {
        let mut output = self.format_error_verbose(error);
        output.push_str(&format!("\nDebug Info: {:?}", error));

        output.push_str("\nError Chain:");
        let mut current_error: &dyn std::error::Error = error;
        let mut level = 0;
        while let Some(source) = current_error.source() {
            output.push_str(&format!("\n  {}: {}", level + 1, source));
            current_error = source;
            level += 1;
        }

        output
    }

    fn timestamp(&self) -> String {
        if self.show_timestamps {
            format!("[{}] ", chrono::Utc::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

fn suggestion_for(error: &GuardError) -> Option<&'static str> {
    match error {
        GuardError::SchemaLoad { .. } => {
            Some("Check that the schema path exists and contains valid JSON")
        }
        GuardError::SchemaCompile { .. } => Some(
            "Fix the schema keywords and formats, or pass --lenient-schema to ignore unknown ones",
        ),
        GuardError::Filesystem { .. } => {
            Some("Check that the folder exists and is readable by the current user")
        }
        GuardError::Config(_) => {
            Some("Check the configuration file syntax (TOML or JSON) and field values")
        }
        GuardError::Usage(_) | GuardError::Parse { .. } => None,
    }
}

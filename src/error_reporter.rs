//! Stderr reporting of faults and progress notes.

use crate::config::{Config, VerbosityLevel};
use crate::error::DomEchoError;
use crate::validation::ValidationSummary;

const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Fault and progress reporting on stderr with configurable verbosity
///
/// Validation occurrences do not go through here; they are written by the
/// [`crate::validation::StreamReporter`] the parser reports into.
pub struct ErrorReporter {
    verbosity: VerbosityLevel,
    show_timestamps: bool,
    use_color: bool,
}

impl ErrorReporter {
    /// Create a new error reporter with specified verbosity
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self::with_options(verbosity, false)
    }

    /// Create a new error reporter with additional options
    pub fn with_options(verbosity: VerbosityLevel, show_timestamps: bool) -> Self {
        Self {
            verbosity,
            show_timestamps,
            use_color: atty::is(atty::Stream::Stderr),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_options(config.verbosity(), config.output.timestamps)
    }

    /// Force coloured output on or off
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    /// Report a fault; shown at every verbosity
    pub fn report_error(&self, error: &DomEchoError) {
        eprintln!("{}", self.format_error(error));
    }

    /// Progress note, shown from verbose up
    pub fn info(&self, message: &str) {
        if let Some(line) = self.format_info(message) {
            eprintln!("{}", line);
        }
    }

    /// Debugging note, shown only at debug verbosity
    pub fn debug(&self, message: &str) {
        if self.verbosity == VerbosityLevel::Debug {
            eprintln!("{}debug: {}", self.timestamp(), message);
        }
    }

    /// Occurrence totals after a run, shown from verbose up
    pub fn report_summary(&self, summary: &ValidationSummary) {
        self.info(&format!("Validation summary: {}", summary));
    }

    pub fn format_info(&self, message: &str) -> Option<String> {
        (self.verbosity >= VerbosityLevel::Verbose)
            .then(|| format!("{}{}", self.timestamp(), message))
    }

    pub fn format_error(&self, error: &DomEchoError) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => self.format_error_brief(error),
            VerbosityLevel::Normal => self.format_error_normal(error),
            VerbosityLevel::Verbose => self.format_error_verbose(error),
            VerbosityLevel::Debug => self.format_error_debug(error),
        }
    }

    fn prefix(&self) -> String {
        if self.use_color {
            format!("{RED}error:{RESET} ")
        } else {
            "error: ".to_string()
        }
    }

    fn timestamp(&self) -> String {
        if self.show_timestamps {
            format!("[{}] ", chrono::Local::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }

    /// Format error for brief output (quiet mode)
    fn format_error_brief(&self, error: &DomEchoError) -> String {
        format!("{}{}", self.prefix(), error)
    }

    /// Format error for normal output
    fn format_error_normal(&self, error: &DomEchoError) -> String {
        format!("{}{}{}", self.timestamp(), self.prefix(), error)
    }

    /// Format error for verbose output
    fn format_error_verbose(&self, error: &DomEchoError) -> String {
        let mut output = self.format_error_normal(error);
        if let Some(suggestion) = suggestion_for(error) {
            output.push_str("\nSuggestion: ");
            output.push_str(suggestion);
        }
        output
    }

    /// Format error for debug output
    fn format_error_debug(&self, error: &DomEchoError) -> String {
        let mut output = self.format_error_verbose(error);
        output.push_str(&format!("\nDebug Info: {:?}", error));

        let mut current: &dyn std::error::Error = error;
        let mut level = 0;
        while let Some(source) = current.source() {
            if level == 0 {
                output.push_str("\nError Chain:");
            }
            level += 1;
            output.push_str(&format!("\n  {}: {}", level, source));
            current = source;
        }

        output
    }
}

fn suggestion_for(error: &DomEchoError) -> Option<&'static str> {
    match error {
        DomEchoError::Io(_) => Some("Check that the file exists and is readable"),
        DomEchoError::Config(_) => Some("Run with --help to see the accepted options"),
        DomEchoError::Parse { .. } => {
            Some("Fix the well-formedness errors reported above and try again")
        }
        DomEchoError::SchemaParsing { .. } => {
            Some("Verify the schema path and that the schema itself is valid XSD")
        }
        DomEchoError::LibXml2Internal { .. } => None,
    }
}

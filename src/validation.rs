//! Validation Reporter
//!
//! The parser hands every warning, recoverable error and fatal error it
//! finds to a [`ValidationReporter`]. Reporters only echo; whether parsing
//! goes on after an error is up to the parser.

use std::fmt;
use std::io::Write;

/// How bad a validation occurrence is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    RecoverableError,
    Fatal,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::RecoverableError => "Error",
            Severity::Fatal => "Fatal Error",
        }
    }
}

/// A single warning or error raised while parsing or validating
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOccurrence {
    pub severity: Severity,
    /// Path or URI of the input the occurrence refers to
    pub source_locator: String,
    /// 1-based; 0 when the parser knows no position
    pub line: u32,
    pub message: String,
}

impl ValidationOccurrence {
    pub fn new(
        severity: Severity,
        source_locator: impl Into<String>,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            source_locator: source_locator.into(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: URI={} Line={}: {}",
            self.severity.label(),
            self.source_locator,
            self.line,
            self.message
        )
    }
}

/// Receiver of validation occurrences, registered before parsing starts
pub trait ValidationReporter {
    fn on_warning(&mut self, occurrence: &ValidationOccurrence);

    fn on_recoverable_error(&mut self, occurrence: &ValidationOccurrence);

    fn on_fatal_error(&mut self, occurrence: &ValidationOccurrence);

    /// Dispatch to the method matching the occurrence's severity
    fn report(&mut self, occurrence: &ValidationOccurrence) {
        match occurrence.severity {
            Severity::Warning => self.on_warning(occurrence),
            Severity::RecoverableError => self.on_recoverable_error(occurrence),
            Severity::Fatal => self.on_fatal_error(occurrence),
        }
    }
}

/// Per-severity tally of what a reporter has seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub warnings: usize,
    pub errors: usize,
    pub fatal_errors: usize,
}

impl ValidationSummary {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Warning => self.warnings += 1,
            Severity::RecoverableError => self.errors += 1,
            Severity::Fatal => self.fatal_errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.warnings + self.errors + self.fatal_errors
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for ValidationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} warning(s), {} error(s), {} fatal error(s)",
            self.warnings, self.errors, self.fatal_errors
        )
    }
}

/// Writes each occurrence as one line to a sink (stderr in the binary)
pub struct StreamReporter<W: Write> {
    out: W,
    summary: ValidationSummary,
}

impl<W: Write> StreamReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            summary: ValidationSummary::default(),
        }
    }

    pub fn summary(&self) -> ValidationSummary {
        self.summary
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, occurrence: &ValidationOccurrence) {
        self.summary.record(occurrence.severity);
        // A broken error stream must not interrupt parsing.
        let _ = writeln!(self.out, "{}", occurrence);
        let _ = self.out.flush();
    }
}

impl<W: Write> ValidationReporter for StreamReporter<W> {
    fn on_warning(&mut self, occurrence: &ValidationOccurrence) {
        self.emit(occurrence);
    }

    fn on_recoverable_error(&mut self, occurrence: &ValidationOccurrence) {
        self.emit(occurrence);
    }

    fn on_fatal_error(&mut self, occurrence: &ValidationOccurrence) {
        self.emit(occurrence);
    }
}

/// Keeps every occurrence in arrival order
#[derive(Debug, Default)]
pub struct CollectingReporter {
    occurrences: Vec<ValidationOccurrence>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occurrences(&self) -> &[ValidationOccurrence] {
        &self.occurrences
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationOccurrence> {
        self.occurrences
            .iter()
            .filter(move |occurrence| occurrence.severity == severity)
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

impl ValidationReporter for CollectingReporter {
    fn on_warning(&mut self, occurrence: &ValidationOccurrence) {
        self.occurrences.push(occurrence.clone());
    }

    fn on_recoverable_error(&mut self, occurrence: &ValidationOccurrence) {
        self.occurrences.push(occurrence.clone());
    }

    fn on_fatal_error(&mut self, occurrence: &ValidationOccurrence) {
        self.occurrences.push(occurrence.clone());
    }
}

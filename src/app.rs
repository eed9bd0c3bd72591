//! Driver for a single run of the tool.

use std::fs;
use std::io::{self, Write};

use crate::config::Config;
use crate::error::Result;
use crate::error_reporter::ErrorReporter;
use crate::parser::XmlParser;
use crate::printer::TreePrinter;
use crate::validation::{StreamReporter, ValidationSummary};

/// Echo the tree of `config.file` to `out`
///
/// Validation occurrences go to `err` as the parser finds them, so all of
/// them are written before the first tree line. Nothing is written to `out`
/// when parsing fails.
pub fn run<P, W, E>(
    config: &Config,
    parser: &P,
    out: W,
    err: E,
    diagnostics: &ErrorReporter,
) -> Result<ValidationSummary>
where
    P: XmlParser + ?Sized,
    W: Write,
    E: Write,
{
    let source_locator = config.file.display().to_string();

    diagnostics.info(&format!("Reading {}", source_locator));
    let input = fs::read(&config.file)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", source_locator, e)))?;

    diagnostics.info(&format!("Validation: {}", config.validation));
    let mut reporter = StreamReporter::new(err);
    let parsed = parser.parse(&input, &source_locator, &config.validation, &mut reporter);
    let summary = reporter.summary();
    diagnostics.debug(&format!("Occurrences before failure check: {}", summary));

    let tree = parsed?;
    diagnostics.report_summary(&summary);

    TreePrinter::new(out).render(tree.root())?;
    Ok(summary)
}

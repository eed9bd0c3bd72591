//! Parser collaborator
//!
//! [`XmlParser`] is the seam between the printer and whatever produces the
//! tree. [`LibXml2Parser`] is the implementation backed by libxml2. DTD
//! validation happens inside the parse; XML Schema validation runs on the
//! parsed document afterwards. Both report through the same
//! [`ValidationReporter`].

use std::fmt;
use std::path::PathBuf;

use crate::dom::DocumentTree;
use crate::error::{DomEchoError, LibXml2Error, Result};
use crate::libxml2::{LibXml2Wrapper, ParseOptions, XmlDocPtr, XmlErrorLevel, XmlErrorRecord};
use crate::schema_loader::SchemaExtractor;
use crate::validation::{Severity, ValidationOccurrence, ValidationReporter};

/// Which validation runs while parsing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    None,
    Dtd,
    /// XML Schema, against `schema_source` when given, else the document's hints
    Xsd { schema_source: Option<PathBuf> },
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::None => write!(f, "none"),
            ValidationMode::Dtd => write!(f, "DTD"),
            ValidationMode::Xsd {
                schema_source: Some(path),
            } => write!(f, "XML Schema ({})", path.display()),
            ValidationMode::Xsd {
                schema_source: None,
            } => write!(f, "XML Schema (document hints)"),
        }
    }
}

/// Produces a document tree from raw bytes
pub trait XmlParser {
    /// Parse `input`, reporting validation occurrences as they are found
    ///
    /// `source_locator` names the input in occurrences and is the base for
    /// relative references inside the document.
    fn parse(
        &self,
        input: &[u8],
        source_locator: &str,
        mode: &ValidationMode,
        reporter: &mut dyn ValidationReporter,
    ) -> Result<DocumentTree>;
}

/// [`XmlParser`] backed by libxml2
pub struct LibXml2Parser {
    libxml: LibXml2Wrapper,
}

impl LibXml2Parser {
    pub fn new() -> Self {
        Self {
            libxml: LibXml2Wrapper::new(),
        }
    }

    /// libxml2 options for a validation mode
    pub fn parse_options(mode: &ValidationMode) -> ParseOptions {
        // The DTD is always read so ATTLIST defaults reach the tree.
        let base = ParseOptions::NOENT
            | ParseOptions::NONET
            | ParseOptions::BIG_LINES
            | ParseOptions::DTDLOAD
            | ParseOptions::DTDATTR;
        match mode {
            ValidationMode::Dtd => base | ParseOptions::DTDVALID,
            ValidationMode::None | ValidationMode::Xsd { .. } => base,
        }
    }

    fn validate_against_schema(
        &self,
        doc: &XmlDocPtr,
        tree: &DocumentTree,
        schema_source: Option<&PathBuf>,
        reporter: &mut dyn ValidationReporter,
    ) -> Result<()> {
        let location = match schema_source {
            Some(path) => path.display().to_string(),
            None => match SchemaExtractor::select(tree) {
                Some(reference) => reference.location(),
                None => {
                    let name = tree
                        .document_element()
                        .map(|element| element.name.as_str())
                        .unwrap_or_default();
                    reporter.report(&ValidationOccurrence::new(
                        Severity::RecoverableError,
                        doc.url(),
                        doc.root_line().unwrap_or(0),
                        format!("Cannot find the declaration of element '{name}'."),
                    ));
                    return Ok(());
                }
            },
        };

        let schema = self
            .libxml
            .parse_schema_file(&location, &mut forward_to(reporter, &location))
            .map_err(|err| match err {
                LibXml2Error::SchemaParseFailed => DomEchoError::SchemaParsing {
                    location: location.clone(),
                    details: "the schema could not be loaded or compiled".to_string(),
                },
                other => other.into(),
            })?;

        // Violations reach the reporter one by one; only internal failures abort.
        self.libxml
            .validate_document(&schema, doc, &mut forward_to(reporter, doc.url()))?;
        Ok(())
    }
}

impl Default for LibXml2Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlParser for LibXml2Parser {
    fn parse(
        &self,
        input: &[u8],
        source_locator: &str,
        mode: &ValidationMode,
        reporter: &mut dyn ValidationReporter,
    ) -> Result<DocumentTree> {
        let doc = self.libxml.read_memory(
            input,
            source_locator,
            Self::parse_options(mode),
            &mut forward_to(reporter, source_locator),
        )?;

        let tree = doc.to_tree();

        if let ValidationMode::Xsd { schema_source } = mode {
            self.validate_against_schema(&doc, &tree, schema_source.as_ref(), reporter)?;
        }

        Ok(tree)
    }
}

/// Map a libxml2 error level onto an occurrence severity
pub fn severity_for(level: XmlErrorLevel) -> Severity {
    match level {
        XmlErrorLevel::Fatal => Severity::Fatal,
        XmlErrorLevel::Error => Severity::RecoverableError,
        XmlErrorLevel::Warning | XmlErrorLevel::None => Severity::Warning,
    }
}

/// Turn a libxml2 error record into an occurrence
///
/// Records without a file are attributed to `fallback_locator`.
pub fn occurrence_from_record(record: XmlErrorRecord, fallback_locator: &str) -> ValidationOccurrence {
    ValidationOccurrence::new(
        severity_for(record.level),
        record
            .file
            .filter(|file| !file.is_empty())
            .unwrap_or_else(|| fallback_locator.to_string()),
        u32::try_from(record.line).unwrap_or(0),
        record.message,
    )
}

fn forward_to<'a>(
    reporter: &'a mut dyn ValidationReporter,
    fallback_locator: &'a str,
) -> impl FnMut(XmlErrorRecord) + 'a {
    move |record| reporter.report(&occurrence_from_record(record, fallback_locator))
}

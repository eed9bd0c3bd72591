//! # dom-echo Library
//!
//! Parses an XML document with libxml2, optionally validating it against its
//! DTD or an XML Schema, and prints an indented trace of its node tree.

pub mod app;
pub mod cli;
pub mod config;
pub mod dom;
pub mod error;
pub mod error_reporter;
pub mod libxml2;
pub mod parser;
pub mod printer;
pub mod schema_loader;
pub mod validation;

pub use cli::{Cli, USAGE};
pub use config::{Config, ConfigManager, EnvProvider, SystemEnvProvider, VerbosityLevel};
pub use dom::{DocumentTree, Node, NodeKind, OtherKind};
pub use error::{ConfigError, DomEchoError, LibXml2Error, Result};
pub use error_reporter::ErrorReporter;
pub use libxml2::{LibXml2Wrapper, ParseOptions, ValidationResult};
pub use parser::{LibXml2Parser, ValidationMode, XmlParser};
pub use printer::{TreePrinter, format_node_line, render_to_string};
pub use schema_loader::{SchemaExtractor, SchemaReference, SchemaSourceType};
pub use validation::{
    CollectingReporter, Severity, StreamReporter, ValidationOccurrence, ValidationReporter,
    ValidationSummary,
};

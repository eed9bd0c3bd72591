//! Error type tests
//!
//! Display forms and conversions as seen from outside the crate.

use std::error::Error;
use std::path::PathBuf;

use dom_echo::{ConfigError, DomEchoError, LibXml2Error};

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "doc.xml: not found");
    let error: DomEchoError = io_error.into();

    assert!(error.to_string().contains("doc.xml: not found"));
    assert!(error.source().is_some());
}

#[test]
fn test_parse_error_names_the_document() {
    let error: DomEchoError = LibXml2Error::DocumentParseFailed {
        source_locator: "data/broken.xml".to_string(),
    }
    .into();

    let message = error.to_string();
    assert!(message.contains("data/broken.xml"));
    assert!(message.contains("not well-formed"));
}

#[test]
fn test_internal_libxml2_errors_keep_details() {
    let error: DomEchoError = LibXml2Error::ValidationFailed {
        code: -1,
        file: PathBuf::from("doc.xml"),
    }
    .into();

    match error {
        DomEchoError::LibXml2Internal { details } => {
            assert!(details.contains("code -1"));
            assert!(details.contains("doc.xml"));
        }
        other => panic!("Expected DomEchoError::LibXml2Internal, got {:?}", other),
    }
}

#[test]
fn test_config_errors_become_config_variant() {
    let error: DomEchoError =
        ConfigError::Environment("Invalid DOM_ECHO_VERBOSE value: loud".to_string()).into();

    assert!(matches!(error, DomEchoError::Config(_)));
    assert!(error.to_string().contains("DOM_ECHO_VERBOSE"));
}

#[test]
fn test_schema_parsing_error() {
    let error = DomEchoError::SchemaParsing {
        location: "schemas/note.xsd".to_string(),
        details: "the schema could not be loaded or compiled".to_string(),
    };

    let message = error.to_string();
    assert!(message.contains("schemas/note.xsd"));
    assert!(message.contains("could not be loaded"));
}

//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum DomEchoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("XML parsing failed: {source_locator} - {details}")]
    Parse {
        source_locator: String,
        details: String,
    },

    #[error("Schema parsing error: {location} - {details}")]
    SchemaParsing { location: String, details: String },

    #[error("LibXML2 internal error: {details}")]
    LibXml2Internal { details: String },
}

/// Configuration-specific error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No XML file given")]
    MissingInput,

    #[error("Environment variable error: {0}")]
    Environment(String),
}

/// LibXML2-specific error types
#[derive(Error, Debug)]
pub enum LibXml2Error {
    #[error("Parser context creation failed")]
    ParserContextCreationFailed,

    #[error("Document parsing failed: {source_locator}")]
    DocumentParseFailed { source_locator: String },

    #[error("Schema parsing failed: null pointer returned")]
    SchemaParseFailed,

    #[error("Validation context creation failed")]
    ValidationContextCreationFailed,

    #[error("Document validation failed with code {code}: {file}")]
    ValidationFailed { code: i32, file: PathBuf },

    #[error("Invalid input for libxml2: {details}")]
    InvalidInput { details: String },
}

impl From<ConfigError> for DomEchoError {
    fn from(err: ConfigError) -> Self {
        DomEchoError::Config(err.to_string())
    }
}

impl From<LibXml2Error> for DomEchoError {
    fn from(err: LibXml2Error) -> Self {
        match err {
            LibXml2Error::DocumentParseFailed { source_locator } => DomEchoError::Parse {
                source_locator,
                details: "document is not well-formed".to_string(),
            },
            other => DomEchoError::LibXml2Internal {
                details: other.to_string(),
            },
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DomEchoError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// LibXML2 result type alias
pub type LibXml2Result<T> = std::result::Result<T, LibXml2Error>;

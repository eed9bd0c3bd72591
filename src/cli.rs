//! Command-line surface, including the single-dash option forms.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::parser::ValidationMode;

/// Usage text written to stderr when no document is given
pub const USAGE: &str = "\
Usage: dom-echo [-options] <file.xml>
Options:
 -dtd     Validate using DTD
 -xsd     Validate using W3C XML Schema
 -xsdss <file.xsd> Specify schema source for validation";

/// Flags passed through to clap untouched
const PASSTHROUGH_FLAGS: &[&str] = &[
    "-v",
    "--verbose",
    "-q",
    "--quiet",
    "--debug",
    "--timestamps",
    "-h",
    "--help",
    "-V",
    "--version",
];

/// Print the node tree of an XML document, optionally validating it
#[derive(Parser, Debug, Clone)]
#[command(name = "dom-echo")]
#[command(about = "Print the node tree of an XML document, optionally validating it")]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Validate against the document's DTD
    #[arg(long = "dtd", help = "Validate using DTD")]
    pub dtd: bool,

    /// Validate against the schema the document references
    #[arg(long = "xsd", help = "Validate using W3C XML Schema")]
    pub xsd: bool,

    /// Validate against this schema instead of the document's hints
    #[arg(
        long = "xsdss",
        value_name = "FILE",
        help = "Specify schema source for validation"
    )]
    pub xsdss: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (faults only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with_all = ["verbose", "debug"]
    )]
    pub quiet: bool,

    #[arg(long = "debug", help = "Show debugging details for faults")]
    pub debug: bool,

    #[arg(long = "timestamps", help = "Prefix diagnostics with the time of day")]
    pub timestamps: bool,

    /// XML documents; the last one given is echoed
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// Parse the process arguments, accepting the single-dash flag spellings
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse_args_from(std::env::args_os())
    }

    pub fn try_parse_args_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args)?)
    }

    /// The document to echo
    pub fn input_file(&self) -> Option<&Path> {
        self.files.last().map(PathBuf::as_path)
    }

    /// XML Schema takes precedence over DTD when both are requested
    pub fn validation_mode(&self) -> ValidationMode {
        if let Some(schema) = &self.xsdss {
            ValidationMode::Xsd {
                schema_source: Some(schema.clone()),
            }
        } else if self.xsd {
            ValidationMode::Xsd {
                schema_source: None,
            }
        } else if self.dtd {
            ValidationMode::Dtd
        } else {
            ValidationMode::None
        }
    }
}

/// Rewrite a raw argument list into the form clap expects
///
/// `-dtd`, `-xsd` and `-xsdss` become their double-dash forms. `-xsdss`
/// always takes the next token as its value, even one starting with a dash.
/// Every other unrecognized token is a file name and is moved after `--`.
pub fn normalize_args<I, T>(args: I) -> Result<Vec<OsString>, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();
    let mut files = Vec::new();

    while let Some(arg) = args.next() {
        let token = arg.to_str().map(str::to_owned);
        match token.as_deref() {
            Some("-dtd" | "--dtd") => normalized.push("--dtd".into()),
            Some("-xsd" | "--xsd") => normalized.push("--xsd".into()),
            Some("-xsdss" | "--xsdss") => match args.next() {
                Some(value) => {
                    let mut flag = OsString::from("--xsdss=");
                    flag.push(value);
                    normalized.push(flag);
                }
                None => {
                    return Err(Cli::command().error(
                        ErrorKind::InvalidValue,
                        "a value is required for '-xsdss <file.xsd>' but none was supplied",
                    ));
                }
            },
            Some(flag) if flag.starts_with("--xsdss=") || PASSTHROUGH_FLAGS.contains(&flag) => {
                normalized.push(arg)
            }
            _ => files.push(arg),
        }
    }

    if !files.is_empty() {
        normalized.push("--".into());
        normalized.extend(files);
    }
    Ok(normalized)
}

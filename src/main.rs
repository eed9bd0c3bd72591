use std::io::{self, BufWriter};
use std::process::ExitCode;

use clap::error::ErrorKind;

use dom_echo::{
    Cli, ConfigError, ConfigManager, DomEchoError, ErrorReporter, LibXml2Parser, USAGE,
    VerbosityLevel,
};

fn main() -> ExitCode {
    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too.
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => {
                    eprintln!("{}", USAGE);
                    ExitCode::FAILURE
                }
            };
        }
    };

    let config = match ConfigManager::load_config(&cli) {
        Ok(config) => config,
        Err(ConfigError::MissingInput) => {
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
        Err(err) => {
            ErrorReporter::new(VerbosityLevel::Normal).report_error(&DomEchoError::from(err));
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    let diagnostics = ErrorReporter::from_config(&config);
    let parser = LibXml2Parser::new();
    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());

    match dom_echo::app::run(&config, &parser, out, io::stderr(), &diagnostics) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            diagnostics.report_error(&err);
            ExitCode::FAILURE
        }
    }
}

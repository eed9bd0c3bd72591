//! Run configuration, layered from defaults, `DOM_ECHO_*` variables and the command line.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::{ConfigError, ConfigResult};
use crate::parser::ValidationMode;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

pub const ENV_VERBOSE: &str = "DOM_ECHO_VERBOSE";
pub const ENV_QUIET: &str = "DOM_ECHO_QUIET";
pub const ENV_TIMESTAMPS: &str = "DOM_ECHO_TIMESTAMPS";
pub const ENV_DEBUG: &str = "DOM_ECHO_DEBUG";

/// How much diagnostic output goes to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Only faults
    Quiet,
    #[default]
    Normal,
    /// Progress notes and suggestions
    Verbose,
    /// Everything, including error debug forms
    Debug,
}

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The document to echo
    pub file: PathBuf,
    pub validation: ValidationMode,
    pub output: OutputConfig,
}

/// Diagnostic output settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub verbose: bool,
    pub quiet: bool,
    pub debug: bool,
    /// Prefix diagnostics with `[HH:MM:SS]`
    pub timestamps: bool,
}

impl Config {
    pub fn new(file: impl Into<PathBuf>, validation: ValidationMode) -> Self {
        Self {
            file: file.into(),
            validation,
            output: OutputConfig::default(),
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.output.quiet {
            VerbosityLevel::Quiet
        } else if self.output.debug {
            VerbosityLevel::Debug
        } else if self.output.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Builds the effective [`Config`] from defaults, environment and CLI
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> environment -> CLI
    pub fn load_config(cli: &Cli) -> ConfigResult<Config> {
        Self::load_config_with(&SystemEnvProvider, cli)
    }

    /// Same as [`ConfigManager::load_config`] with a custom environment provider
    pub fn load_config_with(env: &impl EnvProvider, cli: &Cli) -> ConfigResult<Config> {
        let file = cli.input_file().ok_or(ConfigError::MissingInput)?;
        let config = Config::new(file, ValidationMode::None);

        let config = Self::apply_environment_overrides_with(env, config)?;
        Ok(Self::merge_with_cli(config, cli))
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> ConfigResult<Config> {
        if let Some(verbose) = parse_flag(env, ENV_VERBOSE)? {
            config.output.verbose = verbose;
        }
        if let Some(quiet) = parse_flag(env, ENV_QUIET)? {
            config.output.quiet = quiet;
        }
        if let Some(debug) = parse_flag(env, ENV_DEBUG)? {
            config.output.debug = debug;
        }
        if let Some(timestamps) = parse_flag(env, ENV_TIMESTAMPS)? {
            config.output.timestamps = timestamps;
        }

        if config.output.quiet && (config.output.verbose || config.output.debug) {
            return Err(ConfigError::Environment(format!(
                "{ENV_QUIET} cannot be combined with {ENV_VERBOSE} or {ENV_DEBUG}"
            )));
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(file) = cli.input_file() {
            config.file = file.to_path_buf();
        }
        config.validation = cli.validation_mode();

        // clap rejects -q next to -v or --debug; either side overrides the environment.
        if cli.verbose || cli.debug {
            config.output.verbose |= cli.verbose;
            config.output.debug |= cli.debug;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
            config.output.debug = false;
        }
        config.output.timestamps |= cli.timestamps;

        config
    }
}

/// Accepts the usual spellings of a boolean switch
fn parse_flag(env: &impl EnvProvider, key: &str) -> ConfigResult<Option<bool>> {
    let Some(raw) = env.get(key) else {
        return Ok(None);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
        _ => Err(ConfigError::Environment(format!(
            "Invalid {key} value: {raw}"
        ))),
    }
}

use std::path::PathBuf;

use dom_echo::config::{ENV_DEBUG, ENV_QUIET, ENV_TIMESTAMPS, ENV_VERBOSE};
use dom_echo::{Cli, ConfigError, ConfigManager, ValidationMode, VerbosityLevel};

use crate::common::mocks::MockEnvProvider;

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["dom-echo"];
    argv.extend_from_slice(args);
    Cli::try_parse_args_from(argv).unwrap()
}

#[test]
fn test_default_config() {
    let config = ConfigManager::load_config_with(&MockEnvProvider::new(), &cli(&["a.xml"])).unwrap();

    assert_eq!(config.file, PathBuf::from("a.xml"));
    assert_eq!(config.validation, ValidationMode::None);
    assert!(!config.output.verbose);
    assert!(!config.output.quiet);
    assert!(!config.output.timestamps);
    assert_eq!(config.verbosity(), VerbosityLevel::Normal);
}

#[test]
fn test_no_file_is_missing_input() {
    let result = ConfigManager::load_config_with(&MockEnvProvider::new(), &cli(&["-xsd"]));
    assert_eq!(result.unwrap_err(), ConfigError::MissingInput);
}

#[test]
fn test_precedence_environment_then_cli() {
    let env = MockEnvProvider::new()
        .with(ENV_VERBOSE, "true")
        .with(ENV_TIMESTAMPS, "yes");

    let from_env = ConfigManager::load_config_with(&env, &cli(&["a.xml"])).unwrap();
    assert_eq!(from_env.verbosity(), VerbosityLevel::Verbose);
    assert!(from_env.output.timestamps);

    let from_cli = ConfigManager::load_config_with(&env, &cli(&["-q", "a.xml"])).unwrap();
    assert_eq!(from_cli.verbosity(), VerbosityLevel::Quiet);
    assert!(from_cli.output.timestamps);
}

#[test]
fn test_false_values_switch_off() {
    let env = MockEnvProvider::new()
        .with(ENV_QUIET, "0")
        .with(ENV_DEBUG, "off");

    let config = ConfigManager::load_config_with(&env, &cli(&["a.xml"])).unwrap();
    assert_eq!(config.verbosity(), VerbosityLevel::Normal);
}

#[test]
fn test_invalid_environment_value_is_rejected() {
    let env = MockEnvProvider::new().with(ENV_TIMESTAMPS, "sometimes");

    match ConfigManager::load_config_with(&env, &cli(&["a.xml"])) {
        Err(ConfigError::Environment(message)) => {
            assert!(message.contains("DOM_ECHO_TIMESTAMPS"));
            assert!(message.contains("sometimes"));
        }
        other => panic!("Expected ConfigError::Environment, got {:?}", other),
    }
}

#[test]
fn test_schema_source_from_cli() {
    let config = ConfigManager::load_config_with(
        &MockEnvProvider::new(),
        &cli(&["-xsdss", "schemas/s.xsd", "-dtd", "a.xml"]),
    )
    .unwrap();

    assert_eq!(
        config.validation,
        ValidationMode::Xsd {
            schema_source: Some(PathBuf::from("schemas/s.xsd"))
        }
    );
}

//! Integration tests for configuration parsing
//!
//! This module contains integration tests that verify:
//! - Config loading from files
//! - Conversion into the rule configuration the engine consumes
//! - Rejection of invalid files with the matching error

use cstyle::config::{ColorOption, Config, OutputFormat, RuleConfig};
use cstyle::error::ConfigError;
use cstyle::types::{RuleId, Severity};
use std::path::PathBuf;

// Helper to get fixture path
fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("config")
        .join(filename)
}

fn rule(id: &str) -> RuleId {
    RuleId::new(id).unwrap()
}

#[test]
fn test_config_load_valid_minimal() {
    let config = Config::load(fixture_path("valid_minimal.toml")).unwrap();

    assert_eq!(config.cstyle.version, "1");
    assert_eq!(config.cstyle.include.len(), 2);
    assert_eq!(config.cstyle.include[0].as_str(), "**/*.c");
    assert_eq!(config.cstyle.include[1].as_str(), "**/*.h");
    assert!(config.cstyle.exclude.is_empty());
    assert_eq!(config.output.format, OutputFormat::Human);
    assert_eq!(config.output.color, ColorOption::Auto);
    assert_eq!(config.rule_config(), RuleConfig::default());
}

#[test]
fn test_config_load_valid_full() {
    let config = Config::load(fixture_path("valid_full.toml")).unwrap();

    assert_eq!(config.cstyle.include[0].as_str(), "src/**/*.c");
    assert_eq!(config.cstyle.exclude[0].as_str(), "**/generated/**");
    assert_eq!(config.output.format, OutputFormat::Jsonl);
    assert_eq!(config.output.color, ColorOption::Never);

    let rules = config.rule_config();
    assert!(!rules.is_enabled(&rule("goto-usage")));
    assert!(rules.is_enabled(&rule("comment-marker")));
    assert!(rules.is_enabled(&rule("macro-naming")));
    assert_eq!(rules.enabled.len(), 6);
    assert_eq!(
        rules.severity_for(&rule("comment-marker"), Severity::Info),
        Severity::Warning
    );
    assert_eq!(rules.max_identifier_length, 31);
    assert_eq!(rules.comment_markers, vec!["TODO", "FIXME"]);
    assert!(rules.reserved_type_names.contains("my_handle_t"));
    assert!(!rules.reserved_type_names.contains("uint8_t"));
}

#[test]
fn test_config_load_missing_file() {
    let result = Config::load(fixture_path("does_not_exist.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_config_invalid_version() {
    let result = Config::load(fixture_path("invalid_version.toml"));
    match result {
        Err(ConfigError::Validation(message)) => {
            assert!(message.contains("Unsupported configuration version"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_config_unknown_rule() {
    let result = Config::load(fixture_path("unknown_rule.toml"));
    match result {
        Err(ConfigError::UnknownRule(id)) => assert_eq!(id, "no-such-rule"),
        other => panic!("expected unknown rule error, got {:?}", other),
    }
}

#[test]
fn test_config_invalid_glob() {
    let result = Config::load(fixture_path("invalid_glob.toml"));
    match result {
        Err(ConfigError::Validation(message)) => {
            assert!(message.contains("src/[unclosed"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_config_invalid_severity() {
    let result = Config::load(fixture_path("invalid_severity.toml"));
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_config_invalid_marker() {
    let result = Config::load(fixture_path("invalid_marker.toml"));
    match result {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "comment-markers"),
        other => panic!("expected invalid value error, got {:?}", other),
    }
}

#[test]
fn test_config_unknown_setting() {
    let result = Config::load(fixture_path("unknown_setting.toml"));
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_config_zero_identifier_length() {
    let toml = "[cstyle]\nversion = \"1\"\n\n[settings]\nmax-identifier-length = 0\n";
    match Config::parse(toml) {
        Err(ConfigError::InvalidValue { field, .. }) => {
            assert_eq!(field, "max-identifier-length")
        }
        other => panic!("expected invalid value error, got {:?}", other),
    }
}

#[test]
fn test_config_empty_markers_disable_matching() {
    let toml = "[cstyle]\nversion = \"1\"\n\n[settings]\ncomment-markers = []\n";
    let config = Config::parse(toml).unwrap();
    assert!(config.rule_config().comment_markers.is_empty());
}

#[test]
fn test_known_rules() {
    assert!(Config::is_known_rule(&rule("indentation-consistency")));
    assert!(Config::is_known_rule(&rule("reserved-identifier")));
    assert!(!Config::is_known_rule(&rule("no-todo-comments")));
}

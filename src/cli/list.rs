//! List command implementation
//!
//! This module implements the `cstyle list` command, which shows every
//! built-in rule with its description, effective severity and whether the
//! active configuration enables it.

use crate::cli::args::OutputFormat;
use crate::cli::common::{EXIT_ERROR, EXIT_SUCCESS, config_exit_code, load_config};
use crate::config::RuleConfig;
use crate::error::{ConfigError, RuleError};
use crate::output::{RuleState, RuleStatus, RuleStatusHumanFormatter, RuleStatusJsonlFormatter};
use crate::rules::builtin;
use std::path::Path;

/// Error type specific to list command
#[derive(Debug, thiserror::Error)]
enum ListError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),
}

/// Run the list command
///
/// # Returns
///
/// Exit code:
/// - 0: Success
/// - 2: Error
/// - 3: Configuration error
pub fn run_list(format: OutputFormat, config_path: Option<&Path>) -> i32 {
    match run_list_inner(format, config_path) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            match &e {
                ListError::Config(config) => config_exit_code(config),
                ListError::Rule(_) => EXIT_ERROR,
            }
        }
    }
}

fn run_list_inner(format: OutputFormat, config_path: Option<&Path>) -> Result<(), ListError> {
    let config = load_config(config_path)?;
    let rule_config = config.rule_config();
    rule_config.validate()?;
    let statuses = build_rule_statuses(&rule_config)?;

    match format {
        OutputFormat::Human => RuleStatusHumanFormatter::new().write_to_stdout(&statuses),
        OutputFormat::Jsonl => RuleStatusJsonlFormatter::new().write_to_stdout(&statuses),
    }

    Ok(())
}

/// Describe every built-in rule under `config`, in registration order
fn build_rule_statuses(config: &RuleConfig) -> Result<Vec<RuleStatus>, RuleError> {
    let rules = builtin::load_builtin_rules(config)?;
    Ok(rules
        .iter()
        .map(|(rule_id, rule)| RuleStatus {
            rule_id: rule_id.as_str().to_string(),
            description: rule.description().to_string(),
            severity: rule.severity().as_str().to_string(),
            state: if config.is_enabled(rule_id) {
                RuleState::Enabled
            } else {
                RuleState::Disabled
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RuleId, Severity};

    #[test]
    fn test_statuses_for_default_config() {
        let statuses = build_rule_statuses(&RuleConfig::default()).unwrap();
        assert_eq!(statuses.len(), 7);
        assert!(statuses.iter().all(|s| s.state == RuleState::Enabled));
        assert_eq!(statuses[0].rule_id, "macro-naming");
    }

    #[test]
    fn test_statuses_reflect_config() {
        let goto = RuleId::new("goto-usage").unwrap();
        let mut config = RuleConfig::default();
        config.enabled.remove(&goto);
        config
            .severity_overrides
            .insert(RuleId::new("comment-marker").unwrap(), Severity::Error);

        let statuses = build_rule_statuses(&config).unwrap();
        let goto_status = statuses.iter().find(|s| s.rule_id == "goto-usage").unwrap();
        assert_eq!(goto_status.state, RuleState::Disabled);
        let marker = statuses
            .iter()
            .find(|s| s.rule_id == "comment-marker")
            .unwrap();
        assert_eq!(marker.severity, "error");
    }
}

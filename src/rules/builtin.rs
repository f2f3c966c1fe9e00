#![forbid(unsafe_code)]

//! Built-in rules compiled into the binary
//!
//! Every detector the engine knows is listed here. Each is constructed with its
//! default severity unless the configuration overrides it.

use crate::config::rule_config::RuleConfig;
use crate::error::RuleError;
use crate::rules::{
    CommentMarkerRule, GotoUsageRule, IdentifierLengthRule, IndentationRule, MacroNamingRule,
    ReservedIdentifierRule, Rule, UninitializedVariableRule, comment_marker, goto_usage,
    identifier_length, indentation, macro_naming, reserved_identifier, uninitialized_variable,
};
use crate::types::{RuleId, Severity};

/// Type alias for a list of rules with their IDs
type RuleList = Vec<(RuleId, Box<dyn Rule>)>;

/// Built-in rule ids with their default severities, in registration order
const BUILTIN_RULES: &[(&str, Severity)] = &[
    (macro_naming::ID, Severity::Warning),
    (goto_usage::ID, Severity::Warning),
    (indentation::ID, Severity::Warning),
    (identifier_length::ID, Severity::Warning),
    (reserved_identifier::ID, Severity::Error),
    (comment_marker::ID, Severity::Info),
    (uninitialized_variable::ID, Severity::Error),
];

/// Ids of every built-in rule
pub fn builtin_rule_ids() -> Vec<RuleId> {
    BUILTIN_RULES
        .iter()
        .map(|(id, _)| RuleId::builtin(*id))
        .collect()
}

/// Default severity of a built-in rule
pub fn default_severity(id: &RuleId) -> Option<Severity> {
    BUILTIN_RULES
        .iter()
        .find(|(builtin, _)| *builtin == id.as_str())
        .map(|(_, severity)| *severity)
}

/// Construct every built-in rule for `config`, enabled or not
///
/// # Errors
///
/// Returns `RuleError` if a rule cannot be built from the configuration
/// (for example, comment markers that do not compile into a pattern).
pub fn load_builtin_rules(config: &RuleConfig) -> Result<RuleList, RuleError> {
    let mut rules = RuleList::new();

    for (id, default) in BUILTIN_RULES {
        let rule_id = RuleId::builtin(*id);
        let severity = config.severity_for(&rule_id, *default);
        let rule: Box<dyn Rule> = match *id {
            macro_naming::ID => Box::new(MacroNamingRule::new(severity)),
            goto_usage::ID => Box::new(GotoUsageRule::new(severity)),
            indentation::ID => Box::new(IndentationRule::new(severity)),
            identifier_length::ID => Box::new(IdentifierLengthRule::new(severity)),
            reserved_identifier::ID => Box::new(ReservedIdentifierRule::new(severity)),
            comment_marker::ID => {
                Box::new(CommentMarkerRule::new(config.comment_markers.as_slice(), severity)?)
            }
            uninitialized_variable::ID => Box::new(UninitializedVariableRule::new(severity)),
            other => return Err(RuleError::NotFound(other.to_string())),
        };
        rules.push((rule_id, rule));
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_are_unique_and_valid() {
        let ids = builtin_rule_ids();
        assert_eq!(ids.len(), 7);
        let unique: std::collections::BTreeSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        for id in &ids {
            assert!(RuleId::new(id.as_str()).is_some());
        }
    }

    #[test]
    fn test_load_builtin_rules() {
        let rules = load_builtin_rules(&RuleConfig::default()).unwrap();
        assert_eq!(rules.len(), 7);
        for (id, rule) in &rules {
            assert_eq!(id, rule.id());
            assert!(!rule.description().is_empty());
            assert_eq!(Some(rule.severity()), default_severity(id));
        }
    }

    #[test]
    fn test_severity_override_applied() {
        let mut config = RuleConfig::default();
        config.severity_overrides.insert(
            RuleId::new("comment-marker").unwrap(),
            Severity::Error,
        );
        let rules = load_builtin_rules(&config).unwrap();
        let (_, marker) = rules
            .iter()
            .find(|(id, _)| id.as_str() == "comment-marker")
            .unwrap();
        assert_eq!(marker.severity(), Severity::Error);
    }

    #[test]
    fn test_default_severities() {
        let severity = |id: &str| default_severity(&RuleId::new(id).unwrap());
        assert_eq!(severity("reserved-identifier"), Some(Severity::Error));
        assert_eq!(severity("uninitialized-variable"), Some(Severity::Error));
        assert_eq!(severity("comment-marker"), Some(Severity::Info));
        assert_eq!(severity("goto-usage"), Some(Severity::Warning));
        assert_eq!(severity("unknown"), None);
    }
}

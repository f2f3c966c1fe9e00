#![forbid(unsafe_code)]

//! Rule registry for managing and loading rules
//!
//! The RuleRegistry is responsible for:
//! - Building the built-in detectors from a `RuleConfig`
//! - Filtering rules based on configuration
//! - Providing access to rules by ID

use crate::config::rule_config::RuleConfig;
use crate::error::RuleError;
use crate::rules::{Rule, builtin};
use crate::types::RuleId;
use std::collections::{BTreeMap, BTreeSet};

/// Registry for storing and managing all rules
///
/// The registry holds all loaded rules, keyed by their unique RuleId.
/// Iteration follows rule id order so output is reproducible.
pub struct RuleRegistry {
    rules: BTreeMap<RuleId, Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a new empty RuleRegistry
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Build the registry of enabled built-in rules for `config`
    ///
    /// # Errors
    ///
    /// Returns `RuleError` if a rule cannot be constructed from the
    /// configuration.
    pub fn from_config(config: &RuleConfig) -> Result<Self, RuleError> {
        let mut registry = Self::new();
        for (_, rule) in builtin::load_builtin_rules(config)? {
            registry.register(rule)?;
        }
        registry.filter_by_config(&config.enabled);
        tracing::debug!(rules = registry.len(), "rule registry built");
        Ok(registry)
    }

    /// Add a rule to the registry
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidDefinition` if a rule with the same id is
    /// already registered.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), RuleError> {
        let rule_id = rule.id().clone();
        if self.rules.contains_key(&rule_id) {
            return Err(RuleError::InvalidDefinition(format!(
                "Duplicate rule ID '{}'",
                rule_id.as_str()
            )));
        }
        self.rules.insert(rule_id, rule);
        Ok(())
    }

    /// Keep only the rules whose ids are in `enabled`
    pub fn filter_by_config(&mut self, enabled: &BTreeSet<RuleId>) {
        self.rules.retain(|rule_id, _| {
            let keep = enabled.contains(rule_id);
            if !keep {
                tracing::debug!(rule = %rule_id, "rule disabled by configuration");
            }
            keep
        });
    }

    /// Get a rule by its ID
    ///
    /// Returns `None` if the rule is not found in the registry.
    pub fn get_rule(&self, id: &RuleId) -> Option<&dyn Rule> {
        self.rules.get(id).map(|boxed| boxed.as_ref())
    }

    /// Iterate over all rules in the registry, in id order
    pub fn iter_rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.values().map(|boxed| boxed.as_ref())
    }

    /// Get the number of rules in the registry
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

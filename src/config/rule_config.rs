#![forbid(unsafe_code)]

//! Rule configuration consumed by the analysis core
//!
//! `RuleConfig` is the only configuration object the core sees. It is built
//! either from defaults or from a parsed `cstyle.toml`, and is validated once
//! before any file is analyzed.

use crate::error::ConfigError;
use crate::rules::builtin;
use crate::types::{RuleId, Severity};
use std::collections::{BTreeMap, BTreeSet};

/// Default function-name length limit
pub const DEFAULT_MAX_IDENTIFIER_LENGTH: usize = 20;

/// Comment markers tracked when none are configured
pub const DEFAULT_COMMENT_MARKERS: &[&str] = &["TODO", "FIXME", "XXX", "HACK", "NOTE", "BUG"];

/// Standard type names that must not be declared as new names
pub const DEFAULT_RESERVED_TYPE_NAMES: &[&str] = &[
    "_Atomic",
    "_Bool",
    "_Complex",
    "_Imaginary",
    "int16_t",
    "int32_t",
    "int64_t",
    "int8_t",
    "intmax_t",
    "intptr_t",
    "max_align_t",
    "ptrdiff_t",
    "size_t",
    "ssize_t",
    "uint16_t",
    "uint32_t",
    "uint64_t",
    "uint8_t",
    "uintmax_t",
    "uintptr_t",
    "wchar_t",
    "wint_t",
];

/// Which rules run and with what thresholds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleConfig {
    pub enabled: BTreeSet<RuleId>,
    pub max_identifier_length: usize,
    pub reserved_type_names: BTreeSet<String>,
    pub comment_markers: Vec<String>,
    pub severity_overrides: BTreeMap<RuleId, Severity>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: builtin::builtin_rule_ids().into_iter().collect(),
            max_identifier_length: DEFAULT_MAX_IDENTIFIER_LENGTH,
            reserved_type_names: DEFAULT_RESERVED_TYPE_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            comment_markers: DEFAULT_COMMENT_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            severity_overrides: BTreeMap::new(),
        }
    }
}

impl RuleConfig {
    /// Enable only the given rules, keeping every other default
    pub fn with_enabled<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = RuleId>,
    {
        Self {
            enabled: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn is_enabled(&self, id: &RuleId) -> bool {
        self.enabled.contains(id)
    }

    /// Severity for a rule, honoring overrides
    pub fn severity_for(&self, id: &RuleId, default: Severity) -> Severity {
        self.severity_overrides.get(id).copied().unwrap_or(default)
    }

    /// Check the configuration before analysis starts
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - An enabled or overridden rule id is not a built-in rule
    /// - `max_identifier_length` is zero
    /// - A comment marker is empty or contains non-word characters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let known: BTreeSet<RuleId> = builtin::builtin_rule_ids().into_iter().collect();

        for id in self.enabled.iter().chain(self.severity_overrides.keys()) {
            if !known.contains(id) {
                return Err(ConfigError::UnknownRule(id.to_string()));
            }
        }

        if self.max_identifier_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max-identifier-length".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        for marker in &self.comment_markers {
            if marker.is_empty()
                || !marker
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(ConfigError::InvalidValue {
                    field: "comment-markers".to_string(),
                    message: format!(
                        "marker '{}' must be non-empty and contain only letters, digits or '_'",
                        marker
                    ),
                });
            }
        }

        Ok(())
    }
}

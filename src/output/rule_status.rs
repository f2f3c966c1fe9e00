#![forbid(unsafe_code)]

//! RuleStatus output formatters
//!
//! Formatters for the rule table printed by `cstyle list`, in human-readable
//! and JSONL form.

use serde::Serialize;

/// Whether a rule will run under the active configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleState {
    Enabled,
    Disabled,
}

impl RuleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleState::Enabled => "enabled",
            RuleState::Disabled => "disabled",
        }
    }
}

/// Status information for a single rule
#[derive(Debug, Clone)]
pub struct RuleStatus {
    pub rule_id: String,
    pub description: String,
    pub severity: String,
    pub state: RuleState,
}

/// Human-readable formatter for rule status
pub struct RuleStatusHumanFormatter;

impl RuleStatusHumanFormatter {
    /// Create a new human formatter
    pub fn new() -> Self {
        RuleStatusHumanFormatter
    }

    /// Format a list of rule statuses for human consumption
    pub fn format(&self, statuses: &[RuleStatus]) -> String {
        let enabled = statuses
            .iter()
            .filter(|s| s.state == RuleState::Enabled)
            .count();
        let mut output = format!("Rules ({} of {} enabled):\n\n", enabled, statuses.len());

        for status in statuses {
            let icon = match status.state {
                RuleState::Enabled => "✓",
                RuleState::Disabled => "✗",
            };
            output.push_str(&format!(
                "{} {} ({})\n",
                icon,
                status.rule_id,
                status.state.as_str()
            ));
            output.push_str(&format!("  Description: {}\n", status.description));
            output.push_str(&format!("  Severity: {}\n", status.severity));
            output.push('\n');
        }

        output
    }

    /// Write the formatted output to stdout
    pub fn write_to_stdout(&self, statuses: &[RuleStatus]) {
        print!("{}", self.format(statuses));
    }
}

impl Default for RuleStatusHumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// JSONL output structure for rule status
#[derive(Debug, Serialize)]
struct JsonlRuleStatus<'a> {
    rule_id: &'a str,
    description: &'a str,
    severity: &'a str,
    enabled: bool,
}

/// JSONL formatter for rule status
pub struct RuleStatusJsonlFormatter;

impl RuleStatusJsonlFormatter {
    /// Create a new JSONL formatter
    pub fn new() -> Self {
        RuleStatusJsonlFormatter
    }

    /// Format a list of rule statuses as JSONL, one object per rule
    pub fn format(&self, statuses: &[RuleStatus]) -> String {
        let mut output = String::new();

        for status in statuses {
            let record = JsonlRuleStatus {
                rule_id: &status.rule_id,
                description: &status.description,
                severity: &status.severity,
                enabled: status.state == RuleState::Enabled,
            };
            if let Ok(json) = serde_json::to_string(&record) {
                output.push_str(&json);
                output.push('\n');
            }
        }

        output
    }

    /// Write the formatted output to stdout
    pub fn write_to_stdout(&self, statuses: &[RuleStatus]) {
        print!("{}", self.format(statuses));
    }
}

impl Default for RuleStatusJsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

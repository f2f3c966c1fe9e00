#![forbid(unsafe_code)]

//! Macro names must be uppercase

use crate::rules::{ExecutionContext, Finding, Rule};
use crate::syntax::Position;
use crate::types::{RuleId, Severity};

pub const ID: &str = "macro-naming";

/// Flags `#define` names containing a lowercase ASCII letter
///
/// Object-like and function-like macros are treated the same; only the name
/// before the parameter list is examined.
#[derive(Debug)]
pub struct MacroNamingRule {
    id: RuleId,
    severity: Severity,
}

impl MacroNamingRule {
    pub fn new(severity: Severity) -> Self {
        Self {
            id: RuleId::builtin(ID),
            severity,
        }
    }
}

impl Default for MacroNamingRule {
    fn default() -> Self {
        Self::new(Severity::Warning)
    }
}

impl Rule for MacroNamingRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Macro names defined with #define must not contain lowercase letters"
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn execute(&self, ctx: &ExecutionContext<'_, '_>) -> Vec<Finding> {
        ctx.tokens
            .iter()
            .filter_map(|token| token.directive?.macro_name)
            .filter(|m| m.name.bytes().any(|b| b.is_ascii_lowercase()))
            .map(|m| {
                let start = m.position;
                let end = Position::new(
                    start.line,
                    start.column + m.name.len() as u32,
                    start.offset + m.name.len(),
                );
                ctx.finding(
                    self,
                    start,
                    end,
                    m.name,
                    format!("Macro name '{}' should be uppercase", m.name),
                )
            })
            .collect()
    }
}

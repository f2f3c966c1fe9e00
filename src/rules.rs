#![forbid(unsafe_code)]

//! Rule definitions and registry

pub mod builtin;
pub mod comment_marker;
pub mod declarations;
pub mod goto_usage;
pub mod identifier_length;
pub mod indentation;
pub mod macro_naming;
mod registry;
pub mod reserved_identifier;
mod rule;
pub mod uninitialized_variable;

pub use comment_marker::CommentMarkerRule;
pub use goto_usage::GotoUsageRule;
pub use identifier_length::IdentifierLengthRule;
pub use indentation::IndentationRule;
pub use macro_naming::MacroNamingRule;
pub use registry::RuleRegistry;
pub use reserved_identifier::ReservedIdentifierRule;
pub use rule::{ExecutionContext, Finding, Rule};
pub use uninitialized_variable::UninitializedVariableRule;

#[cfg(test)]
pub(crate) mod test_support {
    use super::{ExecutionContext, Finding, Rule};
    use crate::config::rule_config::RuleConfig;
    use crate::syntax::{SourceIndex, tokenize};
    use std::path::Path;

    /// Run one rule over `source` with the given configuration
    pub fn run_with(rule: &dyn Rule, source: &str, config: &RuleConfig) -> Vec<Finding> {
        let tokens = tokenize(source);
        let index = SourceIndex::build(&tokens);
        let ctx = ExecutionContext {
            file: Path::new("test.c"),
            tokens: &tokens,
            index: &index,
            config,
        };
        rule.execute(&ctx)
    }

    /// Run one rule over `source` with the default configuration
    pub fn run(rule: &dyn Rule, source: &str) -> Vec<Finding> {
        run_with(rule, source, &RuleConfig::default())
    }

    /// `(line, column)` of every finding
    pub fn locations(findings: &[Finding]) -> Vec<(u32, u32)> {
        findings.iter().map(|f| (f.line, f.column)).collect()
    }
}

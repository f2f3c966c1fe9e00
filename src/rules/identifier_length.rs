#![forbid(unsafe_code)]

//! Function names longer than the configured limit

use crate::rules::{ExecutionContext, Finding, Rule};
use crate::syntax::SourceIndex;
use crate::types::{RuleId, Severity};

pub const ID: &str = "identifier-length";

/// Flags function definitions whose name exceeds `max_identifier_length`
/// characters. Prototypes are not checked.
#[derive(Debug)]
pub struct IdentifierLengthRule {
    id: RuleId,
    severity: Severity,
}

impl IdentifierLengthRule {
    pub fn new(severity: Severity) -> Self {
        Self {
            id: RuleId::builtin(ID),
            severity,
        }
    }
}

impl Default for IdentifierLengthRule {
    fn default() -> Self {
        Self::new(Severity::Warning)
    }
}

impl Rule for IdentifierLengthRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Function names must not exceed the configured length limit"
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn execute(&self, ctx: &ExecutionContext<'_, '_>) -> Vec<Finding> {
        let limit = ctx.config.max_identifier_length;

        function_definition_names(ctx.index)
            .filter_map(|i| {
                let token = &ctx.index.code()[i];
                let length = token.text.chars().count();
                (length > limit).then(|| {
                    ctx.finding(
                        self,
                        token.start,
                        token.end,
                        token.text,
                        format!(
                            "Function name '{}' is {} characters long (limit {})",
                            token.text, length, limit
                        ),
                    )
                })
            })
            .collect()
    }
}

/// Code indices of identifiers that name a function definition:
/// `name ( ... ) {` at file scope
fn function_definition_names<'a>(index: &'a SourceIndex<'_>) -> impl Iterator<Item = usize> + 'a {
    let code = index.code();
    (0..code.len()).filter(move |&i| {
        let token = &code[i];
        if !token.is_identifier() || token.depth != 0 {
            return false;
        }
        let Some(open) = code.get(i + 1).filter(|t| t.is_punct("(")) else {
            return false;
        };
        open.partner
            .and_then(|close| code.get(close + 1))
            .is_some_and(|next| next.is_punct("{"))
    })
}

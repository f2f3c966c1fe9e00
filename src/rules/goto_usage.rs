#![forbid(unsafe_code)]

//! `goto` statements and label definitions

use crate::rules::{ExecutionContext, Finding, Rule};
use crate::syntax::{BlockKind, SourceIndex};
use crate::types::{RuleId, Severity};

pub const ID: &str = "goto-usage";

/// Flags every `goto` keyword and every statement label
///
/// `case`/`default` labels, ternary colons and bit-field widths are not labels.
#[derive(Debug)]
pub struct GotoUsageRule {
    id: RuleId,
    severity: Severity,
}

impl GotoUsageRule {
    pub fn new(severity: Severity) -> Self {
        Self {
            id: RuleId::builtin(ID),
            severity,
        }
    }
}

impl Default for GotoUsageRule {
    fn default() -> Self {
        Self::new(Severity::Warning)
    }
}

impl Rule for GotoUsageRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Flags goto statements and the labels they jump to"
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn execute(&self, ctx: &ExecutionContext<'_, '_>) -> Vec<Finding> {
        let code = ctx.index.code();
        let mut findings = Vec::new();
        // `?` operators still waiting for their `:` in the current statement
        let mut pending_ternaries = 0usize;

        for (i, token) in code.iter().enumerate() {
            if token.is_punct(";") || token.is_punct("{") || token.is_punct("}") {
                pending_ternaries = 0;
            } else if token.is_punct("?") {
                pending_ternaries += 1;
            } else if token.is_punct(":") && pending_ternaries > 0 {
                pending_ternaries -= 1;
            } else if token.is_keyword("goto") {
                let target = code
                    .get(i + 1)
                    .filter(|t| t.is_identifier())
                    .map(|t| t.text);
                let (snippet, message) = match target {
                    Some(label) => (
                        format!("goto {}", label),
                        format!("Use of 'goto' (jumps to label '{}')", label),
                    ),
                    None => ("goto".to_string(), "Use of 'goto'".to_string()),
                };
                findings.push(ctx.finding(self, token.start, token.end, snippet, message));
            } else if pending_ternaries == 0 && is_label(ctx.index, i) {
                let colon = &code[i + 1];
                findings.push(ctx.finding(
                    self,
                    token.start,
                    colon.end,
                    format!("{}:", token.text),
                    format!("Label '{}' defined (goto target)", token.text),
                ));
            }
        }

        findings
    }
}

/// Identifier followed by `:` at the start of a statement inside a function
pub(crate) fn is_label(index: &SourceIndex<'_>, i: usize) -> bool {
    let code = index.code();
    let token = &code[i];
    if !token.is_identifier() || token.depth == 0 {
        return false;
    }
    if !code.get(i + 1).is_some_and(|t| t.is_punct(":")) {
        return false;
    }
    // `a::b` attribute namespaces
    if code.get(i + 2).is_some_and(|t| t.is_punct(":")) {
        return false;
    }
    if !matches!(
        index.block_kind_at(i),
        Some(BlockKind::Compound | BlockKind::Switch)
    ) {
        return false;
    }
    index
        .prev_code(i)
        .is_none_or(|prev| [";", "{", "}", ":"].iter().any(|p| prev.is_punct(p)))
}

#![forbid(unsafe_code)]

//! Declared names that fall in the implementation's reserved namespace

use crate::rules::declarations::{self, NameRef};
use crate::rules::{ExecutionContext, Finding, Rule};
use crate::types::{RuleId, Severity};
use std::collections::BTreeSet;

pub const ID: &str = "reserved-identifier";

/// Flags declared names that begin with `__`, begin with `_` followed by an
/// uppercase letter, or redeclare a reserved standard type name
///
/// Declarators (variables, functions, parameters, members, typedefs),
/// struct/union/enum tags being defined and enumerators are checked. Names
/// that are only referenced, such as `size_t` in `size_t n;`, are not.
#[derive(Debug)]
pub struct ReservedIdentifierRule {
    id: RuleId,
    severity: Severity,
}

impl ReservedIdentifierRule {
    pub fn new(severity: Severity) -> Self {
        Self {
            id: RuleId::builtin(ID),
            severity,
        }
    }
}

impl Default for ReservedIdentifierRule {
    fn default() -> Self {
        Self::new(Severity::Error)
    }
}

impl Rule for ReservedIdentifierRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Declared names must not use identifiers reserved for the implementation"
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn execute(&self, ctx: &ExecutionContext<'_, '_>) -> Vec<Finding> {
        let declared = declarations::scan(ctx.index);

        let mut names: Vec<NameRef<'_>> = declared
            .iter()
            .flat_map(|decl| {
                decl.declarators
                    .iter()
                    .map(|d| d.name)
                    .chain(decl.defined_tag)
            })
            .chain(declarations::enumerators(ctx.index))
            .collect();
        names.sort_by_key(|n| n.code_idx);
        names.dedup_by_key(|n| n.code_idx);

        names
            .into_iter()
            .filter_map(|name| {
                let reason = reserved_reason(name.name, &ctx.config.reserved_type_names)?;
                Some(ctx.finding(
                    self,
                    name.start,
                    name.end,
                    name.name,
                    format!("Identifier '{}' is reserved: {}", name.name, reason),
                ))
            })
            .collect()
    }
}

/// Why `name` is reserved, or `None` if it may be declared
pub fn reserved_reason(name: &str, reserved_types: &BTreeSet<String>) -> Option<&'static str> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some('_'), Some('_')) => Some("begins with two underscores"),
        (Some('_'), Some(c)) if c.is_ascii_uppercase() => {
            Some("begins with an underscore followed by an uppercase letter")
        }
        _ if reserved_types.contains(name) => Some("redeclares a standard type name"),
        _ => None,
    }
}

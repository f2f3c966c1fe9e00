#![forbid(unsafe_code)]

//! Reads of local variables before any assignment
//!
//! Each uninitialized local gets a binding tied to the id of the block that
//! declares it. Tokens are then scanned forward from the declarator to the
//! close of that block. The first assignment ends the scan; a read before it is
//! reported. Branches are not modeled: the first textual occurrence decides.

use crate::rules::declarations::{self, DeclContext, Declaration};
use crate::rules::{ExecutionContext, Finding, Rule};
use crate::syntax::{BlockId, CodeToken, SourceIndex, TokenKind};
use crate::types::{RuleId, Severity};
use std::collections::HashMap;

pub const ID: &str = "uninitialized-variable";

/// A local declared without an initializer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding<'src> {
    pub name: &'src str,
    pub declared_line: u32,
    /// Block whose close ends the binding's lifetime
    pub scope: BlockId,
    pub initialized: bool,
    /// Line of the first read before any assignment
    pub first_use: Option<u32>,
}

/// What the first relevant occurrence of a binding's name does
enum Occurrence {
    Read(usize),
    Assigned,
    Unused,
}

/// Flags reads of locals declared without an initializer that happen before
/// the first assignment
#[derive(Debug)]
pub struct UninitializedVariableRule {
    id: RuleId,
    severity: Severity,
}

impl UninitializedVariableRule {
    pub fn new(severity: Severity) -> Self {
        Self {
            id: RuleId::builtin(ID),
            severity,
        }
    }
}

impl Default for UninitializedVariableRule {
    fn default() -> Self {
        Self::new(Severity::Error)
    }
}

impl Rule for UninitializedVariableRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Local variables must be assigned before they are read"
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn execute(&self, ctx: &ExecutionContext<'_, '_>) -> Vec<Finding> {
        let index = ctx.index;
        let declared = declarations::scan(index);
        let declared_at = declaration_sites(&declared);
        let code = index.code();
        let mut findings = Vec::new();

        for decl in declared.iter().filter(|d| is_tracked(index, d)) {
            let Some(scope) = decl.scope else {
                continue;
            };
            for declarator in &decl.declarators {
                if declarator.initialized || declarator.is_array || declarator.is_function {
                    continue;
                }
                let mut binding = Binding {
                    name: declarator.name.name,
                    declared_line: declarator.name.start.line,
                    scope,
                    initialized: false,
                    first_use: None,
                };
                let from = declarator.name.code_idx + 1;
                match first_occurrence(index, &declared_at, &binding, from) {
                    Occurrence::Read(at) => {
                        let token = &code[at];
                        binding.first_use = Some(token.start.line);
                        findings.push(ctx.finding(
                            self,
                            token.start,
                            token.end,
                            token.text,
                            format!(
                                "Variable '{}' may be used before it is initialized (declared on line {})",
                                binding.name, binding.declared_line
                            ),
                        ));
                    }
                    Occurrence::Assigned => binding.initialized = true,
                    Occurrence::Unused => {}
                }
                tracing::trace!(?binding, "uninitialized binding scanned");
            }
        }

        findings
    }
}

/// Block-scope declarations that introduce storage the function must initialize
fn is_tracked(index: &SourceIndex<'_>, decl: &Declaration<'_>) -> bool {
    matches!(decl.context, DeclContext::Statement | DeclContext::ForInit)
        && !decl.is_static
        && !decl.is_extern
        && !decl.is_typedef
        && decl
            .scope
            .is_some_and(|scope| index.block(scope).kind.is_scope())
}

/// Code index of every declared name, with its scope and context
fn declaration_sites(
    declared: &[Declaration<'_>],
) -> HashMap<usize, (Option<BlockId>, DeclContext)> {
    declared
        .iter()
        .flat_map(|decl| {
            decl.declarators
                .iter()
                .map(move |d| (d.name.code_idx, (decl.scope, decl.context)))
        })
        .collect()
}

fn first_occurrence(
    index: &SourceIndex<'_>,
    declared_at: &HashMap<usize, (Option<BlockId>, DeclContext)>,
    binding: &Binding<'_>,
    from: usize,
) -> Occurrence {
    let code = index.code();
    let limit = index
        .block(binding.scope)
        .close_code
        .unwrap_or(code.len());
    let mut i = from;

    while i < limit {
        let token = &code[i];

        if token.is_keyword("sizeof") {
            i = match code.get(i + 1) {
                Some(next) if next.is_punct("(") => next.partner.map_or(limit, |close| close + 1),
                _ => unary_operand_end(code, i + 1, limit),
            };
            continue;
        }
        if !token.is_identifier() || token.text != binding.name {
            i += 1;
            continue;
        }

        match declared_at.get(&i) {
            Some((_, DeclContext::Parameter)) => {
                i += 1;
                continue;
            }
            Some((Some(scope), _)) if *scope != binding.scope => {
                // shadowed for the rest of the nested block
                i = index
                    .block(*scope)
                    .close_code
                    .map_or(limit, |close| close + 1);
                continue;
            }
            Some((_, DeclContext::ForInit)) => {
                // a loop variable shadows the binding for the whole loop
                i = for_statement_end(code, i, limit);
                continue;
            }
            Some(_) => return Occurrence::Unused,
            None => {}
        }

        let prev = index.prev_code(i);
        if prev.is_some_and(|p| p.is_punct(".") || p.is_punct("->")) {
            i += 1;
            continue;
        }

        let next = code.get(i + 1);
        if next.is_some_and(|n| n.is_punct("=")) {
            return Occurrence::Assigned;
        }
        // member stores count as initializing the aggregate
        if next.is_some_and(|n| n.is_punct(".")) {
            return Occurrence::Assigned;
        }
        // `&name` hands the storage to someone who may write it
        let address_taken = prev.is_some_and(|p| p.is_punct("&"))
            && !i
                .checked_sub(2)
                .is_some_and(|before| code[before].ends_operand());
        if address_taken {
            return Occurrence::Assigned;
        }

        return Occurrence::Read(i);
    }

    Occurrence::Unused
}

/// Code index just past the unparenthesized operand of `sizeof` starting at `i`
fn unary_operand_end(code: &[CodeToken<'_>], mut i: usize, limit: usize) -> usize {
    const PREFIX: &[&str] = &["*", "&", "-", "+", "!", "~", "++", "--"];

    loop {
        while code
            .get(i)
            .is_some_and(|t| t.is_keyword("sizeof") || PREFIX.iter().any(|op| t.is_punct(op)))
        {
            i += 1;
        }
        let Some(token) = code.get(i) else {
            return limit;
        };
        if token.is_punct("(") {
            i = token.partner.map_or(limit, |close| close + 1);
            // `(type)` followed by an operand is a cast
            if code.get(i).is_some_and(|t| starts_primary(t)) {
                continue;
            }
            break;
        }
        if starts_primary(token) {
            i += 1;
            break;
        }
        return i.min(limit);
    }

    while let Some(token) = code.get(i) {
        i = if (token.is_punct(".") || token.is_punct("->"))
            && code.get(i + 1).is_some_and(|t| t.is_identifier())
        {
            i + 2
        } else if token.is_punct("[") || token.is_punct("(") {
            token.partner.map_or(limit, |close| close + 1)
        } else if token.is_punct("++") || token.is_punct("--") {
            i + 1
        } else {
            break;
        };
    }
    i.min(limit)
}

fn starts_primary(token: &CodeToken<'_>) -> bool {
    matches!(
        token.kind,
        TokenKind::Identifier
            | TokenKind::NumericLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral
    )
}

/// Code index just past the `for` statement whose header declares the name
/// at `decl_idx`
fn for_statement_end(code: &[CodeToken<'_>], decl_idx: usize, limit: usize) -> usize {
    let header_close = (1..decl_idx)
        .rev()
        .find(|&j| {
            code[j].is_punct("(")
                && code[j - 1].is_keyword("for")
                && code[j].partner.is_some_and(|close| close > decl_idx)
        })
        .and_then(|j| code[j].partner);
    let Some(close) = header_close else {
        return limit;
    };

    let depth = code[close].depth;
    let mut i = close + 1;
    while i < limit {
        let token = &code[i];
        if token.is_punct("{") || token.is_punct("(") || token.is_punct("[") {
            let Some(partner) = token.partner else {
                return limit;
            };
            if token.is_punct("{") && token.depth == depth {
                return partner + 1;
            }
            i = partner + 1;
            continue;
        }
        if token.is_punct(";") && token.depth == depth {
            return i + 1;
        }
        i += 1;
    }
    limit
}

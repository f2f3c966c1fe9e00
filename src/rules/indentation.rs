#![forbid(unsafe_code)]

//! Indentation consistency inside function bodies
//!
//! Each function body gets its own indentation unit, chosen by majority vote
//! over the statement lines directly inside the outer brace. Every checked line
//! in the body is then compared against `level × unit`. Only lines that begin a
//! statement, open or close a block are checked; continuation lines, labels,
//! comment-only and preprocessor lines are left alone.

use crate::rules::goto_usage::is_label;
use crate::rules::{ExecutionContext, Finding, Rule};
use crate::syntax::{Block, BlockKind, CodeToken, Position, SourceIndex, SourceLine, TokenKind};
use crate::types::{RuleId, Severity};
use std::collections::BTreeMap;

pub const ID: &str = "indentation-consistency";

/// One step of indentation
///
/// Ordered so that fewer spaces sort first and tabs sort last, which makes
/// ties in the vote resolve to the smaller unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndentUnit {
    Spaces(usize),
    Tabs,
}

impl IndentUnit {
    /// Unit suggested by a single pure run of spaces or tabs
    pub fn from_run(indent: &str) -> Option<Self> {
        if indent.is_empty() {
            None
        } else if indent.bytes().all(|b| b == b' ') {
            Some(IndentUnit::Spaces(indent.len()))
        } else if indent.bytes().all(|b| b == b'\t') {
            Some(IndentUnit::Tabs)
        } else {
            None
        }
    }

    /// Whether `indent` is exactly `level` units
    pub fn fits(self, indent: &str, level: usize) -> bool {
        match self {
            IndentUnit::Spaces(n) => !indent.contains('\t') && indent.len() == level * n,
            IndentUnit::Tabs => !indent.contains(' ') && indent.len() == level,
        }
    }

    fn describe(self, level: usize) -> String {
        match self {
            IndentUnit::Spaces(n) => count(level * n, "space"),
            IndentUnit::Tabs => count(level, "tab"),
        }
    }
}

/// Majority unit; ties go to the smaller unit
pub fn dominant_unit<I>(runs: I) -> Option<IndentUnit>
where
    I: IntoIterator<Item = IndentUnit>,
{
    let mut votes: BTreeMap<IndentUnit, usize> = BTreeMap::new();
    for unit in runs {
        *votes.entry(unit).or_default() += 1;
    }
    votes
        .into_iter()
        .max_by(|(unit_a, votes_a), (unit_b, votes_b)| {
            votes_a.cmp(votes_b).then(unit_b.cmp(unit_a))
        })
        .map(|(unit, _)| unit)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRole {
    /// Starts a statement; `nested` counts the braceless control headers it
    /// belongs to, `header` is the innermost one
    Statement {
        nested: usize,
        header: Option<usize>,
    },
    OpenBrace,
    CloseBrace,
    Label,
    Continuation,
}

/// Checks tab/space mixing, indentation width and braceless control bodies
#[derive(Debug)]
pub struct IndentationRule {
    id: RuleId,
    severity: Severity,
}

impl IndentationRule {
    pub fn new(severity: Severity) -> Self {
        Self {
            id: RuleId::builtin(ID),
            severity,
        }
    }
}

impl Default for IndentationRule {
    fn default() -> Self {
        Self::new(Severity::Warning)
    }
}

impl Rule for IndentationRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Indentation inside function bodies must use one consistent unit"
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn execute(&self, ctx: &ExecutionContext<'_, '_>) -> Vec<Finding> {
        let layout = Layout {
            index: ctx.index,
            code: ctx.index.code(),
        };
        let mut findings = Vec::new();

        for body in ctx.index.blocks().iter().filter(|b| layout.is_function_body(b)) {
            self.check_function(ctx, &layout, body, &mut findings);
        }

        findings
    }
}

impl IndentationRule {
    fn check_function(
        &self,
        ctx: &ExecutionContext<'_, '_>,
        layout: &Layout<'_, '_>,
        body: &Block,
        findings: &mut Vec<Finding>,
    ) {
        let last_line = body
            .close
            .map_or(ctx.index.lines().len() as u32, |close| close.line);
        let rows: Vec<(&SourceLine<'_>, usize, LineRole)> = ctx
            .index
            .lines()
            .iter()
            .filter(|line| line.number > body.open.line && line.number <= last_line)
            .filter(|line| !line.continues_token)
            .filter_map(|line| {
                let first = line.first_code?;
                Some((line, first, layout.classify(first)))
            })
            .collect();

        let unit = dominant_unit(rows.iter().filter_map(|(line, _, role)| {
            let direct = line.depth == 1 && matches!(role, LineRole::Statement { nested: 0, .. });
            if direct {
                IndentUnit::from_run(line.indent)
            } else {
                None
            }
        }));

        for &(line, first, role) in &rows {
            let level = match role {
                LineRole::Statement { nested, .. } => line.depth + nested,
                LineRole::OpenBrace => line.depth,
                LineRole::CloseBrace => line.depth.saturating_sub(1),
                LineRole::Label | LineRole::Continuation => continue,
            };
            let token = &layout.code[first];
            let start = Position::new(
                line.number,
                1,
                token.start.offset - (token.start.column as usize - 1),
            );
            let end = Position::new(
                line.number,
                line.indent_len() as u32 + 1,
                start.offset + line.indent_len(),
            );
            let mut report = |message: String| {
                findings.push(ctx.finding(self, start, end, line.text.trim_end(), message));
            };

            if line.indent_is_mixed() {
                report("Indentation mixes tabs and spaces".to_string());
                continue;
            }

            if let LineRole::Statement {
                header: Some(header),
                ..
            } = role
            {
                let header_token = &layout.code[header];
                let header_indent = ctx
                    .index
                    .line(header_token.start.line)
                    .map_or(0, |l| l.indent_len());
                if line.indent_len() <= header_indent {
                    report(format!(
                        "Body of '{}' on line {} is not indented past its header",
                        header_token.text, header_token.start.line
                    ));
                    continue;
                }
            }

            let Some(unit) = unit else {
                continue;
            };
            let tolerance = usize::from(layout.within_switch(token, body));
            let fits = (level.saturating_sub(tolerance)..=level + tolerance)
                .any(|candidate| unit.fits(line.indent, candidate));
            if !fits {
                report(format!(
                    "Expected {} of indentation, found {}",
                    unit.describe(level),
                    describe_run(line.indent)
                ));
            }
        }
    }
}

/// Statement-level view of the code tokens
struct Layout<'a, 'src> {
    index: &'a SourceIndex<'src>,
    code: &'a [CodeToken<'src>],
}

impl Layout<'_, '_> {
    /// Top-level compound block opened right after a `)`
    fn is_function_body(&self, block: &Block) -> bool {
        block.parent.is_none()
            && block.kind == BlockKind::Compound
            && self
                .index
                .prev_code(block.open_code)
                .is_some_and(|prev| prev.is_punct(")"))
    }

    /// What the line whose first code token is `first` does
    fn classify(&self, first: usize) -> LineRole {
        let token = &self.code[first];

        if token.is_punct("}") {
            let closed = token
                .partner
                .and_then(|open| self.index.block_opened_at(open));
            return match closed {
                Some(block) if matches!(block.kind, BlockKind::Initializer | BlockKind::Enum) => {
                    LineRole::Continuation
                }
                _ => LineRole::CloseBrace,
            };
        }
        if matches!(
            self.index.block_kind_at(first),
            Some(BlockKind::Initializer | BlockKind::Enum)
        ) {
            return LineRole::Continuation;
        }
        if token.is_punct("{") {
            return LineRole::OpenBrace;
        }
        if is_label(self.index, first) {
            return LineRole::Label;
        }
        if token.is_keyword("else") {
            // aligned with the `if` it belongs to
            return LineRole::Statement {
                nested: self
                    .matching_if(first)
                    .map_or(0, |if_idx| self.line_nesting(if_idx)),
                header: None,
            };
        }

        let Some(prev_idx) = first.checked_sub(1) else {
            return LineRole::Statement {
                nested: 0,
                header: None,
            };
        };
        let prev = &self.code[prev_idx];
        if prev.is_punct(";")
            || prev.is_punct("{")
            || prev.is_punct("}")
            || (prev.is_punct(":") && self.ends_label(prev_idx))
        {
            LineRole::Statement {
                nested: 0,
                header: None,
            }
        } else if let Some(header) = self.control_header(prev_idx) {
            LineRole::Statement {
                nested: 1 + self.line_nesting(header),
                header: Some(header),
            }
        } else {
            LineRole::Continuation
        }
    }

    /// Keyword of a braceless control construct ending at `idx`
    fn control_header(&self, idx: usize) -> Option<usize> {
        let token = &self.code[idx];
        if token.is_keyword("else") || token.is_keyword("do") {
            return Some(idx);
        }
        if !token.is_punct(")") {
            return None;
        }
        let keyword = token.partner?.checked_sub(1)?;
        let head = &self.code[keyword];
        (head.kind == TokenKind::Keyword && matches!(head.text, "if" | "for" | "while" | "switch"))
            .then_some(keyword)
    }

    /// The `if` an `else` pairs with: the nearest earlier unpaired `if` in
    /// the same block
    fn matching_if(&self, else_idx: usize) -> Option<usize> {
        let mut unpaired_elses = 0usize;
        let mut i = else_idx;
        while i > 0 {
            i -= 1;
            let token = &self.code[i];
            if token.is_punct("}") {
                i = token.partner.filter(|&open| open < i)?;
            } else if token.is_punct("{") {
                return None;
            } else if token.is_keyword("else") {
                unpaired_elses += 1;
            } else if token.is_keyword("if") {
                if unpaired_elses == 0 {
                    return Some(i);
                }
                unpaired_elses -= 1;
            }
        }
        None
    }

    /// Braceless nesting of the line holding the code token at `idx`
    fn line_nesting(&self, idx: usize) -> usize {
        let first = self
            .index
            .line(self.code[idx].start.line)
            .and_then(|line| line.first_code);
        match first.map(|first| self.classify(first)) {
            Some(LineRole::Statement { nested, .. }) => nested,
            _ => 0,
        }
    }

    /// Whether the `:` at `colon` closes a `case`, `default` or goto label
    fn ends_label(&self, colon: usize) -> bool {
        let line_first = self
            .index
            .line(self.code[colon].start.line)
            .and_then(|line| line.first_code)
            .map(|first| &self.code[first]);
        if line_first.is_some_and(|t| t.is_keyword("case") || t.is_keyword("default")) {
            return true;
        }
        colon.checked_sub(1).is_some_and(|i| is_label(self.index, i))
    }

    /// Whether a `switch` body lies between `token` and the function body
    fn within_switch(&self, token: &CodeToken<'_>, body: &Block) -> bool {
        token.block.is_some_and(|block| {
            self.index
                .ancestors(block)
                .take_while(|b| b.id != body.id)
                .any(|b| b.kind == BlockKind::Switch)
        })
    }
}

fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

fn describe_run(indent: &str) -> String {
    let tabs = indent.bytes().filter(|&b| b == b'\t').count();
    let spaces = indent.len() - tabs;
    match (tabs, spaces) {
        (0, 0) => "no indentation".to_string(),
        (0, s) => count(s, "space"),
        (t, 0) => count(t, "tab"),
        (t, s) => format!("{} and {}", count(t, "tab"), count(s, "space")),
    }
}

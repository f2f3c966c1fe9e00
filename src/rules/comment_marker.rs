#![forbid(unsafe_code)]

//! Tracked marker words (TODO, FIXME, ...) inside comments
//!
//! Only comment tokens are searched, so marker words inside string literals or
//! code are never reported.

use crate::error::RuleError;
use crate::rules::{ExecutionContext, Finding, Rule};
use crate::syntax::TokenKind;
use crate::types::{RuleId, Severity};
use regex::Regex;

pub const ID: &str = "comment-marker";

/// Reports each whole-word, case-sensitive marker occurrence in a comment
pub struct CommentMarkerRule {
    id: RuleId,
    severity: Severity,
    /// `None` when no markers are configured
    pattern: Option<Regex>,
}

impl std::fmt::Debug for CommentMarkerRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentMarkerRule")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .field("pattern", &self.pattern.as_ref().map(|p| p.as_str()))
            .finish()
    }
}

impl CommentMarkerRule {
    /// Compile a matcher for the given marker words
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidPattern` if the combined pattern fails to compile.
    pub fn new<S: AsRef<str>>(markers: &[S], severity: Severity) -> Result<Self, RuleError> {
        let pattern = if markers.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = markers
                .iter()
                .map(|m| regex::escape(m.as_ref()))
                .collect();
            let source = format!(r"\b({})\b:?", alternatives.join("|"));
            let regex = Regex::new(&source).map_err(|e| {
                RuleError::InvalidPattern(format!("comment markers '{}': {}", source, e))
            })?;
            Some(regex)
        };

        Ok(Self {
            id: RuleId::builtin(ID),
            severity,
            pattern,
        })
    }
}

impl Rule for CommentMarkerRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn description(&self) -> &str {
        "Reports tracked marker words such as TODO and FIXME in comments"
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn execute(&self, ctx: &ExecutionContext<'_, '_>) -> Vec<Finding> {
        let Some(pattern) = &self.pattern else {
            return vec![];
        };
        let map = ctx.tokens.source_map();
        let mut findings = Vec::new();

        for comment in ctx.tokens.iter().filter(|t| t.kind == TokenKind::Comment) {
            let text = comment.text;
            let hits: Vec<(regex::Match<'_>, usize)> = pattern
                .captures_iter(text)
                .filter_map(|caps| Some((caps.get(1)?, caps.get(0)?.end())))
                .collect();

            for (n, (marker, match_end)) in hits.iter().enumerate() {
                let rest_end = hits.get(n + 1).map_or(text.len(), |(next, _)| next.start());
                let rest = remaining_text(&text[*match_end..rest_end]);
                let message = if rest.is_empty() {
                    format!("{} marker", marker.as_str())
                } else {
                    format!("{}: {}", marker.as_str(), rest)
                };

                let offset = comment.start.offset + marker.start();
                findings.push(ctx.finding(
                    self,
                    map.position(offset),
                    map.position(offset + marker.end() - marker.start()),
                    marker.as_str(),
                    message,
                ));
            }
        }

        findings
    }
}

/// Comment text following a marker, up to the end of its line, without the
/// comment terminator
fn remaining_text(text: &str) -> &str {
    let line = text.split('\n').next().unwrap_or_default();
    let line = line.trim();
    line.strip_suffix("*/").unwrap_or(line).trim_end()
}

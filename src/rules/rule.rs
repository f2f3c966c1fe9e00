#![forbid(unsafe_code)]

//! Core Rule trait and related types for defining and executing rules

use crate::config::rule_config::RuleConfig;
use crate::syntax::{Position, SourceIndex, TokenStream};
use crate::types::{RuleId, Severity};
use std::path::{Path, PathBuf};

/// Execution context provided to rules when they execute
///
/// Built once per file; every detector reads the same token stream and index.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext<'a, 'src> {
    /// Identifier of the source unit being analyzed
    pub file: &'a Path,

    /// Tokens of the file, possibly cut short by a lex error
    pub tokens: &'a TokenStream<'src>,

    /// Line and block structure derived from `tokens`
    pub index: &'a SourceIndex<'src>,

    pub config: &'a RuleConfig,
}

impl<'a, 'src> ExecutionContext<'a, 'src> {
    /// Full text of the file
    pub fn source(&self) -> &'src str {
        self.tokens.source()
    }

    /// Build a finding attributed to `rule` for the span `start..end`
    pub fn finding<R>(
        &self,
        rule: &R,
        start: Position,
        end: Position,
        snippet: impl Into<String>,
        message: impl Into<String>,
    ) -> Finding
    where
        R: Rule + ?Sized,
    {
        Finding {
            rule_id: rule.id().clone(),
            severity: rule.severity(),
            file: self.file.to_path_buf(),
            line: start.line,
            column: start.column,
            end_line: end.line,
            end_column: end.column,
            snippet: snippet.into(),
            message: message.into(),
        }
    }
}

/// A single rule violation
///
/// This structure captures all information needed to report and serialize a finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// ID of the rule that produced this finding
    pub rule_id: RuleId,

    pub severity: Severity,

    /// File the finding belongs to
    pub file: PathBuf,

    /// Line number where the finding starts (1-indexed)
    pub line: u32,

    /// Column number where the finding starts (1-indexed)
    pub column: u32,

    /// Line number where the finding ends (1-indexed)
    pub end_line: u32,

    /// Column number just past the end of the finding (1-indexed)
    pub end_column: u32,

    /// Offending token or line text
    pub snippet: String,

    /// Human-readable message describing the finding
    pub message: String,
}

/// Trait that all rules must implement
///
/// Rules are responsible for analyzing source code and detecting findings.
/// The trait is `Send + Sync` to enable parallel execution across files and rules.
pub trait Rule: Send + Sync {
    /// Returns the unique identifier for this rule
    fn id(&self) -> &RuleId;

    /// Returns a human-readable description of what this rule checks
    fn description(&self) -> &str;

    /// Returns the severity level of findings from this rule
    fn severity(&self) -> Severity;

    /// Executes the rule against the provided context
    ///
    /// Returns a vector of all findings in the file.
    /// Returns an empty vector if nothing is found.
    fn execute(&self, ctx: &ExecutionContext<'_, '_>) -> Vec<Finding>;
}

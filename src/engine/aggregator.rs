#![forbid(unsafe_code)]

//! Finding aggregation
//!
//! Detectors return findings in whatever order they discover them. The
//! aggregator merges those lists into one deterministic sequence and derives
//! the counts used by the reports.

use crate::rules::Finding;
use crate::types::{RuleId, Severity};
use std::collections::{BTreeMap, HashSet};

/// Counts over an aggregated set of findings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub by_rule: BTreeMap<RuleId, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    /// Files whose lexing stopped early
    pub partial_files: usize,
    /// Detector runs that panicked, across all files
    pub failed_detectors: usize,
}

impl Summary {
    pub fn count_for(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }
}

/// Merges per-detector findings into report order
pub struct FindingAggregator;

impl FindingAggregator {
    /// Deduplicate and order findings
    ///
    /// Two findings are duplicates when they share rule, file, line and
    /// column; the first one wins. The result is ordered by file, line,
    /// column and then rule id.
    pub fn aggregate(findings: Vec<Finding>) -> Vec<Finding> {
        let mut seen = HashSet::new();
        let mut merged: Vec<Finding> = findings
            .into_iter()
            .filter(|f| seen.insert((f.rule_id.clone(), f.file.clone(), f.line, f.column)))
            .collect();
        merged.sort_by(|a, b| {
            (&a.file, a.line, a.column, &a.rule_id).cmp(&(&b.file, b.line, b.column, &b.rule_id))
        });
        merged
    }

    /// Count findings by rule and severity
    pub fn summarize<'a, I>(findings: I) -> Summary
    where
        I: IntoIterator<Item = &'a Finding>,
    {
        let mut summary = Summary::default();
        for finding in findings {
            summary.total += 1;
            *summary.by_rule.entry(finding.rule_id.clone()).or_insert(0) += 1;
            *summary.by_severity.entry(finding.severity).or_insert(0) += 1;
        }
        summary
    }
}

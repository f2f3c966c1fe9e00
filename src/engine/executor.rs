#![forbid(unsafe_code)]

//! Analysis engine that runs the detectors over in-memory sources
//!
//! One file is lexed and indexed once; every enabled detector then reads the
//! same immutable view. Detectors run in parallel within a file and files run
//! in parallel within a batch, both through rayon. A detector that panics is
//! isolated: its findings for that file are dropped and the failure is
//! recorded on the file's report.

use crate::config::rule_config::RuleConfig;
use crate::engine::aggregator::{FindingAggregator, Summary};
use crate::error::{ConfigError, CstyleError, LexError, RuleError};
use crate::rules::{ExecutionContext, Finding, Rule, RuleRegistry};
use crate::syntax::{SourceIndex, tokenize};
use crate::types::{FileStatus, RuleId};
use rayon::prelude::*;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// A detector that panicked while analyzing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorFailure {
    pub rule_id: RuleId,
    pub message: String,
}

/// Outcome of analyzing one source unit
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub file: PathBuf,
    pub status: FileStatus,
    /// Aggregated findings in report order
    pub findings: Vec<Finding>,
    /// Set when lexing stopped early; findings then cover the prefix only
    pub lex_error: Option<LexError>,
    pub failed_detectors: Vec<DetectorFailure>,
}

impl FileReport {
    /// The lexing failure of a partial file, tagged with its path
    pub fn lex_failure(&self) -> Option<CstyleError> {
        self.lex_error.clone().map(|source| CstyleError::Lex {
            file: self.file.clone(),
            source,
        })
    }
}

/// Result of analyzing a batch of files
#[derive(Debug)]
pub struct AnalysisResult {
    /// One report per file, ordered by file
    pub reports: Vec<FileReport>,
    pub files_checked: usize,
    pub rules_executed: usize,
}

impl AnalysisResult {
    /// Every finding across all files, in report order
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.reports.iter().flat_map(|r| r.findings.iter())
    }

    pub fn total_findings(&self) -> usize {
        self.reports.iter().map(|r| r.findings.len()).sum()
    }

    pub fn has_findings(&self) -> bool {
        self.reports.iter().any(|r| !r.findings.is_empty())
    }

    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(|r| !r.failed_detectors.is_empty())
    }

    /// Counts by rule and severity, plus partial files and detector failures
    pub fn summary(&self) -> Summary {
        let mut summary = FindingAggregator::summarize(self.findings());
        summary.partial_files = self
            .reports
            .iter()
            .filter(|r| r.status == FileStatus::Partial)
            .count();
        summary.failed_detectors = self.reports.iter().map(|r| r.failed_detectors.len()).sum();
        summary
    }
}

/// Runs the enabled detectors for a validated configuration
pub struct AnalysisEngine {
    registry: RuleRegistry,
    config: RuleConfig,
}

impl AnalysisEngine {
    /// Validate `config` and build its detectors
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid. Nothing is
    /// analyzed in that case.
    pub fn new(config: RuleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = RuleRegistry::from_config(&config).map_err(|e| match e {
            RuleError::InvalidPattern(message) => ConfigError::InvalidValue {
                field: "comment-markers".to_string(),
                message,
            },
            other => ConfigError::Validation(other.to_string()),
        })?;
        if registry.is_empty() {
            tracing::warn!("no rules enabled");
        }
        Ok(Self { registry, config })
    }

    /// Use an explicit registry instead of the built-in rules
    pub fn with_registry(registry: RuleRegistry, config: RuleConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Analyze one source unit
    pub fn analyze_source(&self, file: &Path, source: &str) -> FileReport {
        let tokens = tokenize(source);
        let lex_error = tokens.error().cloned();
        if let Some(error) = &lex_error {
            tracing::warn!(file = %file.display(), %error, "lexing stopped early");
        }
        let index = SourceIndex::build(&tokens);
        let ctx = ExecutionContext {
            file,
            tokens: &tokens,
            index: &index,
            config: &self.config,
        };

        let rules: Vec<&dyn Rule> = self.registry.iter_rules().collect();
        let outcomes: Vec<Result<Vec<Finding>, DetectorFailure>> = rules
            .par_iter()
            .map(|&rule| run_isolated(rule, &ctx))
            .collect();

        let mut findings = Vec::new();
        let mut failed_detectors = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(found) => findings.extend(found),
                Err(failure) => {
                    tracing::error!(
                        file = %file.display(),
                        rule = %failure.rule_id,
                        message = %failure.message,
                        "detector failed"
                    );
                    failed_detectors.push(failure);
                }
            }
        }
        let findings = FindingAggregator::aggregate(findings);

        let status = if lex_error.is_some() {
            FileStatus::Partial
        } else if findings.is_empty() {
            FileStatus::Ok
        } else {
            FileStatus::OkWithFindings
        };
        tracing::debug!(file = %file.display(), %status, findings = findings.len(), "analyzed");

        FileReport {
            file: file.to_path_buf(),
            status,
            findings,
            lex_error,
            failed_detectors,
        }
    }

    /// Analyze a batch of files in parallel
    pub fn analyze_all(&self, sources: &BTreeMap<PathBuf, String>) -> AnalysisResult {
        let mut reports: Vec<FileReport> = sources
            .par_iter()
            .map(|(file, source)| self.analyze_source(file, source))
            .collect();
        reports.sort_by(|a, b| a.file.cmp(&b.file));

        AnalysisResult {
            files_checked: reports.len(),
            rules_executed: self.registry.len(),
            reports,
        }
    }
}

fn run_isolated(
    rule: &dyn Rule,
    ctx: &ExecutionContext<'_, '_>,
) -> Result<Vec<Finding>, DetectorFailure> {
    panic::catch_unwind(AssertUnwindSafe(|| rule.execute(ctx))).map_err(|payload| {
        DetectorFailure {
            rule_id: rule.id().clone(),
            message: panic_message(payload.as_ref()),
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "detector panicked".to_string()
    }
}

#![forbid(unsafe_code)]

//! JSONL output formatter for machine-readable output
//!
//! Outputs one JSON object per line in a deterministic order:
//! 1. All finding records (ordered by file, line, column, rule)
//! 2. One file record per file whose status is not `ok` or that had a
//!    detector failure
//! 3. One status record

use crate::engine::AnalysisResult;
use crate::types::FileStatus;
use serde::Serialize;
use std::path::PathBuf;

/// JSONL output formatter
pub struct JsonlFormatter;

impl JsonlFormatter {
    /// Creates a new JsonlFormatter
    pub fn new() -> Self {
        JsonlFormatter
    }

    /// Format the analysis result as JSONL
    pub fn format(&self, result: &AnalysisResult) -> String {
        let mut output = String::new();

        for finding in result.findings() {
            push_record(
                &mut output,
                &FindingRecord {
                    record_type: "finding",
                    rule: finding.rule_id.as_str(),
                    severity: finding.severity.as_str(),
                    file: finding.file.clone(),
                    line: finding.line,
                    column: finding.column,
                    end_line: finding.end_line,
                    end_column: finding.end_column,
                    snippet: &finding.snippet,
                    message: &finding.message,
                },
            );
        }

        for report in &result.reports {
            if report.status == FileStatus::Ok && report.failed_detectors.is_empty() {
                continue;
            }
            push_record(
                &mut output,
                &FileRecord {
                    record_type: "file",
                    file: report.file.clone(),
                    status: report.status.as_str(),
                    findings: report.findings.len() as u64,
                    lex_error: report.lex_error.as_ref().map(|e| e.to_string()),
                    failed_detectors: report
                        .failed_detectors
                        .iter()
                        .map(|f| f.rule_id.as_str())
                        .collect(),
                },
            );
        }

        let total_findings = result.total_findings() as u64;
        push_record(
            &mut output,
            &StatusRecord {
                record_type: "status",
                passed: total_findings == 0,
                files_checked: result.files_checked as u64,
                rules_executed: result.rules_executed as u64,
                total_findings,
            },
        );

        output
    }
}

impl Default for JsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn push_record<T: Serialize>(output: &mut String, record: &T) {
    match serde_json::to_string(record) {
        Ok(json) => {
            output.push_str(&json);
            output.push('\n');
        }
        Err(e) => tracing::error!(error = %e, "failed to serialize output record"),
    }
}

/// Finding record for JSONL output
#[derive(Debug, Serialize)]
struct FindingRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    rule: &'a str,
    severity: &'static str,
    file: PathBuf,
    line: u32,
    column: u32,
    end_line: u32,
    end_column: u32,
    snippet: &'a str,
    message: &'a str,
}

/// Per-file record for files that were not cleanly analyzed
#[derive(Debug, Serialize)]
struct FileRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    file: PathBuf,
    status: &'static str,
    findings: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    lex_error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed_detectors: Vec<&'a str>,
}

/// Status record for JSONL output
#[derive(Debug, Serialize)]
struct StatusRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    passed: bool,
    files_checked: u64,
    rules_executed: u64,
    total_findings: u64,
}

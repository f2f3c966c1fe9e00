#![forbid(unsafe_code)]

//! Human-readable output formatter
//!
//! One line per finding in `file:line:column: severity[rule] message` form,
//! then a short summary. Color is applied through `termcolor`, so the same
//! code writes plain text when color is off.

use crate::engine::AnalysisResult;
use crate::types::{FileStatus, Severity};
use std::io;
use termcolor::{Color, ColorSpec, NoColor, WriteColor};

/// Human-readable output formatter
pub struct HumanFormatter;

impl HumanFormatter {
    pub fn new() -> Self {
        HumanFormatter
    }

    /// Write the report to a color-capable writer
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    pub fn write<W: WriteColor>(&self, out: &mut W, result: &AnalysisResult) -> io::Result<()> {
        for finding in result.findings() {
            write!(
                out,
                "{}:{}:{}: ",
                finding.file.display(),
                finding.line,
                finding.column
            )?;
            out.set_color(&severity_color(finding.severity))?;
            write!(out, "{}", finding.severity)?;
            out.reset()?;
            writeln!(out, "[{}] {}", finding.rule_id, finding.message)?;
        }

        for report in &result.reports {
            if report.status == FileStatus::Partial
                && let Some(error) = report.lex_failure()
            {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
                write!(out, "warning")?;
                out.reset()?;
                writeln!(
                    out,
                    ": {}; only the preceding text was checked",
                    error
                )?;
            }
            for failure in &report.failed_detectors {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                write!(out, "detector failed")?;
                out.reset()?;
                writeln!(
                    out,
                    ": {} on {}: {}",
                    failure.rule_id,
                    report.file.display(),
                    failure.message
                )?;
            }
        }

        let summary = result.summary();
        if summary.total > 0 {
            writeln!(out)?;
            for (rule_id, count) in &summary.by_rule {
                writeln!(out, "  {:<26} {}", rule_id.as_str(), count)?;
            }
        }
        writeln!(out)?;

        let noun = if result.files_checked == 1 { "file" } else { "files" };
        if summary.total == 0 {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
            write!(out, "No findings")?;
            out.reset()?;
            writeln!(out, " in {} {}", result.files_checked, noun)?;
        } else {
            out.set_color(ColorSpec::new().set_bold(true))?;
            write!(out, "{} findings", summary.total)?;
            out.reset()?;
            writeln!(
                out,
                " in {} {} ({} errors, {} warnings, {} info)",
                result.files_checked,
                noun,
                summary.count_for(Severity::Error),
                summary.count_for(Severity::Warning),
                summary.count_for(Severity::Info)
            )?;
        }

        Ok(())
    }

    /// Render the report without color
    pub fn format(&self, result: &AnalysisResult) -> String {
        let mut out = NoColor::new(Vec::new());
        if let Err(e) = self.write(&mut out, result) {
            tracing::error!(error = %e, "failed to render report");
        }
        String::from_utf8_lossy(&out.into_inner()).into_owned()
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn severity_color(severity: Severity) -> ColorSpec {
    let color = match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Cyan,
    };
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(true);
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use crate::engine::AnalysisEngine;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn analyze(files: &[(&str, &str)]) -> AnalysisResult {
        let sources: BTreeMap<PathBuf, String> = files
            .iter()
            .map(|(name, source)| (PathBuf::from(name), source.to_string()))
            .collect();
        AnalysisEngine::new(RuleConfig::default())
            .unwrap()
            .analyze_all(&sources)
    }

    #[test]
    fn test_format_no_findings() {
        let output = HumanFormatter::new().format(&analyze(&[("a.c", "int x = 1;\n")]));
        assert_eq!(output, "\nNo findings in 1 file\n");
    }

    #[test]
    fn test_format_finding_line() {
        let output = HumanFormatter::new().format(&analyze(&[("src/a.c", "#define pi 3\n")]));
        let first = output.lines().next().unwrap();
        assert_eq!(
            first,
            "src/a.c:1:9: warning[macro-naming] Macro name 'pi' should be uppercase"
        );
        assert!(output.contains("  macro-naming"));
        assert!(output.contains("1 findings in 1 file (0 errors, 1 warnings, 0 info)"));
    }

    #[test]
    fn test_format_partial_file_warning() {
        let output = HumanFormatter::new().format(&analyze(&[("p.c", "/* open\n")]));
        assert!(output.contains(
            "warning: Lex error in p.c: unterminated block comment starting at line 1, column 1"
        ));
    }

    #[test]
    fn test_colored_output_contains_escapes() {
        let result = analyze(&[("a.c", "#define pi 3\n")]);
        let mut buffer = termcolor::Ansi::new(Vec::new());
        HumanFormatter::new().write(&mut buffer, &result).unwrap();
        let text = String::from_utf8(buffer.into_inner()).unwrap();
        assert!(text.contains("\u{1b}["));
        assert!(text.contains("[macro-naming]"));
    }
}

//! Check command implementation
//!
//! This module implements the `cstyle check` command, which:
//! - Loads configuration from cstyle.toml (or uses the defaults)
//! - Discovers and reads the C files to check
//! - Runs the enabled detectors over every file in parallel
//! - Formats output (human or JSONL)
//! - Returns the exit code for the outcome

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::common::{
    EXIT_ERROR, EXIT_FINDINGS, EXIT_SUCCESS, config_exit_code, discover_files, load_config,
    read_sources, resolve_color, resolve_format,
};
use crate::engine::AnalysisEngine;
use crate::engine::file_walker::FileWalkerError;
use crate::error::ConfigError;
use crate::output::{HumanFormatter, JsonlFormatter};
use std::io::Write;
use std::path::Path;
use termcolor::StandardStream;

/// Error type specific to check command
#[derive(Debug, thiserror::Error)]
pub(crate) enum CheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("File walker error: {0}")]
    FileWalker(#[from] FileWalkerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckError {
    fn exit_code(&self) -> i32 {
        match self {
            CheckError::Config(e) => config_exit_code(e),
            CheckError::FileWalker(_) | CheckError::Io(_) => EXIT_ERROR,
        }
    }
}

/// Outcome of a completed check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CheckOutcome {
    pub findings: usize,
    pub unreadable_files: usize,
}

impl CheckOutcome {
    fn exit_code(&self) -> i32 {
        if self.unreadable_files > 0 {
            EXIT_ERROR
        } else if self.findings > 0 {
            EXIT_FINDINGS
        } else {
            EXIT_SUCCESS
        }
    }
}

/// Run the check command
///
/// # Returns
///
/// Exit code:
/// - 0: No findings
/// - 1: Findings present
/// - 2: Error (I/O error, unreadable file)
/// - 3: Configuration error (invalid TOML or rule settings)
pub fn run_check(
    paths: &[String],
    format: Option<OutputFormat>,
    config_path: Option<&Path>,
    color: Option<ColorChoice>,
) -> i32 {
    match run_check_inner(paths, format, config_path, color) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

/// Internal implementation of check command
pub(crate) fn run_check_inner(
    paths: &[String],
    format: Option<OutputFormat>,
    config_path: Option<&Path>,
    color: Option<ColorChoice>,
) -> Result<CheckOutcome, CheckError> {
    let config = load_config(config_path)?;
    let engine = AnalysisEngine::new(config.rule_config())?;
    let format = resolve_format(format, &config);

    let files = discover_files(paths, &config)?;
    if files.is_empty() {
        tracing::warn!("no C files found to check");
    }
    let (sources, unreadable) = read_sources(files);
    for (file, error) in &unreadable {
        eprintln!("Error: cannot read {}: {}", file.display(), error);
    }

    tracing::debug!(
        files = sources.len(),
        rules = engine.registry().len(),
        "checking"
    );
    let result = engine.analyze_all(&sources);

    match format {
        OutputFormat::Human => {
            let mut stdout = StandardStream::stdout(resolve_color(color, &config));
            HumanFormatter::new().write(&mut stdout, &result)?;
            stdout.flush()?;
        }
        OutputFormat::Jsonl => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(JsonlFormatter::new().format(&result).as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(CheckOutcome {
        findings: result.total_findings(),
        unreadable_files: unreadable.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("cstyle.toml");
        fs::write(&path, format!("[cstyle]\nversion = \"1\"\n{}", body)).unwrap();
        path
    }

    #[test]
    fn test_outcome_exit_codes() {
        let clean = CheckOutcome {
            findings: 0,
            unreadable_files: 0,
        };
        assert_eq!(clean.exit_code(), EXIT_SUCCESS);

        let dirty = CheckOutcome {
            findings: 3,
            unreadable_files: 0,
        };
        assert_eq!(dirty.exit_code(), EXIT_FINDINGS);

        let broken = CheckOutcome {
            findings: 3,
            unreadable_files: 1,
        };
        assert_eq!(broken.exit_code(), EXIT_ERROR);
    }

    #[test]
    fn test_check_counts_findings() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.c"), "#define lower 1\n// TODO: x\n").unwrap();
        let config = write_config(temp.path(), "");
        let root = temp.path().to_string_lossy().into_owned();

        let outcome =
            run_check_inner(&[root], Some(OutputFormat::Jsonl), Some(&config), None).unwrap();
        assert_eq!(outcome.findings, 2);
        assert_eq!(outcome.unreadable_files, 0);
    }

    #[test]
    fn test_check_honors_disabled_rules() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.c"), "#define lower 1\n// TODO: x\n").unwrap();
        let config = write_config(temp.path(), "\n[rules]\ncomment-marker = false\n");
        let root = temp.path().to_string_lossy().into_owned();

        let outcome =
            run_check_inner(&[root], Some(OutputFormat::Jsonl), Some(&config), None).unwrap();
        assert_eq!(outcome.findings, 1);
    }

    #[test]
    fn test_check_invalid_config() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "\n[settings]\nmax-identifier-length = -1\n");
        let root = temp.path().to_string_lossy().into_owned();

        let error =
            run_check_inner(&[root], Some(OutputFormat::Jsonl), Some(&config), None).unwrap_err();
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_check_malformed_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cstyle.toml");
        fs::write(&path, "[cstyle\nversion = ").unwrap();
        let root = temp.path().to_string_lossy().into_owned();

        let error =
            run_check_inner(&[root], Some(OutputFormat::Human), Some(&path), None).unwrap_err();
        assert!(matches!(error, CheckError::Config(ConfigError::Parse(_))));
        assert_eq!(error.exit_code(), 3);
    }
}

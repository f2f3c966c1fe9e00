//! Common helper functions shared across CLI commands
//!
//! This module provides shared functionality for loading configuration,
//! discovering and reading files, and picking the output color mode.

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::config::{ColorOption, Config};
use crate::engine::file_walker::{FileWalker, FileWalkerError};
use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Process exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FINDINGS: i32 = 1;
pub const EXIT_ERROR: i32 = 2;
pub const EXIT_CONFIG_ERROR: i32 = 3;

/// Configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "cstyle.toml";

/// Load the configuration file
///
/// An explicit `path` must exist. Without one, `cstyle.toml` in the current
/// directory is used when present and the defaults otherwise.
///
/// # Errors
///
/// Returns `ConfigError::Io` if the file cannot be read, and the parse or
/// validation error if it is invalid.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return Config::load(path);
    }

    let default_path = Path::new(CONFIG_FILE_NAME);
    if default_path.exists() {
        tracing::debug!(path = %default_path.display(), "loading configuration");
        Config::load(default_path)
    } else {
        tracing::debug!("no {} found, using defaults", CONFIG_FILE_NAME);
        Ok(Config::default())
    }
}

/// Exit code for a configuration failure
///
/// An unreadable file is an I/O problem; everything else means the
/// configuration itself is wrong.
pub(crate) fn config_exit_code(error: &ConfigError) -> i32 {
    match error {
        ConfigError::Io(_) => EXIT_ERROR,
        _ => EXIT_CONFIG_ERROR,
    }
}

/// Discover C files under `paths` using the configured include/exclude globs
///
/// # Errors
///
/// Returns `FileWalkerError` if there is an error walking the file system.
pub(crate) fn discover_files(
    paths: &[String],
    config: &Config,
) -> Result<Vec<PathBuf>, FileWalkerError> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    let roots: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
    let walker = FileWalker::new(&roots, &config.cstyle.include, &config.cstyle.exclude)?;

    let mut files = walker.walk().collect::<Result<Vec<_>, _>>()?;
    files.sort();
    files.dedup();
    Ok(files)
}

/// Read every file into memory
///
/// Unreadable files are logged and returned separately so the caller can
/// still analyze the rest.
pub(crate) fn read_sources(
    files: Vec<PathBuf>,
) -> (BTreeMap<PathBuf, String>, Vec<(PathBuf, std::io::Error)>) {
    let mut sources = BTreeMap::new();
    let mut failures = Vec::new();

    for file in files {
        match fs::read(&file) {
            Ok(bytes) => {
                let text = String::from_utf8(bytes).unwrap_or_else(|e| {
                    tracing::warn!(
                        file = %file.display(),
                        "file is not valid UTF-8; columns after invalid bytes may be shifted"
                    );
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                });
                sources.insert(file, text);
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "failed to read file");
                failures.push((file, e));
            }
        }
    }

    (sources, failures)
}

/// Output format from the command line, falling back to the configuration
pub(crate) fn resolve_format(cli: Option<OutputFormat>, config: &Config) -> OutputFormat {
    cli.unwrap_or(match config.output.format {
        crate::config::OutputFormat::Human => OutputFormat::Human,
        crate::config::OutputFormat::Jsonl => OutputFormat::Jsonl,
    })
}

/// Color mode for stdout from the command line, falling back to the configuration
pub(crate) fn resolve_color(cli: Option<ColorChoice>, config: &Config) -> termcolor::ColorChoice {
    let choice = cli.unwrap_or(match config.output.color {
        ColorOption::Auto => ColorChoice::Auto,
        ColorOption::Always => ColorChoice::Always,
        ColorOption::Never => ColorChoice::Never,
    });
    match choice {
        ColorChoice::Always => termcolor::ColorChoice::Always,
        ColorChoice::Never => termcolor::ColorChoice::Never,
        ColorChoice::Auto if std::io::stdout().is_terminal() => termcolor::ColorChoice::Auto,
        ColorChoice::Auto => termcolor::ColorChoice::Never,
    }
}

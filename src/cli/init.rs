//! Initialize a cstyle project
//!
//! Writes a commented default `cstyle.toml`.

use crate::cli::common::CONFIG_FILE_NAME;
use std::fs;
use std::path::Path;

/// Default content for cstyle.toml
const DEFAULT_CSTYLE_TOML: &str = r#"[cstyle]
version = "1"

# File patterns to include (defaults to C sources and headers)
include = ["**/*.c", "**/*.h"]

# File patterns to exclude
# exclude = ["**/vendor/**", "**/generated/**"]

[rules]
# Every rule is enabled by default.
# Disable a rule: rule-name = false
# Change its severity: rule-name = { severity = "error" }
#
# macro-naming = true
# goto-usage = true
# indentation-consistency = true
# identifier-length = true
# reserved-identifier = true
# comment-marker = { severity = "info" }
# uninitialized-variable = true

[settings]
# Longest function name accepted by identifier-length
max-identifier-length = 20

# Words reported by comment-marker
comment-markers = ["TODO", "FIXME", "XXX", "HACK", "NOTE", "BUG"]

# Replaces the built-in list of standard type names reserved-identifier protects
# reserved-type-names = ["size_t", "ptrdiff_t", "uint8_t"]

[output]
format = "human"
color = "auto"
"#;

/// Error type for init command
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Path error
    #[error("Path error: {0}")]
    Path(String),
}

/// What happened to the configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitResult {
    Created,
    /// The file existed and `force` was not given
    Skipped,
    Overwritten,
}

/// Run the init command in the current directory
///
/// # Errors
///
/// Returns `InitError` if the file cannot be written.
pub fn run_init(force: bool) -> Result<InitResult, InitError> {
    run_init_in(Path::new("."), force)
}

/// Write `cstyle.toml` into `dir`
///
/// # Errors
///
/// Returns `InitError` if `dir` is not a directory or the file cannot be
/// written.
pub fn run_init_in(dir: &Path, force: bool) -> Result<InitResult, InitError> {
    if !dir.is_dir() {
        return Err(InitError::Path(format!(
            "'{}' is not a directory",
            dir.display()
        )));
    }

    let path = dir.join(CONFIG_FILE_NAME);
    if path.is_dir() {
        return Err(InitError::Path(format!(
            "'{}' exists but is a directory",
            path.display()
        )));
    }

    let result = match (path.exists(), force) {
        (true, false) => return Ok(InitResult::Skipped),
        (true, true) => InitResult::Overwritten,
        (false, _) => InitResult::Created,
    };
    fs::write(&path, DEFAULT_CSTYLE_TOML)?;
    tracing::debug!(path = %path.display(), ?result, "wrote configuration");
    Ok(result)
}

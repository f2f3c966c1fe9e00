//! Integration tests for the check command
//!
//! NOTE: These tests change the current directory and use the serial_test attribute
//! to ensure they run sequentially and don't interfere with each other.

use cstyle::cli::OutputFormat;
use cstyle::cli::check::run_check;
use cstyle::cli::common::{EXIT_CONFIG_ERROR, EXIT_ERROR, EXIT_FINDINGS, EXIT_SUCCESS};
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test project structure
fn setup_test_project(temp_dir: &Path, rules: &str) {
    let config = format!(
        r#"
[cstyle]
version = "1"
include = ["**/*.c", "**/*.h"]

[rules]
{}
"#,
        rules
    );
    fs::write(temp_dir.join("cstyle.toml"), config).unwrap();

    fs::create_dir_all(temp_dir.join("src")).unwrap();
    fs::write(
        temp_dir.join("src").join("clean.c"),
        "int add(int a, int b) {\n    return a + b;\n}\n",
    )
    .unwrap();
    fs::write(
        temp_dir.join("src").join("marked.c"),
        "// TODO: handle overflow\nint twice(int a) {\n    return a * 2;\n}\n",
    )
    .unwrap();
}

/// Run `check .` inside `dir`, restoring the working directory afterwards
fn check_in(dir: &Path, format: OutputFormat) -> i32 {
    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir).unwrap();

    let exit_code = run_check(&[".".to_string()], Some(format), None, None);

    std::env::set_current_dir(original_dir).unwrap();
    exit_code
}

#[test]
#[serial]
fn test_check_command_reports_findings() {
    let temp_dir = TempDir::new().unwrap();
    setup_test_project(temp_dir.path(), "");

    // The TODO comment is a finding
    assert_eq!(check_in(temp_dir.path(), OutputFormat::Human), EXIT_FINDINGS);
}

#[test]
#[serial]
fn test_check_command_clean_when_rule_disabled() {
    let temp_dir = TempDir::new().unwrap();
    setup_test_project(temp_dir.path(), "comment-marker = false");

    assert_eq!(check_in(temp_dir.path(), OutputFormat::Human), EXIT_SUCCESS);
}

#[test]
#[serial]
fn test_check_command_jsonl_format() {
    let temp_dir = TempDir::new().unwrap();
    setup_test_project(temp_dir.path(), "");

    assert_eq!(check_in(temp_dir.path(), OutputFormat::Jsonl), EXIT_FINDINGS);
}

#[test]
#[serial]
fn test_check_command_without_config_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("lower.h"), "#define limit 10\n").unwrap();

    assert_eq!(check_in(temp_dir.path(), OutputFormat::Human), EXIT_FINDINGS);
}

#[test]
#[serial]
fn test_check_command_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "TODO: nothing to lint\n").unwrap();

    assert_eq!(check_in(temp_dir.path(), OutputFormat::Human), EXIT_SUCCESS);
}

#[test]
#[serial]
fn test_check_command_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    setup_test_project(temp_dir.path(), "no-such-rule = true");

    assert_eq!(
        check_in(temp_dir.path(), OutputFormat::Human),
        EXIT_CONFIG_ERROR
    );
}

#[test]
#[serial]
fn test_check_command_malformed_config() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("cstyle.toml"), "[cstyle\nversion = 1").unwrap();

    assert_eq!(
        check_in(temp_dir.path(), OutputFormat::Human),
        EXIT_CONFIG_ERROR
    );
}

#[test]
fn test_check_command_missing_explicit_config() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.toml");
    let root = temp_dir.path().to_string_lossy().into_owned();

    let exit_code = run_check(&[root], Some(OutputFormat::Human), Some(&missing), None);
    assert_eq!(exit_code, EXIT_ERROR);
}

#[test]
fn test_check_command_explicit_file_path() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("single.c");
    fs::write(&file, "int main(void) {\n    goto out;\nout:\n    return 0;\n}\n").unwrap();
    let config = temp_dir.path().join("cstyle.toml");
    fs::write(&config, "[cstyle]\nversion = \"1\"\n\n[rules]\ngoto-usage = false\n").unwrap();

    let exit_code = run_check(
        &[file.to_string_lossy().into_owned()],
        Some(OutputFormat::Jsonl),
        Some(&config),
        None,
    );
    assert_eq!(exit_code, EXIT_SUCCESS);
}

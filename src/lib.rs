#![forbid(unsafe_code)]

//! cstyle: token-level style and safety linting for C sources
//!
//! The core lexes each file once, derives a line and block index from the
//! tokens, and runs independent detectors over that shared read-only view.
//! File discovery, configuration files, rendering and exit codes live in the
//! outer `cli`, `config::cstyle_toml`, `engine::file_walker` and `output`
//! layers.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod rules;
pub mod syntax;
pub mod types;

// Re-export error types for convenient access
pub use error::{ConfigError, CstyleError, LexError, LexErrorKind, RuleError};

// Re-export core domain types for convenient access
pub use config::RuleConfig;
pub use engine::{AnalysisEngine, AnalysisResult, FileReport, FindingAggregator};
pub use rules::{Finding, Rule};
pub use types::{FileStatus, GlobPattern, RuleId, Severity};

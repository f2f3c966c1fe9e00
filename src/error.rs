//! Error types for cstyle
//!
//! This module defines the error types used throughout cstyle, following
//! a hierarchical structure with specific error variants for different
//! error categories.

use std::fmt;
use std::path::PathBuf;

/// What kind of construct was left open at end of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString,
    UnterminatedChar,
    UnterminatedComment,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LexErrorKind::UnterminatedString => "unterminated string literal",
            LexErrorKind::UnterminatedChar => "unterminated character literal",
            LexErrorKind::UnterminatedComment => "unterminated block comment",
        };
        f.write_str(text)
    }
}

/// Lexing failure. Recoverable: tokens before `offset` are still valid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} starting at line {line}, column {column}")]
pub struct LexError {
    pub kind: LexErrorKind,
    /// Line where the unterminated construct starts (1-indexed)
    pub line: u32,
    /// Column where the unterminated construct starts (1-indexed)
    pub column: u32,
    /// Byte offset where the unterminated construct starts
    pub offset: usize,
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Malformed TOML or a value of the wrong shape
    #[error("Invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// Semantically invalid configuration
    #[error("Configuration validation failed: {0}")]
    Validation(String),

    /// A rule id that no detector answers to
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    /// Invalid configuration value
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rule-related errors
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Invalid rule definition
    #[error("Invalid rule definition: {0}")]
    InvalidDefinition(String),

    /// Rule not found
    #[error("Rule not found: {0}")]
    NotFound(String),

    /// A matcher built from configuration failed to compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Top-level error type for cstyle
#[derive(Debug, thiserror::Error)]
pub enum CstyleError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rule error
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    /// Lexing error in source file
    #[error("Lex error in {file}: {source}")]
    Lex { file: PathBuf, source: LexError },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

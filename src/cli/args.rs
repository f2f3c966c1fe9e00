//! CLI argument parsing using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for cstyle commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Automatically detect if terminal supports color
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

/// cstyle CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "cstyle")]
#[command(about = "Token-level style and safety linter for C sources")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Output coloring (overrides the configuration file)
    #[arg(long, global = true)]
    pub color: Option<ColorChoice>,

    /// Log analysis progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available cstyle subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check C sources and report findings
    Check {
        /// Files or directories to check (defaults to current directory)
        #[arg(default_value = ".")]
        paths: Vec<String>,

        /// Output format (overrides the configuration file)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Configuration file (defaults to ./cstyle.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the built-in rules and whether they are enabled
    List {
        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,

        /// Configuration file (defaults to ./cstyle.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a default cstyle.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_default_args() {
        let cli = Cli::parse_from(["cstyle", "check"]);
        match cli.command {
            Command::Check {
                paths,
                format,
                config,
            } => {
                assert_eq!(paths, vec!["."]);
                assert_eq!(format, None);
                assert_eq!(config, None);
            }
            _ => panic!("Expected Check command"),
        }
        assert_eq!(cli.color, None);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_check_with_paths() {
        let cli = Cli::parse_from(["cstyle", "check", "src/", "include/util.h"]);
        match cli.command {
            Command::Check { paths, .. } => {
                assert_eq!(paths, vec!["src/", "include/util.h"]);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_check_with_format_and_config() {
        let cli = Cli::parse_from([
            "cstyle",
            "check",
            "-f",
            "jsonl",
            "--config",
            "ci/cstyle.toml",
        ]);
        match cli.command {
            Command::Check { format, config, .. } => {
                assert_eq!(format, Some(OutputFormat::Jsonl));
                assert_eq!(config, Some(PathBuf::from("ci/cstyle.toml")));
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["cstyle", "check", "--verbose", "--color", "never"]);
        assert!(cli.verbose);
        assert_eq!(cli.color, Some(ColorChoice::Never));
    }

    #[test]
    fn test_invalid_format() {
        let result = Cli::try_parse_from(["cstyle", "check", "--format", "xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_default() {
        let cli = Cli::parse_from(["cstyle", "list"]);
        match cli.command {
            Command::List { format, config } => {
                assert_eq!(format, OutputFormat::Human);
                assert_eq!(config, None);
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_init_with_force() {
        let cli = Cli::parse_from(["cstyle", "init", "--force"]);
        match cli.command {
            Command::Init { force } => assert!(force),
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Cli::try_parse_from(["cstyle"]).is_err());
    }
}

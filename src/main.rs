//! cstyle CLI entry point

use clap::Parser;
use cstyle::cli::common::{EXIT_ERROR, EXIT_SUCCESS};
use cstyle::cli::init::InitResult;
use cstyle::cli::{Cli, Command};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let exit_code = match cli.command {
        Command::Check {
            paths,
            format,
            config,
        } => cstyle::cli::check::run_check(&paths, format, config.as_deref(), cli.color),
        Command::List { format, config } => cstyle::cli::list::run_list(format, config.as_deref()),
        Command::Init { force } => match cstyle::cli::init::run_init(force) {
            Ok(InitResult::Created) => {
                println!("Created cstyle.toml.");
                EXIT_SUCCESS
            }
            Ok(InitResult::Overwritten) => {
                println!("Overwrote cstyle.toml with the defaults.");
                EXIT_SUCCESS
            }
            Ok(InitResult::Skipped) => {
                println!("cstyle.toml already exists; use --force to overwrite it.");
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_ERROR
            }
        },
    };

    process::exit(exit_code);
}

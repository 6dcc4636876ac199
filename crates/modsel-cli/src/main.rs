//! Module selector CLI
//!
//! Resolves the ordered list of modules to activate from a module manifest.

mod cli;
mod commands;
mod error;
mod filters;
mod logging;
mod manifest;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("failed to initialize logging: {e}")))?;

    match cli.command {
        Commands::Resolve {
            selection,
            exclude,
            exclude_names,
            json,
        } => commands::run_resolve(&selection, &exclude, &exclude_names, json),
        Commands::Check { selection } => commands::run_check(&selection),
    }
}

//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Module selector - Resolve which modules to activate, and in what order
#[derive(Parser, Debug)]
#[command(name = "modsel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Inputs shared by every command that runs a resolution
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SelectionArgs {
    /// Module manifest listing candidates and declarations
    #[arg(env = "MODSEL_MANIFEST")]
    pub manifest: PathBuf,

    /// Precomputed metadata index
    #[arg(long, env = "MODSEL_INDEX")]
    pub index: Option<PathBuf>,

    /// Active feature (repeatable)
    #[arg(short, long = "feature")]
    pub features: Vec<String>,

    /// Selector property as KEY=VALUE, e.g. modsel.exclude=web (repeatable)
    #[arg(short = 'D', long = "property", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the modules to activate, in activation order
    ///
    /// Examples:
    ///   modsel resolve modsel.toml
    ///   modsel resolve modsel.toml -x legacy --feature http
    ///   modsel resolve modsel.toml --index index.toml --json
    Resolve {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Module id to exclude (repeatable)
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,

        /// Module name to exclude (repeatable)
        #[arg(long = "exclude-name")]
        exclude_names: Vec<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Run a resolution and report whether it succeeds
    Check {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

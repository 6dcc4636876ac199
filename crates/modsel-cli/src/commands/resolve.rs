//! Resolve command

use std::collections::BTreeSet;
use std::io::Write;

use modsel_core::ExclusionRequest;
use serde::Serialize;

use super::Inputs;
use crate::cli::SelectionArgs;
use crate::error::Result;

#[derive(Serialize)]
struct Report<'a> {
    modules: &'a [String],
    exclusions: &'a BTreeSet<String>,
    filtered: &'a [String],
}

/// Run the resolve command
pub fn run_resolve(
    args: &SelectionArgs,
    exclude: &[String],
    exclude_names: &[String],
    json: bool,
) -> Result<()> {
    let inputs = Inputs::load(args)?;
    let request = ExclusionRequest::none()
        .modules(exclude.iter().cloned())
        .names(exclude_names.iter().cloned());
    let selection = inputs.selector().select(&request)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        let report = Report {
            modules: &selection.modules,
            exclusions: &selection.exclusions,
            filtered: &selection.filtered,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        for module in &selection.modules {
            writeln!(out, "{module}")?;
        }
    }
    Ok(())
}

//! Check command

use colored::Colorize;
use modsel_core::ExclusionRequest;

use super::Inputs;
use crate::cli::SelectionArgs;
use crate::error::Result;

/// Run the check command
pub fn run_check(args: &SelectionArgs) -> Result<()> {
    let inputs = Inputs::load(args)?;
    let selector = inputs.selector();

    if !selector.settings().enabled {
        println!(
            "{} Module selection is disabled; nothing would be activated.",
            "DISABLED".yellow().bold()
        );
        return Ok(());
    }

    let selection = selector.select(&ExclusionRequest::none())?;
    println!(
        "{} {} modules selected, {} excluded, {} filtered",
        "OK".green().bold(),
        selection.modules.len(),
        selection.exclusions.len(),
        selection.filtered.len()
    );
    if !selection.filtered.is_empty() {
        println!("{} {}", "Filtered:".dimmed(), selection.filtered.join(", "));
    }
    Ok(())
}

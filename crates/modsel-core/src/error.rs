//! Error types for modsel-core

pub type Result<T> = std::result::Result<T, Error>;

/// Error raised by a filter, listener or discovery collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a resolution.
///
/// Every variant is fatal; no partial selection is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No candidate modules found. Check that the module registry is populated.")]
    EmptyCandidatePool,

    #[error(
        "The following modules could not be excluded because they are not candidate modules:\n{}",
        format_list(.exclusions)
    )]
    InvalidExclusion { exclusions: Vec<String> },

    #[error("Module ordering cycle detected between '{first}' and '{second}'")]
    CycleDetected { first: String, second: String },

    #[error("Unable to read metadata for module '{module}': {source}")]
    MetadataRead {
        module: String,
        source: modsel_meta::Error,
    },

    #[error("Filter '{filter}' failed: {source}")]
    Filter { filter: String, source: BoxError },

    #[error("Filter '{filter}' returned {actual} verdicts for {expected} candidates")]
    FilterVerdictCount {
        filter: String,
        expected: usize,
        actual: usize,
    },

    #[error("Listener '{listener}' failed: {source}")]
    Listener { listener: String, source: BoxError },

    #[error("Candidate discovery failed: {0}")]
    CandidateSource(BoxError),

    #[error("Invalid selector settings from {origin}: {reason}")]
    Settings { origin: String, reason: String },
}

impl Error {
    /// Wrap a metadata failure for the given module.
    pub fn metadata(module: impl Into<String>, source: modsel_meta::Error) -> Self {
        Self::MetadataRead {
            module: module.into(),
            source,
        }
    }
}

fn format_list(items: &[String]) -> String {
    items.iter().map(|item| format!("\t- {item}\n")).collect()
}

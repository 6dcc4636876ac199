//! Error types for modsel-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read metadata index at {path}: {source}")]
    IndexRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid metadata index at {path}: {source}")]
    IndexParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Attribute '{attribute}' of module '{module}' must be {expected}")]
    InvalidAttribute {
        module: String,
        attribute: String,
        expected: &'static str,
    },

    #[error("Unable to inspect module '{module}': {reason}")]
    Inspection { module: String, reason: String },
}

impl Error {
    /// Create an inspection error for the given module.
    pub fn inspection(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Inspection {
            module: module.into(),
            reason: reason.into(),
        }
    }
}

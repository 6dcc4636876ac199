//! Module metadata for modsel.
//!
//! This crate provides the per-module ordering metadata, the precomputed
//! metadata index, and the caching source used for a single resolution pass.

pub mod error;
pub mod index;
pub mod metadata;
pub mod source;

pub use error::{Error, Result};
pub use index::MetadataIndex;
pub use metadata::{LOWEST_PRECEDENCE, ModuleMetadata};
pub use source::{MetadataSource, ModuleInspector, ResolutionMetadata};

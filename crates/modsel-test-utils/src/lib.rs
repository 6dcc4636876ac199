//! Shared test utilities for the modsel workspace.
//!
//! In-memory stand-ins for the collaborators the selector consumes. It is a
//! dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fakes`] — inspector, locator, filters and listeners with fixed behavior

pub mod fakes;

pub use fakes::{
    FailingFilter, FailingListener, KnownModules, RecordedEvent, RecordingListener,
    RejectingFilter, StaticInspector,
};

use modsel_meta::ModuleMetadata;

/// Start building metadata for a module.
pub fn metadata() -> ModuleMetadata {
    ModuleMetadata::new()
}

/// Owned ids from string literals.
pub fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

//! Notification of the final selection.

use std::collections::BTreeSet;

use crate::error::BoxError;

/// The outcome delivered to every listener after filtering.
#[derive(Debug, Clone, Copy)]
pub struct ImportEvent<'a> {
    /// Modules to activate, in activation order.
    pub modules: &'a [String],
    /// Every exclusion that was requested.
    pub exclusions: &'a BTreeSet<String>,
}

/// Receives the final selection once per resolution.
///
/// A listener error aborts the resolution.
pub trait ImportListener {
    /// Name used in error messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once, after filtering.
    fn on_import(&self, event: &ImportEvent<'_>) -> Result<(), BoxError>;
}

impl<F> ImportListener for F
where
    F: Fn(&ImportEvent<'_>) -> Result<(), BoxError>,
{
    fn on_import(&self, event: &ImportEvent<'_>) -> Result<(), BoxError> {
        self(event)
    }
}

/// Logs every selection at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl ImportListener for LoggingListener {
    fn name(&self) -> &str {
        "logging"
    }

    fn on_import(&self, event: &ImportEvent<'_>) -> Result<(), BoxError> {
        tracing::info!(
            activated = event.modules.len(),
            excluded = event.exclusions.len(),
            modules = ?event.modules,
            exclusions = ?event.exclusions,
            "Resolved module selection"
        );
        Ok(())
    }
}

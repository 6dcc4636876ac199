//! Selection pipeline orchestration
//!
//! A resolution moves through a fixed sequence of stages:
//!
//! ```text
//! Loaded -> Deduplicated -> ExclusionsApplied -> Ordered -> Filtered -> Notified -> Done
//! ```
//!
//! Any failure stops the pipeline and is returned as-is; there is no partial
//! selection. Every call builds its own working sets and metadata cache, so a
//! selector may be reused for any number of resolutions.

use std::collections::BTreeSet;
use std::fmt;

use modsel_meta::{MetadataIndex, ModuleInspector, ModuleMetadata, ResolutionMetadata};

use crate::config::SelectorSettings;
use crate::dedupe::dedupe;
use crate::error::{BoxError, Error, Result};
use crate::exclusion::{ModuleLocator, apply_exclusions, resolve_exclusions};
use crate::filter::{FilterChain, ImportFilter};
use crate::listener::{ImportEvent, ImportListener};
use crate::order::PriorityOrderer;

/// Discovery of the raw candidate list.
pub trait CandidateSource {
    /// Every candidate module id, possibly with repeats.
    fn list_candidates(&self) -> std::result::Result<Vec<String>, BoxError>;
}

impl CandidateSource for Vec<String> {
    fn list_candidates(&self) -> std::result::Result<Vec<String>, BoxError> {
        Ok(self.clone())
    }
}

/// Exclusions named by the caller of a single resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRequest {
    /// Module ids to exclude.
    pub modules: Vec<String>,
    /// Module names to exclude.
    pub names: Vec<String>,
}

impl ExclusionRequest {
    /// A request excluding nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Exclude the given module ids.
    pub fn modules<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Exclude the given module names.
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Pipeline stage reached by a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    Deduplicated,
    ExclusionsApplied,
    Ordered,
    Filtered,
    Notified,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loaded => "loaded",
            Stage::Deduplicated => "deduplicated",
            Stage::ExclusionsApplied => "exclusions-applied",
            Stage::Ordered => "ordered",
            Stage::Filtered => "filtered",
            Stage::Notified => "notified",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a successful resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Modules to activate, in activation order.
    pub modules: Vec<String>,
    /// Every exclusion that was requested, valid or tolerated.
    pub exclusions: BTreeSet<String>,
    /// Candidates removed by filters, in order.
    pub filtered: Vec<String>,
}

/// Inspector used when none is configured: every module declares nothing.
struct NoInspection;

impl ModuleInspector for NoInspection {
    fn inspect(&self, _id: &str) -> modsel_meta::Result<ModuleMetadata> {
        Ok(ModuleMetadata::default())
    }
}

/// Locator used when none is configured: no module is known to exist.
struct NothingLoadable;

impl ModuleLocator for NothingLoadable {
    fn is_loadable(&self, _id: &str) -> bool {
        false
    }
}

/// Derives the ordered set of modules to activate.
///
/// # Example
///
/// ```
/// use modsel_core::{ExclusionRequest, ModuleSelector};
///
/// let candidates = vec!["Z".to_string(), "A".to_string(), "M".to_string()];
/// let selector = ModuleSelector::builder(&candidates).build();
/// let selection = selector.select(&ExclusionRequest::none()).unwrap();
/// assert_eq!(selection.modules, vec!["A", "M", "Z"]);
/// ```
pub struct ModuleSelector<'a> {
    candidates: &'a dyn CandidateSource,
    index: Option<&'a MetadataIndex>,
    empty_index: MetadataIndex,
    inspector: &'a dyn ModuleInspector,
    locator: &'a dyn ModuleLocator,
    filters: FilterChain,
    listeners: Vec<Box<dyn ImportListener>>,
    settings: SelectorSettings,
}

impl<'a> ModuleSelector<'a> {
    /// Start building a selector over the given discovery source.
    pub fn builder(candidates: &'a dyn CandidateSource) -> ModuleSelectorBuilder<'a> {
        ModuleSelectorBuilder::new(candidates)
    }

    /// Settings in effect.
    pub fn settings(&self) -> &SelectorSettings {
        &self.settings
    }

    fn index(&self) -> &MetadataIndex {
        self.index.unwrap_or(&self.empty_index)
    }

    /// Run one resolution.
    ///
    /// # Errors
    ///
    /// - `Error::EmptyCandidatePool` when discovery finds nothing
    /// - `Error::InvalidExclusion` when an exclusion names a loadable module
    ///   that is not a candidate
    /// - `Error::CycleDetected` when precedence constraints conflict
    /// - `Error::MetadataRead` when a candidate's metadata cannot be read
    /// - `Error::Filter` / `Error::Listener` when a collaborator fails
    pub fn select(&self, request: &ExclusionRequest) -> Result<Selection> {
        if !self.settings.enabled {
            tracing::debug!("Module selection disabled");
            return Ok(Selection::default());
        }

        let raw = self
            .candidates
            .list_candidates()
            .map_err(Error::CandidateSource)?;
        if raw.is_empty() {
            return Err(Error::EmptyCandidatePool);
        }
        log_stage(Stage::Loaded, raw.len());

        let candidates = dedupe(raw);
        log_stage(Stage::Deduplicated, candidates.len());

        let external = self.settings.external_exclusion_names();
        let exclusions = resolve_exclusions(&request.modules, &request.names, &external);
        let remaining = apply_exclusions(candidates, &exclusions, self.locator)?;
        log_stage(Stage::ExclusionsApplied, remaining.len());

        let metadata = ResolutionMetadata::new(self.index(), self.inspector);
        let ordered = PriorityOrderer::new(&metadata).order(&remaining)?;
        tracing::debug!(inspected = metadata.inspected(), "Module metadata read");
        log_stage(Stage::Ordered, ordered.len());

        let outcome = self.filters.apply(ordered, self.index())?;
        log_stage(Stage::Filtered, outcome.kept.len());

        let event = ImportEvent {
            modules: &outcome.kept,
            exclusions: &exclusions,
        };
        for listener in &self.listeners {
            listener
                .on_import(&event)
                .map_err(|source| Error::Listener {
                    listener: listener.name().to_string(),
                    source,
                })?;
        }
        log_stage(Stage::Notified, outcome.kept.len());

        let selection = Selection {
            modules: outcome.kept,
            exclusions,
            filtered: outcome.removed,
        };
        log_stage(Stage::Done, selection.modules.len());
        Ok(selection)
    }
}

fn log_stage(stage: Stage, modules: usize) {
    tracing::debug!(stage = %stage, modules, "Selection stage complete");
}

/// Builder for [`ModuleSelector`].
pub struct ModuleSelectorBuilder<'a> {
    candidates: &'a dyn CandidateSource,
    index: Option<&'a MetadataIndex>,
    inspector: &'a dyn ModuleInspector,
    locator: &'a dyn ModuleLocator,
    filters: FilterChain,
    listeners: Vec<Box<dyn ImportListener>>,
    settings: SelectorSettings,
}

impl<'a> ModuleSelectorBuilder<'a> {
    fn new(candidates: &'a dyn CandidateSource) -> Self {
        Self {
            candidates,
            index: None,
            inspector: &NoInspection,
            locator: &NothingLoadable,
            filters: FilterChain::new(),
            listeners: Vec::new(),
            settings: SelectorSettings::default(),
        }
    }

    /// Use a precomputed metadata index.
    pub fn index(mut self, index: &'a MetadataIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Inspect modules missing from the index with `inspector`.
    pub fn inspector(mut self, inspector: &'a dyn ModuleInspector) -> Self {
        self.inspector = inspector;
        self
    }

    /// Decide which exclusions name real modules with `locator`.
    pub fn locator(mut self, locator: &'a dyn ModuleLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Append a filter; filters run in registration order.
    pub fn filter(mut self, filter: impl ImportFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Append a listener; listeners are notified in registration order.
    pub fn listener(mut self, listener: impl ImportListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Use the given settings.
    pub fn settings(mut self, settings: SelectorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Finish building.
    pub fn build(self) -> ModuleSelector<'a> {
        ModuleSelector {
            candidates: self.candidates,
            index: self.index,
            empty_index: MetadataIndex::new(),
            inspector: self.inspector,
            locator: self.locator,
            filters: self.filters,
            listeners: self.listeners,
            settings: self.settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Verdicts;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    struct FailingSource;

    impl CandidateSource for FailingSource {
        fn list_candidates(&self) -> std::result::Result<Vec<String>, BoxError> {
            Err("registry unavailable".into())
        }
    }

    #[test]
    fn test_default_pipeline_sorts_lexically() {
        let candidates = ids(&["Z", "A", "M", "A"]);
        let selection = ModuleSelector::builder(&candidates)
            .build()
            .select(&ExclusionRequest::none())
            .unwrap();
        assert_eq!(selection.modules, ids(&["A", "M", "Z"]));
        assert!(selection.exclusions.is_empty());
        assert!(selection.filtered.is_empty());
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let candidates: Vec<String> = Vec::new();
        let err = ModuleSelector::builder(&candidates)
            .build()
            .select(&ExclusionRequest::none())
            .unwrap_err();
        assert!(matches!(err, Error::EmptyCandidatePool));
    }

    #[test]
    fn test_discovery_failure_is_propagated() {
        let err = ModuleSelector::builder(&FailingSource)
            .build()
            .select(&ExclusionRequest::none())
            .unwrap_err();
        assert!(matches!(err, Error::CandidateSource(_)));
    }

    #[test]
    fn test_disabled_selects_nothing() {
        let settings = SelectorSettings {
            enabled: false,
            exclude: Vec::new(),
        };
        let candidates: Vec<String> = Vec::new();
        let selection = ModuleSelector::builder(&candidates)
            .settings(settings)
            .build()
            .select(&ExclusionRequest::none())
            .unwrap();
        assert_eq!(selection, Selection::default());
    }

    #[test]
    fn test_all_exclusion_sources_are_merged() {
        let candidates = ids(&["a", "b", "c", "d"]);
        let settings = SelectorSettings {
            enabled: true,
            exclude: vec!["c".to_string()],
        };
        let selection = ModuleSelector::builder(&candidates)
            .settings(settings)
            .build()
            .select(&ExclusionRequest::none().modules(["a"]).names(["b"]))
            .unwrap();
        assert_eq!(selection.modules, ids(&["d"]));
        assert_eq!(
            selection.exclusions.into_iter().collect::<Vec<_>>(),
            ids(&["a", "b", "c"])
        );
    }

    #[test]
    fn test_invalid_exclusion_halts_pipeline() {
        let candidates = ids(&["X", "Y"]);
        let known: HashSet<String> = ids(&["X", "Y", "Q"]).into_iter().collect();
        let err = ModuleSelector::builder(&candidates)
            .locator(&known)
            .build()
            .select(&ExclusionRequest::none().modules(["Q"]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidExclusion { ref exclusions } if exclusions == &ids(&["Q"])));
    }

    #[test]
    fn test_filters_report_removed_modules() {
        let candidates = ids(&["X", "Y", "Z"]);
        let selection = ModuleSelector::builder(&candidates)
            .filter(|c: &[String], _: &MetadataIndex| -> Verdicts {
                Ok(c.iter().map(|id| id != "Y").collect())
            })
            .build()
            .select(&ExclusionRequest::none())
            .unwrap();
        assert_eq!(selection.modules, ids(&["X", "Z"]));
        assert_eq!(selection.filtered, ids(&["Y"]));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::ExclusionsApplied.to_string(), "exclusions-applied");
        assert_eq!(Stage::Done.to_string(), "done");
    }
}

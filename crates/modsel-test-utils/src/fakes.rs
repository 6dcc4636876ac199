//! Collaborator fakes with fixed, inspectable behavior.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use modsel_core::{BoxError, ImportEvent, ImportFilter, ImportListener, ModuleLocator, Verdicts};
use modsel_meta::{MetadataIndex, ModuleInspector, ModuleMetadata};

/// Inspector answering from a fixed table and counting its calls.
///
/// Modules without an entry declare nothing; modules marked unreadable fail.
#[derive(Debug, Default)]
pub struct StaticInspector {
    modules: HashMap<String, ModuleMetadata>,
    unreadable: HashSet<String>,
    calls: Cell<usize>,
}

impl StaticInspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare what inspecting `id` returns.
    pub fn module(mut self, id: &str, metadata: ModuleMetadata) -> Self {
        self.modules.insert(id.to_string(), metadata);
        self
    }

    /// Make inspecting `id` fail.
    pub fn unreadable(mut self, id: &str) -> Self {
        self.unreadable.insert(id.to_string());
        self
    }

    /// Number of inspections performed so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ModuleInspector for StaticInspector {
    fn inspect(&self, id: &str) -> modsel_meta::Result<ModuleMetadata> {
        self.calls.set(self.calls.get() + 1);
        if self.unreadable.contains(id) {
            return Err(modsel_meta::Error::inspection(id, "module is unreadable"));
        }
        Ok(self.modules.get(id).cloned().unwrap_or_default())
    }
}

/// Locator knowing a fixed set of loadable modules.
#[derive(Debug, Clone, Default)]
pub struct KnownModules(HashSet<String>);

impl KnownModules {
    pub fn new(ids: &[&str]) -> Self {
        Self(ids.iter().map(|s| s.to_string()).collect())
    }
}

impl ModuleLocator for KnownModules {
    fn is_loadable(&self, id: &str) -> bool {
        self.0.contains(id)
    }
}

/// Filter rejecting a fixed set of modules and recording each batch it saw.
#[derive(Debug, Clone, Default)]
pub struct RejectingFilter {
    rejected: HashSet<String>,
    batches: Rc<RefCell<Vec<Vec<String>>>>,
}

impl RejectingFilter {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            rejected: ids.iter().map(|s| s.to_string()).collect(),
            batches: Rc::default(),
        }
    }

    /// Shared handle to the batches passed to `matches`.
    pub fn batches(&self) -> Rc<RefCell<Vec<Vec<String>>>> {
        Rc::clone(&self.batches)
    }
}

impl ImportFilter for RejectingFilter {
    fn name(&self) -> &str {
        "rejecting"
    }

    fn matches(&self, candidates: &[String], _index: &MetadataIndex) -> Verdicts {
        self.batches.borrow_mut().push(candidates.to_vec());
        Ok(candidates
            .iter()
            .map(|id| !self.rejected.contains(id))
            .collect())
    }
}

/// Filter that always fails with the given message.
#[derive(Debug, Clone)]
pub struct FailingFilter(pub &'static str);

impl ImportFilter for FailingFilter {
    fn name(&self) -> &str {
        "failing"
    }

    fn matches(&self, _candidates: &[String], _index: &MetadataIndex) -> Verdicts {
        Err(self.0.into())
    }
}

/// A notification captured by [`RecordingListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub modules: Vec<String>,
    pub exclusions: BTreeSet<String>,
}

/// Listener capturing every event it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Rc<RefCell<Vec<RecordedEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the captured events.
    pub fn events(&self) -> Rc<RefCell<Vec<RecordedEvent>>> {
        Rc::clone(&self.events)
    }
}

impl ImportListener for RecordingListener {
    fn name(&self) -> &str {
        "recording"
    }

    fn on_import(&self, event: &ImportEvent<'_>) -> Result<(), BoxError> {
        self.events.borrow_mut().push(RecordedEvent {
            modules: event.modules.to_vec(),
            exclusions: event.exclusions.clone(),
        });
        Ok(())
    }
}

/// Listener that always fails with the given message.
#[derive(Debug, Clone)]
pub struct FailingListener(pub &'static str);

impl ImportListener for FailingListener {
    fn name(&self) -> &str {
        "failing"
    }

    fn on_import(&self, _event: &ImportEvent<'_>) -> Result<(), BoxError> {
        Err(self.0.into())
    }
}

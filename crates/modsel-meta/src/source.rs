//! Metadata lookup for a resolution pass
//!
//! A [`MetadataSource`] answers two questions per module: was it precomputed
//! into the index, and what ordering metadata does it declare. The standard
//! implementation, [`ResolutionMetadata`], serves precomputed modules from a
//! [`MetadataIndex`] and falls back to a [`ModuleInspector`] for the rest,
//! memoizing inspection results for the lifetime of the pass.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::index::MetadataIndex;
use crate::metadata::ModuleMetadata;
use crate::Result;

/// Read access to per-module ordering metadata.
pub trait MetadataSource {
    /// Whether the module's metadata comes from the precomputed index.
    fn was_precomputed(&self, id: &str) -> bool;

    /// Ordering metadata of the module.
    fn metadata_for(&self, id: &str) -> Result<ModuleMetadata>;

    /// Numeric order hint of the module.
    fn order_hint(&self, id: &str) -> Result<i32> {
        Ok(self.metadata_for(id)?.order)
    }
}

/// On-demand inspection of a module that is absent from the index.
///
/// Implementations may be slow or perform I/O; callers cache results.
pub trait ModuleInspector {
    /// Inspect the module and return what it declares.
    fn inspect(&self, id: &str) -> Result<ModuleMetadata>;
}

impl ModuleInspector for HashMap<String, ModuleMetadata> {
    fn inspect(&self, id: &str) -> Result<ModuleMetadata> {
        Ok(self.get(id).cloned().unwrap_or_default())
    }
}

/// An index alone answers for every module: unprocessed ones get defaults.
impl MetadataSource for MetadataIndex {
    fn was_precomputed(&self, id: &str) -> bool {
        self.was_processed(id)
    }

    fn metadata_for(&self, id: &str) -> Result<ModuleMetadata> {
        if self.was_processed(id) {
            self.metadata(id)
        } else {
            Ok(ModuleMetadata::default())
        }
    }
}

/// Metadata source scoped to one resolution pass.
///
/// Create one per resolution and drop it afterwards; the inspection cache is
/// never shared between passes.
pub struct ResolutionMetadata<'a> {
    index: &'a MetadataIndex,
    inspector: &'a dyn ModuleInspector,
    cache: RefCell<HashMap<String, ModuleMetadata>>,
}

impl<'a> ResolutionMetadata<'a> {
    /// Create a pass-scoped source over an index and an inspector.
    pub fn new(index: &'a MetadataIndex, inspector: &'a dyn ModuleInspector) -> Self {
        Self {
            index,
            inspector,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of modules inspected so far in this pass.
    pub fn inspected(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl MetadataSource for ResolutionMetadata<'_> {
    fn was_precomputed(&self, id: &str) -> bool {
        self.index.was_processed(id)
    }

    fn metadata_for(&self, id: &str) -> Result<ModuleMetadata> {
        if self.index.was_processed(id) {
            return self.index.metadata(id);
        }

        if let Some(cached) = self.cache.borrow().get(id) {
            return Ok(cached.clone());
        }

        tracing::trace!(module = id, "Inspecting module metadata");
        let metadata = self.inspector.inspect(id)?;
        self.cache
            .borrow_mut()
            .insert(id.to_string(), metadata.clone());
        Ok(metadata)
    }
}

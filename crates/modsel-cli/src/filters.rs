//! Feature-based candidate filter.

use std::collections::{BTreeMap, BTreeSet};

use modsel_core::{ImportFilter, Verdicts};
use modsel_meta::MetadataIndex;

/// Index attribute listing the features a module requires.
pub const REQUIRES_FEATURES_ATTRIBUTE: &str = "requires-features";

/// Rejects modules whose required features are not all active.
///
/// Requirements recorded in the metadata index win over those declared in
/// the manifest.
#[derive(Debug, Clone, Default)]
pub struct RequiredFeatureFilter {
    active: BTreeSet<String>,
    declared: BTreeMap<String, BTreeSet<String>>,
}

impl RequiredFeatureFilter {
    pub fn new(
        active: impl IntoIterator<Item = String>,
        declared: BTreeMap<String, BTreeSet<String>>,
    ) -> Self {
        Self {
            active: active.into_iter().collect(),
            declared,
        }
    }
}

impl ImportFilter for RequiredFeatureFilter {
    fn name(&self) -> &str {
        "required-features"
    }

    fn matches(&self, candidates: &[String], index: &MetadataIndex) -> Verdicts {
        let mut verdicts = Vec::with_capacity(candidates.len());
        for id in candidates {
            let from_index = if index.get(id, REQUIRES_FEATURES_ATTRIBUTE).is_some() {
                Some(index.get_set(id, REQUIRES_FEATURES_ATTRIBUTE)?)
            } else {
                None
            };
            let required = from_index.as_ref().or_else(|| self.declared.get(id));

            let keep = required.is_none_or(|features| features.is_subset(&self.active));
            if !keep {
                tracing::debug!(module = id.as_str(), "Missing required features");
            }
            verdicts.push(keep);
        }
        Ok(verdicts)
    }
}

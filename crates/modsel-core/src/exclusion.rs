//! Exclusion merging and validation
//!
//! Exclusions arrive from three places: module ids named explicitly by the
//! caller, module names named explicitly by the caller, and names supplied by
//! external configuration. They are merged into one set, then checked against
//! the candidate pool.
//!
//! Only an exclusion naming a module that really exists, yet is not a
//! candidate, is invalid. Names that resolve to no module at all are
//! tolerated.

use std::collections::{BTreeSet, HashSet};

use crate::error::{Error, Result};

/// Answers whether a module exists in the running environment.
pub trait ModuleLocator {
    /// Whether `id` names a real, loadable module.
    fn is_loadable(&self, id: &str) -> bool;
}

impl ModuleLocator for HashSet<String> {
    fn is_loadable(&self, id: &str) -> bool {
        self.contains(id)
    }
}

impl ModuleLocator for BTreeSet<String> {
    fn is_loadable(&self, id: &str) -> bool {
        self.contains(id)
    }
}

/// Merge the three exclusion sources into one set.
pub fn resolve_exclusions<'a>(
    explicit_ids: impl IntoIterator<Item = &'a String>,
    explicit_names: impl IntoIterator<Item = &'a String>,
    external_names: impl IntoIterator<Item = &'a String>,
) -> BTreeSet<String> {
    explicit_ids
        .into_iter()
        .chain(explicit_names)
        .chain(external_names)
        .cloned()
        .collect()
}

/// Return the exclusions that name a loadable module absent from `candidates`.
pub fn validate_exclusions(
    candidates: &HashSet<&str>,
    exclusions: &BTreeSet<String>,
    locator: &dyn ModuleLocator,
) -> Vec<String> {
    let mut invalid = Vec::new();
    for exclusion in exclusions {
        if candidates.contains(exclusion.as_str()) {
            continue;
        }
        if locator.is_loadable(exclusion) {
            invalid.push(exclusion.clone());
        } else {
            tracing::warn!(
                exclusion = exclusion.as_str(),
                "Ignoring exclusion of unknown module"
            );
        }
    }
    invalid
}

/// Validate exclusions and remove them from the ordered candidate list.
///
/// Fails with every invalid exclusion at once.
pub fn apply_exclusions(
    candidates: Vec<String>,
    exclusions: &BTreeSet<String>,
    locator: &dyn ModuleLocator,
) -> Result<Vec<String>> {
    let pool: HashSet<&str> = candidates.iter().map(String::as_str).collect();
    let invalid = validate_exclusions(&pool, exclusions, locator);
    if !invalid.is_empty() {
        return Err(Error::InvalidExclusion {
            exclusions: invalid,
        });
    }

    Ok(candidates
        .into_iter()
        .filter(|id| !exclusions.contains(id))
        .collect())
}

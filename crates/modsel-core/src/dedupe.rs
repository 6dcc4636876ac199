//! Removal of repeated candidate ids.

use std::collections::HashSet;

/// Collapse repeated ids, keeping the order of first occurrence.
///
/// Ids are compared by exact string equality.
///
/// ```
/// use modsel_core::dedupe;
///
/// assert_eq!(dedupe(["b", "a", "b", "c", "a"]), vec!["b", "a", "c"]);
/// ```
pub fn dedupe<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(Into::into)
        .filter(|id: &String| seen.insert(id.clone()))
        .collect()
}

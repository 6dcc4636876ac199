//! Batch filters that veto ordered candidates
//!
//! Each filter sees the whole ordered candidate list once and returns one
//! verdict per candidate. A candidate survives only if every filter accepts
//! it; survivors keep their order.

use std::time::Instant;

use modsel_meta::MetadataIndex;

use crate::error::{BoxError, Error, Result};

/// One verdict per candidate, or the filter's own failure.
pub type Verdicts = std::result::Result<Vec<bool>, BoxError>;

/// A predicate evaluated over all candidates at once.
///
/// Evaluating the batch in one call lets a filter apply cross-candidate logic
/// or batch its own I/O.
pub trait ImportFilter {
    /// Name used in error messages and logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Return `true` at position `i` to keep `candidates[i]`.
    fn matches(&self, candidates: &[String], index: &MetadataIndex) -> Verdicts;
}

impl<F> ImportFilter for F
where
    F: Fn(&[String], &MetadataIndex) -> Verdicts,
{
    fn matches(&self, candidates: &[String], index: &MetadataIndex) -> Verdicts {
        self(candidates, index)
    }
}

/// Candidates kept and removed by a [`FilterChain`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Surviving candidates, in input order.
    pub kept: Vec<String>,
    /// Rejected candidates, in input order.
    pub removed: Vec<String>,
}

/// Ordered collection of filters applied together.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn ImportFilter>>,
}

impl FilterChain {
    /// Create an empty chain, which keeps every candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter.
    pub fn push(&mut self, filter: Box<dyn ImportFilter>) {
        self.filters.push(filter);
    }

    /// Number of filters in the chain.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the chain holds no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply every filter to `candidates`.
    ///
    /// # Errors
    ///
    /// A filter's own error is returned as `Error::Filter` with the source
    /// untouched. A verdict list of the wrong length is
    /// `Error::FilterVerdictCount`.
    pub fn apply(&self, candidates: Vec<String>, index: &MetadataIndex) -> Result<FilterOutcome> {
        if self.is_empty() {
            return Ok(FilterOutcome {
                kept: candidates,
                removed: Vec::new(),
            });
        }

        let started = Instant::now();
        let mut skip = vec![false; candidates.len()];

        for filter in &self.filters {
            let verdicts = filter
                .matches(&candidates, index)
                .map_err(|source| Error::Filter {
                    filter: filter.name().to_string(),
                    source,
                })?;
            if verdicts.len() != candidates.len() {
                return Err(Error::FilterVerdictCount {
                    filter: filter.name().to_string(),
                    expected: candidates.len(),
                    actual: verdicts.len(),
                });
            }
            for (flag, keep) in skip.iter_mut().zip(verdicts) {
                if !keep {
                    *flag = true;
                }
            }
        }

        if !skip.contains(&true) {
            return Ok(FilterOutcome {
                kept: candidates,
                removed: Vec::new(),
            });
        }

        let mut outcome = FilterOutcome::default();
        for (candidate, skipped) in candidates.into_iter().zip(skip) {
            if skipped {
                outcome.removed.push(candidate);
            } else {
                outcome.kept.push(candidate);
            }
        }

        tracing::trace!(
            filters = self.len(),
            filtered = outcome.removed.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Filtered {} modules",
            outcome.removed.len()
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn reject(name: &'static str) -> Box<dyn ImportFilter> {
        Box::new(move |candidates: &[String], _: &MetadataIndex| -> Verdicts {
            Ok(candidates.iter().map(|c| c != name).collect())
        })
    }

    #[test]
    fn test_empty_chain_keeps_everything() {
        let chain = FilterChain::new();
        let outcome = chain.apply(ids(&["x", "y"]), &MetadataIndex::new()).unwrap();
        assert_eq!(outcome.kept, ids(&["x", "y"]));
        assert!(outcome.removed.is_empty());
    }

    #[test]
    fn test_single_rejection_preserves_order() {
        let mut chain = FilterChain::new();
        chain.push(reject("Y"));
        let outcome = chain.apply(ids(&["X", "Y", "Z"]), &MetadataIndex::new()).unwrap();
        assert_eq!(outcome.kept, ids(&["X", "Z"]));
        assert_eq!(outcome.removed, ids(&["Y"]));
    }

    #[test]
    fn test_every_filter_must_accept() {
        let mut chain = FilterChain::new();
        chain.push(reject("a"));
        chain.push(reject("c"));
        assert_eq!(chain.len(), 2);

        let outcome = chain
            .apply(ids(&["a", "b", "c", "d"]), &MetadataIndex::new())
            .unwrap();
        assert_eq!(outcome.kept, ids(&["b", "d"]));
        assert_eq!(outcome.removed, ids(&["a", "c"]));
    }

    #[test]
    fn test_each_filter_sees_full_list_once() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut chain = FilterChain::new();
        chain.push(reject("a"));
        let log = Rc::clone(&seen);
        chain.push(Box::new(move |candidates: &[String], _: &MetadataIndex| -> Verdicts {
            log.borrow_mut().push(candidates.to_vec());
            Ok(vec![true; candidates.len()])
        }));

        chain.apply(ids(&["a", "b"]), &MetadataIndex::new()).unwrap();
        assert_eq!(*seen.borrow(), vec![ids(&["a", "b"])]);
    }

    #[test]
    fn test_filter_error_is_propagated() {
        let mut chain = FilterChain::new();
        chain.push(Box::new(|_: &[String], _: &MetadataIndex| -> Verdicts {
            Err("condition store offline".into())
        }));

        let err = chain.apply(ids(&["a"]), &MetadataIndex::new()).unwrap_err();
        match err {
            Error::Filter { source, .. } => assert_eq!(source.to_string(), "condition store offline"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_verdict_count_is_an_error() {
        let mut chain = FilterChain::new();
        chain.push(Box::new(|_: &[String], _: &MetadataIndex| -> Verdicts {
            Ok(vec![true])
        }));

        let err = chain.apply(ids(&["a", "b"]), &MetadataIndex::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::FilterVerdictCount { expected: 2, actual: 1, .. }
        ));
    }
}

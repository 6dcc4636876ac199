//! Priority and precedence ordering of candidate modules
//!
//! Ordering runs in three stable phases:
//!
//! 1. sort ids lexically,
//! 2. stable-sort by order hint (lower first),
//! 3. walk the result and place every module after all of its predecessors.
//!
//! A predecessor of `B` is any module named in `B`'s `after` set, plus any
//! module whose `before` set names `B`. Phase 3 only moves a module when a
//! precedence relation requires it, so unconstrained modules keep their
//! phase-2 relative order.
//!
//! # Example
//!
//! ```
//! use modsel_core::PriorityOrderer;
//! use modsel_meta::{MetadataIndex, ModuleMetadata};
//!
//! let mut index = MetadataIndex::new();
//! index.record("b", &ModuleMetadata::new().after(["c"]));
//!
//! let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
//! let order = PriorityOrderer::new(&index).order(&ids).unwrap();
//! assert_eq!(order, vec!["a", "c", "b"]);
//! ```

use std::collections::HashMap;

use modsel_meta::MetadataSource;

use crate::error::{Error, Result};

/// Visit state of a module during the precedence walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// One pending module on the explicit walk stack.
struct Frame {
    node: usize,
    next: usize,
}

/// Sorts candidates by order hint and precedence constraints.
pub struct PriorityOrderer<'a> {
    metadata: &'a dyn MetadataSource,
}

impl<'a> PriorityOrderer<'a> {
    /// Create an orderer reading metadata from `metadata`.
    pub fn new(metadata: &'a dyn MetadataSource) -> Self {
        Self { metadata }
    }

    /// Return `candidates` in activation order.
    ///
    /// Repeated ids are treated as one.
    ///
    /// # Errors
    ///
    /// Returns `Error::CycleDetected` if the precedence constraints cannot be
    /// satisfied, and `Error::MetadataRead` if a module's metadata cannot be
    /// read.
    pub fn order(&self, candidates: &[String]) -> Result<Vec<String>> {
        let mut ids: Vec<&str> = candidates.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids.dedup();

        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            let metadata = self
                .metadata
                .metadata_for(id)
                .map_err(|e| Error::metadata(id, e))?;
            entries.push((id, metadata));
        }

        // Stable: equal hints keep their lexical order.
        entries.sort_by_key(|(_, metadata)| metadata.order);

        let rank: HashMap<&str, usize> = entries
            .iter()
            .enumerate()
            .map(|(pos, (id, _))| (*id, pos))
            .collect();

        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
        for (pos, (_, metadata)) in entries.iter().enumerate() {
            for after in &metadata.after {
                if let Some(&dep) = rank.get(after.as_str()) {
                    predecessors[pos].push(dep);
                }
            }
            for before in &metadata.before {
                if let Some(&dependent) = rank.get(before.as_str()) {
                    predecessors[dependent].push(pos);
                }
            }
        }
        for preds in &mut predecessors {
            preds.sort_unstable();
            preds.dedup();
        }

        let names: Vec<&str> = entries.iter().map(|(id, _)| *id).collect();
        let sorted = walk(&names, &predecessors)?;

        tracing::debug!(modules = sorted.len(), "Ordered candidate modules");
        Ok(sorted.into_iter().map(|pos| names[pos].to_string()).collect())
    }
}

/// Depth-first placement of every node after its predecessors.
///
/// Nodes are numbered by baseline position, so visiting roots and
/// predecessors in ascending order keeps the walk stable.
fn walk(names: &[&str], predecessors: &[Vec<usize>]) -> Result<Vec<usize>> {
    let mut state = vec![Visit::Unvisited; names.len()];
    let mut sorted = Vec::with_capacity(names.len());
    let mut stack: Vec<Frame> = Vec::new();

    for root in 0..names.len() {
        if state[root] != Visit::Unvisited {
            continue;
        }
        state[root] = Visit::InProgress;
        stack.push(Frame { node: root, next: 0 });

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let Some(&pred) = predecessors[node].get(frame.next) else {
                state[node] = Visit::Done;
                sorted.push(node);
                stack.pop();
                continue;
            };
            frame.next += 1;

            match state[pred] {
                Visit::Done => {}
                Visit::InProgress => {
                    return Err(Error::CycleDetected {
                        first: names[node].to_string(),
                        second: names[pred].to_string(),
                    });
                }
                Visit::Unvisited => {
                    state[pred] = Visit::InProgress;
                    stack.push(Frame { node: pred, next: 0 });
                }
            }
        }
    }

    Ok(sorted)
}

//! Ordering metadata declared by a single module.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Order hint of a module that declares none. Sorts last.
pub const LOWEST_PRECEDENCE: i32 = i32::MAX;

/// Priority hint and precedence declarations of one module.
///
/// Lower `order` values sort earlier. `before` names modules this one must
/// precede, `after` names modules it must follow. Either side of a pair may
/// declare the relation; the orderer honors both.
///
/// # Example
///
/// ```
/// use modsel_meta::ModuleMetadata;
///
/// let meta = ModuleMetadata::new().with_order(10).after(["data"]);
/// assert_eq!(meta.order, 10);
/// assert!(meta.after.contains("data"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleMetadata {
    #[serde(default = "default_order")]
    pub order: i32,

    #[serde(default)]
    pub before: BTreeSet<String>,

    #[serde(default)]
    pub after: BTreeSet<String>,
}

fn default_order() -> i32 {
    LOWEST_PRECEDENCE
}

impl Default for ModuleMetadata {
    fn default() -> Self {
        Self {
            order: LOWEST_PRECEDENCE,
            before: BTreeSet::new(),
            after: BTreeSet::new(),
        }
    }
}

impl ModuleMetadata {
    /// Metadata with the lowest priority and no precedence declarations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the order hint.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Declare modules this one must precede.
    pub fn before<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.before.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Declare modules this one must follow.
    pub fn after<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.after.extend(ids.into_iter().map(Into::into));
        self
    }
}

//! Precomputed metadata index
//!
//! The index is a TOML document with one table per module:
//!
//! ```text
//! [modules."web"]
//! order = 10
//! after = ["data"]
//! requires-features = "http,tls"
//! ```
//!
//! Values found here are authoritative: a module listed in the index is never
//! inspected. Attributes beyond the ordering ones are kept so filters can read
//! them without inspecting modules.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use toml::{Table, Value};

use crate::metadata::{LOWEST_PRECEDENCE, ModuleMetadata};
use crate::{Error, Result};

/// Attribute holding the numeric order hint.
pub const ORDER_ATTRIBUTE: &str = "order";

/// Attribute holding the modules a module must precede.
pub const BEFORE_ATTRIBUTE: &str = "before";

/// Attribute holding the modules a module must follow.
pub const AFTER_ATTRIBUTE: &str = "after";

#[derive(Debug, Default, Deserialize)]
struct IndexFile {
    #[serde(default)]
    modules: BTreeMap<String, Table>,
}

/// Attributes of every precomputed module, keyed by module id.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    entries: HashMap<String, Table>,
}

impl MetadataIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an index from TOML text.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let file: IndexFile = toml::from_str(content)?;
        Ok(Self {
            entries: file.modules.into_iter().collect(),
        })
    }

    /// Load an index from disk.
    ///
    /// A missing file yields an empty index.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No metadata index found");
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|source| Error::IndexRead {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::parse(&content).map_err(|source| Error::IndexParse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            path = %path.display(),
            modules = index.len(),
            "Loaded metadata index"
        );
        Ok(index)
    }

    /// Record ordering metadata for a module, keeping its other attributes.
    pub fn record(&mut self, id: impl Into<String>, metadata: &ModuleMetadata) {
        let table = self.entries.entry(id.into()).or_default();
        table.insert(
            ORDER_ATTRIBUTE.to_string(),
            Value::Integer(i64::from(metadata.order)),
        );
        table.insert(BEFORE_ATTRIBUTE.to_string(), string_array(&metadata.before));
        table.insert(AFTER_ATTRIBUTE.to_string(), string_array(&metadata.after));
    }

    /// Whether the module was precomputed into this index.
    pub fn was_processed(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Raw attribute value.
    pub fn get(&self, id: &str, attribute: &str) -> Option<&Value> {
        self.entries.get(id).and_then(|table| table.get(attribute))
    }

    /// Integer attribute, or `default` when absent.
    ///
    /// Accepts TOML integers and strings holding an integer.
    pub fn get_integer(&self, id: &str, attribute: &str, default: i32) -> Result<i32> {
        let invalid = || Error::InvalidAttribute {
            module: id.to_string(),
            attribute: attribute.to_string(),
            expected: "a 32-bit integer",
        };

        match self.get(id, attribute) {
            None => Ok(default),
            Some(Value::Integer(n)) => i32::try_from(*n).map_err(|_| invalid()),
            Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid()),
            Some(_) => Err(invalid()),
        }
    }

    /// Set-of-names attribute, empty when absent.
    ///
    /// Accepts an array of strings or a single comma-separated string.
    pub fn get_set(&self, id: &str, attribute: &str) -> Result<BTreeSet<String>> {
        let invalid = || Error::InvalidAttribute {
            module: id.to_string(),
            attribute: attribute.to_string(),
            expected: "a list of module names",
        };

        match self.get(id, attribute) {
            None => Ok(BTreeSet::new()),
            Some(Value::String(s)) => Ok(split_names(s)),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(|s| s.trim().to_string())
                        .ok_or_else(invalid)
                })
                .filter(|name| name.as_ref().map_or(true, |n| !n.is_empty()))
                .collect(),
            Some(_) => Err(invalid()),
        }
    }

    /// Ordering metadata of a precomputed module.
    pub fn metadata(&self, id: &str) -> Result<ModuleMetadata> {
        Ok(ModuleMetadata {
            order: self.get_integer(id, ORDER_ATTRIBUTE, LOWEST_PRECEDENCE)?,
            before: self.get_set(id, BEFORE_ATTRIBUTE)?,
            after: self.get_set(id, AFTER_ATTRIBUTE)?,
        })
    }

    /// Number of precomputed modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no modules.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn split_names(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn string_array(names: &BTreeSet<String>) -> Value {
    Value::Array(names.iter().cloned().map(Value::String).collect())
}

//! Module manifest
//!
//! The manifest stands in for a module registry: it lists the discovered
//! candidates, the selector settings, and what every known module declares.
//!
//! ```text
//! candidates = ["web", "data", "security"]
//!
//! [selector]
//! exclude = ["legacy"]
//!
//! [modules."web"]
//! order = 10
//! after = ["data"]
//! requires-features = ["http"]
//!
//! [modules."legacy"]
//! ```
//!
//! Every module with a `[modules]` table is loadable, whether or not it is a
//! candidate. Unknown keys are rejected, so a misspelled `after` or `order`
//! fails to parse instead of silently dropping a constraint.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use modsel_core::{BoxError, CandidateSource, ModuleLocator, SelectorSettings};
use modsel_meta::{LOWEST_PRECEDENCE, ModuleInspector, ModuleMetadata};
use serde::Deserialize;

use crate::error::{CliError, Result};

/// What a single module declares in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModuleDeclaration {
    /// Order hint; lower sorts earlier.
    #[serde(default = "default_order")]
    pub order: i32,

    /// Modules this one must precede.
    #[serde(default)]
    pub before: BTreeSet<String>,

    /// Modules this one must follow.
    #[serde(default)]
    pub after: BTreeSet<String>,

    /// Features that must be active for the module to be selected.
    #[serde(default)]
    pub requires_features: BTreeSet<String>,
}

fn default_order() -> i32 {
    LOWEST_PRECEDENCE
}

impl Default for ModuleDeclaration {
    fn default() -> Self {
        Self {
            order: LOWEST_PRECEDENCE,
            before: BTreeSet::new(),
            after: BTreeSet::new(),
            requires_features: BTreeSet::new(),
        }
    }
}

impl ModuleDeclaration {
    /// Ordering metadata declared by the module.
    pub fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            order: self.order,
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }
}

/// Parsed module manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Discovered candidates, in discovery order.
    #[serde(default)]
    pub candidates: Vec<String>,

    /// Selector settings from the `[selector]` table.
    #[serde(default)]
    pub selector: SelectorSettings,

    /// Declarations of every known module.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleDeclaration>,
}

impl Manifest {
    /// Parse a manifest from TOML text.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CliError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::parse(&content).map_err(|source| CliError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            candidates = manifest.candidates.len(),
            modules = manifest.modules.len(),
            "Loaded manifest"
        );
        Ok(manifest)
    }

    /// Declared required features, by module.
    pub fn required_features(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.modules
            .iter()
            .filter(|(_, decl)| !decl.requires_features.is_empty())
            .map(|(id, decl)| (id.clone(), decl.requires_features.clone()))
            .collect()
    }
}

impl CandidateSource for Manifest {
    fn list_candidates(&self) -> std::result::Result<Vec<String>, BoxError> {
        Ok(self.candidates.clone())
    }
}

impl ModuleInspector for Manifest {
    fn inspect(&self, id: &str) -> modsel_meta::Result<ModuleMetadata> {
        Ok(self
            .modules
            .get(id)
            .map(ModuleDeclaration::metadata)
            .unwrap_or_default())
    }
}

impl ModuleLocator for Manifest {
    fn is_loadable(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }
}

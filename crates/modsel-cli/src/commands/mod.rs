//! Command implementations for modsel-cli

pub mod check;
pub mod resolve;

pub use check::run_check;
pub use resolve::run_resolve;

use std::collections::BTreeMap;

use modsel_core::{LoggingListener, ModuleSelector, SelectorSettings};
use modsel_meta::MetadataIndex;

use crate::cli::SelectionArgs;
use crate::error::{CliError, Result};
use crate::filters::RequiredFeatureFilter;
use crate::manifest::Manifest;

/// Everything a resolution reads, loaded once per command.
struct Inputs {
    manifest: Manifest,
    index: Option<MetadataIndex>,
    settings: SelectorSettings,
    features: Vec<String>,
}

impl Inputs {
    fn load(args: &SelectionArgs) -> Result<Self> {
        let manifest = Manifest::load(&args.manifest)?;

        let index = match &args.index {
            Some(path) if !path.exists() => {
                return Err(CliError::user(format!(
                    "metadata index not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(MetadataIndex::load(path)?),
            None => None,
        };

        let mut settings = manifest.selector.clone();
        let properties: BTreeMap<String, String> = args.properties.iter().cloned().collect();
        settings.apply_properties(&properties)?;
        let settings = settings.with_env_overrides()?;

        Ok(Self {
            manifest,
            index,
            settings,
            features: args.features.clone(),
        })
    }

    fn selector(&self) -> ModuleSelector<'_> {
        let filter =
            RequiredFeatureFilter::new(self.features.clone(), self.manifest.required_features());
        let mut builder = ModuleSelector::builder(&self.manifest)
            .inspector(&self.manifest)
            .locator(&self.manifest)
            .settings(self.settings.clone())
            .filter(filter)
            .listener(LoggingListener);
        if let Some(index) = &self.index {
            builder = builder.index(index);
        }
        builder.build()
    }
}

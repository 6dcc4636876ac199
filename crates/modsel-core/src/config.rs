//! Selector settings
//!
//! Settings come from three layers, each overriding the previous one:
//!
//! 1. the `[selector]` table of a TOML file,
//! 2. a flat property map (`modsel.enabled`, `modsel.exclude`,
//!    `modsel.exclude[0]`, ...),
//! 3. the `MODSEL_ENABLED` and `MODSEL_EXCLUDE` environment variables.
//!
//! Exclusion values are comma-separated lists.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Property switching module selection on or off.
pub const ENABLED_PROPERTY: &str = "modsel.enabled";

/// Property listing modules to exclude.
pub const EXCLUDE_PROPERTY: &str = "modsel.exclude";

/// Environment variable overriding [`ENABLED_PROPERTY`].
pub const ENABLED_ENV: &str = "MODSEL_ENABLED";

/// Environment variable overriding [`EXCLUDE_PROPERTY`].
pub const EXCLUDE_ENV: &str = "MODSEL_EXCLUDE";

/// Settings consumed by the selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSettings {
    /// When false the selector activates nothing.
    pub enabled: bool,

    /// Externally configured exclusions. Entries may be comma-separated.
    ///
    /// In TOML either a list or a single comma-separated string.
    #[serde(deserialize_with = "string_or_list")]
    pub exclude: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::One(value) => vec![value],
        StringOrList::Many(values) => values,
    })
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    selector: SelectorSettings,
}

impl SelectorSettings {
    /// Parse the `[selector]` table of a TOML document.
    ///
    /// Other tables are ignored; a missing table yields defaults.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let file: SettingsFile = toml::from_str(content)?;
        Ok(file.selector)
    }

    /// Load settings from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let origin = || path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| Error::Settings {
            origin: origin(),
            reason: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| Error::Settings {
            origin: origin(),
            reason: e.to_string(),
        })
    }

    /// Overlay a flat property map.
    ///
    /// `modsel.exclude` and every `modsel.exclude[N]` key contribute, indexed
    /// keys in ascending `N`. When any exclusion property is present it
    /// replaces the current list.
    pub fn apply_properties(&mut self, properties: &BTreeMap<String, String>) -> Result<()> {
        if let Some(value) = properties.get(ENABLED_PROPERTY) {
            self.enabled = parse_bool(value, ENABLED_PROPERTY)?;
        }

        let mut indexed: Vec<(usize, &String)> = Vec::new();
        let mut plain: Option<&String> = None;
        for (key, value) in properties {
            let Some(rest) = key.strip_prefix(EXCLUDE_PROPERTY) else {
                continue;
            };
            if rest.is_empty() {
                plain = Some(value);
            } else if let Some(position) = rest
                .strip_prefix('[')
                .and_then(|r| r.strip_suffix(']'))
                .and_then(|n| n.parse::<usize>().ok())
            {
                indexed.push((position, value));
            }
        }

        if plain.is_some() || !indexed.is_empty() {
            indexed.sort_by_key(|(position, _)| *position);
            self.exclude = plain
                .into_iter()
                .chain(indexed.into_iter().map(|(_, value)| value))
                .cloned()
                .collect();
        }
        Ok(())
    }

    /// Overlay `MODSEL_ENABLED` / `MODSEL_EXCLUDE` from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_vars(std::env::vars())
    }

    /// Overlay `MODSEL_ENABLED` / `MODSEL_EXCLUDE` from the given variables.
    pub fn with_vars<I>(mut self, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                ENABLED_ENV => self.enabled = parse_bool(&value, ENABLED_ENV)?,
                EXCLUDE_ENV => self.exclude = vec![value],
                _ => {}
            }
        }
        Ok(self)
    }

    /// Exclusion names supplied by configuration, tokenized on commas.
    pub fn external_exclusion_names(&self) -> BTreeSet<String> {
        self.exclude
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn parse_bool(value: &str, origin: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::Settings {
            origin: origin.to_string(),
            reason: format!("expected true or false, got '{other}'"),
        }),
    }
}

//! End-to-end selection tests over on-disk fixtures
//!
//! These tests exercise the complete flow: index and settings loading ->
//! exclusions -> ordering -> filtering -> notification.

use modsel_core::{
    Error, ExclusionRequest, ImportFilter, LoggingListener, ModuleSelector, SelectorSettings,
    Verdicts,
};
use modsel_meta::MetadataIndex;
use modsel_test_utils::{KnownModules, RecordingListener, StaticInspector, ids, metadata};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures")
        .join(relative)
}

fn web_stack_index() -> MetadataIndex {
    MetadataIndex::load(&fixture("index/web-stack.toml")).unwrap()
}

fn web_stack_candidates() -> Vec<String> {
    ids(&["web", "cache", "data", "security", "metrics", "web"])
}

/// Only `metrics` is missing from the index and needs inspecting.
fn web_stack_inspector() -> StaticInspector {
    StaticInspector::new().module("metrics", metadata().after(["web"]))
}

/// Keeps modules whose indexed `requires-features` are all active.
struct FeatureGate {
    active: BTreeSet<String>,
}

impl FeatureGate {
    fn new(active: &[&str]) -> Self {
        Self {
            active: active.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ImportFilter for FeatureGate {
    fn name(&self) -> &str {
        "feature-gate"
    }

    fn matches(&self, candidates: &[String], index: &MetadataIndex) -> Verdicts {
        candidates
            .iter()
            .map(|id| {
                let required = index.get_set(id, "requires-features")?;
                Ok(required.is_subset(&self.active))
            })
            .collect()
    }
}

#[test]
fn test_web_stack_full_resolution() {
    let candidates = web_stack_candidates();
    let index = web_stack_index();
    let inspector = web_stack_inspector();
    let listener = RecordingListener::new();
    let events = listener.events();

    let selection = ModuleSelector::builder(&candidates)
        .index(&index)
        .inspector(&inspector)
        .filter(FeatureGate::new(&["http"]))
        .listener(LoggingListener)
        .listener(listener)
        .build()
        .select(&ExclusionRequest::none())
        .unwrap();

    assert_eq!(
        selection.modules,
        ids(&["security", "data", "cache", "web", "metrics"])
    );
    assert!(selection.filtered.is_empty());
    assert_eq!(inspector.calls(), 1);
    assert_eq!(events.borrow().len(), 1);
    assert_eq!(events.borrow()[0].modules, selection.modules);
}

#[test]
fn test_web_stack_without_feature_drops_web() {
    let candidates = web_stack_candidates();
    let index = web_stack_index();
    let inspector = web_stack_inspector();

    let selection = ModuleSelector::builder(&candidates)
        .index(&index)
        .inspector(&inspector)
        .filter(FeatureGate::new(&[]))
        .build()
        .select(&ExclusionRequest::none())
        .unwrap();

    assert_eq!(selection.modules, ids(&["security", "data", "cache", "metrics"]));
    assert_eq!(selection.filtered, ids(&["web"]));
}

#[test]
fn test_settings_file_exclusions() {
    let candidates = web_stack_candidates();
    let index = web_stack_index();
    let inspector = web_stack_inspector();
    let settings = SelectorSettings::load(&fixture("settings/exclude-cache.toml")).unwrap();

    let selection = ModuleSelector::builder(&candidates)
        .index(&index)
        .inspector(&inspector)
        .settings(settings)
        .build()
        .select(&ExclusionRequest::none().modules(["metrics"]))
        .unwrap();

    assert_eq!(selection.modules, ids(&["security", "data", "web"]));
    assert_eq!(
        selection.exclusions,
        ["cache", "metrics"]
            .iter()
            .map(|s| s.to_string())
            .collect::<BTreeSet<_>>()
    );
    assert_eq!(inspector.calls(), 0);
}

#[test]
fn test_disabled_settings_skip_everything() {
    let index = web_stack_index();
    let settings = SelectorSettings::load(&fixture("settings/disabled.toml")).unwrap();
    let listener = RecordingListener::new();
    let events = listener.events();
    let empty: Vec<String> = Vec::new();

    let selection = ModuleSelector::builder(&empty)
        .index(&index)
        .settings(settings)
        .listener(listener)
        .build()
        .select(&ExclusionRequest::none())
        .unwrap();

    assert!(selection.modules.is_empty());
    assert!(events.borrow().is_empty());
}

#[rstest]
#[case::enable_by_property(&[("modsel.enabled", "true")], &["security", "data", "cache", "metrics"])]
#[case::exclude_by_indexed_property(
    &[("modsel.enabled", "true"), ("modsel.exclude[1]", "metrics"), ("modsel.exclude[0]", "web")],
    &["security", "data", "cache"]
)]
fn test_property_layer_over_settings_file(
    #[case] properties: &[(&str, &str)],
    #[case] expected: &[&str],
) {
    let candidates = web_stack_candidates();
    let index = web_stack_index();
    let inspector = web_stack_inspector();
    let mut settings = SelectorSettings::load(&fixture("settings/disabled.toml")).unwrap();
    let properties: BTreeMap<String, String> = properties
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    settings.apply_properties(&properties).unwrap();

    let selection = ModuleSelector::builder(&candidates)
        .index(&index)
        .inspector(&inspector)
        .settings(settings)
        .build()
        .select(&ExclusionRequest::none())
        .unwrap();

    assert_eq!(selection.modules, ids(expected));
}

#[test]
fn test_excluding_known_non_candidate_fails() {
    let candidates = web_stack_candidates();
    let index = web_stack_index();
    let inspector = web_stack_inspector();
    let locator = KnownModules::new(&["web", "cache", "data", "security", "metrics", "legacy"]);

    let err = ModuleSelector::builder(&candidates)
        .index(&index)
        .inspector(&inspector)
        .locator(&locator)
        .build()
        .select(&ExclusionRequest::none().names(["legacy", "retired"]))
        .unwrap_err();

    match err {
        Error::InvalidExclusion { exclusions } => assert_eq!(exclusions, ids(&["legacy"])),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_index_written_to_disk_drives_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("index.toml");
    fs::write(
        &path,
        r#"
[modules."alpha"]
after = "omega"

[modules."omega"]
"#,
    )
    .unwrap();
    let index = MetadataIndex::load(&path).unwrap();
    let candidates = ids(&["alpha", "omega"]);

    let selection = ModuleSelector::builder(&candidates)
        .index(&index)
        .build()
        .select(&ExclusionRequest::none())
        .unwrap();

    assert_eq!(selection.modules, ids(&["omega", "alpha"]));
}

#[test]
fn test_cycle_across_index_and_inspection() {
    let candidates = ids(&["data", "cache", "metrics"]);
    let mut index = web_stack_index();
    index.record("cache", &metadata().before(["data"]));
    let inspector = StaticInspector::new().module("metrics", metadata());

    let err = ModuleSelector::builder(&candidates)
        .index(&index)
        .inspector(&inspector)
        .build()
        .select(&ExclusionRequest::none())
        .unwrap_err();

    assert!(matches!(err, Error::CycleDetected { .. }), "got {err}");
}

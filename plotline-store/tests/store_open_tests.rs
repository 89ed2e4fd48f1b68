mod support;

use plotline_model::StoryFields;
use plotline_store::{MemoryRefPolicy, PlotStore, StoreConfig};
use std::io::Write;
use support::*;

// ── File-backed store ────────────────────────────────────────────

#[test]
fn file_store_persists_across_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plot.duckdb");

    {
        let store = PlotStore::open(&path).unwrap();
        store.create_user("ann", "hash").unwrap();
        store
            .create_story("ann", &StoryFields::titled("Persisted"))
            .unwrap();
    }

    let store = PlotStore::open(&path).unwrap();
    let stories = store.list_stories("ann").unwrap();
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].title, "Persisted");

    // Sequences survive as well: the next story gets a fresh id.
    let next = store
        .create_story("ann", &StoryFields::titled("Second"))
        .unwrap();
    assert_ne!(next.id, stories[0].id);
}

#[test]
fn corrupt_wal_is_discarded_on_open() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plot.duckdb");

    {
        let store = PlotStore::open(&path).unwrap();
        store.create_user("ann", "hash").unwrap();
        store
            .create_story("ann", &StoryFields::titled("Checkpointed"))
            .unwrap();
    }
    std::fs::write(dir.path().join("plot.duckdb.wal"), b"definitely not a duckdb log").unwrap();

    let store = PlotStore::open(&path).unwrap();

    let stories = store.list_stories("ann").unwrap();
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].title, "Checkpointed");
    store
        .create_story("ann", &StoryFields::titled("After recovery"))
        .unwrap();
}

#[test]
fn store_handles_share_one_connection() {
    let store = store();
    let other = store.clone();
    store.create_user("ann", "hash").unwrap();

    assert!(other.find_user("ann").unwrap().is_some());
}

// ── Configuration ────────────────────────────────────────────────

#[test]
fn config_loads_from_json_with_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "template_story_id": 7, "memory_ref_policy": "cascade" }}"#
    )
    .unwrap();

    let config = StoreConfig::from_json_file(file.path()).unwrap();

    assert_eq!(config.template_story_id.get(), 7);
    assert_eq!(config.memory_ref_policy, MemoryRefPolicy::Cascade);
    assert_eq!(config.default_tag_types, StoreConfig::default().default_tag_types);
    assert_eq!(config.threads, 2);
}

#[test]
fn malformed_config_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    assert!(StoreConfig::from_json_file(file.path()).is_err());
}

#[test]
fn custom_default_tag_types() {
    let store = store_with(StoreConfig {
        default_tag_types: vec!["Mood".into()],
        ..StoreConfig::default()
    });
    let story = user_with_story(&store, "ann");

    let names: Vec<String> = store
        .list_tag_types("ann", story.id)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Mood"]);
}

//! Shared fixtures for plot store integration tests.
#![allow(dead_code)]

use plotline_model::{
    EventDraft, EventFields, EventId, EventOrder, Story, StoryFields, Tag, TagFields, TagType,
};
use plotline_store::{PlotStore, StoreConfig};
use tracing_subscriber::EnvFilter;

/// Route store logs to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("plotline_store=debug"))
        .with_test_writer()
        .try_init();
}

pub fn store() -> PlotStore {
    init_tracing();
    PlotStore::open_in_memory().unwrap()
}

pub fn store_with(config: StoreConfig) -> PlotStore {
    init_tracing();
    PlotStore::open_in_memory_with_config(config).unwrap()
}

/// Create `username` with one empty story.
pub fn user_with_story(store: &PlotStore, username: &str) -> Story {
    store.create_user(username, "hash").unwrap();
    store
        .create_story(username, &StoryFields::titled(format!("{username}'s story")))
        .unwrap()
}

/// Insert an in-plot event with `title` behind `after` (or at the head).
pub fn chained(store: &PlotStore, username: &str, story: &Story, title: &str, after: Option<EventId>) -> EventId {
    let mut draft = EventDraft::new(EventFields::in_plot(title));
    draft.prev_event = after;
    store.insert_event(username, story.id, &draft).unwrap().id
}

/// Append `titles` to the chain in order and return their ids.
pub fn chain_of(store: &PlotStore, username: &str, story: &Story, titles: &[&str]) -> Vec<EventId> {
    let mut ids = Vec::new();
    for title in titles {
        let id = chained(store, username, story, title, ids.last().copied());
        ids.push(id);
    }
    ids
}

/// Titles in structural order.
pub fn structural_titles(store: &PlotStore, username: &str, story: &Story) -> Vec<String> {
    store
        .list_events(username, story.id, EventOrder::Structural)
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect()
}

pub fn assert_chain_consistent(store: &PlotStore, username: &str, story: &Story) {
    let report = store.check_chain(username, story.id).unwrap();
    assert!(report.is_consistent(), "chain problems: {:?}", report.problems);
}

pub fn tag_type_named(store: &PlotStore, username: &str, story: &Story, name: &str) -> TagType {
    store
        .list_tag_types(username, story.id)
        .unwrap()
        .into_iter()
        .find(|t| t.name == name)
        .unwrap()
}

pub fn tag(store: &PlotStore, username: &str, story: &Story, tag_type: &TagType, name: &str) -> Tag {
    store
        .create_tag(
            username,
            story.id,
            &TagFields {
                name: name.into(),
                tag_type_id: tag_type.id,
                color: None,
            },
        )
        .unwrap()
}

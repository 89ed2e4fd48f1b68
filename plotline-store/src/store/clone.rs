//! Deep copy of a template story for a newly registered user.
//!
//! Records are copied in dependency order (tag types, tags, characters,
//! events) while remap tables collect `old id -> new id`. Event links are
//! written in a second pass, once every event has its new id.

use super::helpers::{load_story_events, next_id, now_millis, story_from_row, STORY_COLUMNS};
use super::stories::insert_story;
use super::tag_types::{insert_tag_type, story_tag_types};
use super::tags::story_tags;
use super::users::{insert_user, user_by_id};
use super::PlotStore;
use crate::error::{StoreError, StoreResult};
use duckdb::{params, Connection};
use plotline_model::{EventId, Story, StoryFields, StoryId, TagId, TagTypeId, User, UserId};
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use tracing::info;

/// Result of a template clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneSummary {
    /// The new story, owned by the new user.
    pub story: Story,
    pub tag_types: usize,
    pub tags: usize,
    pub characters: usize,
    pub events: usize,
}

impl PlotStore {
    /// Copy the whole graph of `template` into a fresh story owned by `user`.
    ///
    /// Runs in one transaction: either the complete copy is visible or
    /// nothing is. A missing template is a configuration error and reported
    /// as `InvalidState`.
    pub fn clone_template_for_new_user(
        &self,
        template: StoryId,
        user: UserId,
    ) -> StoreResult<CloneSummary> {
        self.with_transaction(|conn| {
            let user = user_by_id(conn, user)?;
            clone_story_graph(conn, template, &user)
        })
    }

    /// Create an account and give it a copy of the configured template story.
    pub fn register_user(
        &self,
        username: &str,
        credential_hash: &str,
    ) -> StoreResult<(User, CloneSummary)> {
        let template = self.config().template_story_id;
        self.with_transaction(|conn| {
            let user = insert_user(conn, username, credential_hash)?;
            let summary = clone_story_graph(conn, template, &user)?;
            info!(username = %user.username, story_id = %summary.story.id, "User registered");
            Ok((user, summary))
        })
    }
}

pub(crate) fn clone_story_graph(
    conn: &Connection,
    template: StoryId,
    user: &User,
) -> StoreResult<CloneSummary> {
    let source = load_template(conn, template)?;
    let story = insert_story(
        conn,
        user.id,
        &StoryFields {
            title: source.title.clone(),
            description: source.description.clone(),
            date_format: source.date_format.clone(),
        },
    )?;

    let mut tag_type_map: HashMap<TagTypeId, TagTypeId> = HashMap::new();
    for tag_type in story_tag_types(conn, template)? {
        let copy = insert_tag_type(conn, story.id, &tag_type.name)?;
        tag_type_map.insert(tag_type.id, copy.id);
    }

    let mut tag_map: HashMap<TagId, TagId> = HashMap::new();
    for tag in story_tags(conn, template)? {
        let tag_type = remap(&tag_type_map, tag.tag_type_id, "tag type")?;
        let id = TagId(next_id(conn, "tags_id_seq")?);
        conn.execute(
            "INSERT INTO tags (id, story_id, tag_type_id, name, color) VALUES (?, ?, ?, ?, ?)",
            params![id.get(), story.id.get(), tag_type.get(), tag.name, tag.color],
        )?;
        tag_map.insert(tag.id, id);
    }

    let characters = clone_characters(conn, template, &tag_map)?;

    let events = load_story_events(conn, template)?;
    let mut event_map: HashMap<EventId, EventId> = HashMap::new();
    for event in &events {
        let id = EventId(next_id(conn, "plot_events_id_seq")?);
        conn.execute(
            r#"INSERT INTO plot_events (id, story_id, event_type, title, event_date, description,
                   content, in_plot, memory_ref_id, prev_event_id, next_event_id, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, NULL, NULL, ?)"#,
            params![
                id.get(),
                story.id.get(),
                event.event_type.as_str(),
                event.title,
                event.date,
                event.description,
                event.content,
                event.in_plot,
                now_millis(),
            ],
        )?;
        event_map.insert(event.id, id);
    }

    // Second pass: links and tag sets, now that every event has a new id.
    for event in &events {
        let id = remap(&event_map, event.id, "plot event")?;
        let memory_ref = remap_link(&event_map, event.memory_ref)?;
        let prev = remap_link(&event_map, event.prev_event)?;
        let next = remap_link(&event_map, event.next_event)?;
        conn.execute(
            "UPDATE plot_events SET memory_ref_id = ?, prev_event_id = ?, next_event_id = ? WHERE id = ?",
            params![
                memory_ref.map(EventId::get),
                prev.map(EventId::get),
                next.map(EventId::get),
                id.get(),
            ],
        )?;
        for &tag in &event.tags {
            let tag = remap(&tag_map, tag, "tag")?;
            conn.execute(
                "INSERT INTO plot_event_tags (event_id, tag_id) VALUES (?, ?)",
                params![id.get(), tag.get()],
            )?;
        }
    }

    let summary = CloneSummary {
        story,
        tag_types: tag_type_map.len(),
        tags: tag_map.len(),
        characters,
        events: event_map.len(),
    };
    info!(
        template = %template,
        story_id = %summary.story.id,
        user_id = %user.id,
        tag_types = summary.tag_types,
        tags = summary.tags,
        characters = summary.characters,
        events = summary.events,
        "Template story cloned"
    );
    Ok(summary)
}

fn load_template(conn: &Connection, template: StoryId) -> StoreResult<Story> {
    let result = conn.query_row(
        &format!("SELECT {STORY_COLUMNS} FROM stories s WHERE s.id = ?"),
        params![template.get()],
        story_from_row,
    );
    match result {
        Ok(story) => Ok(story),
        Err(duckdb::Error::QueryReturnedNoRows) => Err(StoreError::InvalidState(format!(
            "template story {template} does not exist"
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Copy the character rows of `template`'s tags, image payload included.
fn clone_characters(
    conn: &Connection,
    template: StoryId,
    tag_map: &HashMap<TagId, TagId>,
) -> StoreResult<usize> {
    let mut stmt = conn.prepare(
        "SELECT c.tag_id, c.short_description, c.description, c.image, c.image_content_type \
         FROM characters c JOIN tags t ON t.id = c.tag_id WHERE t.story_id = ? ORDER BY c.id",
    )?;
    let rows = stmt
        .query_map(params![template.get()], |row| {
            Ok((
                TagId(row.get(0)?),
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<Vec<u8>>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    let count = rows.len();
    for (tag, short_description, description, image, content_type) in rows {
        let tag = remap(tag_map, tag, "tag")?;
        let id = next_id(conn, "characters_id_seq")?;
        conn.execute(
            r#"INSERT INTO characters (id, tag_id, short_description, description, image, image_content_type)
               VALUES (?, ?, ?, ?, ?, ?)"#,
            params![id, tag.get(), short_description, description, image, content_type],
        )?;
    }
    Ok(count)
}

fn remap<K>(map: &HashMap<K, K>, old: K, kind: &str) -> StoreResult<K>
where
    K: Copy + Eq + Hash + Display,
{
    map.get(&old).copied().ok_or_else(|| {
        StoreError::InvalidState(format!("template {kind} {old} has no copy in the clone"))
    })
}

fn remap_link(map: &HashMap<EventId, EventId>, old: Option<EventId>) -> StoreResult<Option<EventId>> {
    old.map(|id| remap(map, id, "plot event")).transpose()
}

//! Tag CRUD. Tags are story-scoped labels; their tag type decides whether
//! a character extension exists.

use super::characters::sync_character;
use super::helpers::{next_id, require_name, tag_from_row, TAG_COLUMNS};
use super::ownership::{resolve, resolve_in_story};
use super::PlotStore;
use crate::error::StoreResult;
use duckdb::{params, Connection};
use plotline_model::{Story, StoryId, Tag, TagFields, TagId, TagType};
use tracing::info;

impl PlotStore {
    /// Create a tag. Its tag type must belong to the same story.
    pub fn create_tag(&self, username: &str, story_id: StoryId, fields: &TagFields) -> StoreResult<Tag> {
        self.with_transaction(|conn| {
            resolve::<Story>(conn, story_id, username)?;
            let tag_type = resolve_in_story::<TagType>(conn, fields.tag_type_id, username, story_id)?;
            let name = require_name(&fields.name, "tag name")?;

            let id = TagId(next_id(conn, "tags_id_seq")?);
            conn.execute(
                "INSERT INTO tags (id, story_id, tag_type_id, name, color) VALUES (?, ?, ?, ?, ?)",
                params![id.get(), story_id.get(), tag_type.id.get(), name, fields.color.as_deref()],
            )?;
            sync_character(conn, id, &tag_type.name)?;

            info!(tag_id = %id, story_id = %story_id, tag_type = %tag_type.name, "Tag created");
            Ok(Tag {
                id,
                story_id,
                tag_type_id: tag_type.id,
                name: name.to_string(),
                color: fields.color.clone(),
            })
        })
    }

    pub fn get_tag(&self, username: &str, tag_id: TagId) -> StoreResult<Tag> {
        let conn = self.lock_conn();
        resolve::<Tag>(&conn, tag_id, username)
    }

    pub fn list_tags(&self, username: &str, story_id: StoryId) -> StoreResult<Vec<Tag>> {
        let conn = self.lock_conn();
        let story = resolve::<Story>(&conn, story_id, username)?;
        story_tags(&conn, story.id)
    }

    /// Update a tag. Moving it to another tag type re-evaluates the
    /// character rule; an existing character keeps its data if the new type
    /// still needs one.
    pub fn update_tag(&self, username: &str, tag_id: TagId, fields: &TagFields) -> StoreResult<Tag> {
        self.with_transaction(|conn| {
            let tag = resolve::<Tag>(conn, tag_id, username)?;
            let tag_type = resolve_in_story::<TagType>(conn, fields.tag_type_id, username, tag.story_id)?;
            let name = require_name(&fields.name, "tag name")?;

            conn.execute(
                "UPDATE tags SET tag_type_id = ?, name = ?, color = ? WHERE id = ?",
                params![tag_type.id.get(), name, fields.color.as_deref(), tag_id.get()],
            )?;
            sync_character(conn, tag_id, &tag_type.name)?;

            Ok(Tag {
                tag_type_id: tag_type.id,
                name: name.to_string(),
                color: fields.color.clone(),
                ..tag
            })
        })
    }

    /// Delete a tag, its event associations and its character extension.
    pub fn delete_tag(&self, username: &str, tag_id: TagId) -> StoreResult<()> {
        self.with_transaction(|conn| {
            resolve::<Tag>(conn, tag_id, username)?;
            delete_tag_rows(conn, tag_id)?;
            info!(tag_id = %tag_id, "Tag deleted");
            Ok(())
        })
    }
}

pub(crate) fn story_tags(conn: &Connection, story: StoryId) -> StoreResult<Vec<Tag>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TAG_COLUMNS} FROM tags t WHERE t.story_id = ? ORDER BY t.id"
    ))?;
    let tags = stmt
        .query_map(params![story.get()], tag_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

pub(crate) fn delete_tag_rows(conn: &Connection, tag: TagId) -> StoreResult<()> {
    conn.execute("DELETE FROM plot_event_tags WHERE tag_id = ?", params![tag.get()])?;
    conn.execute("DELETE FROM characters WHERE tag_id = ?", params![tag.get()])?;
    conn.execute("DELETE FROM tags WHERE id = ?", params![tag.get()])?;
    Ok(())
}

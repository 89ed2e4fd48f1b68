//! Tag type (category) operations.

use super::characters::sync_character;
use super::helpers::{next_id, require_name, tag_type_from_row, TAG_TYPE_COLUMNS};
use super::ownership::resolve;
use super::PlotStore;
use crate::error::StoreResult;
use duckdb::{params, Connection};
use plotline_model::{Story, StoryId, TagId, TagType, TagTypeId};
use tracing::info;

impl PlotStore {
    pub fn create_tag_type(
        &self,
        username: &str,
        story_id: StoryId,
        name: &str,
    ) -> StoreResult<TagType> {
        let conn = self.lock_conn();
        let story = resolve::<Story>(&conn, story_id, username)?;
        insert_tag_type(&conn, story.id, name)
    }

    pub fn get_tag_type(&self, username: &str, tag_type_id: TagTypeId) -> StoreResult<TagType> {
        let conn = self.lock_conn();
        resolve::<TagType>(&conn, tag_type_id, username)
    }

    pub fn list_tag_types(&self, username: &str, story_id: StoryId) -> StoreResult<Vec<TagType>> {
        let conn = self.lock_conn();
        let story = resolve::<Story>(&conn, story_id, username)?;
        story_tag_types(&conn, story.id)
    }

    /// Rename a tag type. Renaming to or from "Character" adds or drops the
    /// character extension of each of its tags.
    pub fn rename_tag_type(
        &self,
        username: &str,
        tag_type_id: TagTypeId,
        name: &str,
    ) -> StoreResult<TagType> {
        self.with_transaction(|conn| {
            let tag_type = resolve::<TagType>(conn, tag_type_id, username)?;
            let name = require_name(name, "tag type name")?;
            conn.execute(
                "UPDATE tag_types SET name = ? WHERE id = ?",
                params![name, tag_type_id.get()],
            )?;
            for tag in tags_of_type(conn, tag_type_id)? {
                sync_character(conn, tag, name)?;
            }
            Ok(TagType {
                name: name.to_string(),
                ..tag_type
            })
        })
    }

    /// Delete a tag type with all of its tags.
    pub fn delete_tag_type(&self, username: &str, tag_type_id: TagTypeId) -> StoreResult<()> {
        self.with_transaction(|conn| {
            resolve::<TagType>(conn, tag_type_id, username)?;
            let tags = tags_of_type(conn, tag_type_id)?;
            for &tag in &tags {
                super::tags::delete_tag_rows(conn, tag)?;
            }
            conn.execute("DELETE FROM tag_types WHERE id = ?", params![tag_type_id.get()])?;
            info!(tag_type_id = %tag_type_id, tags = tags.len(), "Tag type deleted");
            Ok(())
        })
    }
}

pub(crate) fn insert_tag_type(conn: &Connection, story: StoryId, name: &str) -> StoreResult<TagType> {
    let name = require_name(name, "tag type name")?;
    let id = TagTypeId(next_id(conn, "tag_types_id_seq")?);
    conn.execute(
        "INSERT INTO tag_types (id, story_id, name) VALUES (?, ?, ?)",
        params![id.get(), story.get(), name],
    )?;
    Ok(TagType {
        id,
        story_id: story,
        name: name.to_string(),
    })
}

pub(crate) fn story_tag_types(conn: &Connection, story: StoryId) -> StoreResult<Vec<TagType>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TAG_TYPE_COLUMNS} FROM tag_types tt WHERE tt.story_id = ? ORDER BY tt.id"
    ))?;
    let types = stmt
        .query_map(params![story.get()], tag_type_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(types)
}

fn tags_of_type(conn: &Connection, tag_type: TagTypeId) -> StoreResult<Vec<TagId>> {
    let mut stmt = conn.prepare("SELECT id FROM tags WHERE tag_type_id = ? ORDER BY id")?;
    let tags = stmt
        .query_map(params![tag_type.get()], |row| row.get::<_, i64>(0))?
        .map(|r| r.map(TagId))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

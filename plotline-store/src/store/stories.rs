//! Story CRUD. Deleting a story discards its whole graph at once; the chain
//! is not relinked because every node goes.

use super::helpers::{next_id, now_millis, require_name, story_from_row, STORY_COLUMNS};
use super::ownership::resolve;
use super::tag_types::insert_tag_type;
use super::users::user_by_name;
use super::PlotStore;
use crate::error::{StoreError, StoreResult};
use duckdb::{params, Connection};
use plotline_model::{Story, StoryFields, StoryId, UserId};
use tracing::info;

impl PlotStore {
    /// Create a story together with the configured default tag types.
    pub fn create_story(&self, username: &str, fields: &StoryFields) -> StoreResult<Story> {
        let default_types = self.config().default_tag_types.clone();
        self.with_transaction(|conn| {
            let user = user_by_name(conn, username)?
                .ok_or_else(|| StoreError::not_found("user", username))?;
            let story = insert_story(conn, user.id, fields)?;
            for name in &default_types {
                insert_tag_type(conn, story.id, name)?;
            }
            info!(story_id = %story.id, username, "Story created");
            Ok(story)
        })
    }

    pub fn get_story(&self, username: &str, story_id: StoryId) -> StoreResult<Story> {
        let conn = self.lock_conn();
        resolve::<Story>(&conn, story_id, username)
    }

    /// All stories of a user, oldest first.
    pub fn list_stories(&self, username: &str) -> StoreResult<Vec<Story>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {STORY_COLUMNS} FROM stories s JOIN users u ON u.id = s.user_id \
             WHERE u.username = ? ORDER BY s.id"
        ))?;
        let stories = stmt
            .query_map(params![username], story_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stories)
    }

    pub fn update_story(
        &self,
        username: &str,
        story_id: StoryId,
        fields: &StoryFields,
    ) -> StoreResult<Story> {
        let conn = self.lock_conn();
        let story = resolve::<Story>(&conn, story_id, username)?;
        let title = require_name(&fields.title, "story title")?;
        let now = now_millis();
        conn.execute(
            "UPDATE stories SET title = ?, description = ?, date_format = ?, modified_at = ? WHERE id = ?",
            params![
                title,
                fields.description.as_deref(),
                fields.date_format.as_deref(),
                now,
                story_id.get(),
            ],
        )?;
        Ok(Story {
            title: title.to_string(),
            description: fields.description.clone(),
            date_format: fields.date_format.clone(),
            modified_at: now,
            ..story
        })
    }

    /// Delete a story and everything in it.
    pub fn delete_story(&self, username: &str, story_id: StoryId) -> StoreResult<()> {
        self.with_transaction(|conn| {
            resolve::<Story>(conn, story_id, username)?;
            delete_story_graph(conn, story_id)?;
            info!(story_id = %story_id, "Story deleted");
            Ok(())
        })
    }
}

pub(crate) fn insert_story(
    conn: &Connection,
    user: UserId,
    fields: &StoryFields,
) -> StoreResult<Story> {
    let title = require_name(&fields.title, "story title")?;
    let id = StoryId(next_id(conn, "stories_id_seq")?);
    let now = now_millis();
    conn.execute(
        r#"INSERT INTO stories (id, user_id, title, description, date_format, created_at, modified_at)
           VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        params![
            id.get(),
            user.get(),
            title,
            fields.description.as_deref(),
            fields.date_format.as_deref(),
            now,
            now,
        ],
    )?;
    Ok(Story {
        id,
        user_id: user,
        title: title.to_string(),
        description: fields.description.clone(),
        date_format: fields.date_format.clone(),
        created_at: now,
        modified_at: now,
    })
}

/// Remove every row belonging to a story: event-tag links, characters,
/// tags, tag types, events and the story itself.
pub(crate) fn delete_story_graph(conn: &Connection, story: StoryId) -> StoreResult<()> {
    let id = story.get();
    conn.execute(
        "DELETE FROM plot_event_tags WHERE event_id IN (SELECT id FROM plot_events WHERE story_id = ?)",
        params![id],
    )?;
    conn.execute(
        "DELETE FROM plot_event_tags WHERE tag_id IN (SELECT id FROM tags WHERE story_id = ?)",
        params![id],
    )?;
    conn.execute(
        "DELETE FROM characters WHERE tag_id IN (SELECT id FROM tags WHERE story_id = ?)",
        params![id],
    )?;
    conn.execute("DELETE FROM tags WHERE story_id = ?", params![id])?;
    conn.execute("DELETE FROM tag_types WHERE story_id = ?", params![id])?;
    conn.execute("DELETE FROM plot_events WHERE story_id = ?", params![id])?;
    conn.execute("DELETE FROM stories WHERE id = ?", params![id])?;
    Ok(())
}

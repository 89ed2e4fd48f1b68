//! Character extensions of tags.
//!
//! The rows are created and removed only by [`sync_character`]; the public
//! operations here edit an existing extension.

use super::helpers::{next_id, require_name};
use super::ownership::resolve;
use super::PlotStore;
use crate::error::{StoreError, StoreResult};
use duckdb::{params, Connection};
use plotline_model::{requires_character, Character, CharacterId, CharacterImage, StoryId, Tag, TagId};
use tracing::debug;

const CHARACTER_COLUMNS: &str = "c.id, c.tag_id, t.name, c.short_description, c.description, \
     c.image IS NOT NULL";

impl PlotStore {
    pub fn get_character(&self, username: &str, tag_id: TagId) -> StoreResult<Character> {
        let conn = self.lock_conn();
        resolve::<Tag>(&conn, tag_id, username)?;
        load_character(&conn, tag_id)
    }

    /// Edit a character. `name` renames the owning tag.
    pub fn update_character(
        &self,
        username: &str,
        tag_id: TagId,
        name: &str,
        short_description: Option<&str>,
        description: Option<&str>,
    ) -> StoreResult<Character> {
        self.with_transaction(|conn| {
            resolve::<Tag>(conn, tag_id, username)?;
            load_character(conn, tag_id)?;
            let name = require_name(name, "character name")?;

            conn.execute("UPDATE tags SET name = ? WHERE id = ?", params![name, tag_id.get()])?;
            conn.execute(
                "UPDATE characters SET short_description = ?, description = ? WHERE tag_id = ?",
                params![short_description, description, tag_id.get()],
            )?;
            load_character(conn, tag_id)
        })
    }

    pub fn set_character_image(
        &self,
        username: &str,
        tag_id: TagId,
        bytes: &[u8],
        content_type: &str,
    ) -> StoreResult<()> {
        let conn = self.lock_conn();
        resolve::<Tag>(&conn, tag_id, username)?;
        load_character(&conn, tag_id)?;
        if bytes.is_empty() {
            return Err(StoreError::InvalidInput("character image is empty".into()));
        }
        let content_type = require_name(content_type, "image content type")?;

        conn.execute(
            "UPDATE characters SET image = ?, image_content_type = ? WHERE tag_id = ?",
            params![bytes.to_vec(), content_type, tag_id.get()],
        )?;
        debug!(tag_id = %tag_id, size = bytes.len(), "Character image stored");
        Ok(())
    }

    pub fn character_image(&self, username: &str, tag_id: TagId) -> StoreResult<CharacterImage> {
        let conn = self.lock_conn();
        resolve::<Tag>(&conn, tag_id, username)?;
        load_character(&conn, tag_id)?;

        let image = conn.query_row(
            "SELECT image_content_type, image FROM characters WHERE tag_id = ? AND image IS NOT NULL",
            params![tag_id.get()],
            |row| {
                Ok(CharacterImage {
                    content_type: row.get(0)?,
                    bytes: row.get(1)?,
                })
            },
        );
        match image {
            Ok(image) => Ok(image),
            Err(duckdb::Error::QueryReturnedNoRows) => {
                Err(StoreError::not_found("character image", tag_id))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Bring a tag's character extension in line with its tag type: create the
/// row if the type needs one and it is missing, drop it if the type does not.
pub(crate) fn sync_character(conn: &Connection, tag: TagId, tag_type_name: &str) -> StoreResult<()> {
    let existing = match conn.query_row(
        "SELECT id FROM characters WHERE tag_id = ?",
        params![tag.get()],
        |row| row.get::<_, i64>(0),
    ) {
        Ok(id) => Some(id),
        Err(duckdb::Error::QueryReturnedNoRows) => None,
        Err(e) => return Err(e.into()),
    };

    match (requires_character(tag_type_name), existing) {
        (true, None) => {
            let id = next_id(conn, "characters_id_seq")?;
            conn.execute(
                "INSERT INTO characters (id, tag_id) VALUES (?, ?)",
                params![id, tag.get()],
            )?;
            debug!(tag_id = %tag, character_id = id, "Character extension created");
        }
        (false, Some(id)) => {
            conn.execute("DELETE FROM characters WHERE id = ?", params![id])?;
            debug!(tag_id = %tag, character_id = id, "Character extension removed");
        }
        _ => {}
    }
    Ok(())
}

pub(crate) fn load_character(conn: &Connection, tag: TagId) -> StoreResult<Character> {
    let result = conn.query_row(
        &format!(
            "SELECT {CHARACTER_COLUMNS} FROM characters c JOIN tags t ON t.id = c.tag_id \
             WHERE c.tag_id = ?"
        ),
        params![tag.get()],
        character_from_row,
    );
    match result {
        Ok(character) => Ok(character),
        Err(duckdb::Error::QueryReturnedNoRows) => Err(StoreError::not_found("character", tag)),
        Err(e) => Err(e.into()),
    }
}

/// Characters of a story ordered by tag id.
pub(crate) fn story_characters(
    conn: &Connection,
    story: StoryId,
) -> StoreResult<Vec<Character>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CHARACTER_COLUMNS} FROM characters c JOIN tags t ON t.id = c.tag_id \
         WHERE t.story_id = ? ORDER BY t.id"
    ))?;
    let characters = stmt
        .query_map(params![story.get()], character_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(characters)
}

fn character_from_row(row: &duckdb::Row<'_>) -> duckdb::Result<Character> {
    Ok(Character {
        id: CharacterId(row.get(0)?),
        tag_id: TagId(row.get(1)?),
        name: row.get(2)?,
        short_description: row.get(3)?,
        description: row.get(4)?,
        has_image: row.get(5)?,
    })
}

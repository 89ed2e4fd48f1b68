//! Shared helper functions for store operations.

use crate::error::{StoreError, StoreResult};
use duckdb::{params, Connection, Row};
use plotline_model::{
    EventId, EventType, PlotEvent, Story, StoryId, Tag, TagId, TagType, TagTypeId, UserId,
};
use std::collections::HashMap;

pub(crate) const STORY_COLUMNS: &str =
    "s.id, s.user_id, s.title, s.description, s.date_format, s.created_at, s.modified_at";

pub(crate) const TAG_TYPE_COLUMNS: &str = "tt.id, tt.story_id, tt.name";

pub(crate) const TAG_COLUMNS: &str = "t.id, t.story_id, t.tag_type_id, t.name, t.color";

pub(crate) const EVENT_COLUMNS: &str = "e.id, e.story_id, e.event_type, e.title, e.event_date, \
     e.description, e.content, e.in_plot, e.memory_ref_id, e.prev_event_id, e.next_event_id";

/// Next value of a schema sequence.
pub(crate) fn next_id(conn: &Connection, sequence: &str) -> StoreResult<i64> {
    let id = conn.query_row(&format!("SELECT nextval('{sequence}')"), [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(id)
}

/// Current time in milliseconds since Unix epoch.
pub(crate) fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Trimmed, non-empty name or an `InvalidInput` error naming `what`.
pub(crate) fn require_name<'a>(value: &'a str, what: &str) -> StoreResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidInput(format!("{what} must not be blank")));
    }
    Ok(trimmed)
}

pub(crate) fn story_from_row(row: &Row<'_>) -> duckdb::Result<Story> {
    Ok(Story {
        id: StoryId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        date_format: row.get(4)?,
        created_at: row.get(5)?,
        modified_at: row.get(6)?,
    })
}

pub(crate) fn tag_type_from_row(row: &Row<'_>) -> duckdb::Result<TagType> {
    Ok(TagType {
        id: TagTypeId(row.get(0)?),
        story_id: StoryId(row.get(1)?),
        name: row.get(2)?,
    })
}

pub(crate) fn tag_from_row(row: &Row<'_>) -> duckdb::Result<Tag> {
    Ok(Tag {
        id: TagId(row.get(0)?),
        story_id: StoryId(row.get(1)?),
        tag_type_id: TagTypeId(row.get(2)?),
        name: row.get(3)?,
        color: row.get(4)?,
    })
}

/// Map an `EVENT_COLUMNS` row. Tags are left empty; see [`load_event_tags`].
pub(crate) fn event_from_row(row: &Row<'_>) -> duckdb::Result<PlotEvent> {
    Ok(PlotEvent {
        id: EventId(row.get(0)?),
        story_id: StoryId(row.get(1)?),
        event_type: EventType::parse(&row.get::<_, String>(2)?),
        title: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
        content: row.get(6)?,
        in_plot: row.get(7)?,
        memory_ref: row.get::<_, Option<i64>>(8)?.map(EventId),
        prev_event: row.get::<_, Option<i64>>(9)?.map(EventId),
        next_event: row.get::<_, Option<i64>>(10)?.map(EventId),
        tags: Vec::new(),
    })
}

/// Tag ids attached to one event, ascending.
pub(crate) fn load_event_tags(conn: &Connection, event: EventId) -> StoreResult<Vec<TagId>> {
    let mut stmt =
        conn.prepare("SELECT tag_id FROM plot_event_tags WHERE event_id = ? ORDER BY tag_id")?;
    let tags = stmt
        .query_map(params![event.get()], |row| row.get::<_, i64>(0))?
        .map(|r| r.map(TagId))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

/// Tag ids of every event in a story, grouped by event.
pub(crate) fn load_story_event_tags(
    conn: &Connection,
    story: StoryId,
) -> StoreResult<HashMap<EventId, Vec<TagId>>> {
    let mut stmt = conn.prepare(
        "SELECT pet.event_id, pet.tag_id FROM plot_event_tags pet \
         JOIN plot_events e ON e.id = pet.event_id \
         WHERE e.story_id = ? ORDER BY pet.event_id, pet.tag_id",
    )?;
    let pairs = stmt
        .query_map(params![story.get()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut grouped: HashMap<EventId, Vec<TagId>> = HashMap::new();
    for (event, tag) in pairs {
        grouped.entry(EventId(event)).or_default().push(TagId(tag));
    }
    Ok(grouped)
}

/// Load one event with its tags, or `NotFound`.
pub(crate) fn load_event(conn: &Connection, id: EventId) -> StoreResult<PlotEvent> {
    let result = conn.query_row(
        &format!("SELECT {EVENT_COLUMNS} FROM plot_events e WHERE e.id = ?"),
        params![id.get()],
        event_from_row,
    );
    let mut event = match result {
        Ok(event) => event,
        Err(duckdb::Error::QueryReturnedNoRows) => {
            return Err(StoreError::not_found("plot event", id));
        }
        Err(e) => return Err(e.into()),
    };
    event.tags = load_event_tags(conn, id)?;
    Ok(event)
}

/// All events of a story in natural (creation) order, tags attached.
pub(crate) fn load_story_events(conn: &Connection, story: StoryId) -> StoreResult<Vec<PlotEvent>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM plot_events e WHERE e.story_id = ? ORDER BY e.id"
    ))?;
    let mut events = stmt
        .query_map(params![story.get()], event_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    let mut tags = load_story_event_tags(conn, story)?;
    for event in &mut events {
        event.tags = tags.remove(&event.id).unwrap_or_default();
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_name_trims() {
        assert_eq!(require_name("  Ada ", "tag name").unwrap(), "Ada");
        assert!(matches!(
            require_name("   ", "tag name"),
            Err(StoreError::InvalidInput(_))
        ));
    }
}

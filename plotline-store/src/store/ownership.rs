//! Ownership guard: every record reached by id is checked against the
//! acting user through the User → Story → record path before use.

use super::helpers::{
    event_from_row, load_event_tags, story_from_row, tag_from_row, tag_type_from_row,
    EVENT_COLUMNS, STORY_COLUMNS, TAG_COLUMNS, TAG_TYPE_COLUMNS,
};
use super::PlotStore;
use crate::error::{StoreError, StoreResult};
use duckdb::{params, Connection, Row};
use plotline_model::{EventId, PlotEvent, Story, StoryId, Tag, TagId, TagType, TagTypeId};

mod sealed {
    pub trait Sealed {}
    impl Sealed for plotline_model::Story {}
    impl Sealed for plotline_model::TagType {}
    impl Sealed for plotline_model::Tag {}
    impl Sealed for plotline_model::PlotEvent {}
}

/// A record that belongs to exactly one story and, through it, one user.
pub trait OwnedRecord: sealed::Sealed + Sized {
    /// Human-readable record kind used in errors.
    const KIND: &'static str;

    type Id: Copy + std::fmt::Display;

    /// Load the record together with its owner's username.
    fn load_with_owner(conn: &Connection, id: Self::Id) -> StoreResult<Option<(Self, String)>>;

    fn story_id(&self) -> StoryId;
}

/// Resolve `id` for `username`: `NotFound` if absent, `Unauthorized` if the
/// owning story belongs to someone else.
pub(crate) fn resolve<R: OwnedRecord>(
    conn: &Connection,
    id: R::Id,
    username: &str,
) -> StoreResult<R> {
    match R::load_with_owner(conn, id)? {
        None => Err(StoreError::not_found(R::KIND, id)),
        Some((record, owner)) if owner == username => Ok(record),
        Some(_) => Err(StoreError::unauthorized(R::KIND, id)),
    }
}

/// Like [`resolve`], and additionally require the record to sit in `story`.
/// A record from another story of the same user is still `Unauthorized`.
pub(crate) fn resolve_in_story<R: OwnedRecord>(
    conn: &Connection,
    id: R::Id,
    username: &str,
    story: StoryId,
) -> StoreResult<R> {
    let record = resolve::<R>(conn, id, username)?;
    if record.story_id() != story {
        return Err(StoreError::unauthorized(R::KIND, id));
    }
    Ok(record)
}

fn query_owned<T>(
    conn: &Connection,
    sql: &str,
    id: i64,
    map: impl FnOnce(&Row<'_>) -> duckdb::Result<T>,
    owner_column: usize,
) -> StoreResult<Option<(T, String)>> {
    let result = conn.query_row(sql, params![id], |row| {
        Ok((map(row)?, row.get::<_, String>(owner_column)?))
    });
    match result {
        Ok(found) => Ok(Some(found)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl OwnedRecord for Story {
    const KIND: &'static str = "story";
    type Id = StoryId;

    fn load_with_owner(conn: &Connection, id: StoryId) -> StoreResult<Option<(Self, String)>> {
        let sql = format!(
            "SELECT {STORY_COLUMNS}, u.username FROM stories s \
             JOIN users u ON u.id = s.user_id WHERE s.id = ?"
        );
        query_owned(conn, &sql, id.get(), story_from_row, 7)
    }

    fn story_id(&self) -> StoryId {
        self.id
    }
}

impl OwnedRecord for TagType {
    const KIND: &'static str = "tag type";
    type Id = TagTypeId;

    fn load_with_owner(conn: &Connection, id: TagTypeId) -> StoreResult<Option<(Self, String)>> {
        let sql = format!(
            "SELECT {TAG_TYPE_COLUMNS}, u.username FROM tag_types tt \
             JOIN stories s ON s.id = tt.story_id \
             JOIN users u ON u.id = s.user_id WHERE tt.id = ?"
        );
        query_owned(conn, &sql, id.get(), tag_type_from_row, 3)
    }

    fn story_id(&self) -> StoryId {
        self.story_id
    }
}

impl OwnedRecord for Tag {
    const KIND: &'static str = "tag";
    type Id = TagId;

    fn load_with_owner(conn: &Connection, id: TagId) -> StoreResult<Option<(Self, String)>> {
        let sql = format!(
            "SELECT {TAG_COLUMNS}, u.username FROM tags t \
             JOIN stories s ON s.id = t.story_id \
             JOIN users u ON u.id = s.user_id WHERE t.id = ?"
        );
        query_owned(conn, &sql, id.get(), tag_from_row, 5)
    }

    fn story_id(&self) -> StoryId {
        self.story_id
    }
}

impl OwnedRecord for PlotEvent {
    const KIND: &'static str = "plot event";
    type Id = EventId;

    fn load_with_owner(conn: &Connection, id: EventId) -> StoreResult<Option<(Self, String)>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS}, u.username FROM plot_events e \
             JOIN stories s ON s.id = e.story_id \
             JOIN users u ON u.id = s.user_id WHERE e.id = ?"
        );
        let found = query_owned(conn, &sql, id.get(), event_from_row, 11)?;
        match found {
            Some((mut event, owner)) => {
                event.tags = load_event_tags(conn, id)?;
                Ok(Some((event, owner)))
            }
            None => Ok(None),
        }
    }

    fn story_id(&self) -> StoryId {
        self.story_id
    }
}

impl PlotStore {
    /// Resolve any owned record by id for `username`.
    ///
    /// ```no_run
    /// # use plotline_store::PlotStore;
    /// # use plotline_model::{PlotEvent, EventId};
    /// # let store = PlotStore::open_in_memory().unwrap();
    /// let event: PlotEvent = store.resolve(EventId(4), "ann").unwrap();
    /// ```
    pub fn resolve<R: OwnedRecord>(&self, id: R::Id, username: &str) -> StoreResult<R> {
        let conn = self.lock_conn();
        resolve::<R>(&conn, id, username)
    }
}

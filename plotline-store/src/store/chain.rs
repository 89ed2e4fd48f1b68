//! Narrative chain primitives.
//!
//! The chain of a story is the doubly-linked path over its in-plot events,
//! stored in `prev_event_id` / `next_event_id`. These functions are the only
//! writers of those columns outside of cloning and story deletion. They take
//! a connection that is already inside a transaction; each one leaves the
//! chain a single simple path with exactly one head, provided it was one on
//! entry.
//!
//! Writes always clear a link before another node claims the same
//! neighbour, so no intermediate row state has two nodes pointing at one
//! successor or predecessor.

use crate::error::{StoreError, StoreResult};
use duckdb::{params, Connection};
use plotline_model::{EventId, StoryId};
use tracing::debug;

/// Chain-relevant columns of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Links {
    pub id: EventId,
    pub story_id: StoryId,
    pub in_plot: bool,
    pub prev: Option<EventId>,
    pub next: Option<EventId>,
}

pub(crate) fn links(conn: &Connection, id: EventId) -> StoreResult<Links> {
    let result = conn.query_row(
        "SELECT story_id, in_plot, prev_event_id, next_event_id FROM plot_events WHERE id = ?",
        params![id.get()],
        |row| {
            Ok(Links {
                id,
                story_id: StoryId(row.get(0)?),
                in_plot: row.get(1)?,
                prev: row.get::<_, Option<i64>>(2)?.map(EventId),
                next: row.get::<_, Option<i64>>(3)?.map(EventId),
            })
        },
    );
    match result {
        Ok(links) => Ok(links),
        Err(duckdb::Error::QueryReturnedNoRows) => Err(StoreError::not_found("plot event", id)),
        Err(e) => Err(e.into()),
    }
}

fn set_prev(conn: &Connection, id: EventId, prev: Option<EventId>) -> StoreResult<()> {
    conn.execute(
        "UPDATE plot_events SET prev_event_id = ? WHERE id = ?",
        params![prev.map(EventId::get), id.get()],
    )?;
    debug!(event = %id, prev = ?prev, "prev link set");
    Ok(())
}

fn set_next(conn: &Connection, id: EventId, next: Option<EventId>) -> StoreResult<()> {
    conn.execute(
        "UPDATE plot_events SET next_event_id = ? WHERE id = ?",
        params![next.map(EventId::get), id.get()],
    )?;
    debug!(event = %id, next = ?next, "next link set");
    Ok(())
}

/// The head of a story's chain, ignoring `excluding` (an event that is being
/// positioned and therefore temporarily looks like a head itself).
pub(crate) fn find_head(
    conn: &Connection,
    story: StoryId,
    excluding: EventId,
) -> StoreResult<Option<EventId>> {
    let result = conn.query_row(
        "SELECT id FROM plot_events \
         WHERE story_id = ? AND in_plot AND prev_event_id IS NULL AND id <> ? \
         ORDER BY id LIMIT 1",
        params![story.get(), excluding.get()],
        |row| row.get::<_, i64>(0),
    );
    match result {
        Ok(id) => Ok(Some(EventId(id))),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Take `id` out of the chain, linking its former neighbours directly to
/// each other. A head's successor becomes the new head; a tail's
/// predecessor becomes the new tail. Afterwards `id` has no links.
pub(crate) fn detach(conn: &Connection, id: EventId) -> StoreResult<()> {
    let node = links(conn, id)?;
    if node.prev.is_none() && node.next.is_none() {
        return Ok(());
    }

    set_prev(conn, id, None)?;
    set_next(conn, id, None)?;
    if let Some(prev) = node.prev {
        set_next(conn, prev, node.next)?;
    }
    if let Some(next) = node.next {
        set_prev(conn, next, node.prev)?;
    }
    debug!(event = %id, prev = ?node.prev, next = ?node.next, "event detached from chain");
    Ok(())
}

/// Insert the detached, in-plot event `id` into its story's chain.
///
/// `after = None` makes it the new head (or a singleton chain when the story
/// has none). `after = Some(p)` places it directly behind `p`, in front of
/// whatever followed `p`. The caller has already checked that `p` is visible
/// to the acting user; this function checks it is a chained event of the
/// same story.
pub(crate) fn attach(
    conn: &Connection,
    id: EventId,
    after: Option<EventId>,
) -> StoreResult<()> {
    let node = links(conn, id)?;
    if !node.in_plot {
        return Err(StoreError::InvalidState(format!(
            "event {id} is not in plot and cannot join the chain"
        )));
    }
    if node.prev.is_some() || node.next.is_some() {
        return Err(StoreError::InvalidState(format!(
            "event {id} is still linked and must be detached first"
        )));
    }

    let Some(prev_id) = after else {
        if let Some(head) = find_head(conn, node.story_id, id)? {
            set_next(conn, id, Some(head))?;
            set_prev(conn, head, Some(id))?;
        }
        debug!(event = %id, story = %node.story_id, "event placed at chain head");
        return Ok(());
    };

    if prev_id == id {
        return Err(StoreError::InvalidState(format!(
            "event {id} cannot follow itself"
        )));
    }
    let prev = links(conn, prev_id)?;
    if prev.story_id != node.story_id {
        return Err(StoreError::unauthorized("plot event", prev_id));
    }
    if !prev.in_plot {
        return Err(StoreError::InvalidState(format!(
            "event {prev_id} is not in plot and cannot precede another event"
        )));
    }

    let old_next = prev.next;
    if let Some(next) = old_next {
        set_prev(conn, next, None)?;
    }
    set_next(conn, prev_id, Some(id))?;
    set_prev(conn, id, Some(prev_id))?;
    if let Some(next) = old_next {
        set_next(conn, id, Some(next))?;
        set_prev(conn, next, Some(id))?;
    }
    debug!(event = %id, prev = %prev_id, next = ?old_next, "event inserted into chain");
    Ok(())
}

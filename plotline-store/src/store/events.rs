//! Plot event operations: insert, reposition, delete and tag changes.
//!
//! Every operation resolves ownership first and runs in one transaction;
//! chain rewrites go through [`chain`](super::chain).

use super::chain;
use super::helpers::{load_event, next_id, now_millis, require_name};
use super::ownership::{resolve, resolve_in_story};
use super::PlotStore;
use crate::config::MemoryRefPolicy;
use crate::error::{StoreError, StoreResult};
use duckdb::{params, Connection};
use plotline_model::{EventDraft, EventId, PlotEvent, Story, StoryId, Tag, TagId};
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::info;

impl PlotStore {
    /// Create an event in `story_id` and, if it is in plot, splice it into
    /// the chain behind `draft.prev_event` (or at the head when `None`).
    pub fn insert_event(
        &self,
        username: &str,
        story_id: StoryId,
        draft: &EventDraft,
    ) -> StoreResult<PlotEvent> {
        self.with_transaction(|conn| {
            let story = resolve::<Story>(conn, story_id, username)?;
            let title = check_draft(draft)?;
            check_references(conn, username, story.id, None, draft)?;
            let tags = check_tags(conn, username, story.id, &draft.tags)?;

            let id = EventId(next_id(conn, "plot_events_id_seq")?);
            let fields = &draft.fields;
            conn.execute(
                r#"INSERT INTO plot_events (id, story_id, event_type, title, event_date, description,
                       content, in_plot, memory_ref_id, prev_event_id, next_event_id, created_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, NULL, ?)"#,
                params![
                    id.get(),
                    story.id.get(),
                    fields.event_type.as_str(),
                    title,
                    fields.date.as_deref(),
                    fields.description.as_deref(),
                    fields.content.as_deref(),
                    fields.in_plot,
                    draft.memory_ref.map(EventId::get),
                    now_millis(),
                ],
            )?;

            if fields.in_plot {
                chain::attach(conn, id, draft.prev_event)?;
            }
            replace_tags(conn, id, &tags)?;

            info!(event_id = %id, story_id = %story.id, in_plot = fields.in_plot, "Plot event created");
            load_event(conn, id)
        })
    }

    /// Rewrite an event's fields, memory reference and tag set, and move it to
    /// the chain position after `draft.prev_event`.
    ///
    /// The event is first detached from its current neighbours, so passing
    /// its current predecessor leaves the chain unchanged. Setting
    /// `in_plot = false` removes it from the chain for good.
    pub fn update_event(
        &self,
        username: &str,
        event_id: EventId,
        draft: &EventDraft,
    ) -> StoreResult<PlotEvent> {
        self.with_transaction(|conn| {
            let existing = resolve::<PlotEvent>(conn, event_id, username)?;
            let title = check_draft(draft)?;
            check_references(conn, username, existing.story_id, Some(event_id), draft)?;
            let tags = check_tags(conn, username, existing.story_id, &draft.tags)?;

            if existing.in_plot {
                chain::detach(conn, event_id)?;
            }

            let fields = &draft.fields;
            conn.execute(
                r#"UPDATE plot_events SET event_type = ?, title = ?, event_date = ?, description = ?,
                       content = ?, in_plot = ?, memory_ref_id = ?
                   WHERE id = ?"#,
                params![
                    fields.event_type.as_str(),
                    title,
                    fields.date.as_deref(),
                    fields.description.as_deref(),
                    fields.content.as_deref(),
                    fields.in_plot,
                    draft.memory_ref.map(EventId::get),
                    event_id.get(),
                ],
            )?;

            if fields.in_plot {
                chain::attach(conn, event_id, draft.prev_event)?;
            }
            replace_tags(conn, event_id, &tags)?;

            info!(event_id = %event_id, in_plot = fields.in_plot, "Plot event updated");
            load_event(conn, event_id)
        })
    }

    /// Fetch one event.
    pub fn get_event(&self, username: &str, event_id: EventId) -> StoreResult<PlotEvent> {
        let conn = self.lock_conn();
        resolve::<PlotEvent>(&conn, event_id, username)
    }

    /// Delete an event, relinking its chain neighbours to each other.
    ///
    /// Events that point at it through `memory_ref` are handled per
    /// [`MemoryRefPolicy`].
    pub fn delete_event(&self, username: &str, event_id: EventId) -> StoreResult<()> {
        let policy = self.config().memory_ref_policy;
        self.with_transaction(|conn| {
            resolve::<PlotEvent>(conn, event_id, username)?;

            let victims = match policy {
                MemoryRefPolicy::Detach => vec![event_id],
                MemoryRefPolicy::Cascade => memory_referrers_closure(conn, event_id)?,
            };
            for &victim in &victims {
                chain::detach(conn, victim)?;
            }
            for &victim in &victims {
                delete_event_row(conn, victim)?;
            }

            info!(event_id = %event_id, removed = victims.len(), ?policy, "Plot event deleted");
            Ok(())
        })
    }

    /// Attach a tag of the same story to an event. Attaching twice is a no-op.
    pub fn add_tag(&self, username: &str, event_id: EventId, tag_id: TagId) -> StoreResult<PlotEvent> {
        self.with_transaction(|conn| {
            let event = resolve::<PlotEvent>(conn, event_id, username)?;
            resolve_in_story::<Tag>(conn, tag_id, username, event.story_id)?;

            if !event.tags.contains(&tag_id) {
                conn.execute(
                    "INSERT INTO plot_event_tags (event_id, tag_id) VALUES (?, ?)",
                    params![event_id.get(), tag_id.get()],
                )?;
            }
            load_event(conn, event_id)
        })
    }

    /// Detach a tag of the same story from an event.
    pub fn remove_tag(
        &self,
        username: &str,
        event_id: EventId,
        tag_id: TagId,
    ) -> StoreResult<PlotEvent> {
        self.with_transaction(|conn| {
            let event = resolve::<PlotEvent>(conn, event_id, username)?;
            resolve_in_story::<Tag>(conn, tag_id, username, event.story_id)?;

            conn.execute(
                "DELETE FROM plot_event_tags WHERE event_id = ? AND tag_id = ?",
                params![event_id.get(), tag_id.get()],
            )?;
            load_event(conn, event_id)
        })
    }
}

/// Validate scalar fields; returns the trimmed title.
fn check_draft(draft: &EventDraft) -> StoreResult<&str> {
    let title = require_name(&draft.fields.title, "event title")?;
    if draft.prev_event.is_some() && !draft.fields.in_plot {
        return Err(StoreError::InvalidState(
            "an event that is not in plot cannot be positioned in the chain".to_string(),
        ));
    }
    Ok(title)
}

/// Resolve `prev_event` and `memory_ref` inside `story`. `own_id` is the id
/// of the event being updated, which may reference neither slot.
fn check_references(
    conn: &Connection,
    username: &str,
    story: StoryId,
    own_id: Option<EventId>,
    draft: &EventDraft,
) -> StoreResult<()> {
    if let Some(prev) = draft.prev_event {
        if Some(prev) == own_id {
            return Err(StoreError::InvalidState(format!(
                "event {prev} cannot follow itself"
            )));
        }
        let prev_event = resolve_in_story::<PlotEvent>(conn, prev, username, story)?;
        if !prev_event.in_plot {
            return Err(StoreError::InvalidState(format!(
                "event {prev} is not in plot and cannot precede another event"
            )));
        }
    }
    if let Some(memory) = draft.memory_ref {
        if Some(memory) == own_id {
            return Err(StoreError::InvalidState(format!(
                "event {memory} cannot reference itself"
            )));
        }
        resolve_in_story::<PlotEvent>(conn, memory, username, story)?;
    }
    Ok(())
}

/// Resolve every tag id inside `story` before anything is written.
fn check_tags(
    conn: &Connection,
    username: &str,
    story: StoryId,
    tags: &[TagId],
) -> StoreResult<BTreeSet<TagId>> {
    let wanted: BTreeSet<TagId> = tags.iter().copied().collect();
    for &tag in &wanted {
        resolve_in_story::<Tag>(conn, tag, username, story)?;
    }
    Ok(wanted)
}

/// Make the event's tag set exactly `wanted`, touching only the rows that
/// change.
fn replace_tags(conn: &Connection, event: EventId, wanted: &BTreeSet<TagId>) -> StoreResult<()> {
    let current: BTreeSet<TagId> = super::helpers::load_event_tags(conn, event)?
        .into_iter()
        .collect();

    for stale in current.difference(wanted) {
        conn.execute(
            "DELETE FROM plot_event_tags WHERE event_id = ? AND tag_id = ?",
            params![event.get(), stale.get()],
        )?;
    }
    for added in wanted.difference(&current) {
        conn.execute(
            "INSERT INTO plot_event_tags (event_id, tag_id) VALUES (?, ?)",
            params![event.get(), added.get()],
        )?;
    }
    Ok(())
}

/// `root` plus every event reaching it through a chain of memory
/// references. Memory references may form cycles.
fn memory_referrers_closure(conn: &Connection, root: EventId) -> StoreResult<Vec<EventId>> {
    let mut stmt = conn.prepare("SELECT id FROM plot_events WHERE memory_ref_id = ? ORDER BY id")?;
    let mut seen: HashSet<EventId> = HashSet::from([root]);
    let mut order = vec![root];
    let mut queue = VecDeque::from([root]);

    while let Some(current) = queue.pop_front() {
        let referrers = stmt
            .query_map(params![current.get()], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        for referrer in referrers.into_iter().map(EventId) {
            if seen.insert(referrer) {
                order.push(referrer);
                queue.push_back(referrer);
            }
        }
    }
    Ok(order)
}

/// Remove an already detached event, its tag rows, and clear memory
/// references that still point at it.
pub(crate) fn delete_event_row(conn: &Connection, id: EventId) -> StoreResult<()> {
    conn.execute(
        "UPDATE plot_events SET memory_ref_id = NULL WHERE memory_ref_id = ?",
        params![id.get()],
    )?;
    conn.execute(
        "DELETE FROM plot_event_tags WHERE event_id = ?",
        params![id.get()],
    )?;
    conn.execute("DELETE FROM plot_events WHERE id = ?", params![id.get()])?;
    Ok(())
}

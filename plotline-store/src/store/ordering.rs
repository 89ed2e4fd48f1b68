//! Traversal orders over a story's events.

use super::helpers::load_story_events;
use super::ownership::resolve;
use super::PlotStore;
use crate::error::{StoreError, StoreResult};
use chrono::{NaiveDate, NaiveDateTime};
use plotline_model::{EventId, EventOrder, PlotEvent, Story, StoryId, UndatedPlacement};
use std::collections::{HashMap, HashSet};

impl PlotStore {
    /// List a story's events in the requested order.
    ///
    /// - `Structural`: the chain from its head; loose events are left out.
    /// - `Chronological`: dated events by date, undated ones per placement.
    /// - `Natural`: creation order.
    pub fn list_events(
        &self,
        username: &str,
        story_id: StoryId,
        order: EventOrder,
    ) -> StoreResult<Vec<PlotEvent>> {
        let conn = self.lock_conn();
        let story = resolve::<Story>(&conn, story_id, username)?;
        let events = load_story_events(&conn, story.id)?;
        drop(conn);

        match order {
            EventOrder::Natural => Ok(events),
            EventOrder::Structural => structural_order(events),
            EventOrder::Chronological(placement) => Ok(chronological_order(
                events,
                story.date_format.as_deref(),
                placement,
            )),
        }
    }
}

/// Follow `next` from the head. A link to a missing event or a revisited
/// event means the chain is corrupt.
pub(crate) fn structural_order(events: Vec<PlotEvent>) -> StoreResult<Vec<PlotEvent>> {
    let head = events
        .iter()
        .filter(|e| e.in_plot && e.prev_event.is_none())
        .map(|e| e.id)
        .min();
    let mut by_id: HashMap<EventId, PlotEvent> = events.into_iter().map(|e| (e.id, e)).collect();

    let mut ordered = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = head;
    while let Some(id) = cursor {
        if !seen.insert(id) {
            return Err(StoreError::InvalidState(format!(
                "plot chain revisits event {id}"
            )));
        }
        let event = by_id.remove(&id).ok_or_else(|| {
            StoreError::InvalidState(format!("plot chain links to missing event {id}"))
        })?;
        cursor = event.next_event;
        ordered.push(event);
    }
    Ok(ordered)
}

/// Sort key for an event date: parsed values sort before raw strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum DateKey {
    Parsed(NaiveDateTime),
    Raw(String),
}

pub(crate) fn date_key(date: &str, format: Option<&str>) -> DateKey {
    let Some(format) = format else {
        return DateKey::Raw(date.to_string());
    };
    if let Ok(at) = NaiveDateTime::parse_from_str(date, format) {
        return DateKey::Parsed(at);
    }
    match NaiveDate::parse_from_str(date, format) {
        Ok(day) => DateKey::Parsed(day.and_time(chrono::NaiveTime::MIN)),
        Err(_) => DateKey::Raw(date.to_string()),
    }
}

/// Stable sort by date key; ties keep natural order.
pub(crate) fn chronological_order(
    events: Vec<PlotEvent>,
    date_format: Option<&str>,
    placement: UndatedPlacement,
) -> Vec<PlotEvent> {
    let (mut dated, undated): (Vec<_>, Vec<_>) = events.into_iter().partition(|e| e.date.is_some());
    dated.sort_by_cached_key(|e| date_key(e.date.as_deref().unwrap_or_default(), date_format));

    match placement {
        UndatedPlacement::First => undated.into_iter().chain(dated).collect(),
        UndatedPlacement::Exclude => dated,
    }
}

//! Chain integrity report.

use super::helpers::load_story_events;
use super::ownership::resolve;
use super::PlotStore;
use crate::error::StoreResult;
use plotline_model::{EventId, PlotEvent, Story, StoryId};
use std::collections::{HashMap, HashSet};

/// Result of walking a story's chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainReport {
    /// In-plot events without a predecessor.
    pub head_count: usize,
    /// Events with `in_plot = true`.
    pub chained: usize,
    /// Events reached by following `next` from the first head.
    pub reachable: usize,
    pub problems: Vec<String>,
}

impl ChainReport {
    /// Exactly one head (or none for an empty chain), every chained event
    /// reachable, no link mismatches.
    pub fn is_consistent(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Check the chain invariants over one story's events.
pub fn inspect_chain(events: &[PlotEvent]) -> ChainReport {
    let by_id: HashMap<EventId, &PlotEvent> = events.iter().map(|e| (e.id, e)).collect();
    let mut report = ChainReport {
        chained: events.iter().filter(|e| e.in_plot).count(),
        ..ChainReport::default()
    };

    for event in events {
        if !event.in_plot {
            if event.prev_event.is_some() || event.next_event.is_some() {
                report
                    .problems
                    .push(format!("loose event {} still has links", event.id));
            }
            continue;
        }
        if event.prev_event.is_none() {
            report.head_count += 1;
        }
        if let Some(next) = event.next_event {
            match by_id.get(&next) {
                Some(n) if n.prev_event == Some(event.id) => {}
                Some(_) => report
                    .problems
                    .push(format!("{} -> {next} is not mirrored by prev", event.id)),
                None => report
                    .problems
                    .push(format!("{} links to missing next {next}", event.id)),
            }
        }
        if let Some(prev) = event.prev_event {
            match by_id.get(&prev) {
                Some(p) if p.next_event == Some(event.id) => {}
                Some(_) => report
                    .problems
                    .push(format!("{prev} <- {} is not mirrored by next", event.id)),
                None => report
                    .problems
                    .push(format!("{} links to missing prev {prev}", event.id)),
            }
        }
    }

    if report.chained > 0 && report.head_count != 1 {
        report
            .problems
            .push(format!("expected one head, found {}", report.head_count));
    }

    let head = events
        .iter()
        .filter(|e| e.in_plot && e.prev_event.is_none())
        .map(|e| e.id)
        .min();
    let mut seen = HashSet::new();
    let mut cursor = head;
    while let Some(id) = cursor {
        if !seen.insert(id) {
            report.problems.push(format!("cycle through {id}"));
            break;
        }
        cursor = by_id.get(&id).and_then(|e| e.next_event);
    }
    report.reachable = seen.len();
    if report.reachable != report.chained {
        report.problems.push(format!(
            "{} of {} chained events reachable from the head",
            report.reachable, report.chained
        ));
    }
    report
}

impl PlotStore {
    /// Walk a story's chain and report every invariant violation.
    pub fn check_chain(&self, username: &str, story_id: StoryId) -> StoreResult<ChainReport> {
        let conn = self.lock_conn();
        let story = resolve::<Story>(&conn, story_id, username)?;
        let events = load_story_events(&conn, story.id)?;
        Ok(inspect_chain(&events))
    }
}

//! Plot events and the orderings they can be listed in.

use crate::ids::{EventId, StoryId, TagId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of plot event. `dated` and `undated` are the built-in kinds; any
/// other name is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Dated,
    Undated,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Dated => "dated",
            Self::Undated => "undated",
            Self::Other(name) => name,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "dated" => Self::Dated,
            "undated" => Self::Undated,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored plot event.
///
/// `prev_event`/`next_event` are only ever set while `in_plot` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotEvent {
    pub id: EventId,
    pub story_id: StoryId,
    pub event_type: EventType,
    pub title: String,
    pub date: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub in_plot: bool,
    pub memory_ref: Option<EventId>,
    pub prev_event: Option<EventId>,
    pub next_event: Option<EventId>,
    /// Attached tags, ascending by id.
    pub tags: Vec<TagId>,
}

/// Scalar fields of a plot event as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFields {
    pub event_type: EventType,
    pub title: String,
    pub date: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub in_plot: bool,
}

impl EventFields {
    /// An in-plot, undated event with only a title.
    pub fn in_plot(title: impl Into<String>) -> Self {
        Self {
            event_type: EventType::Undated,
            title: title.into(),
            date: None,
            description: None,
            content: None,
            in_plot: true,
        }
    }

    /// A loose event that never joins the chain.
    pub fn loose(title: impl Into<String>) -> Self {
        Self {
            in_plot: false,
            ..Self::in_plot(title)
        }
    }

    pub fn dated(mut self, date: impl Into<String>) -> Self {
        self.event_type = EventType::Dated;
        self.date = Some(date.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Everything needed to insert or reposition an event: its fields, the
/// event it should follow in the chain (`None` makes it the head), an
/// optional memory reference and the complete tag set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub fields: EventFields,
    pub prev_event: Option<EventId>,
    pub memory_ref: Option<EventId>,
    pub tags: Vec<TagId>,
}

impl EventDraft {
    pub fn new(fields: EventFields) -> Self {
        Self {
            fields,
            prev_event: None,
            memory_ref: None,
            tags: Vec::new(),
        }
    }

    pub fn after(mut self, prev: EventId) -> Self {
        self.prev_event = Some(prev);
        self
    }

    pub fn remembering(mut self, memory: EventId) -> Self {
        self.memory_ref = Some(memory);
        self
    }

    pub fn tagged(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }
}

/// Where events without a date go in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndatedPlacement {
    /// Undated events lead, in natural order.
    #[default]
    First,
    /// Undated events are left out.
    Exclude,
}

/// Ordering for event listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrder {
    /// Chain order from the head. Loose (`in_plot = false`) events are not
    /// part of the chain and are left out.
    Structural,
    /// Sorted by `date`, compared through the story's date format.
    Chronological(UndatedPlacement),
    /// Creation order, no resequencing.
    #[default]
    Natural,
}

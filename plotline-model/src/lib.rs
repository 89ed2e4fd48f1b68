//! Record types for Plotline.
//!
//! A story owns tag types, tags (with an optional character extension) and
//! plot events. In-plot events are threaded into a single narrative chain
//! through `prev_event` / `next_event` id fields; the chain is maintained by
//! `plotline-store`, these types only describe the records.

mod character;
mod event;
mod ids;
mod records;

pub use character::{requires_character, CHARACTER_TAG_TYPE};
pub use event::{EventDraft, EventFields, EventOrder, EventType, PlotEvent, UndatedPlacement};
pub use ids::{CharacterId, EventId, StoryId, TagId, TagTypeId, UserId};
pub use records::{Character, CharacterImage, Story, StoryFields, Tag, TagFields, TagType, User};

//! Users, stories, tag types, tags and character extensions.

use crate::ids::{CharacterId, StoryId, TagId, TagTypeId, UserId};
use serde::{Deserialize, Serialize};

/// A registered account. The credential hash never leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: i64,
}

/// A story and its per-story settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    /// chrono `strftime` pattern used to compare event dates.
    pub date_format: Option<String>,
    pub created_at: i64,
    pub modified_at: i64,
}

/// Editable story fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryFields {
    pub title: String,
    pub description: Option<String>,
    pub date_format: Option<String>,
}

impl StoryFields {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A tag category ("Character", "Plot line", "Location", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagType {
    pub id: TagTypeId,
    pub story_id: StoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub story_id: StoryId,
    pub tag_type_id: TagTypeId,
    pub name: String,
    pub color: Option<String>,
}

/// Editable tag fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFields {
    pub name: String,
    pub tag_type_id: TagTypeId,
    pub color: Option<String>,
}

/// Character extension of a tag whose type is "Character".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub tag_id: TagId,
    /// The owning tag's name, which doubles as the character's name.
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub has_image: bool,
}

/// Uploaded character portrait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

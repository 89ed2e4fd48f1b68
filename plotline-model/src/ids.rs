//! Strongly-typed record identifiers (NewType pattern).
//!
//! Ids are the integers handed out by the backing store's sequences. They are
//! opaque to callers: never reuse one across record kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a registered user.
    UserId
);
record_id!(
    /// Identifier of a story.
    StoryId
);
record_id!(
    /// Identifier of a tag type (category) within a story.
    TagTypeId
);
record_id!(
    /// Identifier of a tag.
    TagId
);
record_id!(
    /// Identifier of a character extension row.
    CharacterId
);
record_id!(
    /// Identifier of a plot event.
    EventId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&EventId(42)).unwrap();
        assert_eq!(json, "42");
        let back: EventId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EventId(42));
    }

    #[test]
    fn display_is_the_raw_number() {
        assert_eq!(StoryId(7).to_string(), "7");
        assert_eq!(TagId::from(3).get(), 3);
    }
}

//! The tag-type driven character side table.
//!
//! A tag whose tag type is named "Character" carries a `Character` extension
//! row. This is the only place that decides it; the store calls
//! [`requires_character`] after creating a tag or changing its tag type.

/// Name of the tag type whose tags get a character extension.
pub const CHARACTER_TAG_TYPE: &str = "Character";

/// Whether tags of the named tag type need a character extension row.
pub fn requires_character(tag_type_name: &str) -> bool {
    tag_type_name == CHARACTER_TAG_TYPE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_name_matches() {
        assert!(requires_character("Character"));
        assert!(!requires_character("character"));
        assert!(!requires_character("Characters"));
        assert!(!requires_character("Location"));
    }
}

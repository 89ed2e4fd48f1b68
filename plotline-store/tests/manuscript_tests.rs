mod support;

use plotline_export::{render, ManuscriptStyle, PlainTextSink};
use plotline_model::{EventDraft, EventFields, StoryFields};
use pretty_assertions::assert_eq;
use support::*;

#[test]
fn manuscript_follows_chain_and_skips_empty_content() {
    let store = store();
    store.create_user("ann", "hash").unwrap();
    let story = store
        .create_story(
            "ann",
            &StoryFields {
                title: "Harbour".into(),
                description: Some("A short tale.".into()),
                date_format: None,
            },
        )
        .unwrap();
    let second = store
        .insert_event(
            "ann",
            story.id,
            &EventDraft::new(EventFields::in_plot("two").with_content("Second.")),
        )
        .unwrap();
    store
        .insert_event(
            "ann",
            story.id,
            &EventDraft::new(EventFields::in_plot("one").with_content("First.")),
        )
        .unwrap();
    store
        .insert_event(
            "ann",
            story.id,
            &EventDraft::new(EventFields::in_plot("silent")).after(second.id),
        )
        .unwrap();
    store
        .insert_event(
            "ann",
            story.id,
            &EventDraft::new(EventFields::loose("cut").with_content("Never printed.")),
        )
        .unwrap();

    let manuscript = store
        .manuscript("ann", story.id, ManuscriptStyle::Novella)
        .unwrap();

    assert_eq!(manuscript.title, "Harbour");
    assert_eq!(manuscript.passages, vec!["First.", "Second."]);
    assert!(manuscript.cast.is_empty());
}

#[test]
fn script_lists_cast_in_tag_order() {
    let store = store();
    let story = user_with_story(&store, "ann");
    let character = tag_type_named(&store, "ann", &story, "Character");
    let location = tag_type_named(&store, "ann", &story, "Location");
    let mara = tag(&store, "ann", &story, &character, "Mara");
    tag(&store, "ann", &story, &location, "Harbour");
    tag(&store, "ann", &story, &character, "Tomas");
    store
        .update_character("ann", mara.id, "Mara", Some("a sailor"), None)
        .unwrap();

    let manuscript = store
        .manuscript("ann", story.id, ManuscriptStyle::Script)
        .unwrap();

    let lines: Vec<String> = manuscript.cast.iter().map(|c| c.line()).collect();
    assert_eq!(lines, vec!["Mara, a sailor", "Tomas"]);
}

#[test]
fn empty_chain_renders_header_only() {
    let store = store();
    let story = user_with_story(&store, "ann");

    let manuscript = store
        .manuscript("ann", story.id, ManuscriptStyle::Novella)
        .unwrap();
    let mut sink = PlainTextSink::new(Vec::new());
    let written = render(&manuscript, &mut sink).unwrap();

    assert!(manuscript.passages.is_empty());
    assert_eq!(written, 1);
    assert_eq!(
        String::from_utf8(sink.into_inner()).unwrap(),
        "ann's story\n"
    );
}

#[test]
fn other_users_manuscript_is_unauthorized() {
    let store = store();
    let story = user_with_story(&store, "ann");
    store.create_user("bob", "hash").unwrap();

    let err = store
        .manuscript("bob", story.id, ManuscriptStyle::Novella)
        .unwrap_err();
    assert_eq!(err.kind(), plotline_store::ErrorKind::Unauthorized);
}

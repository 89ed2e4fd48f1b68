mod support;

use plotline_model::{
    EventDraft, EventFields, EventOrder, PlotEvent, Story, StoryFields, Tag, TagFields,
};
use plotline_store::ErrorKind;
use support::*;

// ── Cross-user access ────────────────────────────────────────────

#[test]
fn other_users_story_is_unauthorized() {
    let store = store();
    let story = user_with_story(&store, "ann");
    store.create_user("bob", "hash").unwrap();

    let err = store.get_story("bob", story.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = store
        .list_events("bob", story.id, EventOrder::Natural)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn other_users_event_cannot_be_edited_or_deleted() {
    let store = store();
    let story = user_with_story(&store, "ann");
    user_with_story(&store, "bob");
    let a = chained(&store, "ann", &story, "A", None);

    let err = store
        .update_event("bob", a, &EventDraft::new(EventFields::in_plot("hijack")))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = store.delete_event("bob", a).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    assert_eq!(store.get_event("ann", a).unwrap().title, "A");
}

#[test]
fn inserting_into_other_users_story_is_unauthorized() {
    let store = store();
    let story = user_with_story(&store, "ann");
    store.create_user("bob", "hash").unwrap();

    let err = store
        .insert_event("bob", story.id, &EventDraft::new(EventFields::in_plot("A")))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(store
        .list_events("ann", story.id, EventOrder::Natural)
        .unwrap()
        .is_empty());
}

#[test]
fn missing_records_are_not_found() {
    let store = store();
    store.create_user("ann", "hash").unwrap();

    assert_eq!(
        store.get_story("ann", plotline_model::StoryId(77)).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        store.get_tag("ann", plotline_model::TagId(77)).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn generic_resolve_checks_owner() {
    let store = store();
    let story = user_with_story(&store, "ann");
    store.create_user("bob", "hash").unwrap();
    let a = chained(&store, "ann", &story, "A", None);

    let event: PlotEvent = store.resolve(a, "ann").unwrap();
    assert_eq!(event.story_id, story.id);
    let own: Story = store.resolve(story.id, "ann").unwrap();
    assert_eq!(own.id, story.id);

    let err = store.resolve::<PlotEvent>(a, "bob").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn other_user_cannot_change_tags_on_event() {
    let store = store();
    let story = user_with_story(&store, "ann");
    let bob_story = user_with_story(&store, "bob");
    let location = tag_type_named(&store, "ann", &story, "Location");
    let harbour = tag(&store, "ann", &story, &location, "Harbour");
    let hill = tag(&store, "ann", &story, &location, "Hill");
    let a = chained(&store, "ann", &story, "A", None);
    store.add_tag("ann", a, harbour.id).unwrap();

    let err = store.add_tag("bob", a, hill.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = store.remove_tag("bob", a, harbour.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    // Bob's own tag on Ann's event is refused as well.
    let bob_location = tag_type_named(&store, "bob", &bob_story, "Location");
    let dock = tag(&store, "bob", &bob_story, &bob_location, "Dock");
    let err = store.add_tag("bob", a, dock.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    assert_eq!(store.get_event("ann", a).unwrap().tags, vec![harbour.id]);
}

#[test]
fn other_users_tag_cannot_be_attached_or_removed() {
    let store = store();
    let story = user_with_story(&store, "ann");
    let bob_story = user_with_story(&store, "bob");
    let bob_location = tag_type_named(&store, "bob", &bob_story, "Location");
    let dock = tag(&store, "bob", &bob_story, &bob_location, "Dock");
    let a = chained(&store, "ann", &story, "A", None);

    let err = store.add_tag("ann", a, dock.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = store.remove_tag("ann", a, dock.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    assert!(store.get_event("ann", a).unwrap().tags.is_empty());
}

// ── Cross-story references ───────────────────────────────────────

#[test]
fn prev_event_from_another_story_is_unauthorized() {
    let store = store();
    let first = user_with_story(&store, "ann");
    let second = store
        .create_story("ann", &StoryFields::titled("Second"))
        .unwrap();
    let a = chained(&store, "ann", &first, "A", None);

    let err = store
        .insert_event("ann", second.id, &EventDraft::new(EventFields::in_plot("B")).after(a))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn memory_ref_from_another_story_is_unauthorized() {
    let store = store();
    let first = user_with_story(&store, "ann");
    let second = store
        .create_story("ann", &StoryFields::titled("Second"))
        .unwrap();
    let a = chained(&store, "ann", &first, "A", None);

    let err = store
        .insert_event(
            "ann",
            second.id,
            &EventDraft::new(EventFields::loose("B")).remembering(a),
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn tag_from_another_story_is_unauthorized_and_nothing_is_written() {
    let store = store();
    let first = user_with_story(&store, "ann");
    let second = store
        .create_story("ann", &StoryFields::titled("Second"))
        .unwrap();
    let location = tag_type_named(&store, "ann", &first, "Location");
    let foreign: Tag = tag(&store, "ann", &first, &location, "Harbour");
    let ids = chain_of(&store, "ann", &second, &["A", "B"]);

    let err = store
        .update_event(
            "ann",
            ids[1],
            &EventDraft::new(EventFields::in_plot("B")).tagged([foreign.id]),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = store.add_tag("ann", ids[0], foreign.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    assert!(store.get_event("ann", ids[1]).unwrap().tags.is_empty());
    assert_eq!(structural_titles(&store, "ann", &second), vec!["A", "B"]);
}

#[test]
fn removing_tag_from_another_story_is_unauthorized() {
    let store = store();
    let first = user_with_story(&store, "ann");
    let second = store
        .create_story("ann", &StoryFields::titled("Second"))
        .unwrap();
    let first_location = tag_type_named(&store, "ann", &first, "Location");
    let second_location = tag_type_named(&store, "ann", &second, "Location");
    let foreign = tag(&store, "ann", &first, &first_location, "Harbour");
    let local = tag(&store, "ann", &second, &second_location, "Hill");
    let b = chained(&store, "ann", &second, "B", None);
    store.add_tag("ann", b, local.id).unwrap();

    let err = store.remove_tag("ann", b, foreign.id).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(store.get_event("ann", b).unwrap().tags, vec![local.id]);
}

#[test]
fn tag_type_from_another_story_is_unauthorized() {
    let store = store();
    let first = user_with_story(&store, "ann");
    let second = store
        .create_story("ann", &StoryFields::titled("Second"))
        .unwrap();
    let location = tag_type_named(&store, "ann", &first, "Location");

    let err = store
        .create_tag(
            "ann",
            second.id,
            &TagFields {
                name: "Harbour".into(),
                tag_type_id: location.id,
                color: None,
            },
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

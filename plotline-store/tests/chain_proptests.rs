//! Chain invariants under random edit sequences, checked against a plain
//! `Vec` model of the expected order.

mod support;

use plotline_model::{EventDraft, EventFields, EventId, EventOrder};
use proptest::prelude::*;
use support::*;

#[derive(Debug, Clone)]
enum Op {
    Insert { after: Option<usize>, loose: bool },
    Move { target: usize, after: Option<usize> },
    Unplug { target: usize },
    Delete { target: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (proptest::option::of(any::<usize>()), any::<bool>())
            .prop_map(|(after, loose)| Op::Insert { after, loose }),
        2 => (any::<usize>(), proptest::option::of(any::<usize>()))
            .prop_map(|(target, after)| Op::Move { target, after }),
        1 => any::<usize>().prop_map(|target| Op::Unplug { target }),
        1 => any::<usize>().prop_map(|target| Op::Delete { target }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn random_edits_keep_chain_consistent(ops in proptest::collection::vec(op(), 1..24)) {
        let store = store();
        let story = user_with_story(&store, "ann");
        let mut chain: Vec<EventId> = Vec::new();
        let mut loose: Vec<EventId> = Vec::new();
        let mut counter = 0;

        for op in ops {
            match op {
                Op::Insert { after, loose: is_loose } => {
                    counter += 1;
                    let title = format!("E{counter}");
                    if is_loose {
                        let event = store
                            .insert_event("ann", story.id, &EventDraft::new(EventFields::loose(title)))
                            .unwrap();
                        loose.push(event.id);
                    } else {
                        let pos = after.filter(|_| !chain.is_empty()).map(|i| i % chain.len());
                        let mut draft = EventDraft::new(EventFields::in_plot(title));
                        draft.prev_event = pos.map(|p| chain[p]);
                        let event = store.insert_event("ann", story.id, &draft).unwrap();
                        match pos {
                            Some(p) => chain.insert(p + 1, event.id),
                            None => chain.insert(0, event.id),
                        }
                    }
                }
                Op::Move { target, after } => {
                    if chain.is_empty() {
                        continue;
                    }
                    let id = chain.remove(target % chain.len());
                    let pos = after.filter(|_| !chain.is_empty()).map(|i| i % chain.len());
                    let current = store.get_event("ann", id).unwrap();
                    let mut draft = EventDraft::new(EventFields::in_plot(current.title));
                    draft.prev_event = pos.map(|p| chain[p]);
                    store.update_event("ann", id, &draft).unwrap();
                    match pos {
                        Some(p) => chain.insert(p + 1, id),
                        None => chain.insert(0, id),
                    }
                }
                Op::Unplug { target } => {
                    if chain.is_empty() {
                        continue;
                    }
                    let id = chain.remove(target % chain.len());
                    let current = store.get_event("ann", id).unwrap();
                    store
                        .update_event("ann", id, &EventDraft::new(EventFields::loose(current.title)))
                        .unwrap();
                    loose.push(id);
                }
                Op::Delete { target } => {
                    let total = chain.len() + loose.len();
                    if total == 0 {
                        continue;
                    }
                    let index = target % total;
                    let id = if index < chain.len() {
                        chain.remove(index)
                    } else {
                        loose.remove(index - chain.len())
                    };
                    store.delete_event("ann", id).unwrap();
                }
            }

            let report = store.check_chain("ann", story.id).unwrap();
            prop_assert!(report.is_consistent(), "problems: {:?}", report.problems);
            prop_assert_eq!(report.chained, chain.len());

            let structural: Vec<EventId> = store
                .list_events("ann", story.id, EventOrder::Structural)
                .unwrap()
                .into_iter()
                .map(|e| e.id)
                .collect();
            prop_assert_eq!(&structural, &chain);
        }
    }
}

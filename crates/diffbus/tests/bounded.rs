use std::cell::Cell;
use std::rc::Rc;

use diffbus::{map_payload, BoundedPrefix, SeqDiff, SeqDispatcher, SeqListener};
use proptest::prelude::*;

fn bounded_pair(max_size: usize) -> (SeqDispatcher<&'static str>, SeqListener<&'static str>) {
    let dispatcher = SeqDispatcher::new();
    let listener = SeqListener::new();
    dispatcher.add_listener(BoundedPrefix::new(listener.clone(), max_size));
    (dispatcher, listener)
}

#[test]
fn window_never_grows_past_max_size() {
    let (dispatcher, listener) = bounded_pair(2);
    dispatcher.insert(0, "a");
    dispatcher.insert(1, "b");
    dispatcher.insert(2, "c");
    dispatcher.insert(3, "d");
    assert_eq!(
        listener.take_pending(),
        vec![
            SeqDiff::Insert { index: 0, value: "a" },
            SeqDiff::Insert { index: 1, value: "b" },
        ]
    );
    assert_eq!(listener.snapshot(), vec!["a", "b"]);

    dispatcher.assign(1, "BB");
    assert_eq!(listener.take_pending(), vec![SeqDiff::Replace { index: 1, value: "BB" }]);
    assert_eq!(listener.snapshot(), vec!["a", "BB"]);
}

#[test]
fn insert_inside_window_trims_overflow() {
    let (dispatcher, listener) = bounded_pair(2);
    dispatcher.insert(0, "a");
    dispatcher.insert(1, "b");
    assert_eq!(
        listener.take_pending(),
        vec![
            SeqDiff::Insert { index: 0, value: "a" },
            SeqDiff::Insert { index: 1, value: "b" },
        ]
    );
    assert_eq!(listener.snapshot(), vec!["a", "b"]);

    dispatcher.insert(0, "c");
    assert_eq!(
        listener.take_pending(),
        vec![SeqDiff::Insert { index: 0, value: "c" }, SeqDiff::Delete { index: 2 }]
    );
    assert_eq!(listener.snapshot(), vec!["c", "a"]);

    dispatcher.insert(0, "d");
    assert_eq!(
        listener.take_pending(),
        vec![SeqDiff::Insert { index: 0, value: "d" }, SeqDiff::Delete { index: 2 }]
    );
    assert_eq!(listener.snapshot(), vec!["d", "c"]);
}

#[test]
fn delete_re_exposes_hidden_elements() {
    let (dispatcher, listener) = bounded_pair(2);
    dispatcher.insert(0, "a");
    dispatcher.insert(1, "b");
    dispatcher.insert(0, "c");
    dispatcher.insert(0, "d");
    listener.take_pending(); // flush the initial churn
    assert_eq!(listener.snapshot(), vec!["d", "c"]);

    // Shadow is [d, c, a, b]; deleting inside the window pulls "a" back in.
    dispatcher.erase(0);
    assert_eq!(
        listener.take_pending(),
        vec![SeqDiff::Delete { index: 0 }, SeqDiff::Insert { index: 1, value: "a" }]
    );
    assert_eq!(listener.snapshot(), vec!["c", "a"]);

    dispatcher.erase(1);
    assert_eq!(
        listener.take_pending(),
        vec![SeqDiff::Delete { index: 1 }, SeqDiff::Insert { index: 1, value: "b" }]
    );
    assert_eq!(listener.snapshot(), vec!["c", "b"]);
}

#[test]
fn nothing_to_re_expose_once_shadow_runs_dry() {
    let (dispatcher, listener) = bounded_pair(2);
    dispatcher.insert(0, "a");
    dispatcher.insert(1, "b");
    dispatcher.insert(0, "c");
    dispatcher.insert(0, "d");
    listener.take_pending(); // flush the initial churn
    assert_eq!(listener.snapshot(), vec!["d", "c"]);

    // Deletes entirely outside the window are invisible downstream.
    dispatcher.erase(3);
    dispatcher.erase(2);
    assert!(listener.take_pending().is_empty(), "no effect expected");
    assert_eq!(listener.snapshot(), vec!["d", "c"], "no effect expected");

    // Now there is no hidden data left to grow back from.
    dispatcher.erase(1);
    assert_eq!(listener.take_pending(), vec![SeqDiff::Delete { index: 1 }]);
    assert_eq!(listener.snapshot(), vec!["d"]);

    dispatcher.erase(0);
    assert_eq!(listener.take_pending(), vec![SeqDiff::Delete { index: 0 }]);
    assert!(listener.snapshot().is_empty());
}

#[test]
fn growth_past_the_window_does_not_flap() {
    let (dispatcher, listener) = bounded_pair(2);
    dispatcher.insert(0, "a");
    dispatcher.insert(1, "b");
    listener.take_pending();
    assert_eq!(listener.snapshot(), vec!["a", "b"]);

    dispatcher.insert(2, "c");
    assert!(
        listener.take_pending().is_empty(),
        "no redundant insert/delete pair for edits past the window"
    );
    assert_eq!(listener.snapshot(), vec!["a", "b"]);
}

#[test]
fn batch_hook_travels_through_nested_adapters() {
    let calls = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&calls);

    // dispatcher -> bounded -> mapper -> listener
    let listener =
        SeqListener::new().on_finalize_batch(move || counter.set(counter.get() + 1));
    let mapped = map_payload(|data: &str| data.to_lowercase(), listener.clone());
    let bounded = BoundedPrefix::new(mapped, 2);

    let dispatcher = SeqDispatcher::new();
    dispatcher.add_listener(bounded);

    {
        let _scope = dispatcher.batch();
        dispatcher.insert(0, "AAA");
        dispatcher.insert(0, "BBB");
        dispatcher.insert(0, "CCC");
        assert_eq!(calls.get(), 0);
    }
    assert_eq!(calls.get(), 1);

    listener.take_pending();
    assert_eq!(listener.snapshot(), vec!["ccc", "bbb"]);
}

/// One raw edit instruction; mapped onto a valid op against the current
/// model length inside the test.
fn raw_edits() -> impl Strategy<Value = Vec<(u8, u16, i32)>> {
    prop::collection::vec((0u8..3, any::<u16>(), any::<i32>()), 1..64)
}

proptest! {
    /// After any sequence of edits, the wrapped listener materializes to
    /// exactly the first `min(full, max_size)` elements of the full list.
    #[test]
    fn window_is_the_shadow_prefix(edits in raw_edits(), max_size in 1usize..6) {
        let dispatcher = SeqDispatcher::new();
        let listener = SeqListener::new();
        dispatcher.add_listener(BoundedPrefix::new(listener.clone(), max_size));

        let mut model: Vec<i32> = Vec::new();
        for (op, raw_index, value) in edits {
            if model.is_empty() {
                model.insert(0, value);
                dispatcher.insert(0, value);
                continue;
            }
            let index = raw_index as usize % model.len();
            match op {
                0 => {
                    model.insert(index, value);
                    dispatcher.insert(index, value);
                }
                1 => {
                    model[index] = value;
                    dispatcher.assign(index, value);
                }
                _ => {
                    model.remove(index);
                    dispatcher.erase(index);
                }
            }
        }

        listener.take_pending();
        let visible = model.len().min(max_size);
        prop_assert_eq!(listener.snapshot(), model[..visible].to_vec());
    }
}

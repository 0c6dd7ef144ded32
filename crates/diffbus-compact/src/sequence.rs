//! Sequence compaction: reduce a diff list to an equivalent shorter one.
//!
//! The difficulty is that sequence edits re-index each other: an insert at
//! `i` shifts the meaning of every previously recorded position at or after
//! `i`, a delete does the opposite, and an overwrite is tied to whichever
//! earlier op produced the element now living at its position. The walk
//! below keeps a map from *current effective producer position* to *slot in
//! the output* so each incoming op can find the earlier op it pairs with,
//! and rewrites that map around every unpaired insert or delete.

use std::collections::BTreeMap;

use diffbus::{SeqDiff, SeqKind};

/// Maps the position an already-emitted op currently targets in the producer
/// stream to that op's slot in the output list.
type SlotMap = BTreeMap<usize, usize>;

/// Reduce `diffs` to an equivalent list with pair-level cancellations
/// applied:
///
/// | pair (same target element) | becomes              |
/// |----------------------------|----------------------|
/// | insert, replace            | insert (new payload) |
/// | replace, replace           | replace (new payload)|
/// | insert, delete             | nothing              |
/// | replace, delete            | delete               |
///
/// The input must be valid against some non-empty starting sequence;
/// replaying input and output against that sequence yields the same final
/// state. Output order is not input order (a cancelled pair leaves later
/// ops in place) and intermediate states differ accordingly.
///
/// Worst case quadratic in the input length, which is fine for the batch
/// sizes this is meant for.
pub fn compact_sequence<T>(diffs: impl IntoIterator<Item = SeqDiff<T>>) -> Vec<SeqDiff<T>> {
    let mut out = Vec::new();
    let mut slots = SlotMap::new();
    for diff in diffs {
        match diff {
            SeqDiff::Insert { .. } => push_unpaired(diff, &mut out, &mut slots),
            SeqDiff::Replace { index, value } => fold_replace(index, value, &mut out, &mut slots),
            SeqDiff::Delete { index } => fold_delete(index, &mut out, &mut slots),
        }
    }
    out
}

/// Append an op that pairs with nothing, rebinding the slot map around it: a
/// delete pulls every later position down one, an insert pushes positions at
/// or after it up one. The op's own position then binds to the new slot.
fn push_unpaired<T>(diff: SeqDiff<T>, out: &mut Vec<SeqDiff<T>>, slots: &mut SlotMap) {
    match &diff {
        SeqDiff::Delete { index } => shift_positions_down(slots, *index),
        SeqDiff::Insert { index, .. } => {
            let moved: Vec<(usize, usize)> =
                slots.range(*index..).map(|(&pos, &slot)| (pos, slot)).collect();
            for &(pos, _) in &moved {
                slots.remove(&pos);
            }
            for (pos, slot) in moved {
                slots.insert(pos + 1, slot);
            }
        }
        SeqDiff::Replace { .. } => {}
    }
    slots.insert(diff.index(), out.len());
    out.push(diff);
}

/// Rebind every position strictly above `index` one lower. A rebound
/// position may land on `index` itself and displace its binding; the caller
/// overwrites or removes that binding anyway.
fn shift_positions_down(slots: &mut SlotMap, index: usize) {
    let moved: Vec<(usize, usize)> =
        slots.range(index + 1..).map(|(&pos, &slot)| (pos, slot)).collect();
    for &(pos, _) in &moved {
        slots.remove(&pos);
    }
    for (pos, slot) in moved {
        slots.insert(pos - 1, slot);
    }
}

/// Fold a replace into the earlier op that produced the element it
/// overwrites, if that op is still in the output and is not a delete.
fn fold_replace<T>(index: usize, value: T, out: &mut Vec<SeqDiff<T>>, slots: &mut SlotMap) {
    if let Some(&slot) = slots.get(&index) {
        match &mut out[slot] {
            // A delete holds this position: nothing to fold into.
            SeqDiff::Delete { .. } => {}
            // insert+replace and replace+replace keep the earlier op, new
            // payload.
            SeqDiff::Insert { value: payload, .. } | SeqDiff::Replace { value: payload, .. } => {
                *payload = value;
                return;
            }
        }
    }
    push_unpaired(SeqDiff::Replace { index, value }, out, slots);
}

/// Fold a delete against the earlier op bound to its position.
fn fold_delete<T>(index: usize, out: &mut Vec<SeqDiff<T>>, slots: &mut SlotMap) {
    let Some(&slot) = slots.get(&index) else {
        return push_unpaired(SeqDiff::Delete { index }, out, slots);
    };
    let paired_with = out[slot].kind();
    let inserted_at = out[slot].index();
    match paired_with {
        // A chain of unpaired deletes: nothing cancels.
        SeqKind::Delete => push_unpaired(SeqDiff::Delete { index }, out, slots),
        // replace+delete: the overwrite is moot, the delete survives.
        SeqKind::Replace => {
            remove_slot(slot, out, slots);
            slots.remove(&index);
            push_unpaired(SeqDiff::Delete { index }, out, slots);
        }
        // insert+delete: both vanish. Ops recorded after the insert carry its
        // positional shift and must be unwound before the slot is dropped.
        SeqKind::Insert => {
            unwind_insert(inserted_at, slot, out);
            remove_slot(slot, out, slots);
            slots.remove(&index);
            shift_positions_down(slots, index);
        }
    }
}

/// Drop `out[slot]` and renumber every map entry pointing past it.
fn remove_slot<T>(slot: usize, out: &mut Vec<SeqDiff<T>>, slots: &mut SlotMap) {
    out.remove(slot);
    for bound in slots.values_mut() {
        if *bound >= slot {
            *bound -= 1;
        }
    }
}

/// Undo the positional shift of a cancelled insert for every op emitted
/// after it.
///
/// `at` is the position the insert targeted when it was recorded. Each later
/// op was recorded while the insert was in effect, so its position comes
/// down by one *iff* it sits at or above the insert's effective position at
/// that point in the list. The effective position itself moves as the
/// walk passes later inserts at or below it and deletes below it. A blanket
/// decrement would misplace ops that interleave with such shifts.
fn unwind_insert<T>(at: usize, slot: usize, out: &mut Vec<SeqDiff<T>>) {
    let mut effective = at;
    for later in (slot + 1)..out.len() {
        match &out[later] {
            SeqDiff::Insert { index, .. } if *index <= effective => effective += 1,
            SeqDiff::Delete { index } if *index < effective => effective -= 1,
            _ => {}
        }
        match &mut out[later] {
            SeqDiff::Insert { index, .. }
            | SeqDiff::Replace { index, .. }
            | SeqDiff::Delete { index } => {
                if *index >= effective {
                    *index -= 1;
                }
            }
        }
    }
}

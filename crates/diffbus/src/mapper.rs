//! Payload-transforming listener decorator.

use crate::listen::Listener;
use crate::types::{MapDiff, SeqDiff};

/// Decorate `inner` so every inbound payload passes through `map` first.
///
/// `map` must be pure: it runs once per diff, on the way in. The decorator
/// keeps no state of its own and forwards batch finalization untouched.
pub fn map_payload<F, L>(map: F, inner: L) -> PayloadMapper<F, L> {
    PayloadMapper { map, inner }
}

/// See [`map_payload`].
pub struct PayloadMapper<F, L> {
    map: F,
    inner: L,
}

impl<T, U, F, L> Listener<SeqDiff<T>> for PayloadMapper<F, L>
where
    F: FnMut(T) -> U,
    L: Listener<SeqDiff<U>>,
{
    fn receive(&mut self, diff: SeqDiff<T>) {
        self.inner.receive(diff.map_value(&mut self.map));
    }

    fn finalize_batch(&mut self) {
        self.inner.finalize_batch();
    }
}

impl<K, T, U, F, L> Listener<MapDiff<K, T>> for PayloadMapper<F, L>
where
    F: FnMut(T) -> U,
    L: Listener<MapDiff<K, U>>,
{
    fn receive(&mut self, diff: MapDiff<K, T>) {
        self.inner.receive(diff.map_value(&mut self.map));
    }

    fn finalize_batch(&mut self) {
        self.inner.finalize_batch();
    }
}

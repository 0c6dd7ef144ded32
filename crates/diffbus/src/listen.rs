//! Buffered listeners with deferred diff application.
//!
//! A listener receives diffs into a pending buffer and applies them to its
//! snapshot only when asked. This split is load-bearing: a consumer can
//! inspect the prior state while planning how to handle the new diffs, then
//! drain the buffer in one step ([`SeqListener::take_pending`]) or one diff
//! at a time ([`SeqListener::stream_pending`]).
//!
//! `SeqListener` and `MapListener` are cheap-clone handles over shared inner
//! state: register one clone with a dispatcher, keep another for reads.
//! Reading a listener from inside its own `on_change` hook is a re-entrant
//! borrow and panics; the hook receives the diff by reference instead.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::error::ApplyError;
use crate::types::{MapDiff, SeqDiff};

/// Receives diffs from a dispatcher.
///
/// The batch hook is an optional capability: the default implementation does
/// nothing, so plain per-diff listeners ignore batch boundaries entirely.
pub trait Listener<D> {
    /// Deliver one diff.
    fn receive(&mut self, diff: D);

    /// Called when a batch scope closes with at least one admitted edit.
    fn finalize_batch(&mut self) {}
}

/// Wrap a bare closure as a [`Listener`] with no batch hook.
pub fn listener_fn<D, F: FnMut(D)>(f: F) -> ListenerFn<F> {
    ListenerFn(f)
}

/// See [`listener_fn`].
pub struct ListenerFn<F>(F);

impl<D, F: FnMut(D)> Listener<D> for ListenerFn<F> {
    fn receive(&mut self, diff: D) {
        (self.0)(diff);
    }
}

type ChangeHook<D> = Rc<dyn Fn(&D)>;
type BatchHook = Rc<dyn Fn()>;

struct Buffered<C, D> {
    /// The applied view. Mutated only when pending diffs are materialized.
    applied: C,
    /// Diffs received but not yet folded into `applied`. Replaying these over
    /// `applied`, in order, yields the logical current state.
    pending: VecDeque<D>,
}

impl<C: Default, D> Default for Buffered<C, D> {
    fn default() -> Self {
        Self { applied: C::default(), pending: VecDeque::new() }
    }
}

/// Listener over an ordered sequence.
pub struct SeqListener<T> {
    state: Rc<RefCell<Buffered<Vec<T>, SeqDiff<T>>>>,
    on_change: Option<ChangeHook<SeqDiff<T>>>,
    on_finalize_batch: Option<BatchHook>,
}

impl<T> Clone for SeqListener<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            on_change: self.on_change.clone(),
            on_finalize_batch: self.on_finalize_batch.clone(),
        }
    }
}

impl<T> Default for SeqListener<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SeqListener<T> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(Buffered::default())),
            on_change: None,
            on_finalize_batch: None,
        }
    }

    /// Install a hook fired synchronously for every received diff, after it
    /// is buffered and before delivery returns to the dispatcher.
    pub fn on_change(mut self, hook: impl Fn(&SeqDiff<T>) + 'static) -> Self {
        self.on_change = Some(Rc::new(hook));
        self
    }

    /// Install a hook fired when a batch scope closes with admitted edits.
    pub fn on_finalize_batch(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_finalize_batch = Some(Rc::new(hook));
        self
    }

    /// `true` while diffs are buffered but not yet applied.
    pub fn has_changed(&self) -> bool {
        !self.state.borrow().pending.is_empty()
    }
}

impl<T: Clone> SeqListener<T> {
    /// The applied view, leaving the pending buffer untouched.
    pub fn snapshot(&self) -> Vec<T> {
        self.state.borrow().applied.clone()
    }

    /// Drain the pending buffer: replay every buffered diff onto the
    /// snapshot in order, then hand the diffs back.
    ///
    /// The two observation orders are equivalent: reading the snapshot first
    /// and applying the returned diffs externally reaches the same state as
    /// calling `take_pending`, discarding the result, and reading the
    /// snapshot.
    pub fn take_pending(&self) -> Vec<SeqDiff<T>> {
        let mut state = self.state.borrow_mut();
        let drained: Vec<_> = state.pending.drain(..).collect();
        for diff in &drained {
            diff.apply_to(&mut state.applied);
        }
        drained
    }

    /// Lazy variant of [`take_pending`](Self::take_pending): the returned
    /// iterator applies one buffered diff per step, immediately before
    /// yielding it, so a [`snapshot`](Self::snapshot) read mid-iteration
    /// reflects exactly the prefix consumed so far. Diffs buffered after the
    /// iterator was created are yielded too.
    pub fn stream_pending(&self) -> PendingSeq<T> {
        PendingSeq { listener: self.clone() }
    }

    fn push(&self, diff: SeqDiff<T>) {
        match &self.on_change {
            Some(hook) => {
                self.state.borrow_mut().pending.push_back(diff.clone());
                hook(&diff);
            }
            None => self.state.borrow_mut().pending.push_back(diff),
        }
    }
}

impl<T: Clone> Listener<SeqDiff<T>> for SeqListener<T> {
    fn receive(&mut self, diff: SeqDiff<T>) {
        self.push(diff);
    }

    fn finalize_batch(&mut self) {
        if let Some(hook) = &self.on_finalize_batch {
            hook();
        }
    }
}

/// Iterator returned by [`SeqListener::stream_pending`].
pub struct PendingSeq<T> {
    listener: SeqListener<T>,
}

impl<T: Clone> Iterator for PendingSeq<T> {
    type Item = SeqDiff<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut state = self.listener.state.borrow_mut();
        let diff = state.pending.pop_front()?;
        diff.apply_to(&mut state.applied);
        Some(diff)
    }
}

/// Listener over an associative mapping.
pub struct MapListener<K, V> {
    state: Rc<RefCell<Buffered<HashMap<K, V>, MapDiff<K, V>>>>,
    on_change: Option<ChangeHook<MapDiff<K, V>>>,
    on_finalize_batch: Option<BatchHook>,
}

impl<K, V> Clone for MapListener<K, V> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            on_change: self.on_change.clone(),
            on_finalize_batch: self.on_finalize_batch.clone(),
        }
    }
}

impl<K, V> Default for MapListener<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MapListener<K, V> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(Buffered::default())),
            on_change: None,
            on_finalize_batch: None,
        }
    }

    /// Install a hook fired synchronously for every received diff, after it
    /// is buffered and before delivery returns to the dispatcher.
    pub fn on_change(mut self, hook: impl Fn(&MapDiff<K, V>) + 'static) -> Self {
        self.on_change = Some(Rc::new(hook));
        self
    }

    /// Install a hook fired when a batch scope closes with admitted edits.
    pub fn on_finalize_batch(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_finalize_batch = Some(Rc::new(hook));
        self
    }

    /// `true` while diffs are buffered but not yet applied.
    pub fn has_changed(&self) -> bool {
        !self.state.borrow().pending.is_empty()
    }
}

impl<K, V> MapListener<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    /// The applied view, leaving the pending buffer untouched.
    pub fn snapshot(&self) -> HashMap<K, V> {
        self.state.borrow().applied.clone()
    }

    /// Drain the pending buffer: replay every buffered diff onto the
    /// snapshot in order, then hand the diffs back.
    ///
    /// A `Delete` for a key the snapshot does not contain stops the replay
    /// with [`ApplyError::MissingKey`]. The buffer is consumed either way;
    /// on error the snapshot reflects the prefix applied so far.
    pub fn take_pending(&self) -> Result<Vec<MapDiff<K, V>>, ApplyError> {
        let mut state = self.state.borrow_mut();
        let drained: Vec<_> = state.pending.drain(..).collect();
        for diff in &drained {
            diff.apply_to(&mut state.applied)?;
        }
        Ok(drained)
    }

    /// Lazy variant of [`take_pending`](Self::take_pending); see
    /// [`SeqListener::stream_pending`].
    pub fn stream_pending(&self) -> PendingMap<K, V> {
        PendingMap { listener: self.clone() }
    }

    fn push(&self, diff: MapDiff<K, V>) {
        match &self.on_change {
            Some(hook) => {
                self.state.borrow_mut().pending.push_back(diff.clone());
                hook(&diff);
            }
            None => self.state.borrow_mut().pending.push_back(diff),
        }
    }
}

impl<K, V> Listener<MapDiff<K, V>> for MapListener<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    fn receive(&mut self, diff: MapDiff<K, V>) {
        self.push(diff);
    }

    fn finalize_batch(&mut self) {
        if let Some(hook) = &self.on_finalize_batch {
            hook();
        }
    }
}

/// Iterator returned by [`MapListener::stream_pending`].
pub struct PendingMap<K, V> {
    listener: MapListener<K, V>,
}

impl<K, V> Iterator for PendingMap<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    type Item = Result<MapDiff<K, V>, ApplyError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut state = self.listener.state.borrow_mut();
        let diff = state.pending.pop_front()?;
        match diff.apply_to(&mut state.applied) {
            Ok(()) => Some(Ok(diff)),
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_listener_receives_diffs() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut listener = listener_fn(move |diff: SeqDiff<i32>| sink.borrow_mut().push(diff));
        listener.receive(SeqDiff::Insert { index: 0, value: 7 });
        assert_eq!(&*seen.borrow(), &[SeqDiff::Insert { index: 0, value: 7 }]);
    }

    #[test]
    fn has_changed_tracks_buffer() {
        let listener = SeqListener::new();
        assert!(!listener.has_changed());
        listener.clone().receive(SeqDiff::Insert { index: 0, value: 1 });
        assert!(listener.has_changed());
        listener.take_pending();
        assert!(!listener.has_changed());
    }
}

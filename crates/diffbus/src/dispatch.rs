//! Fan-out of container edits to registered listeners.
//!
//! The dispatcher is the single point through which every edit flows. It
//! guarantees a total order: each admitted diff reaches every listener, in
//! registration order, before the next diff reaches any listener. Listeners
//! that emit derived edits from inside a delivery do not break this: nested
//! emits are queued and drained by the outermost frame.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::Config;
use crate::invariants::debug_assert_queue_drained;
use crate::listen::Listener;
use crate::metrics::DispatchStats;
use crate::types::{MapDiff, SeqDiff};

/// Dispatcher over sequence edits, addressed by position.
pub type SeqDispatcher<T> = Dispatcher<SeqDiff<T>>;

/// Dispatcher over mapping edits, addressed by key.
pub type MapDispatcher<K, V> = Dispatcher<MapDiff<K, V>>;

/// Serializes edit emission and fans each diff out to every listener.
///
/// Cheap-clone handle: clones share the same listener set, queue and
/// counters. Keep one clone for emitting and move others into callbacks that
/// need to emit derived edits.
///
/// Single-threaded by design; the handle is `!Send`. Callers that want to
/// share a dispatcher across threads must wrap it in their own mutual
/// exclusion and a `Send` container.
pub struct Dispatcher<D> {
    core: Rc<DispatchCore<D>>,
}

impl<D> Clone for Dispatcher<D> {
    fn clone(&self) -> Self {
        Self { core: Rc::clone(&self.core) }
    }
}

struct DispatchCore<D> {
    config: Config,
    listeners: RefCell<Vec<Box<dyn Listener<D>>>>,
    /// Diffs admitted but not yet delivered. Only the outermost `emit` frame
    /// pops; nested frames push and return.
    queue: RefCell<VecDeque<D>>,
    /// Current emit nesting depth; reset when the outermost frame finishes
    /// draining.
    depth: Cell<usize>,
    /// Set once the first diff is admitted. The listener set is frozen from
    /// then on.
    sealed: Cell<bool>,
    /// At least one diff was admitted since the last batch finalization.
    needs_finalize: Cell<bool>,
    stats: Cell<DispatchStats>,
}

impl<D> DispatchCore<D> {
    fn bump(&self, update: impl FnOnce(&mut DispatchStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}

impl<D> Dispatcher<D> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            core: Rc::new(DispatchCore {
                config,
                listeners: RefCell::new(Vec::new()),
                queue: RefCell::new(VecDeque::new()),
                depth: Cell::new(0),
                sealed: Cell::new(false),
                needs_finalize: Cell::new(false),
                stats: Cell::new(DispatchStats::new()),
            }),
        }
    }

    /// Attach a listener. The set is frozen at the first emitted edit, so
    /// every listener observes the stream from its beginning.
    ///
    /// # Panics
    ///
    /// Panics if any diff has already been emitted.
    pub fn add_listener<L>(&self, listener: L)
    where
        L: Listener<D> + 'static,
    {
        assert!(
            !self.core.sealed.get(),
            "cannot add listener after diffs have been emitted"
        );
        self.core.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Fire every listener's batch hook, iff any diff was admitted since the
    /// last finalization.
    pub fn finalize_batch(&self) {
        if !self.core.needs_finalize.get() {
            return;
        }
        for listener in self.core.listeners.borrow_mut().iter_mut() {
            listener.finalize_batch();
        }
        self.core.needs_finalize.set(false);
        self.core.bump(|stats| stats.batches_finalized += 1);
    }

    /// Scope a batch of edits: dropping the returned guard runs
    /// [`finalize_batch`](Self::finalize_batch).
    pub fn batch(&self) -> BatchScope<'_, D> {
        BatchScope { dispatcher: self }
    }

    /// Snapshot of the dispatch counters.
    pub fn stats(&self) -> DispatchStats {
        self.core.stats.get()
    }
}

impl<D: Clone> Dispatcher<D> {
    /// Admit one diff and deliver it to every listener in registration order.
    ///
    /// A listener invoked during delivery may call `emit` itself (e.g. to
    /// synthesize a derived edit). Such nested diffs are appended to the
    /// queue and drained after the current delivery completes, so every
    /// listener still observes every diff in the same global order.
    ///
    /// # Panics
    ///
    /// Panics when nesting exceeds [`Config::max_nesting`], meaning the listeners
    /// are feeding each other in a loop. If a listener panics mid-delivery,
    /// the queue state is unspecified; delivery is not transactional.
    pub fn emit(&self, diff: D) {
        let core = &*self.core;
        assert!(
            core.depth.get() < core.config.max_nesting,
            "emit nesting exceeded {} frames; listener feedback loop?",
            core.config.max_nesting
        );
        core.queue.borrow_mut().push_back(diff);
        core.depth.set(core.depth.get() + 1);
        if core.depth.get() > 1 {
            // Nested frame: the outermost frame will deliver this diff.
            core.bump(|stats| stats.nested_emits += 1);
            return;
        }

        core.sealed.set(true);
        core.needs_finalize.set(true);
        loop {
            let next = core.queue.borrow_mut().pop_front();
            let Some(diff) = next else { break };
            let mut listeners = core.listeners.borrow_mut();
            for listener in listeners.iter_mut() {
                listener.receive(diff.clone());
            }
            drop(listeners);
            core.bump(|stats| stats.diffs_emitted += 1);
        }
        debug_assert_queue_drained!(core.queue.borrow().len());
        core.depth.set(0);
    }
}

impl<D> Default for Dispatcher<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> SeqDispatcher<T> {
    /// Emit an insertion of `value` at `index`.
    pub fn insert(&self, index: usize, value: T) {
        self.emit(SeqDiff::Insert { index, value });
    }

    /// Emit an overwrite of the element at `index`.
    pub fn assign(&self, index: usize, value: T) {
        self.emit(SeqDiff::Replace { index, value });
    }

    /// Emit a removal of the element at `index`.
    pub fn erase(&self, index: usize) {
        self.emit(SeqDiff::Delete { index });
    }
}

impl<K: Clone, V: Clone> MapDispatcher<K, V> {
    /// Emit an assignment of `value` under `key`.
    pub fn assign(&self, key: K, value: V) {
        self.emit(MapDiff::Set { key, value });
    }

    /// Emit a removal of `key`.
    pub fn erase(&self, key: K) {
        self.emit(MapDiff::Delete { key });
    }
}

/// RAII guard for a batch of edits.
///
/// Dropping the guard finalizes the batch; listeners with a batch hook see it
/// fire exactly when the scope admitted at least one edit.
#[must_use = "a batch scope finalizes when dropped"]
pub struct BatchScope<'a, D> {
    dispatcher: &'a Dispatcher<D>,
}

impl<D> Drop for BatchScope<'_, D> {
    fn drop(&mut self) {
        self.dispatcher.finalize_batch();
    }
}

//! Fixed-size window over the prefix of a tracked sequence.

use crate::invariants::debug_assert_window_len;
use crate::listen::Listener;
use crate::types::{SeqDiff, SeqKind};

/// Caps the wrapped listener at `max_size` elements.
///
/// The adapter mirrors the full sequence in a private shadow copy and lets
/// only edits inside the window through, synthesizing a trimming `Delete`
/// when an insertion pushes the window over its bound and a re-exposing
/// `Insert` (fed from the shadow) when a deletion pulls it under, provided
/// the shadow still has an element to re-expose.
///
/// An edit past the window updates only the shadow: nothing is forwarded, so
/// growth beyond the bound never produces a redundant insert/delete pair
/// downstream.
pub struct BoundedPrefix<T, L> {
    inner: L,
    max_size: usize,
    /// Mirror of the full tracked sequence, every diff applied verbatim.
    shadow: Vec<T>,
    /// Length the wrapped listener will have once it drains its pending
    /// buffer. Tracked here because the adapter never observes downstream
    /// flushes; counts forwarded inserts and deletes, synthetic ones
    /// included.
    inner_len: usize,
}

impl<T, L> BoundedPrefix<T, L> {
    /// Wrap `inner`, bounding it to `max_size` elements.
    ///
    /// # Panics
    ///
    /// Panics if `max_size` is zero.
    pub fn new(inner: L, max_size: usize) -> Self {
        assert!(max_size > 0, "bounded prefix needs room for at least one element");
        Self { inner, max_size, shadow: Vec::new(), inner_len: 0 }
    }

    /// Unwrap, discarding the shadow.
    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<T, L> Listener<SeqDiff<T>> for BoundedPrefix<T, L>
where
    T: Clone,
    L: Listener<SeqDiff<T>>,
{
    fn receive(&mut self, diff: SeqDiff<T>) {
        diff.apply_to(&mut self.shadow);

        if diff.index() < self.max_size {
            let kind = diff.kind();
            self.inner.receive(diff);
            match kind {
                SeqKind::Insert => {
                    self.inner_len += 1;
                    if self.inner_len > self.max_size {
                        // The insertion grew the window past its bound. Trim.
                        self.inner.receive(SeqDiff::Delete { index: self.max_size });
                        self.inner_len -= 1;
                    }
                }
                SeqKind::Delete => {
                    self.inner_len -= 1;
                    if self.inner_len < self.max_size && self.max_size <= self.shadow.len() {
                        // The deletion shrank the window while the shadow
                        // still covers it: re-expose the element that just
                        // slid inside.
                        self.inner.receive(SeqDiff::Insert {
                            index: self.max_size - 1,
                            value: self.shadow[self.max_size - 1].clone(),
                        });
                        self.inner_len += 1;
                    }
                }
                SeqKind::Replace => {}
            }
        }

        debug_assert_window_len!(self.inner_len, self.shadow.len(), self.max_size);
    }

    fn finalize_batch(&mut self) {
        self.inner.finalize_batch();
    }
}

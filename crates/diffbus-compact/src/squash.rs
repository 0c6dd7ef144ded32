//! Squash: merge runs of contiguous same-kind diffs into range records.

use diffbus::{RangeOp, SeqDiff, SeqKind};

/// Merge consecutive same-kind diffs that form contiguous runs into
/// [`RangeOp`]s.
///
/// Insert and replace runs climb one position per op; delete runs stay at
/// one position while the sequence shrinks underneath them. Any other
/// adjacency flushes the current run and starts a new one. Empty input
/// yields nothing.
pub fn squash_sequence<T, I>(diffs: I) -> Squash<T, I::IntoIter>
where
    I: IntoIterator<Item = SeqDiff<T>>,
{
    Squash { input: diffs.into_iter(), run: None }
}

/// Streaming iterator returned by [`squash_sequence`].
pub struct Squash<T, I> {
    input: I,
    run: Option<Run<T>>,
}

impl<T, I> Iterator for Squash<T, I>
where
    I: Iterator<Item = SeqDiff<T>>,
{
    type Item = RangeOp<T>;

    fn next(&mut self) -> Option<Self::Item> {
        for diff in self.input.by_ref() {
            match &mut self.run {
                Some(run) if run.accepts(&diff) => run.push(diff),
                Some(_) => {
                    let flushed = self.run.take().map(Run::finish);
                    self.run = Some(Run::begin(diff));
                    return flushed;
                }
                None => self.run = Some(Run::begin(diff)),
            }
        }
        self.run.take().map(Run::finish)
    }
}

/// An open run of same-kind, contiguous ops.
struct Run<T> {
    kind: SeqKind,
    start: usize,
    last: usize,
    count: usize,
    payload: Vec<T>,
}

impl<T> Run<T> {
    fn begin(diff: SeqDiff<T>) -> Self {
        let mut run = Run {
            kind: diff.kind(),
            start: diff.index(),
            last: diff.index(),
            count: 0,
            payload: Vec::new(),
        };
        run.push(diff);
        run
    }

    /// Whether `diff` extends this run.
    fn accepts(&self, diff: &SeqDiff<T>) -> bool {
        if diff.kind() != self.kind {
            return false;
        }
        match self.kind {
            SeqKind::Insert | SeqKind::Replace => diff.index() == self.last + 1,
            SeqKind::Delete => diff.index() == self.last,
        }
    }

    fn push(&mut self, diff: SeqDiff<T>) {
        self.last = diff.index();
        self.count += 1;
        match diff {
            SeqDiff::Insert { value, .. } | SeqDiff::Replace { value, .. } => {
                self.payload.push(value);
            }
            SeqDiff::Delete { .. } => {}
        }
    }

    fn finish(self) -> RangeOp<T> {
        let stop = match self.kind {
            // Inclusive end for inserts, half-open for replaces and deletes.
            SeqKind::Insert => self.start + self.count - 1,
            SeqKind::Replace | SeqKind::Delete => self.start + self.count,
        };
        RangeOp { kind: self.kind, start: self.start, stop, payload: self.payload }
    }
}

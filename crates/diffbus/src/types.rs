//! Diff records for the two tracked container families.
//!
//! Edits are modeled as plain sum types: `SeqDiff` for ordered sequences,
//! `MapDiff` for associative mappings. A `Delete` carries no payload, so the
//! "payload is ignored for DELETE" convention is unrepresentable rather than
//! merely documented. Records are immutable once emitted; everything
//! downstream (listeners, adapters, compaction) consumes them by value or by
//! shared reference.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ApplyError;

/// One edit to an ordered sequence.
///
/// Positions are producer positions at emission time: an `Insert` at `i`
/// shifts every element at `i` and after one place right, a `Delete` shifts
/// everything after `i` one place left. Replaying a diff list therefore only
/// makes sense against the sequence state it was recorded from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SeqDiff<T> {
    /// Insert `value` at `index` (`0 <= index <= len`).
    Insert { index: usize, value: T },
    /// Overwrite the element at `index` (`0 <= index < len`).
    Replace { index: usize, value: T },
    /// Remove the element at `index` (`0 <= index < len`).
    Delete { index: usize },
}

impl<T> SeqDiff<T> {
    /// The position this edit targets.
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Self::Insert { index, .. } | Self::Replace { index, .. } | Self::Delete { index } => {
                *index
            }
        }
    }

    /// The edit kind, stripped of its data.
    #[inline]
    pub fn kind(&self) -> SeqKind {
        match self {
            Self::Insert { .. } => SeqKind::Insert,
            Self::Replace { .. } => SeqKind::Replace,
            Self::Delete { .. } => SeqKind::Delete,
        }
    }

    /// Transform the payload, keeping kind and position.
    pub fn map_value<U>(self, f: impl FnOnce(T) -> U) -> SeqDiff<U> {
        match self {
            Self::Insert { index, value } => SeqDiff::Insert { index, value: f(value) },
            Self::Replace { index, value } => SeqDiff::Replace { index, value: f(value) },
            Self::Delete { index } => SeqDiff::Delete { index },
        }
    }

    /// Replay this edit onto `seq`.
    ///
    /// # Panics
    ///
    /// Panics if the target position is out of bounds for `seq`, i.e. the
    /// diff was recorded against a different sequence state.
    pub fn apply_to(&self, seq: &mut Vec<T>)
    where
        T: Clone,
    {
        match self {
            Self::Insert { index, value } => seq.insert(*index, value.clone()),
            Self::Replace { index, value } => seq[*index] = value.clone(),
            Self::Delete { index } => {
                seq.remove(*index);
            }
        }
    }
}

/// One edit to an associative mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MapDiff<K, V> {
    /// Assign `value` under `key`, overwriting any previous value.
    Set { key: K, value: V },
    /// Remove `key`.
    Delete { key: K },
}

impl<K, V> MapDiff<K, V> {
    /// The key this edit targets.
    #[inline]
    pub fn key(&self) -> &K {
        match self {
            Self::Set { key, .. } | Self::Delete { key } => key,
        }
    }

    /// Transform the payload, keeping kind and key.
    pub fn map_value<U>(self, f: impl FnOnce(V) -> U) -> MapDiff<K, U> {
        match self {
            Self::Set { key, value } => MapDiff::Set { key, value: f(value) },
            Self::Delete { key } => MapDiff::Delete { key },
        }
    }

    /// Replay this edit onto `map`.
    ///
    /// Deleting a key the mapping does not contain is an [`ApplyError`], not
    /// a panic: compaction can legitimately hand a caller such a record (see
    /// `compact_mapping` in the companion crate), and the caller owns the
    /// policy for it.
    pub fn apply_to(&self, map: &mut HashMap<K, V>) -> Result<(), ApplyError>
    where
        K: Eq + Hash + Clone + fmt::Debug,
        V: Clone,
    {
        match self {
            Self::Set { key, value } => {
                map.insert(key.clone(), value.clone());
                Ok(())
            }
            Self::Delete { key } => match map.remove(key) {
                Some(_) => Ok(()),
                None => Err(ApplyError::missing_key(key)),
            },
        }
    }
}

/// Sequence edit kinds, without their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SeqKind {
    Insert,
    Replace,
    Delete,
}

/// A run of contiguous same-kind sequence edits, as produced by squashing.
///
/// `stop` is inclusive for `Insert` runs and exclusive for `Replace` and
/// `Delete` runs; `payload` is empty for `Delete`. Only sequence kinds exist
/// here; there is no way to build a `RangeOp` over mapping edits.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangeOp<T> {
    pub kind: SeqKind,
    pub start: usize,
    pub stop: usize,
    pub payload: Vec<T>,
}

impl<T> RangeOp<T> {
    /// Expand back into the constituent per-element diffs.
    ///
    /// Inverse of squashing: `Insert`/`Replace` runs climb one index per
    /// payload element, a `Delete` run repeats at `start` while the sequence
    /// shrinks underneath it.
    pub fn expand(&self) -> Vec<SeqDiff<T>>
    where
        T: Clone,
    {
        match self.kind {
            SeqKind::Insert => self
                .payload
                .iter()
                .cloned()
                .enumerate()
                .map(|(offset, value)| SeqDiff::Insert { index: self.start + offset, value })
                .collect(),
            SeqKind::Replace => self
                .payload
                .iter()
                .cloned()
                .enumerate()
                .map(|(offset, value)| SeqDiff::Replace { index: self.start + offset, value })
                .collect(),
            SeqKind::Delete => (self.start..self.stop)
                .map(|_| SeqDiff::Delete { index: self.start })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_apply_follows_positional_semantics() {
        let mut seq = vec!["a", "b"];
        SeqDiff::Insert { index: 1, value: "x" }.apply_to(&mut seq);
        assert_eq!(seq, ["a", "x", "b"]);
        SeqDiff::Replace { index: 0, value: "y" }.apply_to(&mut seq);
        assert_eq!(seq, ["y", "x", "b"]);
        SeqDiff::<&str>::Delete { index: 1 }.apply_to(&mut seq);
        assert_eq!(seq, ["y", "b"]);
    }

    #[test]
    fn map_apply_reports_missing_key() {
        let mut map = HashMap::new();
        MapDiff::Set { key: "x", value: 1 }.apply_to(&mut map).unwrap();
        assert_eq!(map.get("x"), Some(&1));
        MapDiff::<&str, i32>::Delete { key: "x" }.apply_to(&mut map).unwrap();
        let err = MapDiff::<&str, i32>::Delete { key: "x" }
            .apply_to(&mut map)
            .unwrap_err();
        assert!(matches!(err, ApplyError::MissingKey { .. }));
    }

    #[test]
    fn map_value_keeps_position() {
        let diff = SeqDiff::Insert { index: 3, value: 2 }.map_value(|v| v * 10);
        assert_eq!(diff, SeqDiff::Insert { index: 3, value: 20 });
    }

    #[test]
    fn delete_range_expands_to_repeated_position() {
        let range = RangeOp::<i32> { kind: SeqKind::Delete, start: 1, stop: 4, payload: vec![] };
        assert_eq!(
            range.expand(),
            vec![
                SeqDiff::Delete { index: 1 },
                SeqDiff::Delete { index: 1 },
                SeqDiff::Delete { index: 1 },
            ]
        );
    }
}

//! Mapping compaction: at most one surviving op per key.

use std::hash::Hash;

use diffbus::MapDiff;
use indexmap::IndexMap;

/// Collapse a set/delete history to its net effect: one record per touched
/// key, emitted in first-touch order.
///
/// A key whose history ends in a delete survives as a lone `Delete` even if
/// the mapping being tracked never held it (a set/delete pair collapses to
/// just the delete). Replaying such a record against a snapshot without the
/// key surfaces [`diffbus::ApplyError::MissingKey`]; running the output
/// through compaction again reproduces the same delete. Whether to tolerate
/// or strip those is the caller's policy.
pub fn compact_mapping<K, V>(diffs: impl IntoIterator<Item = MapDiff<K, V>>) -> Vec<MapDiff<K, V>>
where
    K: Eq + Hash,
{
    // `None` is the tombstone: the key's history ends in a delete.
    let mut net: IndexMap<K, Option<V>> = IndexMap::new();
    for diff in diffs {
        match diff {
            MapDiff::Set { key, value } => {
                net.insert(key, Some(value));
            }
            MapDiff::Delete { key } => {
                net.insert(key, None);
            }
        }
    }
    net.into_iter()
        .map(|(key, net_value)| match net_value {
            Some(value) => MapDiff::Set { key, value },
            None => MapDiff::Delete { key },
        })
        .collect()
}

//! Error types for diff replay.

use std::fmt;

use thiserror::Error;

/// Errors surfaced when replaying buffered diffs onto a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// A mapping `Delete` targeted a key the snapshot does not contain.
    ///
    /// Compaction can reduce a SET/DELETE pair to a lone DELETE; replaying
    /// that against a mapping which never held the key ends up here. The key
    /// is captured in its `Debug` rendering.
    #[error("delete for missing key {key}")]
    MissingKey { key: String },
}

impl ApplyError {
    pub(crate) fn missing_key(key: &impl fmt::Debug) -> Self {
        Self::MissingKey { key: format!("{key:?}") }
    }
}

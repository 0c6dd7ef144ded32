/// Counters describing a dispatcher's activity.
///
/// Plain `u64` fields, no atomics: the dispatch model is single-threaded
/// cooperative, so there is exactly one writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Diffs delivered to the listener set.
    pub diffs_emitted: u64,
    /// Emits that arrived while an earlier delivery was in flight.
    pub nested_emits: u64,
    /// Batch scopes that closed with at least one admitted edit.
    pub batches_finalized: u64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }
}

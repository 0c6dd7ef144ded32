//! Debug assertion macros for pipeline invariants.
//!
//! Only active in debug builds (`debug_assert!`), so there is zero overhead
//! in release builds.

/// Assert that the bounded window tracks `min(shadow length, max size)`.
///
/// Holds after every admitted edit: the wrapped listener, once it drains its
/// pending buffer, is exactly as long as the visible prefix of the shadow.
macro_rules! debug_assert_window_len {
    ($inner_len:expr, $shadow_len:expr, $max_size:expr) => {
        debug_assert!(
            $inner_len == ::std::cmp::min($shadow_len, $max_size),
            "bounded window out of sync: inner length {} != min(shadow {}, max {})",
            $inner_len,
            $shadow_len,
            $max_size
        )
    };
}

/// Assert that the dispatch queue fully drained before the outermost frame
/// returned.
macro_rules! debug_assert_queue_drained {
    ($len:expr) => {
        debug_assert!($len == 0, "dispatch queue not drained: {} diffs left", $len)
    };
}

pub(crate) use debug_assert_queue_drained;
pub(crate) use debug_assert_window_len;

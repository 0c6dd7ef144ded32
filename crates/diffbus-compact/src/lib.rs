//! Offline algebra over collected diff lists.
//!
//! The live pipeline (`diffbus`) hands out lists of diff records; this crate
//! transforms them after the fact:
//!
//! - [`compact_sequence`]: reduce a sequence diff list to the minimum
//!   equivalent list, cancelling insert/replace/delete pairs that target the
//!   same element while keeping every position consistent.
//! - [`compact_mapping`]: reduce a mapping diff list to at most one record
//!   per key.
//! - [`squash_sequence`]: merge runs of contiguous same-kind diffs into
//!   range records.
//!
//! These are pure functions over already-collected lists, not pipeline
//! stages: collect from a listener first, then transform.
//!
//! ```
//! use diffbus::SeqDiff;
//! use diffbus_compact::compact_sequence;
//!
//! let history = vec![
//!     SeqDiff::Insert { index: 0, value: "x" },
//!     SeqDiff::Replace { index: 0, value: "y" },
//! ];
//! // The overwrite folds into the insert that produced the element.
//! assert_eq!(
//!     compact_sequence(history),
//!     vec![SeqDiff::Insert { index: 0, value: "y" }],
//! );
//! ```

mod mapping;
mod sequence;
mod squash;

pub use mapping::compact_mapping;
pub use sequence::compact_sequence;
pub use squash::{squash_sequence, Squash};

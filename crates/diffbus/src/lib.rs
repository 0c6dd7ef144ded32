//! diffbus: mutation tracking for observable containers.
//!
//! Edits to an ordered sequence or an associative mapping are recorded as
//! explicit diff records ([`SeqDiff`], [`MapDiff`]), fanned out through a
//! [`Dispatcher`], and buffered in listeners that apply them lazily on
//! demand. Consumers read a listener's snapshot as of the last
//! materialization, then drain the pending diffs when they are ready.
//!
//! # Key pieces
//!
//! - [`Dispatcher`]: serializes emission; every diff reaches every listener
//!   in registration order before the next one is admitted, re-entrant emits
//!   from listener callbacks included.
//! - [`SeqListener`] / [`MapListener`]: pending buffer plus materialized
//!   snapshot; batch-end hooks via [`Dispatcher::batch`] scopes.
//! - [`PayloadMapper`]: transforms payloads on the way into a listener.
//! - [`BoundedPrefix`]: windows a sequence listener to a fixed maximum
//!   length, trimming and re-exposing elements from a shadow copy.
//!
//! The offline algebra over collected diff lists (compaction, squash) lives
//! in the companion crate `diffbus-compact`.
//!
//! # Example
//!
//! ```
//! use diffbus::{SeqDispatcher, SeqListener};
//!
//! let dispatcher = SeqDispatcher::new();
//! let listener = SeqListener::new();
//! dispatcher.add_listener(listener.clone());
//!
//! dispatcher.insert(0, "a");
//! dispatcher.insert(1, "b");
//!
//! // Nothing is applied until the pending buffer is drained.
//! assert!(listener.snapshot().is_empty());
//! assert!(listener.has_changed());
//!
//! let pending = listener.take_pending();
//! assert_eq!(pending.len(), 2);
//! assert_eq!(listener.snapshot(), vec!["a", "b"]);
//! ```
//!
//! # Threading
//!
//! Single-threaded cooperative by design: handles are `Rc`-based and `!Send`,
//! no operation suspends, and the only form of "concurrency" is listener
//! re-entrancy, which the dispatcher linearizes through a FIFO queue.

mod bounded;
mod config;
mod dispatch;
mod error;
mod invariants;
mod listen;
mod mapper;
mod metrics;
mod types;

pub use bounded::BoundedPrefix;
pub use config::Config;
pub use dispatch::{BatchScope, Dispatcher, MapDispatcher, SeqDispatcher};
pub use error::ApplyError;
pub use listen::{
    listener_fn, Listener, ListenerFn, MapListener, PendingMap, PendingSeq, SeqListener,
};
pub use mapper::{map_payload, PayloadMapper};
pub use metrics::DispatchStats;
pub use types::{MapDiff, RangeOp, SeqDiff, SeqKind};

//! Concurrent shared-canvas store.
//!
//! This crate holds the authoritative state for a large shared, mutable 2D
//! grid under concurrent single-cell writes. Every accepted write is ordered
//! into an append-only log, and readers obtain fully caught-up copies of the
//! grid through a tiered snapshot cache that amortizes the full-grid-copy
//! cost across many reads.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  CanvasStore                                                        │
//! │    - One RwLock over { UpdateLog, RateLimiter, SnapshotCache }      │
//! │    - submit_write: bounds → cooldown → append (exclusive, O(1))     │
//! │    - read_snapshot: refresh (exclusive) → copy (unlocked)           │
//! │                     → bounded catch-up (shared)                     │
//! └─────────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  SnapshotCache                                                      │
//! │    - working: GridSnapshot, always caught up to the log tail        │
//! │    - published: Arc<GridSnapshot>, frozen, swapped wholesale        │
//! │    - full clone only once per republish_threshold updates          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writers never see a partially applied state: a write is either rejected
//! (out of bounds, or the writer is inside its cooldown window) without any
//! side effect, or appended to the log with the next sequence number.
//! Readers holding an old published snapshot keep a frozen, internally
//! consistent view; the cache replaces the `Arc`, never the object behind it.
//!
//! Transport, persistence, and rendering are external collaborators. They
//! drive the store through [`CanvasStore::submit_write`],
//! [`CanvasStore::read_snapshot`], and [`CanvasStore::updates_since`];
//! log entries are immutable and gaplessly numbered, so checkpoint/replay is
//! well-defined without the store knowing about disks or sockets.

mod cache;
mod cell;
mod error;
mod limiter;
mod log;
mod snapshot;
mod store;

pub use cache::SnapshotCache;
pub use cell::{CellValue, WriterId};
pub use error::{CanvasError, CanvasResult};
pub use limiter::RateLimiter;
pub use log::{Update, UpdateLog};
pub use snapshot::GridSnapshot;
pub use store::{CanvasConfig, CanvasStore, WriteOutcome};

/// Position of an update in the log (zero-based, gapless, monotonic).
pub type SeqId = u64;

/// A caller-supplied instant, expressed as the elapsed time since the Unix
/// epoch.
///
/// The store never reads a clock itself; callers pass `now` into
/// [`CanvasStore::submit_write`]. Using [`std::time::Duration`] end to end
/// keeps cooldown arithmetic unit-safe.
pub type Timestamp = std::time::Duration;

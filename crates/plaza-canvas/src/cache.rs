//! Tiered snapshot cache.
//!
//! A full grid copy on every read would cost O(width * height) per read. The
//! cache keeps two tiers instead: a privately owned *working* snapshot that is
//! caught up to the log tail on every refresh (cheap — proportional to the
//! updates since the last refresh), and a shared *published* snapshot that is
//! recloned from the working copy only once the gap between them reaches the
//! republish threshold. Readers start from the published copy and fold in at
//! most a threshold's worth of updates themselves.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{GridSnapshot, UpdateLog};

/// Working/published snapshot pair with threshold-gated republishing.
///
/// The published snapshot is frozen: republishing swaps the `Arc` for a new
/// allocation, so readers that captured the old handle keep an internally
/// consistent view for as long as they hold it.
#[derive(Debug)]
pub struct SnapshotCache {
    working: GridSnapshot,
    published: Arc<GridSnapshot>,
    republish_threshold: u64,
}

impl SnapshotCache {
    /// Create a cache; both tiers start as copies of `initial`.
    #[must_use]
    pub fn new(initial: GridSnapshot, republish_threshold: u64) -> Self {
        Self {
            published: Arc::new(initial.clone()),
            working: initial,
            republish_threshold,
        }
    }

    /// Number of updates the published snapshot may lag the working one.
    #[must_use]
    pub fn republish_threshold(&self) -> u64 {
        self.republish_threshold
    }

    /// Sequence number of the currently published snapshot.
    #[must_use]
    pub fn published_through(&self) -> u64 {
        self.published.applied_through()
    }

    /// Catch the working snapshot up to the log tail, republish if it has
    /// pulled far enough ahead, and hand back the published snapshot.
    ///
    /// Must run while the caller holds the store's exclusive lock: it mutates
    /// both tiers. The returned handle is safe to use after the lock is
    /// released — it is never mutated, only replaced.
    pub fn refresh(&mut self, log: &UpdateLog) -> Arc<GridSnapshot> {
        self.working.apply(log, log.len());

        let lag = self.working.applied_through() - self.published.applied_through();
        if lag >= self.republish_threshold {
            // The expensive full-grid clone, amortized over at least
            // `republish_threshold` reads or writes.
            debug!(
                applied_through = self.working.applied_through(),
                lag, "republishing snapshot"
            );
            self.published = Arc::new(self.working.clone());
        } else {
            trace!(lag, "published snapshot within threshold");
        }

        Arc::clone(&self.published)
    }
}

//! The canvas store: write admission, ordering, and tiered reads.

use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cache::SnapshotCache;
use crate::error::{CanvasError, CanvasResult};
use crate::limiter::RateLimiter;
use crate::log::{Update, UpdateLog};
use crate::snapshot::GridSnapshot;
use crate::{CellValue, SeqId, Timestamp, WriterId};

/// Construction-time configuration for a [`CanvasStore`].
///
/// Dimensions are fixed for the lifetime of the instance; growing the canvas
/// means constructing a new store, optionally seeded from the old one via
/// [`CanvasStore::seeded`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Payload carried by cells nobody has written yet.
    pub background: u64,
    /// Updates allowed to accumulate before the published snapshot is
    /// recloned from the working one.
    pub republish_threshold: u64,
    /// Minimum interval between two accepted writes from the same writer.
    pub cooldown: Duration,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            background: 0,
            republish_threshold: 100,
            cooldown: Duration::from_secs(5 * 60),
        }
    }
}

/// Outcome of a write attempt.
///
/// Rejections are ordinary values, not errors: they are expected under normal
/// operation and leave the store completely untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[must_use]
pub enum WriteOutcome {
    /// The write was admitted and appended at this sequence number.
    Accepted(SeqId),
    /// The coordinates fall outside the canvas.
    RejectedBounds,
    /// The writer is still inside its cooldown window.
    RejectedCooldown,
}

impl WriteOutcome {
    /// Whether the write landed in the log.
    #[must_use]
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Mutable state guarded by the store's single read-write lock.
struct State {
    log: UpdateLog,
    limiter: RateLimiter,
    cache: SnapshotCache,
}

/// Authoritative state for one shared canvas.
///
/// The store owns the update log, the rate limiter, and the snapshot cache,
/// all behind one [`RwLock`]. Writers hold the write lock for the whole O(1)
/// admission section. Readers take the write lock briefly to refresh the
/// cache, then only a read lock while folding the bounded tail into their
/// private copy — so readers never block each other, and never block writers
/// for the cost of a full-grid copy.
///
/// There is no global instance; construct a store and pass it (or an `Arc` of
/// it) to whatever handlers need it.
pub struct CanvasStore {
    config: CanvasConfig,
    state: RwLock<State>,
}

impl CanvasStore {
    /// Create a store with an all-background canvas.
    ///
    /// # Errors
    /// Returns [`CanvasError::ZeroDimension`] or [`CanvasError::ZeroThreshold`]
    /// when the configuration is unusable.
    pub fn new(config: CanvasConfig) -> CanvasResult<Self> {
        let initial = GridSnapshot::new(config.width, config.height, config.background);
        Self::with_initial(config, initial)
    }

    /// Create a store whose initial canvas carries over the overlapping
    /// region of `seed` (typically the final snapshot of a smaller store).
    ///
    /// The new store's log starts empty at sequence 0: the seed becomes the
    /// background state of a fresh epoch, and the old instance keeps its own
    /// history.
    ///
    /// # Errors
    /// Same conditions as [`CanvasStore::new`].
    pub fn seeded(config: CanvasConfig, seed: &GridSnapshot) -> CanvasResult<Self> {
        let mut initial = GridSnapshot::new(config.width, config.height, config.background);
        initial.paste_overlap(seed);
        Self::with_initial(config, initial)
    }

    fn with_initial(config: CanvasConfig, initial: GridSnapshot) -> CanvasResult<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(CanvasError::ZeroDimension {
                width: config.width,
                height: config.height,
            });
        }
        if config.republish_threshold == 0 {
            return Err(CanvasError::ZeroThreshold);
        }

        let state = State {
            log: UpdateLog::new(),
            limiter: RateLimiter::new(config.cooldown),
            cache: SnapshotCache::new(initial, config.republish_threshold),
        };

        Ok(Self {
            config,
            state: RwLock::new(state),
        })
    }

    /// Grid width in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Grid height in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// The configuration this store was built with.
    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Attempt to write one cell.
    ///
    /// Bounds are checked first; an out-of-bounds write touches neither the
    /// rate limiter nor the log. In-bounds writes go through cooldown
    /// admission and, if admitted, are appended to the log — check, update,
    /// and append all happen inside one exclusive critical section, so the
    /// write is all-or-nothing and sequence numbers stay gapless.
    ///
    /// `now` is the caller's clock reading, as elapsed time since the Unix
    /// epoch; the store never reads a clock itself.
    pub fn submit_write(
        &self,
        x: u32,
        y: u32,
        value: u64,
        writer: WriterId,
        now: Timestamp,
    ) -> WriteOutcome {
        if x >= self.config.width || y >= self.config.height {
            trace!(x, y, writer, "write rejected: out of bounds");
            return WriteOutcome::RejectedBounds;
        }

        let mut state = self.state.write();

        if !state.limiter.admit(writer, now) {
            trace!(writer, "write rejected: cooldown");
            return WriteOutcome::RejectedCooldown;
        }

        let seq = state.log.append(CellValue::new(x, y, value, writer), now);
        debug!(seq, x, y, writer, "write accepted");
        WriteOutcome::Accepted(seq)
    }

    /// Read a fully caught-up, caller-owned copy of the canvas.
    ///
    /// The returned snapshot reflects every update admitted before some
    /// consistent point during the call: its
    /// [`applied_through`](GridSnapshot::applied_through) equals the log
    /// length at that point, with nothing beyond it and nothing missing.
    ///
    /// Cost: the exclusive phase is proportional to the updates since the
    /// last read (plus, once per `republish_threshold` updates, one full-grid
    /// clone); the private catch-up in the shared phase folds in at most a
    /// threshold's worth of updates plus whatever writers squeezed in between
    /// the two phases.
    #[must_use]
    pub fn read_snapshot(&self) -> GridSnapshot {
        // Exclusive: catch the cache up and capture the published handle.
        let published = {
            let mut state = self.state.write();
            let State { log, cache, .. } = &mut *state;
            cache.refresh(log)
        };

        // No lock: deep-copy the frozen published snapshot. Concurrent
        // republishes swap the Arc rather than touching this object.
        let mut copy = GridSnapshot::clone(&published);

        // Shared: fold in the bounded tail. The read lock only guards the
        // log against a concurrent append mid-iteration; other readers
        // proceed in parallel.
        let state = self.state.read();
        copy.apply(&state.log, state.log.len());
        copy
    }

    /// Clone the updates with `seq >= from`, for incremental consumers
    /// (display diffing, checkpointing).
    #[must_use]
    pub fn updates_since(&self, from: SeqId) -> Vec<Update> {
        let state = self.state.read();
        state.log.range(from, state.log.len()).to_vec()
    }

    /// Number of accepted writes so far.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.state.read().log.len()
    }

    /// Whether no write has been accepted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().log.is_empty()
    }

    /// Number of writers the rate limiter currently tracks.
    #[must_use]
    pub fn tracked_writers(&self) -> usize {
        self.state.read().limiter.tracked_writers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_store(republish_threshold: u64) -> CanvasStore {
        CanvasStore::new(CanvasConfig {
            width: 3,
            height: 3,
            republish_threshold,
            ..CanvasConfig::default()
        })
        .unwrap()
    }

    fn at(secs: u64) -> Timestamp {
        Duration::from_secs(secs)
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let result = CanvasStore::new(CanvasConfig {
            width: 0,
            height: 3,
            ..CanvasConfig::default()
        });
        assert_eq!(
            result.err(),
            Some(CanvasError::ZeroDimension {
                width: 0,
                height: 3
            })
        );
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let result = CanvasStore::new(CanvasConfig {
            republish_threshold: 0,
            ..CanvasConfig::default()
        });
        assert_eq!(result.err(), Some(CanvasError::ZeroThreshold));
    }

    #[test]
    fn test_bounds_rejection_has_no_side_effects() {
        let store = small_store(100);

        assert_eq!(store.submit_write(3, 0, 1, 7, at(0)), WriteOutcome::RejectedBounds);
        assert_eq!(store.submit_write(0, 3, 1, 7, at(0)), WriteOutcome::RejectedBounds);

        assert_eq!(store.len(), 0);
        assert_eq!(store.tracked_writers(), 0);
        // The writer was never charged a cooldown.
        assert!(store.submit_write(0, 0, 1, 7, at(0)).is_accepted());
    }

    #[test]
    fn test_cooldown_rejection_has_no_side_effects() {
        let store = small_store(100);

        assert_eq!(store.submit_write(0, 0, 1, 7, at(0)), WriteOutcome::Accepted(0));
        assert_eq!(
            store.submit_write(1, 1, 2, 7, at(1)),
            WriteOutcome::RejectedCooldown
        );

        assert_eq!(store.len(), 1);
        let snapshot = store.read_snapshot();
        assert_eq!(snapshot.get(1, 1).unwrap().value, 0);
    }

    #[test]
    fn test_sequence_numbers_are_gapless_across_rejections() {
        let store = small_store(100);

        let mut expected = 0;
        for i in 0..20u64 {
            // Every other attempt is out of bounds and must not consume a seq.
            let outcome = if i % 2 == 0 {
                store.submit_write((i % 3) as u32, 0, i, i, at(i))
            } else {
                store.submit_write(99, 99, i, i, at(i))
            };

            match outcome {
                WriteOutcome::Accepted(seq) => {
                    assert_eq!(seq, expected);
                    expected += 1;
                }
                WriteOutcome::RejectedBounds => {}
                WriteOutcome::RejectedCooldown => panic!("distinct writers never cool down"),
            }
        }

        assert_eq!(store.len(), expected);
    }

    #[test]
    fn test_read_reflects_exact_prefix() {
        let store = small_store(100);

        assert!(store.submit_write(1, 1, 5, 7, at(0)).is_accepted());
        assert!(store.submit_write(2, 0, 9, 8, at(0)).is_accepted());

        let snapshot = store.read_snapshot();
        assert_eq!(snapshot.applied_through(), 2);
        assert_eq!(snapshot.get(1, 1).unwrap().value, 5);
        assert_eq!(snapshot.get(1, 1).unwrap().writer, 7);
        assert_eq!(snapshot.get(2, 0).unwrap().value, 9);
        assert_eq!(snapshot.get(0, 0).unwrap().value, 0);
    }

    #[test]
    fn test_tiering_is_transparent() {
        // Whatever the threshold, reads must return byte-identical snapshots.
        let eager = small_store(1);
        let lazy = small_store(1_000_000);

        for i in 0..50u64 {
            let x = (i % 3) as u32;
            let y = ((i / 3) % 3) as u32;
            assert!(eager.submit_write(x, y, i, i, at(i)).is_accepted());
            assert!(lazy.submit_write(x, y, i, i, at(i)).is_accepted());

            if i % 7 == 0 {
                assert_eq!(eager.read_snapshot(), lazy.read_snapshot());
            }
        }

        assert_eq!(eager.read_snapshot(), lazy.read_snapshot());
    }

    #[test]
    fn test_updates_since() {
        let store = small_store(100);

        for i in 0..5u64 {
            assert!(store.submit_write(i as u32 % 3, 0, i, i, at(i)).is_accepted());
        }

        let tail = store.updates_since(3);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].seq, 3);
        assert_eq!(tail[1].seq, 4);
        assert!(store.updates_since(99).is_empty());
    }

    #[test]
    fn test_seeded_store_carries_overlap() {
        let old = small_store(100);
        assert!(old.submit_write(2, 2, 6, 7, at(0)).is_accepted());
        let final_state = old.read_snapshot();

        let grown = CanvasStore::seeded(
            CanvasConfig {
                width: 5,
                height: 5,
                ..CanvasConfig::default()
            },
            &final_state,
        )
        .unwrap();

        // Seed cells show through; the new epoch starts at sequence 0.
        assert_eq!(grown.len(), 0);
        let snapshot = grown.read_snapshot();
        assert_eq!(snapshot.applied_through(), 0);
        assert_eq!(snapshot.get(2, 2).unwrap().value, 6);
        assert_eq!(snapshot.get(4, 4).unwrap().value, 0);
    }
}

//! Per-writer write-admission cooldowns.

use std::time::Duration;

use hashbrown::HashMap;

use crate::{Timestamp, WriterId};

/// Tracks the last accepted write per writer and enforces a fixed cooldown
/// between accepted writes.
///
/// The limiter holds no lock of its own: `CanvasStore` calls
/// [`RateLimiter::admit`] inside the same exclusive section as the log
/// append, which makes the check-and-update atomic per writer. Entries are
/// never evicted; [`RateLimiter::tracked_writers`] exposes the table size so
/// growth stays observable.
#[derive(Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    last_accepted: HashMap<WriterId, Timestamp>,
}

impl RateLimiter {
    /// Create a limiter with the given cooldown window.
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: HashMap::new(),
        }
    }

    /// Decide admission for a write from `writer` at instant `now`.
    ///
    /// A writer's first write is always admitted. After that a write is
    /// admitted iff at least the cooldown has elapsed since the writer's last
    /// *accepted* write. Only admission updates the recorded timestamp — a
    /// rejected attempt leaves the entry untouched, so hammering the store
    /// does not push the window further out.
    ///
    /// `now` earlier than the recorded timestamp (clock skew between callers)
    /// saturates to an elapsed time of zero and rejects.
    pub fn admit(&mut self, writer: WriterId, now: Timestamp) -> bool {
        match self.last_accepted.get_mut(&writer) {
            Some(last) => {
                if now.saturating_sub(*last) < self.cooldown {
                    return false;
                }
                *last = now;
                true
            }
            None => {
                self.last_accepted.insert(writer, now);
                true
            }
        }
    }

    /// The configured cooldown window.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Number of writers with a recorded accepted write.
    #[must_use]
    pub fn tracked_writers(&self) -> usize {
        self.last_accepted.len()
    }
}

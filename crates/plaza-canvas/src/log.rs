//! Append-only update log — the source of truth.

use serde::{Deserialize, Serialize};

use crate::{CellValue, SeqId, Timestamp};

/// One accepted write, with its assigned position in the log.
///
/// Created exactly once, at admission time, by the store. Never mutated or
/// deleted afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// Position of this update in the log.
    pub seq: SeqId,
    /// Caller-supplied admission time.
    pub timestamp: Timestamp,
    /// The cell state this update installs.
    pub cell: CellValue,
}

/// Ordered, append-only sequence of accepted writes.
///
/// Invariant: the i-th entry has `seq == i`; the length only grows. The log
/// holds no lock of its own — `CanvasStore` owns one exclusively and
/// serializes all access to it. Entries are immutable and gaplessly
/// numbered, so a persistence collaborator can checkpoint and replay via
/// [`UpdateLog::range`].
#[derive(Debug, Default)]
pub struct UpdateLog {
    updates: Vec<Update>,
}

impl UpdateLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an accepted write, assigning it the next sequence number.
    pub fn append(&mut self, cell: CellValue, timestamp: Timestamp) -> SeqId {
        let seq = self.updates.len() as SeqId;
        self.updates.push(Update {
            seq,
            timestamp,
            cell,
        });
        seq
    }

    /// Number of updates in the log.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.updates.len() as u64
    }

    /// Whether the log has no updates yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Borrowed view of the updates with `from <= seq < to`, in order.
    ///
    /// Both ends are clamped to the log tail, so a caller racing a concurrent
    /// append simply sees the available suffix.
    #[must_use]
    pub fn range(&self, from: SeqId, to: SeqId) -> &[Update] {
        let to = to.min(self.len()) as usize;
        let from = (from as usize).min(to);
        &self.updates[from..to]
    }
}

//! Materialized grid snapshots.

use serde::{Deserialize, Serialize};

use crate::{CellValue, SeqId, UpdateLog};

/// A dense, fully materialized copy of the canvas at a specific log position.
///
/// Cells are stored row-major (`y * width + x`). `applied_through` is the
/// exclusive upper bound of the log prefix this snapshot reflects: every cell
/// holds the most recent update with a matching position and
/// `seq < applied_through`, or the background value if none exists.
///
/// Bounds are validated at the store boundary, not here — the snapshot trusts
/// the coordinates carried by log entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    width: u32,
    height: u32,
    cells: Vec<CellValue>,
    applied_through: SeqId,
}

impl GridSnapshot {
    /// Create an all-background snapshot at log position 0.
    #[must_use]
    pub fn new(width: u32, height: u32, background: u64) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(CellValue::new(x, y, background, 0));
            }
        }

        Self {
            width,
            height,
            cells,
            applied_through: 0,
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Exclusive upper bound of the log prefix this snapshot reflects.
    ///
    /// Equivalently: the snapshot's sequence number, the number of updates
    /// folded into it.
    #[must_use]
    pub fn applied_through(&self) -> SeqId {
        self.applied_through
    }

    /// Get a cell by coordinate, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<CellValue> {
        if x < self.width && y < self.height {
            Some(self.cells[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// All cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    /// Catch this snapshot up to `upto_exclusive` by folding in log entries,
    /// in sequence order, last write winning per cell.
    ///
    /// Only entries with `applied_through <= seq < upto_exclusive` are
    /// applied; entries already folded in are never re-applied, so repeating
    /// a call with the same bound is a no-op. `upto_exclusive` is clamped to
    /// the log tail, and `applied_through` never moves backwards.
    pub fn apply(&mut self, log: &UpdateLog, upto_exclusive: SeqId) {
        let upto = upto_exclusive.min(log.len());
        for update in log.range(self.applied_through, upto) {
            let cell = update.cell;
            self.cells[(cell.y * self.width + cell.x) as usize] = cell;
        }
        self.applied_through = self.applied_through.max(upto);
    }

    /// Copy the overlapping region of `seed` into this snapshot's background.
    ///
    /// Used when a new canvas is constructed from an old one's final state;
    /// `applied_through` is left untouched because the seed belongs to the
    /// previous instance's log, not this one's.
    pub(crate) fn paste_overlap(&mut self, seed: &Self) {
        for y in 0..self.height.min(seed.height) {
            for x in 0..self.width.min(seed.width) {
                if let Some(cell) = seed.get(x, y) {
                    self.cells[(y * self.width + x) as usize] = cell;
                }
            }
        }
    }
}

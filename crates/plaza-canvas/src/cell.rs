//! Per-cell values.

use serde::{Deserialize, Serialize};

/// Opaque writer identity token.
///
/// Supplied by the caller (typically the transport layer); the store never
/// interprets or authenticates it.
pub type WriterId = u64;

/// The last-written state of one canvas cell.
///
/// Immutable once created. A `CellValue` carries enough to repaint the cell
/// on a display surface, not to reconstruct history; the update log holds the
/// full ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellValue {
    /// Column, in `0..width`.
    pub x: u32,
    /// Row, in `0..height`.
    pub y: u32,
    /// Opaque payload (e.g. a palette index). Not interpreted by the store.
    pub value: u64,
    /// The writer that produced this value. Default cells carry writer 0.
    pub writer: WriterId,
}

impl CellValue {
    /// Create a cell value.
    #[must_use]
    pub const fn new(x: u32, y: u32, value: u64, writer: WriterId) -> Self {
        Self {
            x,
            y,
            value,
            writer,
        }
    }
}

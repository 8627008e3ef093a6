//! Canvas error types.

use thiserror::Error;

/// Canvas construction error.
///
/// Write rejections are not errors — they come back as
/// [`WriteOutcome`](crate::WriteOutcome) values. This type only covers
/// configuration misuse caught at construction time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanvasError {
    /// Canvas dimensions must both be non-zero.
    #[error("canvas dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },

    /// The republish threshold must be non-zero.
    #[error("republish threshold must be non-zero")]
    ZeroThreshold,
}

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

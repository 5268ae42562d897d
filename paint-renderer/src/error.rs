//! Renderer error types.

use paint_core::CanvasError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering, loading or exporting.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error from the core painting model.
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    /// Pixel buffer could not be allocated (zero or huge dimensions).
    #[error("Cannot allocate {width}x{height} pixel buffer")]
    Allocation {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Image or stamp asset failed to decode.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Stamp name not in the configured catalog.
    #[error("Unknown stamp: {0}")]
    UnknownStamp(String),

    /// Encoding an output image failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Background decode task was cancelled or panicked.
    #[error("Decode task failed: {0}")]
    Task(String),
}

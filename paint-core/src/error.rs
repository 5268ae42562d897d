//! Error types for painting operations.

use thiserror::Error;

/// Result type for painting operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in painting operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Layer index outside the configured stack.
    #[error("Layer {index} out of range (stack has {count} layers)")]
    LayerOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of layers in the stack.
        count: usize,
    },

    /// Layer exists but cannot receive strokes.
    #[error("Layer {0} is not a drawing layer")]
    LayerNotDrawable(usize),

    /// Project JSON could not be parsed at all.
    #[error("Malformed project JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// Project JSON parsed but is structurally invalid.
    #[error("Invalid project file: {0}")]
    InvalidProject(String),

    /// File type rejected before reading its contents.
    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    /// Color string could not be understood.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error outside project loading.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error while reading or writing files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

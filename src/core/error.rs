//! Error types for texture generation

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// The pooled rendering context could not be created.
    #[error("GPU error: {0}")]
    Gpu(String),

    /// A height grid was handed to a stage expecting a different size.
    #[error("dimension mismatch: expected {expected}x{expected}, got {actual}x{actual}")]
    DimensionMismatch { expected: u32, actual: u32 },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Generation was requested after the factory or context was disposed.
    #[error("rendering context has been disposed")]
    Disposed,

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

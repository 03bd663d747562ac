//! Error types for `todo_assistant`.

use std::path::PathBuf;

/// Errors that can occur while serving todo.txt data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The todo file exists but could not be read.
    #[error("Error reading todo file {path}: {source}")]
    TodoFileRead {
        /// Path to the todo file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

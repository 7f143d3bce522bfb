//! Error types for document rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while producing a document file.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The PDF backend failed
    #[error("failed to render document: {0}")]
    RenderFailure(String),

    /// The output directory or file could not be written
    #[error("failed to write {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

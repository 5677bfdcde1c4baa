//! Error types for the ingest crate.

use std::path::PathBuf;

/// Errors that can occur while acquiring documents.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The document's bytes are not valid JSON.
    #[error("invalid JSON in {name}: {message}")]
    InvalidJson { name: String, message: String },

    /// A document was offered without a name.
    #[error("document name must not be empty")]
    EmptyName,

    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory walk failed.
    #[error("failed to scan directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl IngestError {
    pub(crate) fn invalid_json(name: &str, err: &serde_json::Error) -> Self {
        Self::InvalidJson {
            name: name.to_string(),
            message: err.to_string(),
        }
    }
}

/// Convenience alias for ingest results.
pub type IngestResult<T> = Result<T, IngestError>;

//! Error types for the export crate.

use std::path::PathBuf;

/// Errors that can occur while rendering or exporting a value.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The value cannot be shown as a table (it is not an array of objects).
    #[error("not tabular: {0}")]
    NotTabular(String),

    /// A view mode name was not recognised.
    #[error("unknown view mode '{0}' (expected tree, table or text)")]
    UnknownView(String),

    /// CSV input could not be read.
    #[error("malformed CSV at line {line}: {message}")]
    MalformedCsv { line: usize, message: String },

    /// A header name appears more than once, so rows cannot be keyed by it.
    #[error("duplicate column '{0}' in header row")]
    DuplicateHeader(String),

    /// Building an xlsx workbook failed.
    #[error("xlsx export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// A workbook could not be opened or read.
    #[error("cannot read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// The table does not fit in a worksheet.
    #[error("table too large for a worksheet: {0}")]
    SheetBounds(String),

    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the output failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for export results.
pub type ExportResult<T> = Result<T, ExportError>;

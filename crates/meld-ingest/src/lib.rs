//! Document acquisition for JSON Meld.
//!
//! Turns raw uploads into the ordered document set the merge engine folds.
//! Parsing happens here, so malformed input is rejected before a merge is
//! ever attempted. Documents are identified by name; adding a name twice
//! is reported as a duplicate and skipped.
//!
//! # Key Types
//!
//! - [`DocumentSet`] -- Ordered, name-deduplicated set of parsed documents
//! - [`Document`] -- Per-document metadata (name, size, digest)
//! - [`AddOutcome`] / [`BatchSummary`] -- What an add or batch add did

pub mod document;
pub mod error;
pub mod loader;
pub mod set;

pub use document::Document;
pub use error::{IngestError, IngestResult};
pub use loader::{collect_json_files, load_files};
pub use set::{AddOutcome, BatchSummary, DocumentSet};

//! The ordered document set.
//!
//! Arrival order is merge precedence, so the set is a pair of parallel
//! vectors rather than a map: `documents[i]` describes `values[i]`.

use meld_types::{ByteSize, MIN_MERGE_DOCUMENTS};
use serde_json::Value;
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{IngestError, IngestResult};

/// What happened to a single document offered to the set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// The document was appended at this index.
    Added { index: usize },
    /// A document with the same name is already present; nothing changed.
    Duplicate,
}

/// Result of a successful batch add.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Names appended, in order.
    pub added: Vec<String>,
    /// Names skipped because they were already present.
    pub duplicates: Vec<String>,
    /// Total size of the appended documents.
    pub bytes_added: ByteSize,
}

/// Ordered, name-deduplicated collection of parsed JSON documents.
#[derive(Clone, Debug, Default)]
pub struct DocumentSet {
    documents: Vec<Document>,
    values: Vec<Value>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns `true` once there are enough documents to merge.
    pub fn is_mergeable(&self) -> bool {
        self.len() >= MIN_MERGE_DOCUMENTS
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Look up a document and its parsed value by name.
    pub fn get(&self, name: &str) -> Option<(&Document, &Value)> {
        self.position(name)
            .map(|i| (&self.documents[i], &self.values[i]))
    }

    /// Metadata in arrival order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Parsed values in arrival order, ready for the merge engine.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Document, &Value)> {
        self.documents.iter().zip(self.values.iter())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.name.as_str())
    }

    /// Combined size of every document in the set.
    pub fn total_size(&self) -> ByteSize {
        self.documents.iter().map(|d| d.size).sum()
    }

    /// Parse `bytes` and append them under `name`.
    ///
    /// Malformed JSON is an error and leaves the set unchanged. A name that
    /// is already present yields [`AddOutcome::Duplicate`].
    pub fn add_bytes(&mut self, name: &str, bytes: &[u8]) -> IngestResult<AddOutcome> {
        validate_name(name)?;
        if self.contains(name) {
            warn!(document = name, "skipping duplicate document");
            return Ok(AddOutcome::Duplicate);
        }
        let value = parse(name, bytes)?;
        Ok(self.push(Document::from_bytes(name, bytes), value))
    }

    /// Append an already-parsed value. The recorded size is its compact
    /// serialization.
    pub fn add_value(&mut self, name: &str, value: Value) -> IngestResult<AddOutcome> {
        validate_name(name)?;
        if self.contains(name) {
            warn!(document = name, "skipping duplicate document");
            return Ok(AddOutcome::Duplicate);
        }
        let bytes = serde_json::to_vec(&value).map_err(|e| IngestError::invalid_json(name, &e))?;
        Ok(self.push(Document::from_bytes(name, &bytes), value))
    }

    /// Add several documents at once.
    ///
    /// Every document is parsed before any is appended: if one fails, the
    /// whole batch is rejected and the set keeps its previous contents.
    /// Duplicate names, including repeats inside the batch, are skipped.
    pub fn add_batch<I, N, B>(&mut self, files: I) -> IngestResult<BatchSummary>
    where
        I: IntoIterator<Item = (N, B)>,
        N: Into<String>,
        B: AsRef<[u8]>,
    {
        let mut staged: Vec<(Document, Value)> = Vec::new();
        let mut summary = BatchSummary::default();

        for (name, bytes) in files {
            let name = name.into();
            let bytes = bytes.as_ref();
            validate_name(&name)?;
            if self.contains(&name) || staged.iter().any(|(d, _)| d.name == name) {
                warn!(document = %name, "skipping duplicate document");
                summary.duplicates.push(name);
                continue;
            }
            let value = parse(&name, bytes)?;
            staged.push((Document::from_bytes(name, bytes), value));
        }

        for (document, value) in staged {
            summary.bytes_added += document.size;
            summary.added.push(document.name.clone());
            self.push(document, value);
        }

        debug!(
            added = summary.added.len(),
            duplicates = summary.duplicates.len(),
            total = self.len(),
            "batch ingested"
        );
        Ok(summary)
    }

    /// Remove a document by name, returning its metadata and value.
    pub fn remove(&mut self, name: &str) -> Option<(Document, Value)> {
        let index = self.position(name)?;
        let document = self.documents.remove(index);
        let value = self.values.remove(index);
        debug!(document = name, remaining = self.len(), "document removed");
        Some((document, value))
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        self.values.clear();
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.documents.iter().position(|d| d.name == name)
    }

    fn push(&mut self, document: Document, value: Value) -> AddOutcome {
        let index = self.documents.len();
        debug!(document = %document.name, size = %document.size, index, "document added");
        self.documents.push(document);
        self.values.push(value);
        AddOutcome::Added { index }
    }
}

fn validate_name(name: &str) -> IngestResult<()> {
    if name.trim().is_empty() {
        return Err(IngestError::EmptyName);
    }
    Ok(())
}

fn parse(name: &str, bytes: &[u8]) -> IngestResult<Value> {
    serde_json::from_slice(bytes).map_err(|e| {
        warn!(document = name, error = %e, "rejecting malformed document");
        IngestError::invalid_json(name, &e)
    })
}

//! Per-document metadata.

use meld_types::{ByteSize, ContentDigest};
use serde::Serialize;

/// Metadata for one accepted document.
///
/// The parsed value itself lives in the owning
/// [`DocumentSet`](crate::DocumentSet) so the set can hand the engine a
/// contiguous slice of values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Caller-chosen identity, usually the file name.
    pub name: String,
    /// Size of the raw bytes the document was parsed from.
    pub size: ByteSize,
    /// Digest of the raw bytes.
    pub digest: ContentDigest,
}

impl Document {
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            size: ByteSize::from(bytes.len()),
            digest: ContentDigest::of_bytes(bytes),
        }
    }
}

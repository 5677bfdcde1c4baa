//! Foundation types for JSON Meld.
//!
//! Every other meld crate depends on `meld-types`. The merge engine itself
//! works on plain `serde_json::Value`; this crate carries the small value
//! types that travel between acquisition, the quota gate, and the engine.
//!
//! # Key Types
//!
//! - [`MergePolicy`]: whether later or earlier documents win leaf conflicts
//! - [`ByteSize`]: byte counts with the megabyte view used by plan limits
//! - [`ContentDigest`]: BLAKE3 digest of a document or merge result

pub mod digest;
pub mod error;
pub mod policy;
pub mod size;

pub use digest::ContentDigest;
pub use error::TypeError;
pub use policy::MergePolicy;
pub use size::ByteSize;

/// Smallest number of documents a merge accepts.
pub const MIN_MERGE_DOCUMENTS: usize = 2;

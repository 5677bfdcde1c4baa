//! Merge engine for JSON Meld.
//!
//! Folds an ordered set of JSON documents into one. Objects merge key by
//! key, recursively; any other pairing is a leaf conflict settled by the
//! [`MergePolicy`]: later documents win under `Override`, earlier ones
//! under `Preserve`. The engine is a pure function of its inputs, holds no
//! state between calls, and never mutates the documents it is given.
//!
//! # Quick Start
//!
//! ```rust
//! use meld_merge::{merge, MergePolicy};
//! use serde_json::json;
//!
//! let docs = [json!({"a": {"x": 1}, "n": 1}), json!({"a": {"y": 2}, "n": 2})];
//! let merged = merge(&docs, MergePolicy::Override).unwrap();
//! assert_eq!(merged, json!({"a": {"x": 1, "y": 2}, "n": 2}));
//! ```

pub mod engine;
pub mod error;
pub mod report;

pub use engine::{merge, merge_two, Merger, MIN_DOCUMENTS};
pub use error::{MergeError, MergeResult};
pub use meld_types::MergePolicy;
pub use report::{LeafConflict, MergeReport, Resolution, ValueKind};

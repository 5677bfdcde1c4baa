//! Diagnostic record of the leaf conflicts met during a merge.
//!
//! A report never influences the merged value; it only describes which
//! paths disagreed and how the policy resolved them.

use std::fmt;

use meld_types::MergePolicy;
use serde::Serialize;
use serde_json::Value;

/// The JSON kind of a value, without its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// How a leaf conflict was settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The incoming (later) document's value replaced the accumulated one.
    TookLater,
    /// The accumulated (earlier) value was kept.
    KeptEarlier,
}

impl From<MergePolicy> for Resolution {
    fn from(policy: MergePolicy) -> Self {
        match policy {
            MergePolicy::Override => Self::TookLater,
            MergePolicy::Preserve => Self::KeptEarlier,
        }
    }
}

/// A single leaf conflict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeafConflict {
    /// RFC 6901 JSON pointer to the conflicting location (`""` is the root).
    pub path: String,
    /// Index of the document being folded in when the conflict occurred.
    pub document: usize,
    /// Kind of the accumulated value.
    pub earlier: ValueKind,
    /// Kind of the incoming value.
    pub later: ValueKind,
    pub resolution: Resolution,
}

impl LeafConflict {
    /// Returns `true` if the two sides had different kinds (e.g. an object
    /// against a scalar).
    pub fn is_type_mismatch(&self) -> bool {
        self.earlier != self.later
    }
}

/// Everything a merge with reporting enabled observed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub policy: MergePolicy,
    /// Number of documents folded.
    pub documents: usize,
    /// Conflicts in the order they were met.
    pub conflicts: Vec<LeafConflict>,
}

impl MergeReport {
    pub fn new(policy: MergePolicy, documents: usize) -> Self {
        Self {
            policy,
            documents,
            conflicts: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    pub fn type_mismatches(&self) -> usize {
        self.conflicts.iter().filter(|c| c.is_type_mismatch()).count()
    }

    /// Conflicts recorded at exactly `path`.
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a LeafConflict> + 'a {
        self.conflicts.iter().filter(move |c| c.path == path)
    }
}

/// Tracks the current location while the engine descends.
#[derive(Debug, Default)]
pub(crate) struct PathTracker {
    segments: Vec<String>,
}

impl PathTracker {
    pub(crate) fn push(&mut self, key: &str) {
        self.segments.push(escape_segment(key));
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }

    pub(crate) fn pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            out.push_str(segment);
        }
        out
    }
}

/// Escape one reference token per RFC 6901 (`~` → `~0`, `/` → `~1`).
pub fn escape_segment(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

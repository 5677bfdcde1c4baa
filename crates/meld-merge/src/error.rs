//! Error types for the merge crate.

/// Errors that can occur during a merge.
///
/// The engine has a single failure mode: the caller handed it something it
/// cannot merge. No partial result is ever produced alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// The document set is too small, or an entry is not a usable JSON value.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl MergeError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;

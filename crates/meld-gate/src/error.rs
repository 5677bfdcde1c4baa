use std::fmt;

use meld_types::TypeError;

/// Errors that can occur during gate evaluation.
///
/// A denied request is not an error: denials are reported through
/// [`GateOutcome`](crate::GateOutcome). These variants cover a gate that
/// could not reach a decision at all.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// A stage returned an unexpected error.
    #[error("stage error in '{stage}': {message}")]
    StageError { stage: String, message: String },

    /// A size figure could not be converted.
    #[error("invalid size: {0}")]
    Size(#[from] TypeError),
}

impl GateError {
    /// Create a stage error with a name and message.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageError {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

impl PartialEq for GateError {
    fn eq(&self, other: &Self) -> bool {
        // Compare by display representation for test convenience.
        fmt::format(format_args!("{self}")) == fmt::format(format_args!("{other}"))
    }
}

impl Eq for GateError {}

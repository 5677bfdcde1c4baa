use std::time::Duration;

use meld_types::ByteSize;
use serde::{Deserialize, Serialize};

use crate::config::GateConfig;
use crate::error::GateError;
use crate::usage::UsageReport;

// ---------------------------------------------------------------------------
// MergeRequest
// ---------------------------------------------------------------------------

/// What the gate needs to know about a prospective merge.
///
/// Only counts and sizes: the gate never sees document contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Number of documents in the set.
    pub document_count: usize,
    /// Combined size of the documents being uploaded.
    pub incoming: ByteSize,
}

impl MergeRequest {
    pub fn new(document_count: usize, incoming: ByteSize) -> Self {
        Self {
            document_count,
            incoming,
        }
    }
}

// ---------------------------------------------------------------------------
// StageDecision
// ---------------------------------------------------------------------------

/// The outcome of a single gate stage evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// The stage passed; proceed to the next stage.
    Pass,
    /// The stage failed; the request should be rejected.
    Fail { reason: String },
    /// The request would push usage past the plan limit.
    LimitExceeded(UsageReport),
}

impl StageDecision {
    /// Returns `true` if the decision is `Pass`.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

// ---------------------------------------------------------------------------
// StageResult
// ---------------------------------------------------------------------------

/// Recorded result from a completed stage evaluation.
#[derive(Clone, Debug)]
pub struct StageResult {
    /// Name of the stage that produced this result.
    pub stage_name: String,
    /// Whether the stage passed.
    pub passed: bool,
    /// Optional reason (populated on failure).
    pub reason: Option<String>,
    /// Wall-clock time the stage took to evaluate.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// GateContext
// ---------------------------------------------------------------------------

/// Contextual information available to every gate stage.
#[derive(Clone, Debug)]
pub struct GateContext {
    /// The caller's plan limit.
    pub limit: ByteSize,
    /// Storage already consumed before this request.
    pub used: ByteSize,
    /// Results from stages that have already run in this evaluation.
    pub previous_stages: Vec<StageResult>,
}

impl GateContext {
    pub fn new(limit: ByteSize, used: ByteSize) -> Self {
        Self {
            limit,
            used,
            previous_stages: Vec::new(),
        }
    }

    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(config.limit, config.used)
    }

    /// Usage as it would stand after `request`.
    pub fn usage_for(&self, request: &MergeRequest) -> UsageReport {
        UsageReport::new(self.limit, self.used, request.incoming)
    }
}

// ---------------------------------------------------------------------------
// GateStage trait
// ---------------------------------------------------------------------------

/// A single evaluation stage in the gate pipeline.
///
/// Stages are evaluated in order. Each stage receives the request and a
/// shared context, and returns a decision.
///
/// The trait is object-safe and `Send + Sync` so stages can be stored in
/// a `Vec<Box<dyn GateStage>>`.
pub trait GateStage: Send + Sync {
    /// Human-readable name of this stage (e.g., "document-count", "quota").
    fn name(&self) -> &str;

    /// Evaluate the request and return a decision.
    fn evaluate(
        &self,
        request: &MergeRequest,
        context: &GateContext,
    ) -> Result<StageDecision, GateError>;
}

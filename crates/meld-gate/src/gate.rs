use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::GateConfig;
use crate::error::GateError;
use crate::stage::{GateContext, GateStage, MergeRequest, StageDecision, StageResult};
use crate::stages::{DocumentCountStage, QuotaStage};
use crate::usage::UsageReport;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why a request was turned away.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Denial {
    /// The upload would exceed the plan; route the caller to the upgrade
    /// path with this usage.
    LimitExceeded(UsageReport),
    /// Some other stage refused the request.
    Rejected { stage: String, reason: String },
}

impl Denial {
    pub fn usage(&self) -> Option<&UsageReport> {
        match self {
            Self::LimitExceeded(usage) => Some(usage),
            Self::Rejected { .. } => None,
        }
    }

    pub fn reason(&self) -> String {
        match self {
            Self::LimitExceeded(usage) => format!("plan limit exceeded: {usage}"),
            Self::Rejected { reason, .. } => reason.clone(),
        }
    }
}

/// The gate's verdict on a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// The merge may run.
    Admitted,
    /// The merge must not run.
    Denied(Denial),
}

// ---------------------------------------------------------------------------
// GateResult
// ---------------------------------------------------------------------------

/// The outcome of running a request through the full gate pipeline.
#[derive(Clone, Debug)]
pub struct GateResult {
    pub outcome: GateOutcome,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
    /// Total wall-clock time for the pipeline evaluation.
    pub elapsed: Duration,
}

impl GateResult {
    /// Returns `true` if the request was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self.outcome, GateOutcome::Admitted)
    }

    pub fn denial(&self) -> Option<&Denial> {
        match &self.outcome {
            GateOutcome::Admitted => None,
            GateOutcome::Denied(denial) => Some(denial),
        }
    }
}

// ---------------------------------------------------------------------------
// MergeGate
// ---------------------------------------------------------------------------

/// The quota gate: a configurable pipeline of stages that every merge
/// request passes through before the merge engine is invoked.
pub struct MergeGate {
    stages: Vec<Box<dyn GateStage>>,
    config: GateConfig,
}

impl MergeGate {
    /// Create a new gate with the given configuration.
    ///
    /// Starts with an empty pipeline. Use [`Self::add_stage`] to add stages,
    /// or [`Self::with_default_stages`] for the standard pipeline.
    pub fn new(config: GateConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Create a gate with the default stage pipeline:
    /// DocumentCount -> Quota
    pub fn with_default_stages(config: GateConfig) -> Self {
        let mut gate = Self::new(config);
        gate.add_stage(Box::new(DocumentCountStage));
        gate.add_stage(Box::new(QuotaStage));
        gate
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn GateStage>) {
        self.stages.push(stage);
    }

    /// The current configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Evaluate a request against the configured plan.
    pub fn evaluate(&self, request: &MergeRequest) -> Result<GateResult, GateError> {
        let mut context = GateContext::from_config(&self.config);
        self.evaluate_with_context(request, &mut context)
    }

    /// Evaluate with an explicit context, for callers whose limit and usage
    /// differ per request.
    ///
    /// The pipeline is **fail-fast**: the first stage that does not pass
    /// stops evaluation and produces a denial. If all stages pass the
    /// request is admitted.
    pub fn evaluate_with_context(
        &self,
        request: &MergeRequest,
        context: &mut GateContext,
    ) -> Result<GateResult, GateError> {
        let pipeline_start = Instant::now();

        if self.config.permissive {
            debug!("permissive gate, admitting request");
            return Ok(GateResult {
                outcome: GateOutcome::Admitted,
                stage_results: Vec::new(),
                elapsed: pipeline_start.elapsed(),
            });
        }

        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_start = Instant::now();
            let decision = stage.evaluate(request, context)?;
            let elapsed = stage_start.elapsed();

            let reason = match &decision {
                StageDecision::Pass => None,
                StageDecision::Fail { reason } => Some(reason.clone()),
                StageDecision::LimitExceeded(usage) => Some(format!("plan limit exceeded: {usage}")),
            };

            let result = StageResult {
                stage_name: stage.name().to_string(),
                passed: decision.is_pass(),
                reason,
                elapsed,
            };

            stage_results.push(result.clone());
            context.previous_stages.push(result);

            // Fail-fast: stop on first failure.
            let denial = match decision {
                StageDecision::Pass => continue,
                StageDecision::Fail { reason } => Denial::Rejected {
                    stage: stage.name().to_string(),
                    reason,
                },
                StageDecision::LimitExceeded(usage) => Denial::LimitExceeded(usage),
            };

            info!(stage = stage.name(), reason = %denial.reason(), "merge request denied");
            return Ok(GateResult {
                outcome: GateOutcome::Denied(denial),
                stage_results,
                elapsed: pipeline_start.elapsed(),
            });
        }

        Ok(GateResult {
            outcome: GateOutcome::Admitted,
            stage_results,
            elapsed: pipeline_start.elapsed(),
        })
    }
}

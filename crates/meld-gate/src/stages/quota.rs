use tracing::debug;

use crate::error::GateError;
use crate::stage::{GateContext, GateStage, MergeRequest, StageDecision};

/// Plan quota check.
///
/// Fails with [`StageDecision::LimitExceeded`] when the storage already
/// used plus the incoming upload is strictly greater than the plan limit.
/// Landing exactly on the limit is allowed.
pub struct QuotaStage;

impl GateStage for QuotaStage {
    fn name(&self) -> &str {
        "quota"
    }

    fn evaluate(
        &self,
        request: &MergeRequest,
        context: &GateContext,
    ) -> Result<StageDecision, GateError> {
        let usage = context.usage_for(request);
        debug!(
            limit = %usage.limit,
            used = %usage.used,
            attempted = %usage.attempted,
            "checking quota"
        );
        if usage.exceeds_limit() {
            return Ok(StageDecision::LimitExceeded(usage));
        }
        Ok(StageDecision::Pass)
    }
}

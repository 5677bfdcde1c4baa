use meld_types::MIN_MERGE_DOCUMENTS;

use crate::error::GateError;
use crate::stage::{GateContext, GateStage, MergeRequest, StageDecision};

/// Rejects requests that do not carry enough documents to merge.
pub struct DocumentCountStage;

impl GateStage for DocumentCountStage {
    fn name(&self) -> &str {
        "document-count"
    }

    fn evaluate(
        &self,
        request: &MergeRequest,
        _context: &GateContext,
    ) -> Result<StageDecision, GateError> {
        if request.document_count < MIN_MERGE_DOCUMENTS {
            return Ok(StageDecision::Fail {
                reason: format!(
                    "please upload at least {MIN_MERGE_DOCUMENTS} JSON documents to merge, got {}",
                    request.document_count
                ),
            });
        }
        Ok(StageDecision::Pass)
    }
}

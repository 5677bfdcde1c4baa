use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use meld_gate::{Denial, GateOutcome, MergeGate, MergeRequest};
use meld_merge::{MergeReport, Merger};
use meld_types::{ByteSize, MergePolicy};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<MergeGate>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let gate = MergeGate::with_default_stages(config.gate.clone());
        Self {
            gate: Arc::new(gate),
            config: Arc::new(config),
        }
    }
}

/// Body of a merge request.
#[derive(Debug, Deserialize)]
pub struct MergeBody {
    /// Documents in precedence order.
    pub jsons: Vec<Value>,
    /// `true`: later documents win leaf conflicts.
    #[serde(rename = "override", default = "default_override")]
    pub override_existing: bool,
    /// Include the conflict report in the response.
    #[serde(default)]
    pub report: bool,
}

fn default_override() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct MergeResponse {
    pub merged: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<MergeReport>,
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<Value> {
    let gate = state.gate.config();
    Json(json!({
        "name": "meld-server",
        "version": env!("CARGO_PKG_VERSION"),
        "default_policy": MergePolicy::default(),
        "limit": gate.limit,
        "used": gate.used,
    }))
}

/// Merge handler.
///
/// The body is read raw so the quota gate can account for its exact size
/// before anything is merged.
pub async fn merge_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<Json<MergeResponse>> {
    let request: MergeBody = serde_json::from_slice(&body)
        .map_err(|e| ServerError::BadRequest(format!("invalid merge request: {e}")))?;
    let policy = MergePolicy::from(request.override_existing);
    debug!(
        documents = request.jsons.len(),
        bytes = body.len(),
        %policy,
        "merge request received"
    );

    let gate_request = MergeRequest::new(request.jsons.len(), ByteSize::from(body.len()));
    let verdict = state.gate.evaluate(&gate_request)?;
    if let GateOutcome::Denied(denial) = verdict.outcome {
        return Err(match denial {
            Denial::LimitExceeded(usage) => ServerError::QuotaExceeded(usage),
            Denial::Rejected { reason, .. } => ServerError::BadRequest(reason),
        });
    }

    let merger = Merger::new(policy);
    let response = if request.report {
        let (merged, report) = merger.merge_with_report(&request.jsons)?;
        MergeResponse {
            merged,
            report: Some(report),
        }
    } else {
        MergeResponse {
            merged: merger.merge(&request.jsons)?,
            report: None,
        }
    };

    info!(documents = request.jsons.len(), %policy, "merge served");
    Ok(Json(response))
}

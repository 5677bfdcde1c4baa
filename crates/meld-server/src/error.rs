use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use meld_gate::UsageReport;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("plan limit exceeded: {0}")]
    QuotaExceeded(UsageReport),

    #[error("merge error: {0}")]
    Merge(#[from] meld_merge::MergeError),

    #[error("gate error: {0}")]
    Gate(#[from] meld_gate::GateError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Merge(_) => StatusCode::BAD_REQUEST,
            Self::QuotaExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Gate(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::QuotaExceeded(usage) => json!({
                "message": self.to_string(),
                "limit": usage.limit,
                "used": usage.used,
                "attempted": usage.attempted,
            }),
            Self::BadRequest(message) => json!({ "message": message }),
            _ => json!({ "message": self.to_string() }),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(body)).into_response()
    }
}

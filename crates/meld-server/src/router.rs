use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler::{self, AppState};

/// Build the axum router with all meld endpoints.
///
/// `/merge-json` is kept alongside `/v1/merge` for existing browser clients.
pub fn build_router(config: ServerConfig) -> Router {
    let max_body = config.max_body_bytes;
    let cors_any_origin = config.cors_any_origin;
    let state = AppState::new(config);

    let router = Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/v1/merge", post(handler::merge_handler))
        .route("/merge-json", post(handler::merge_handler))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_any_origin {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

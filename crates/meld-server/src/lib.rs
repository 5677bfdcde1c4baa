//! HTTP server for JSON Meld.
//!
//! Exposes the merge engine to browser clients. Every merge request is
//! sized, passed through the quota gate, and only then merged. A request
//! that would push the caller past their plan gets a `413` carrying the
//! limit, the storage already used, and the attempted upload.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, MergeBody, MergeResponse};
pub use server::MeldServer;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use meld_gate::GateConfig;
    use meld_types::ByteSize;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn app() -> Router {
        router::build_router(ServerConfig::default())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post(app: Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn body(value: Value) -> String {
        value.to_string()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = get(app(), "/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn info_endpoint() {
        let (status, body) = get(app(), "/v1/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "meld-server");
        assert_eq!(body["default_policy"], "override");
        assert_eq!(body["limit"], 50 * 1024 * 1024);
    }

    #[tokio::test]
    async fn merge_defaults_to_override() {
        let request = body(json!({
            "jsons": [
                {"a": 1, "b": {"x": 1}},
                {"a": 2, "b": {"y": 2}, "c": 3}
            ]
        }));
        let (status, body) = post(app(), "/merge-json", request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["merged"], json!({"a": 2, "b": {"x": 1, "y": 2}, "c": 3}));
        assert!(body.get("report").is_none());
    }

    #[tokio::test]
    async fn merge_with_preserve() {
        let request = body(json!({
            "jsons": [{"a": 1}, {"a": 2, "b": 3}],
            "override": false
        }));
        let (status, body) = post(app(), "/v1/merge", request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["merged"], json!({"a": 1, "b": 3}));
    }

    #[tokio::test]
    async fn merged_keys_keep_first_seen_order() {
        let request = r#"{"jsons":[{"z":1,"a":1},{"m":2,"z":3}]}"#;
        let (status, body) = post(app(), "/v1/merge", request).await;
        assert_eq!(status, StatusCode::OK);
        let keys: Vec<&str> = body["merged"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[tokio::test]
    async fn merge_report_on_request() {
        let request = body(json!({
            "jsons": [{"a": 1, "b": 1}, {"a": "one", "b": 1}],
            "report": true
        }));
        let (status, body) = post(app(), "/v1/merge", request).await;
        assert_eq!(status, StatusCode::OK);
        let conflicts = body["report"]["conflicts"].as_array().unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0]["path"], "/a");
    }

    #[tokio::test]
    async fn single_document_is_bad_request() {
        let request = body(json!({"jsons": [{"a": 1}]}));
        let (status, body) = post(app(), "/merge-json", request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("at least 2"));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (status, body) = post(app(), "/merge-json", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let (status, _) = post(app(), "/merge-json", r#"{"docs": []}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn quota_exceeded_is_payload_too_large() {
        let config = ServerConfig {
            gate: GateConfig {
                limit: ByteSize::from_bytes(100),
                used: ByteSize::from_bytes(60),
                permissive: false,
            },
            ..ServerConfig::default()
        };
        let request = body(json!({
            "jsons": [{"key": "a fairly long value"}, {"key": "another long value"}]
        }));
        let attempted = request.len() as u64;
        let (status, body) = post(router::build_router(config), "/merge-json", request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["limit"], 100);
        assert_eq!(body["used"], 60);
        assert_eq!(body["attempted"], attempted);
        assert!(body["message"].as_str().unwrap().contains("limit"));
    }

    #[tokio::test]
    async fn permissive_gate_still_rejects_single_document() {
        let config = ServerConfig {
            gate: GateConfig::permissive(),
            ..ServerConfig::default()
        };
        let request = body(json!({"jsons": [{"a": 1}]}));
        let (status, _) = post(router::build_router(config), "/v1/merge", request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

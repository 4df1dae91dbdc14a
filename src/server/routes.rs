//! HTTP route handlers for the summary API.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::extract::{JsonBody, MAX_BODY_BYTES};
use super::state::AppState;

/// Create the API router with all routes.
#[must_use]
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/summarize", post(summarize_chat))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "chat-summary",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Summarization request.
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    /// Raw chat transcript.
    pub conversation: String,
}

/// Summarization response.
#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    /// Model output, verbatim.
    pub summary: String,
}

/// Handle summarization requests.
async fn summarize_chat(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let summary = state.summarizer.summarize(&request.conversation).await?;

    Ok(Json(SummarizeResponse { summary }))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use futures::future::BoxFuture;
    use tower::ServiceExt;

    use super::*;
    use crate::summarization::{SummarizationError, SummarizationResult, Summarizer};

    /// Records every conversation it sees and replies with a fixed outcome.
    struct Recording {
        reply: Result<String, String>,
        seen: Mutex<Vec<String>>,
    }

    impl Recording {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self { reply: Ok(text.to_string()), seen: Mutex::new(Vec::new()) })
        }

        fn failing(detail: &str) -> Arc<Self> {
            Arc::new(Self { reply: Err(detail.to_string()), seen: Mutex::new(Vec::new()) })
        }

        fn calls(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Summarizer for Recording {
        fn summarize<'a>(&'a self, conversation: &'a str) -> BoxFuture<'a, SummarizationResult<String>> {
            self.seen.lock().unwrap().push(conversation.to_string());
            let reply = self.reply.clone().map_err(SummarizationError::Api);
            Box::pin(async move { reply })
        }
    }

    async fn post_json(router: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/summarize")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_summary_returned_verbatim() {
        let fake = Recording::ok("## Terms\n- Party A: $500\n");
        let router = create_router(AppState::new(fake.clone()));

        let (status, body) = post_json(router, r#"{"conversation":"A: $500?\nB: ok"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"summary": "## Terms\n- Party A: $500\n"}));
        assert_eq!(fake.calls(), vec!["A: $500?\nB: ok".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_conversation_is_accepted() {
        let fake = Recording::ok("No business-relevant discussion identified.");
        let router = create_router(AppState::new(fake.clone()));

        let (status, body) = post_json(router, r#"{"conversation":""}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "No business-relevant discussion identified.");
        assert_eq!(fake.calls(), vec![String::new()]);
    }

    #[tokio::test]
    async fn test_invalid_bodies_never_reach_summarizer() {
        let fake = Recording::ok("unused");
        for body in [
            "{}",
            r#"{"conversation": 42}"#,
            r#"{"conversation": null}"#,
            r#"{"conversation": ["a", "b"]}"#,
            r#"{"text": "A: hi"}"#,
            "not json",
        ] {
            let router = create_router(AppState::new(fake.clone()));
            let (status, json) = post_json(router, body).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
            assert!(json["detail"].as_str().is_some_and(|d| !d.is_empty()), "{body}");
        }
        assert!(fake.calls().is_empty());
    }

    async fn post_raw(router: Router, content_type: Option<&str>, body: String) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method("POST").uri("/summarize");
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let response = router.oneshot(request.body(Body::from(body)).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_content_type_is_parsed_as_json() {
        let fake = Recording::ok("summary");
        let router = create_router(AppState::new(fake.clone()));

        let (status, body) = post_raw(router, None, r#"{"conversation":"hi"}"#.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "summary");
        assert_eq!(fake.calls(), vec!["hi".to_string()]);
    }

    #[tokio::test]
    async fn test_non_json_content_type_is_validation_error() {
        let fake = Recording::ok("unused");
        let router = create_router(AppState::new(fake.clone()));

        let (status, body) = post_raw(router, Some("text/plain"), r#"{"conversation":"hi"}"#.to_string()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().is_some_and(|d| d.contains("application/json")));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_long_transcript_is_accepted() {
        let fake = Recording::ok("long");
        let router = create_router(AppState::new(fake.clone()));
        let transcript = "A: I can offer $500/month. B: I need $600.\n".repeat(80_000);
        let body = serde_json::json!({ "conversation": &transcript }).to_string();
        assert!(body.len() > 3 * 1024 * 1024);

        let (status, json) = post_raw(router, Some("application/json"), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"], "long");
        assert_eq!(fake.calls(), vec![transcript]);
    }

    #[tokio::test]
    async fn test_oversize_body_is_413() {
        let fake = Recording::ok("unused");
        let router = create_router(AppState::new(fake.clone()));
        let body = serde_json::json!({ "conversation": "x".repeat(MAX_BODY_BYTES) }).to_string();

        let (status, json) = post_raw(router, Some("application/json"), body).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(json["detail"].as_str().is_some_and(|d| !d.is_empty()));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_500() {
        let fake = Recording::failing("403 PERMISSION_DENIED. Method doesn't allow unregistered callers.");
        let router = create_router(AppState::new(fake.clone()));

        let (status, body) = post_json(router, r#"{"conversation":"A: hi"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({"detail": "403 PERMISSION_DENIED. Method doesn't allow unregistered callers."})
        );
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_health_check() {
        let router = create_router(AppState::new(Recording::ok("unused")));
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "chat-summary");
    }
}

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::commands;
use super::health;
use super::middleware::logging_middleware;
use super::state::AppState;
use super::types::ApiError;
use crate::infrastructure::observability::create_metrics_router;

/// Create the full router with application state
pub fn create_router(state: AppState, metrics_path: &str) -> Router {
    let metrics = state.metrics.clone();

    let router = Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Bot commands
        .route("/commands/ask", post(commands::ask))
        .route("/commands/refresh", post(commands::refresh))
        .fallback(not_found)
        .with_state(state);

    let router = match metrics {
        Some(metrics) => router.merge(create_metrics_router(metrics, metrics_path)),
        None => router,
    };

    router
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> ApiError {
    ApiError::not_found("Unknown endpoint")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::domain::DomainError;
    use crate::domain::bot::{CommandReply, NOT_READY_MESSAGE};
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::knowledge_base::{DocumentChunk, EmbeddedChunk, VectorIndex};
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::rag::{GenerationSettings, PipelineFactory, RagPipeline};
    use crate::infrastructure::services::RagBotService;
    use crate::infrastructure::vector_store::InMemoryVectorIndex;

    struct TestFactory {
        builds: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl PipelineFactory for TestFactory {
        async fn build(&self) -> Result<RagPipeline, DomainError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            let index = Arc::new(InMemoryVectorIndex::new());
            index
                .add(vec![EmbeddedChunk::new(
                    DocumentChunk::new("LFG offers services in web development.", "dummy_doc_0", 0),
                    vec![1.0; 4],
                )])
                .await?;

            Ok(RagPipeline::new(
                Arc::new(MockEmbeddingProvider::new(4)),
                index,
                Arc::new(MockLlmProvider::new().with_answer("Web development.")),
                GenerationSettings::default(),
            )
            .with_chunk_count(1))
        }
    }

    fn bot() -> Arc<RagBotService> {
        Arc::new(RagBotService::new(Arc::new(TestFactory {
            builds: AtomicUsize::new(0),
        })))
    }

    fn app(bot: Arc<RagBotService>, admin_token: Option<&str>) -> Router {
        create_router(AppState::new(bot).with_admin_token(admin_token), "/metrics")
    }

    fn ask_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/commands/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn refresh_request(header: Option<(&str, &str)>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/commands/refresh");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn reply(response: axum::response::Response) -> CommandReply {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_and_live() {
        let app = app(bot(), None);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_reflects_lifecycle() {
        let bot = bot();
        let app = app(bot.clone(), None);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        bot.initialize().await.unwrap();

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ask_before_ready() {
        let response = app(bot(), None)
            .oneshot(ask_request(r#"{"question": "What does LFG do?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(reply(response).await, CommandReply::ephemeral(NOT_READY_MESSAGE));
    }

    #[tokio::test]
    async fn test_ask_answers() {
        let bot = bot();
        bot.initialize().await.unwrap();

        let response = app(bot, None)
            .oneshot(ask_request(r#"{"question": "What does LFG do?"}"#))
            .await
            .unwrap();

        let reply = reply(response).await;
        assert!(!reply.ephemeral);
        assert!(reply.content.contains("**A:** Web development."));
        assert!(reply.content.contains("- dummy_doc_0"));
    }

    #[tokio::test]
    async fn test_ask_malformed_body() {
        let response = app(bot(), None)
            .oneshot(ask_request(r#"{"text": 1}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_refresh_disabled_without_token() {
        let response = app(bot(), None)
            .oneshot(refresh_request(Some(("authorization", "Bearer anything"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_refresh_requires_valid_token() {
        let app = app(bot(), Some("s3cret"));

        let response = app.clone().oneshot(refresh_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(refresh_request(Some(("x-admin-token", "wrong"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_with_token() {
        let bot = bot();
        let app = app(bot.clone(), Some("s3cret"));

        let response = app
            .oneshot(refresh_request(Some(("authorization", "Bearer s3cret"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let reply = reply(response).await;
        assert!(reply.ephemeral);
        assert!(reply.content.contains("refreshed successfully"));
        assert!(bot.is_ready().await);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = app(bot(), None)
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

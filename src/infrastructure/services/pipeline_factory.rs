//! Builds retrieval pipelines from application configuration

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::KnowledgeIndexer;
use crate::config::{AppConfig, SourceKind, VectorBackend};
use crate::domain::DomainError;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::knowledge_base::{DocumentSource, VectorIndex};
use crate::domain::llm::LlmProvider;
use crate::domain::rag::{PipelineFactory, RagPipeline};
use crate::infrastructure::embedding::OpenAiEmbeddingProvider;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::ingestion::RecursiveTextSplitter;
use crate::infrastructure::llm::OpenAiChatProvider;
use crate::infrastructure::sources::{StaticSource, WebSource};
use crate::infrastructure::vector_store::{
    InMemoryVectorIndex, PgvectorIndex, SupabaseConfig, SupabaseVectorIndex,
};

/// Pipeline factory driven by [`AppConfig`]
///
/// The in-memory backend gets a fresh index on every build; remote backends
/// are shared across builds and updated in place.
pub struct ConfiguredPipelineFactory {
    config: AppConfig,
    pool: Option<PgPool>,
}

impl std::fmt::Debug for ConfiguredPipelineFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredPipelineFactory")
            .field("backend", &self.config.vector_store.backend)
            .field("source", &self.config.knowledge.source)
            .finish()
    }
}

impl ConfiguredPipelineFactory {
    /// Create the factory; the Postgres pool is opened lazily on first use
    pub fn new(config: AppConfig) -> Result<Self, DomainError> {
        let pool = match config.vector_store.backend {
            VectorBackend::Pgvector => {
                let url = config.vector_store.database_url.as_deref().ok_or_else(|| {
                    DomainError::configuration("DATABASE_URL is required for the pgvector backend")
                })?;

                let pool = PgPoolOptions::new()
                    .max_connections(config.vector_store.max_connections)
                    .acquire_timeout(Duration::from_secs(config.openai.timeout_secs))
                    .connect_lazy(url)
                    .map_err(|e| {
                        DomainError::configuration(format!("Invalid DATABASE_URL: {}", e))
                    })?;
                Some(pool)
            }
            _ => None,
        };

        Ok(Self { config, pool })
    }

    fn http_client(&self) -> Result<HttpClient, DomainError> {
        HttpClient::with_timeout(Duration::from_secs(self.config.openai.timeout_secs))
    }

    fn api_key(&self) -> Result<&str, DomainError> {
        self.config
            .openai
            .api_key
            .as_deref()
            .ok_or_else(|| DomainError::configuration("OPENAI_API_KEY is not set"))
    }

    fn vector_index(&self, client: &HttpClient) -> Result<Arc<dyn VectorIndex>, DomainError> {
        let store = &self.config.vector_store;

        match store.backend {
            VectorBackend::InMemory => Ok(Arc::new(InMemoryVectorIndex::new())),
            VectorBackend::Supabase => {
                let url = store.supabase_url.as_deref().ok_or_else(|| {
                    DomainError::configuration("SUPABASE_URL is not set")
                })?;
                let key = store.supabase_key.as_deref().ok_or_else(|| {
                    DomainError::configuration("SUPABASE_KEY or SUPABASE_SERVICE_KEY is not set")
                })?;

                let config = SupabaseConfig::new(url, key)
                    .with_table_name(&store.table_name)
                    .with_query_name(&store.query_name);
                Ok(Arc::new(SupabaseVectorIndex::new(client.clone(), config)))
            }
            VectorBackend::Pgvector => {
                let pool = self.pool.clone().ok_or_else(|| {
                    DomainError::configuration("DATABASE_URL is not set")
                })?;
                Ok(Arc::new(PgvectorIndex::new(pool, &store.table_name)?))
            }
        }
    }

    fn document_source(&self, client: &HttpClient) -> Box<dyn DocumentSource> {
        let knowledge = &self.config.knowledge;

        match knowledge.source {
            SourceKind::Static => Box::new(StaticSource::new(knowledge.texts.clone())),
            SourceKind::Web => Box::new(
                WebSource::new(client.clone(), knowledge.urls.clone())
                    .with_follow_links(knowledge.follow_links)
                    .with_max_pages(knowledge.max_pages),
            ),
        }
    }
}

#[async_trait]
impl PipelineFactory for ConfiguredPipelineFactory {
    async fn build(&self) -> Result<RagPipeline, DomainError> {
        let openai = &self.config.openai;
        let api_key = self.api_key()?;
        let client = self.http_client()?;

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(
            OpenAiEmbeddingProvider::with_base_url(client.clone(), api_key, &openai.base_url)
                .with_model(&openai.embedding_model),
        );
        let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiChatProvider::with_base_url(
            client.clone(),
            api_key,
            &openai.base_url,
        ));
        let index = self.vector_index(&client)?;
        let source = self.document_source(&client);

        let indexer = KnowledgeIndexer::new(
            Arc::new(RecursiveTextSplitter::new()),
            Arc::clone(&embedder),
            self.config.chunking(),
        )
        .with_batch_size(openai.embedding_batch_size);

        let report = indexer.index(source.as_ref(), index.as_ref()).await?;

        Ok(RagPipeline::new(embedder, index, llm, self.config.generation())
            .with_chunk_count(report.chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    /// Answers every embeddings call with one 3-dim vector per input
    fn embeddings_responder(request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap_or_default();
        let count = body["input"].as_array().map(|a| a.len()).unwrap_or(0);
        let data: Vec<serde_json::Value> = (0..count)
            .map(|i| serde_json::json!({"index": i, "embedding": [1.0, i as f32, 0.5]}))
            .collect();
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data }))
    }

    async fn openai_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(embeddings_responder)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "model": "gpt-3.5-turbo",
                "choices": [{
                    "message": {"role": "assistant", "content": "LFG builds websites."},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;
        server
    }

    fn config_for(server: &MockServer) -> AppConfig {
        let mut config = AppConfig::default();
        config.openai.api_key = Some("sk-test".to_string());
        config.openai.base_url = server.uri();
        config
    }

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        let factory = ConfiguredPipelineFactory::new(AppConfig::default()).unwrap();

        let result = factory.build().await;

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_missing_supabase_key_is_configuration_error() {
        let mut config = AppConfig::default();
        config.openai.api_key = Some("sk-test".to_string());
        config.vector_store.backend = VectorBackend::Supabase;
        config.vector_store.supabase_url = Some("https://p.supabase.co".to_string());

        let result = ConfiguredPipelineFactory::new(config).unwrap().build().await;

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_pgvector_requires_database_url() {
        let mut config = AppConfig::default();
        config.vector_store.backend = VectorBackend::Pgvector;

        assert!(ConfiguredPipelineFactory::new(config).is_err());
    }

    #[tokio::test]
    async fn test_builds_static_in_memory_pipeline() {
        let server = openai_server().await;
        let factory = ConfiguredPipelineFactory::new(config_for(&server)).unwrap();

        let pipeline = factory.build().await.unwrap();

        assert_eq!(pipeline.chunk_count(), 4);
        assert_eq!(pipeline.backend_name(), "in_memory");

        let answer = pipeline.answer("What does LFG do?").await.unwrap();
        assert_eq!(answer.text(), "LFG builds websites.");
        assert_eq!(answer.chunks().len(), 2);
    }

    #[tokio::test]
    async fn test_each_build_gets_a_fresh_in_memory_index() {
        let server = openai_server().await;
        let factory = ConfiguredPipelineFactory::new(config_for(&server)).unwrap();

        let first = factory.build().await.unwrap();
        let second = factory.build().await.unwrap();

        assert_eq!(first.chunk_count(), 4);
        assert_eq!(second.chunk_count(), 4);
    }
}

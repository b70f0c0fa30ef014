//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Turns text into fixed-dimension vectors (OpenAI, compatible gateways, etc.)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed a batch of texts, returning one vector per input in input order
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, DomainError>;

    /// Embed a single query string
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.embed(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                DomainError::provider(self.provider_name(), "Embedding response was empty")
            })
    }

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Get the embedding model in use
    fn model(&self) -> &str;
}

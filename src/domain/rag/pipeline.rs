//! The embed, retrieve and generate pipeline

use std::fmt::Debug;
use std::sync::Arc;

use tracing::debug;

use super::{build_qa_request, Answer};
use crate::domain::DomainError;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::knowledge_base::VectorIndex;
use crate::domain::llm::LlmProvider;

/// Fixed generation parameters of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    /// Chat model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Number of chunks retrieved per question
    pub top_k: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
            top_k: 2,
        }
    }
}

/// A fully initialized embed -> search -> generate pipeline
///
/// Immutable once built; refreshing the knowledge base builds a new one.
#[derive(Debug)]
pub struct RagPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LlmProvider>,
    settings: GenerationSettings,
    chunk_count: usize,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmProvider>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            embedder,
            index,
            llm,
            settings,
            chunk_count: 0,
        }
    }

    /// Record how many chunks were indexed when the pipeline was built
    pub fn with_chunk_count(mut self, count: usize) -> Self {
        self.chunk_count = count;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn backend_name(&self) -> &'static str {
        self.index.backend_name()
    }

    /// Answer a question from the indexed knowledge
    pub async fn answer(&self, question: &str) -> Result<Answer, DomainError> {
        let query = self.embedder.embed_query(question).await?;

        let retrieved = self
            .index
            .similarity_search(&query, self.settings.top_k)
            .await?;

        debug!(
            retrieved = retrieved.len(),
            top_k = self.settings.top_k,
            backend = self.index.backend_name(),
            "Retrieved context chunks"
        );

        let request = build_qa_request(question, &retrieved, self.settings.temperature);
        let response = self.llm.chat(&self.settings.model, request).await?;

        Ok(Answer::new(response.content().trim(), retrieved))
    }
}

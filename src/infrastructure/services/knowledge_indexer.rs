//! Load -> split -> embed -> store

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::DomainError;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::ingestion::{ChunkingConfig, TextSplitter};
use crate::domain::knowledge_base::{DocumentSource, EmbeddedChunk, VectorIndex};

/// Outcome of one indexing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexReport {
    pub documents: usize,
    pub chunks: usize,
    /// Rows of the previous contents that are no longer part of the index
    pub removed: usize,
}

/// Fills a vector index from a document source
#[derive(Debug)]
pub struct KnowledgeIndexer {
    splitter: Arc<dyn TextSplitter>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunking: ChunkingConfig,
    batch_size: usize,
}

impl KnowledgeIndexer {
    pub fn new(
        splitter: Arc<dyn TextSplitter>,
        embedder: Arc<dyn EmbeddingProvider>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            splitter,
            embedder,
            chunking,
            batch_size: 100,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Replace the contents of `index` with every document of `source`
    ///
    /// All embeddings are computed before the index is touched, so a
    /// provider failure leaves existing rows in place. Rows of sources that
    /// are no longer loaded (pages gone from the crawl, another source kind)
    /// are dropped.
    pub async fn index(
        &self,
        source: &dyn DocumentSource,
        index: &dyn VectorIndex,
    ) -> Result<IndexReport, DomainError> {
        let documents = source.load().await?;
        if documents.is_empty() {
            return Err(DomainError::source(format!(
                "The {} source returned no documents",
                source.name()
            )));
        }

        let mut chunks = Vec::new();
        for document in &documents {
            chunks.extend(self.splitter.split_document(document, &self.chunking)?);
        }

        if chunks.is_empty() {
            return Err(DomainError::source("Documents produced no text to index"));
        }

        debug!(
            documents = documents.len(),
            chunks = chunks.len(),
            splitter = self.splitter.name(),
            "Split documents"
        );

        let mut embedded = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content().to_string()).collect();
            let vectors = self.embedder.embed(texts).await?;

            if vectors.len() != batch.len() {
                return Err(DomainError::provider(
                    self.embedder.provider_name(),
                    format!(
                        "Embedding count mismatch: sent {}, received {}",
                        batch.len(),
                        vectors.len()
                    ),
                ));
            }

            embedded.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(vectors)
                    .map(|(chunk, vector)| EmbeddedChunk::new(chunk, vector)),
            );
        }

        index.ensure_schema().await?;

        let chunk_count = embedded.len();
        let removed = index.replace(embedded).await?;

        info!(
            source = source.name(),
            backend = index.backend_name(),
            documents = documents.len(),
            chunks = chunk_count,
            removed,
            "Indexed knowledge base"
        );

        Ok(IndexReport {
            documents: documents.len(),
            chunks: chunk_count,
            removed,
        })
    }
}

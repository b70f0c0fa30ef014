//! In-process vector index for development and testing

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::DomainError;
use crate::domain::embedding::cosine_similarity;
use crate::domain::knowledge_base::{EmbeddedChunk, ScoredChunk, VectorIndex};

/// Flat cosine-similarity index held in memory
///
/// Every search scans all rows. Fine for the few hundred chunks a small
/// knowledge base produces; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    rows: Arc<RwLock<Vec<StoredChunk>>>,
}

#[derive(Debug, Clone)]
struct StoredChunk {
    id: String,
    entry: EmbeddedChunk,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

fn upsert(rows: &mut Vec<StoredChunk>, entry: EmbeddedChunk) -> Result<(), DomainError> {
    if entry.embedding.is_empty() {
        return Err(DomainError::vector_store(
            "in_memory",
            format!("Chunk {} has an empty embedding", entry.chunk.chunk_index()),
        ));
    }

    let id = entry.chunk.stable_id();
    match rows.iter_mut().find(|row| row.id == id) {
        Some(existing) => existing.entry = entry,
        None => rows.push(StoredChunk { id, entry }),
    }

    Ok(())
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    fn backend_name(&self) -> &'static str {
        "in_memory"
    }

    async fn add(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize, DomainError> {
        let mut rows = self.rows.write().await;
        let added = chunks.len();

        for entry in chunks {
            upsert(&mut rows, entry)?;
        }

        Ok(added)
    }

    async fn replace(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize, DomainError> {
        // Built aside and swapped in whole; an invalid chunk leaves the old rows
        let mut fresh = Vec::with_capacity(chunks.len());
        for entry in chunks {
            upsert(&mut fresh, entry)?;
        }

        let mut rows = self.rows.write().await;
        let removed = rows
            .iter()
            .filter(|old| !fresh.iter().any(|new| new.id == old.id))
            .count();
        *rows = fresh;

        Ok(removed)
    }

    async fn remove_source(&self, source: &str) -> Result<usize, DomainError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.entry.chunk.source() != source);
        Ok(before - rows.len())
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>, DomainError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let rows = self.rows.read().await;

        let mut scored: Vec<ScoredChunk> = rows
            .iter()
            .map(|row| {
                ScoredChunk::new(
                    row.entry.chunk.clone(),
                    cosine_similarity(query, &row.entry.embedding),
                )
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);

        Ok(scored)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.rows.read().await.len())
    }
}

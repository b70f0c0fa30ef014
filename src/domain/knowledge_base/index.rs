//! Vector index trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{EmbeddedChunk, ScoredChunk};
use crate::domain::DomainError;

/// Similarity index over embedded chunks
///
/// Implementations cover the in-process index and managed vector databases;
/// the similarity metric is whatever the backend uses.
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Backend name for logs and status reports
    fn backend_name(&self) -> &'static str;

    /// Prepare the backend (tables, extensions). No-op where nothing is needed.
    async fn ensure_schema(&self) -> Result<(), DomainError> {
        Ok(())
    }

    /// Add chunks, replacing rows that share a chunk's stable id
    async fn add(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize, DomainError>;

    /// Make `chunks` the whole contents of the index
    ///
    /// Returns how many previous rows were dropped. On error the previous
    /// rows are still searchable.
    async fn replace(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize, DomainError>;

    /// Remove every chunk of a source, returning how many were removed
    async fn remove_source(&self, source: &str) -> Result<usize, DomainError>;

    /// Return up to `k` chunks closest to `query`, best first
    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>, DomainError>;

    /// Number of indexed chunks
    async fn count(&self) -> Result<usize, DomainError>;
}

//! Knowledge base document and chunk types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label used when a chunk carries no source
pub const UNKNOWN_SOURCE: &str = "Unknown source";

/// Raw text loaded from a document source, before splitting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    content: String,
    source: String,
}

impl SourceDocument {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// An immutable span of a source document, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    content: String,
    source: String,
    chunk_index: usize,
}

impl DocumentChunk {
    pub fn new(content: impl Into<String>, source: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            chunk_index,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Source label, empty when the origin is unknown
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Source label for display, falling back to [`UNKNOWN_SOURCE`]
    pub fn source_label(&self) -> &str {
        if self.source.trim().is_empty() {
            UNKNOWN_SOURCE
        } else {
            &self.source
        }
    }

    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    /// Stable row identifier derived from source and position
    ///
    /// A name-based (v5) UUID, so it fits `uuid` primary keys. Re-indexing
    /// the same document produces the same ids, so remote stores overwrite
    /// instead of accumulating duplicates.
    pub fn stable_id(&self) -> String {
        let mut name = Vec::with_capacity(self.source.len() + 9);
        name.extend_from_slice(self.source.as_bytes());
        name.push(0);
        name.extend_from_slice(&(self.chunk_index as u64).to_le_bytes());

        Uuid::new_v5(&Uuid::NAMESPACE_URL, &name).to_string()
    }
}

/// A chunk paired with its embedding, ready for indexing
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: DocumentChunk,
    pub embedding: Vec<f32>,
}

impl EmbeddedChunk {
    pub fn new(chunk: DocumentChunk, embedding: Vec<f32>) -> Self {
        Self { chunk, embedding }
    }
}

/// A retrieved chunk with the backend's similarity score (higher is closer)
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

impl ScoredChunk {
    pub fn new(chunk: DocumentChunk, score: f32) -> Self {
        Self { chunk, score }
    }
}

//! Text splitter trait and configuration

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;
use crate::domain::knowledge_base::{DocumentChunk, SourceDocument};

/// Configuration for chunking, measured in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size
    pub chunk_size: usize,
    /// Overlap carried from the end of one chunk into the next
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::validation(
                "chunk_overlap must be less than chunk_size",
            ));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Strategy for splitting text into bounded, optionally overlapping chunks
pub trait TextSplitter: Send + Sync + Debug {
    /// Split raw text into chunk strings, in document order
    fn split_text(&self, text: &str, config: &ChunkingConfig) -> Result<Vec<String>, DomainError>;

    /// Get the strategy name
    fn name(&self) -> &'static str;

    /// Split a document, labelling every chunk with the document's source
    fn split_document(
        &self,
        document: &SourceDocument,
        config: &ChunkingConfig,
    ) -> Result<Vec<DocumentChunk>, DomainError> {
        Ok(self
            .split_text(document.content(), config)?
            .into_iter()
            .enumerate()
            .map(|(index, text)| DocumentChunk::new(text, document.source(), index))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ChunkingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(ChunkingConfig::new(0, 0).validate().is_err());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        assert!(ChunkingConfig::new(100, 100).validate().is_err());
        assert!(ChunkingConfig::new(100, 99).validate().is_ok());
    }
}

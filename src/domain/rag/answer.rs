//! Answer produced by the pipeline and its cited sources

use serde::Serialize;

use crate::domain::knowledge_base::ScoredChunk;

/// Generated answer plus the chunks it was grounded on
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    text: String,
    chunks: Vec<ScoredChunk>,
}

impl Answer {
    pub fn new(text: impl Into<String>, chunks: Vec<ScoredChunk>) -> Self {
        Self {
            text: text.into(),
            chunks,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chunks(&self) -> &[ScoredChunk] {
        &self.chunks
    }

    /// Source labels of the retrieved chunks, each listed once in first-seen order
    pub fn sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::with_capacity(self.chunks.len());

        for scored in &self.chunks {
            let label = scored.chunk.source_label();

            if !sources.contains(&label) {
                sources.push(label);
            }
        }

        sources
    }
}

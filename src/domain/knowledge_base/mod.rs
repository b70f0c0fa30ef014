//! Knowledge base domain - documents, chunks, sources and vector indexes

mod document;
mod index;
mod source;

pub use document::{DocumentChunk, EmbeddedChunk, ScoredChunk, SourceDocument, UNKNOWN_SOURCE};
pub use index::VectorIndex;
pub use source::DocumentSource;

#[cfg(test)]
pub use source::MockDocumentSource;

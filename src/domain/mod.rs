//! Domain layer - Core types and traits

pub mod bot;
pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod knowledge_base;
pub mod llm;
pub mod rag;

pub use bot::{CommandReply, Lifecycle, LifecycleStatus};
pub use embedding::EmbeddingProvider;
pub use error::DomainError;
pub use ingestion::{ChunkingConfig, TextSplitter};
pub use knowledge_base::{
    DocumentChunk, DocumentSource, EmbeddedChunk, ScoredChunk, SourceDocument, VectorIndex,
};
pub use llm::{FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage};
pub use rag::{Answer, GenerationSettings, PipelineFactory, RagPipeline};

//! Infrastructure services

mod knowledge_indexer;
mod pipeline_factory;
mod rag_bot_service;

pub use knowledge_indexer::{IndexReport, KnowledgeIndexer};
pub use pipeline_factory::ConfiguredPipelineFactory;
pub use rag_bot_service::RagBotService;

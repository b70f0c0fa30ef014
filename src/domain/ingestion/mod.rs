//! Ingestion domain - splitting source documents into chunks

mod chunker;

pub use chunker::{ChunkingConfig, TextSplitter};

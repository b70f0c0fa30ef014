//! Prompt assembly for the "stuff" strategy: every retrieved chunk goes into one prompt

use crate::domain::knowledge_base::ScoredChunk;
use crate::domain::llm::LlmRequest;

/// System prompt; `{context}` is replaced by the retrieved chunks
pub const QA_SYSTEM_TEMPLATE: &str = "Use the following pieces of context to answer the user's question. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
----------------\n\
{context}";

/// Join chunk contents with blank lines, in retrieval order
pub fn format_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.chunk.content())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the chat request for a question and its retrieved chunks
pub fn build_qa_request(question: &str, chunks: &[ScoredChunk], temperature: f32) -> LlmRequest {
    let system = QA_SYSTEM_TEMPLATE.replace("{context}", &format_context(chunks));

    LlmRequest::builder()
        .system(system)
        .user(question)
        .temperature(temperature)
        .build()
}

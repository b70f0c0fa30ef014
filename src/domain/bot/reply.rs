//! Formatting of replies sent back through the chat transport

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::rag::Answer;

/// Maximum message length accepted by the chat transport, in characters
pub const MESSAGE_LIMIT: usize = 2000;

pub const NOT_READY_MESSAGE: &str =
    "The question-answering system is not ready yet. Please try again later.";

pub const GENERIC_FAILURE_MESSAGE: &str =
    "Sorry, I encountered an error while processing your question. Please try again later.";

pub const EMPTY_QUESTION_MESSAGE: &str = "Please provide a question.";

/// Text reply to a bot command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReply {
    /// Message body, never longer than [`MESSAGE_LIMIT`] characters
    pub content: String,
    /// Only visible to the invoking user
    pub ephemeral: bool,
}

impl CommandReply {
    /// Visible to the whole channel
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: truncate_chars(&content.into(), MESSAGE_LIMIT),
            ephemeral: false,
        }
    }

    /// Visible only to the caller
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: truncate_chars(&content.into(), MESSAGE_LIMIT),
            ephemeral: true,
        }
    }
}

/// Reply to a successful knowledge-base refresh
pub fn refresh_succeeded(backend: &str, chunk_count: usize) -> CommandReply {
    CommandReply::ephemeral(format!(
        "RAG system has been refreshed successfully with {} ({} chunks indexed).",
        backend, chunk_count
    ))
}

/// Reply to a failed refresh, shown to the administrator who asked for it
pub fn refresh_failed(error: &DomainError) -> CommandReply {
    CommandReply::ephemeral(format!("An error occurred during RAG refresh: {}", error))
}

/// Render `**Q:** ...\n\n**A:** ...` followed by the deduplicated source list
pub fn format_answer(question: &str, answer: &Answer) -> String {
    let mut response = format!("**Q:** {}\n\n**A:** {}", question, answer.text());
    let sources = answer.sources();

    if !sources.is_empty() {
        response.push_str("\n\n*Sources:*\n");
        let lines: Vec<String> = sources.iter().map(|s| format!("- {}", s)).collect();
        response.push_str(&lines.join("\n"));
    }

    response
}

/// Keep at most `limit` characters (Unicode scalar values, never splitting one)
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge_base::{DocumentChunk, ScoredChunk};

    fn answer(text: &str, sources: &[&str]) -> Answer {
        Answer::new(
            text,
            sources
                .iter()
                .enumerate()
                .map(|(i, s)| ScoredChunk::new(DocumentChunk::new(format!("chunk {}", i), *s, i), 0.5))
                .collect(),
        )
    }

    #[test]
    fn test_format_answer_with_sources() {
        let text = format_answer("What do you do?", &answer("Web development.", &["doc_0", "doc_1"]));

        assert_eq!(
            text,
            "**Q:** What do you do?\n\n**A:** Web development.\n\n*Sources:*\n- doc_0\n- doc_1"
        );
    }

    #[test]
    fn test_format_answer_lists_shared_source_once() {
        let text = format_answer("q", &answer("a", &["faq", "faq"]));

        assert_eq!(text.matches("- faq").count(), 1);
    }

    #[test]
    fn test_format_answer_without_sources() {
        let text = format_answer("q", &answer("a", &[]));

        assert_eq!(text, "**Q:** q\n\n**A:** a");
    }

    #[test]
    fn test_truncate_chars_keeps_short_text() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        let text = "é".repeat(10);
        let truncated = truncate_chars(&text, 4);

        assert_eq!(truncated.chars().count(), 4);
        assert_eq!(truncated, "éééé");
    }

    #[test]
    fn test_reply_is_capped_at_message_limit() {
        let reply = CommandReply::public("x".repeat(MESSAGE_LIMIT + 500));

        assert_eq!(reply.content.chars().count(), MESSAGE_LIMIT);
        assert!(!reply.ephemeral);
    }

    #[test]
    fn test_ephemeral_reply() {
        let reply = CommandReply::ephemeral(NOT_READY_MESSAGE);

        assert!(reply.ephemeral);
        assert_eq!(reply.content, NOT_READY_MESSAGE);
    }

    #[test]
    fn test_refresh_replies_are_ephemeral() {
        let ok = refresh_succeeded("in_memory", 4);
        assert!(ok.ephemeral);
        assert_eq!(
            ok.content,
            "RAG system has been refreshed successfully with in_memory (4 chunks indexed)."
        );

        let failed = refresh_failed(&DomainError::configuration("OPENAI_API_KEY is not set"));
        assert!(failed.ephemeral);
        assert_eq!(
            failed.content,
            "An error occurred during RAG refresh: Configuration error: OPENAI_API_KEY is not set"
        );
    }
}

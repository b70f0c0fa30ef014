//! LLM provider implementations

mod openai;

pub use openai::{DEFAULT_CHAT_MODEL, OpenAiChatProvider};

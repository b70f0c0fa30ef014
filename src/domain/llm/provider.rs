use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// Chat-completion backend (OpenAI and API-compatible gateways)
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::llm::Message;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    pub struct MockLlmProvider {
        answer: Option<String>,
        error: Option<String>,
        calls: AtomicUsize,
        last_request: Mutex<Option<LlmRequest>>,
    }

    impl MockLlmProvider {
        pub fn new() -> Self {
            Self {
                answer: None,
                error: None,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
            self.answer = Some(answer.into());
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_request(&self) -> Option<LlmRequest> {
            self.last_request.lock().unwrap().clone()
        }
    }

    impl Default for MockLlmProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request);

            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock", error));
            }

            let answer = self
                .answer
                .clone()
                .ok_or_else(|| DomainError::provider("mock", "No mock response configured"))?;

            Ok(LlmResponse::new("mock-id", model, Message::assistant(answer)))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}

//! Bot service: answers questions from the current pipeline and rebuilds it on demand

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::domain::DomainError;
use crate::domain::bot::{
    CommandReply, EMPTY_QUESTION_MESSAGE, GENERIC_FAILURE_MESSAGE, Lifecycle, LifecycleStatus,
    NOT_READY_MESSAGE, format_answer, refresh_failed, refresh_succeeded,
};
use crate::domain::rag::PipelineFactory;
use crate::infrastructure::observability::{QuestionOutcome, record_question, record_refresh};

/// Holds the active pipeline and serves the `ask` and `refresh` commands
///
/// Builds run outside the state lock and are swapped in with a single
/// write, so an `ask` always sees either the old or the new pipeline in
/// full. Concurrent refreshes are serialized.
pub struct RagBotService {
    factory: Arc<dyn PipelineFactory>,
    state: RwLock<Lifecycle>,
    build_lock: Mutex<()>,
}

impl std::fmt::Debug for RagBotService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagBotService").finish_non_exhaustive()
    }
}

impl RagBotService {
    pub fn new(factory: Arc<dyn PipelineFactory>) -> Self {
        Self {
            factory,
            state: RwLock::new(Lifecycle::default()),
            build_lock: Mutex::new(()),
        }
    }

    /// Build a new pipeline and make it current
    ///
    /// On failure the previous pipeline, if any, keeps serving.
    pub async fn initialize(&self) -> Result<LifecycleStatus, DomainError> {
        let _guard = self.build_lock.lock().await;
        let started = Instant::now();

        info!("Initializing retrieval pipeline");

        let pipeline = match self.factory.build().await {
            Ok(pipeline) => pipeline,
            Err(e) => {
                record_refresh(None);
                error!(error = %e, "Failed to initialize retrieval pipeline");
                return Err(e);
            }
        };

        let chunk_count = pipeline.chunk_count();
        let status = {
            let mut state = self.state.write().await;
            *state = state.advance(pipeline);
            state.status()
        };

        record_refresh(Some(chunk_count));
        info!(
            generation = status.generation,
            chunks = chunk_count,
            backend = status.backend.unwrap_or_default(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Retrieval pipeline ready"
        );

        Ok(status)
    }

    /// Handle the `ask` command; never fails, errors become an apology
    pub async fn ask(&self, question: &str) -> CommandReply {
        let started = Instant::now();
        let question = question.trim();

        if question.is_empty() {
            record_question(QuestionOutcome::Invalid, started.elapsed());
            return CommandReply::ephemeral(EMPTY_QUESTION_MESSAGE);
        }

        // Snapshot under a short read lock; the lock is not held across network calls
        let Some(pipeline) = self.state.read().await.pipeline() else {
            warn!("Question received before the pipeline is ready");
            record_question(QuestionOutcome::NotReady, started.elapsed());
            return CommandReply::ephemeral(NOT_READY_MESSAGE);
        };

        debug!(question, "Answering question");

        match pipeline.answer(question).await {
            Ok(answer) => {
                record_question(QuestionOutcome::Answered, started.elapsed());
                info!(
                    question_chars = question.chars().count(),
                    chunks = answer.chunks().len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Question answered"
                );
                CommandReply::public(format_answer(question, &answer))
            }
            Err(e) => {
                record_question(QuestionOutcome::Failed, started.elapsed());
                error!(error = %e, "Failed to answer question");
                CommandReply::ephemeral(GENERIC_FAILURE_MESSAGE)
            }
        }
    }

    /// Handle the `refresh` command; the reply is for the administrator only
    pub async fn refresh(&self) -> CommandReply {
        info!("Knowledge base refresh requested");

        match self.initialize().await {
            Ok(status) => refresh_succeeded(
                status.backend.unwrap_or("unknown"),
                status.chunk_count.unwrap_or_default(),
            ),
            Err(e) => refresh_failed(&e),
        }
    }

    pub async fn status(&self) -> LifecycleStatus {
        self.state.read().await.status()
    }

    pub async fn is_ready(&self) -> bool {
        self.state.read().await.is_ready()
    }
}

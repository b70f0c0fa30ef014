//! RAG answer bot
//!
//! Answers questions about a small knowledge base by retrieving the most
//! similar text chunks and asking a chat model to answer from them:
//! - Static or crawled-website document sources
//! - In-memory, Supabase or pgvector vector indexes
//! - Hot-swappable pipeline rebuilt by an admin refresh command

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::observability::PrometheusMetrics;
use infrastructure::services::{ConfiguredPipelineFactory, RagBotService};
use tracing::info;

/// Create the bot service; the pipeline is not built yet
pub fn create_bot(config: &AppConfig) -> anyhow::Result<Arc<RagBotService>> {
    config.validate()?;

    info!(
        backend = config.vector_store.backend.as_str(),
        source = ?config.knowledge.source,
        chat_model = %config.openai.chat_model,
        embedding_model = %config.openai.embedding_model,
        top_k = config.retrieval.top_k,
        "Creating bot service"
    );

    let factory = ConfiguredPipelineFactory::new(config.clone())?;
    Ok(Arc::new(RagBotService::new(Arc::new(factory))))
}

/// Create the application state with the bot and admin settings
pub fn create_app_state(
    config: &AppConfig,
    metrics: Option<PrometheusMetrics>,
) -> anyhow::Result<AppState> {
    let bot = create_bot(config)?;

    if config.admin.token.is_none() {
        info!("ADMIN_TOKEN not set, refresh command disabled");
    }

    Ok(AppState::new(bot)
        .with_admin_token(config.admin.token.as_deref())
        .with_metrics(metrics))
}

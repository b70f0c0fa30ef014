//! CLI module for the RAG answer bot
//!
//! - `serve`: HTTP command server (default)
//! - `ask`: one-shot question from the terminal

pub mod ask;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// RAG answer bot - answers questions from a small knowledge base
#[derive(Parser)]
#[command(name = "rag-answer-bot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the command server (default)
    Serve,

    /// Build the pipeline, answer one question and exit
    Ask(ask::AskArgs),
}

/// Load `.env`, configuration and logging shared by every subcommand
pub fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}

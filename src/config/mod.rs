//! Application configuration

mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, KnowledgeConfig, LogFormat, LoggingConfig, MetricsConfig,
    OpenAiConfig, RetrievalConfig, ServerConfig, SourceKind, VectorBackend, VectorStoreConfig,
};

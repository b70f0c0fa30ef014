use serde::Deserialize;

use crate::domain::DomainError;
use crate::domain::ingestion::ChunkingConfig;
use crate::domain::rag::GenerationSettings;
use crate::infrastructure::sources::DEFAULT_TEXTS;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub openai: OpenAiConfig,
    pub retrieval: RetrievalConfig,
    pub knowledge: KnowledgeConfig,
    pub vector_store: VectorStoreConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

/// OpenAI credentials and model selection
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Texts per embedding request while indexing
    pub embedding_batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Static,
    Web,
}

/// Where the knowledge base text is loaded from
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub source: SourceKind,
    /// Texts for the static source
    pub texts: Vec<String>,
    /// Start URLs for the web source
    pub urls: Vec<String>,
    pub follow_links: bool,
    pub max_pages: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VectorBackend {
    #[default]
    InMemory,
    Supabase,
    Pgvector,
}

impl VectorBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InMemory => "in_memory",
            Self::Supabase => "supabase",
            Self::Pgvector => "pgvector",
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: VectorBackend,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub table_name: String,
    /// Supabase RPC used for similarity search
    pub query_name: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

/// Administrative command settings
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Token required by the refresh command; refresh is disabled without one
    pub token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
            timeout_secs: 60,
            embedding_batch_size: 100,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        let chunking = ChunkingConfig::default();
        Self {
            top_k: 2,
            chunk_size: chunking.chunk_size,
            chunk_overlap: chunking.chunk_overlap,
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            texts: DEFAULT_TEXTS.iter().map(|t| t.to_string()).collect(),
            urls: Vec::new(),
            follow_links: false,
            max_pages: 20,
        }
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackend::default(),
            supabase_url: None,
            supabase_key: None,
            table_name: "documents".to_string(),
            query_name: "match_documents".to_string(),
            database_url: None,
            max_connections: 5,
        }
    }
}

fn redact(value: &Option<String>) -> &'static str {
    if value.is_some() { "<redacted>" } else { "<unset>" }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("embedding_model", &self.embedding_model)
            .field("chat_model", &self.chat_model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("embedding_batch_size", &self.embedding_batch_size)
            .finish()
    }
}

impl std::fmt::Debug for VectorStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStoreConfig")
            .field("backend", &self.backend)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &redact(&self.supabase_key))
            .field("table_name", &self.table_name)
            .field("query_name", &self.query_name)
            .field("database_url", &redact(&self.database_url))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("token", &redact(&self.token))
            .finish()
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("knowledge.urls")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        app_config.apply_env_overrides(|key| std::env::var(key).ok());

        Ok(app_config)
    }

    /// Apply the conventional unprefixed variables (`OPENAI_API_KEY`, ...)
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(url) = get("SUPABASE_URL") {
            self.vector_store.supabase_url = Some(url);
        }
        if let Some(key) = get("SUPABASE_KEY").or_else(|| get("SUPABASE_SERVICE_KEY")) {
            self.vector_store.supabase_key = Some(key);
        }
        if let Some(table) = get("SUPABASE_TABLE_NAME") {
            self.vector_store.table_name = table;
        }
        if let Some(url) = get("DATABASE_URL") {
            self.vector_store.database_url = Some(url);
        }
        if let Some(token) = get("ADMIN_TOKEN") {
            self.admin.token = Some(token);
        }
    }

    /// Reject settings that can never produce a working pipeline
    ///
    /// Missing API keys are not checked here: the server starts without
    /// them and reports not-ready until a build succeeds.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.retrieval.top_k == 0 {
            return Err(DomainError::configuration("retrieval.top_k must be at least 1"));
        }

        self.chunking()
            .validate()
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(DomainError::configuration(
                "openai.temperature must be between 0.0 and 2.0",
            ));
        }

        if self.openai.embedding_batch_size == 0 {
            return Err(DomainError::configuration(
                "openai.embedding_batch_size must be at least 1",
            ));
        }

        if self.knowledge.source == SourceKind::Web && self.knowledge.urls.is_empty() {
            return Err(DomainError::configuration(
                "knowledge.urls must not be empty for the web source",
            ));
        }

        match self.vector_store.backend {
            VectorBackend::Supabase if self.vector_store.supabase_url.is_none() => {
                Err(DomainError::configuration(
                    "SUPABASE_URL is required for the supabase backend",
                ))
            }
            VectorBackend::Pgvector if self.vector_store.database_url.is_none() => {
                Err(DomainError::configuration(
                    "DATABASE_URL is required for the pgvector backend",
                ))
            }
            _ => Ok(()),
        }
    }

    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig::new(self.retrieval.chunk_size, self.retrieval.chunk_overlap)
    }

    pub fn generation(&self) -> GenerationSettings {
        GenerationSettings {
            model: self.openai.chat_model.clone(),
            temperature: self.openai.temperature,
            top_k: self.retrieval.top_k,
        }
    }
}

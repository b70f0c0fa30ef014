//! Supabase (PostgREST) vector index

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::domain::knowledge_base::{DocumentChunk, EmbeddedChunk, ScoredChunk, VectorIndex};
use crate::infrastructure::http_client::HttpClientTrait;

const BACKEND: &str = "supabase";

/// Rows are sent in slices of this size to stay under request body limits
const INSERT_BATCH_SIZE: usize = 100;

/// Metadata key tagging rows with the refresh that wrote them
const GENERATION_KEY: &str = "generation";

/// Connection settings for a Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
    pub table_name: String,
    pub query_name: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            key: key.into(),
            table_name: "documents".to_string(),
            query_name: "match_documents".to_string(),
        }
    }

    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    pub fn with_query_name(mut self, name: impl Into<String>) -> Self {
        self.query_name = name.into();
        self
    }
}

/// Vector index stored in a Supabase table with pgvector
///
/// Expects the `documents` table and `match_documents` function of the
/// LangChain Supabase guide: `id uuid`, `content`, `metadata jsonb`,
/// `embedding vector`, and an RPC returning rows with a `similarity` column.
#[derive(Debug)]
pub struct SupabaseVectorIndex<C: HttpClientTrait> {
    client: C,
    config: SupabaseConfig,
    auth_header: String,
}

impl<C: HttpClientTrait> SupabaseVectorIndex<C> {
    pub fn new(client: C, config: SupabaseConfig) -> Self {
        let auth_header = format!("Bearer {}", config.key);
        Self {
            client,
            config,
            auth_header,
        }
    }

    fn table_url(&self) -> Result<Url, DomainError> {
        let raw = format!("{}/rest/v1/{}", self.config.url, self.config.table_name);
        Url::parse(&raw).map_err(|e| {
            DomainError::configuration(format!("Invalid Supabase URL '{}': {}", raw, e))
        })
    }

    fn rpc_url(&self) -> String {
        format!("{}/rest/v1/rpc/{}", self.config.url, self.config.query_name)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("apikey", self.config.key.as_str()),
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn row(entry: &EmbeddedChunk, generation: Option<&str>) -> serde_json::Value {
        let mut metadata = serde_json::json!({
            "source": entry.chunk.source(),
            "chunk_index": entry.chunk.chunk_index(),
        });
        if let Some(generation) = generation {
            metadata[GENERATION_KEY] = serde_json::Value::from(generation);
        }

        serde_json::json!({
            "id": entry.chunk.stable_id(),
            "content": entry.chunk.content(),
            "embedding": entry.embedding,
            "metadata": metadata,
        })
    }

    fn map_error(e: DomainError) -> DomainError {
        DomainError::vector_store(BACKEND, e.to_string())
    }

    async fn upsert(
        &self,
        chunks: &[EmbeddedChunk],
        generation: Option<&str>,
    ) -> Result<(), DomainError> {
        let url = self.table_url()?;
        let mut headers = self.headers();
        headers.push(("Prefer", "resolution=merge-duplicates,return=minimal"));

        for batch in chunks.chunks(INSERT_BATCH_SIZE) {
            let rows: Vec<serde_json::Value> =
                batch.iter().map(|entry| Self::row(entry, generation)).collect();
            self.client
                .post_json(url.as_str(), headers.clone(), &serde_json::Value::Array(rows))
                .await
                .map_err(Self::map_error)?;

            debug!(table = %self.config.table_name, rows = batch.len(), "Upserted rows");
        }

        Ok(())
    }

    /// Delete rows matching the PostgREST filter `key=value`, returning how many went
    async fn delete_matching(&self, key: &str, value: &str) -> Result<usize, DomainError> {
        let mut url = self.table_url()?;
        url.query_pairs_mut().append_pair(key, value);

        let mut headers = self.headers();
        headers.push(("Prefer", "count=exact"));

        let removed = self
            .client
            .delete(url.as_str(), headers)
            .await
            .map_err(Self::map_error)?;

        Ok(removed.unwrap_or_default())
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorIndex for SupabaseVectorIndex<C> {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn add(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize, DomainError> {
        self.upsert(&chunks, None).await?;
        Ok(chunks.len())
    }

    async fn replace(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize, DomainError> {
        // PostgREST has no multi-request transaction: write the new generation
        // first, then drop everything else, so a failed upsert loses nothing
        let generation = Uuid::new_v4().to_string();
        self.upsert(&chunks, Some(&generation)).await?;

        let stale = format!(
            "(metadata->>{key}.is.null,metadata->>{key}.neq.{generation})",
            key = GENERATION_KEY,
        );
        let removed = self.delete_matching("or", &stale).await?;

        debug!(table = %self.config.table_name, %generation, removed, "Replaced rows");
        Ok(removed)
    }

    async fn remove_source(&self, source: &str) -> Result<usize, DomainError> {
        self.delete_matching("metadata->>source", &format!("eq.{}", source))
            .await
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>, DomainError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "query_embedding": query,
            "match_count": k,
            "filter": {},
        });

        let response = self
            .client
            .post_json(&self.rpc_url(), self.headers(), &body)
            .await
            .map_err(Self::map_error)?;

        let rows: Vec<MatchRow> = serde_json::from_value(response).map_err(|e| {
            DomainError::vector_store(BACKEND, format!("Failed to parse match rows: {}", e))
        })?;

        let mut results: Vec<ScoredChunk> = rows.into_iter().map(MatchRow::into_scored).collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);

        Ok(results)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let mut url = self.table_url()?;
        url.query_pairs_mut().append_pair("select", "id");

        let mut headers = self.headers();
        headers.push(("Prefer", "count=exact"));

        self.client
            .head_count(url.as_str(), headers)
            .await
            .map_err(Self::map_error)?
            .ok_or_else(|| {
                DomainError::vector_store(BACKEND, "Row count missing from Content-Range")
            })
    }
}

#[derive(Debug, Deserialize)]
struct MatchRow {
    content: String,
    #[serde(default)]
    metadata: MatchMetadata,
    #[serde(default)]
    similarity: f32,
}

#[derive(Debug, Default, Deserialize)]
struct MatchMetadata {
    #[serde(default)]
    source: String,
    #[serde(default)]
    chunk_index: usize,
}

impl MatchRow {
    fn into_scored(self) -> ScoredChunk {
        let chunk = DocumentChunk::new(self.content, self.metadata.source, self.metadata.chunk_index);
        ScoredChunk::new(chunk, self.similarity)
    }
}

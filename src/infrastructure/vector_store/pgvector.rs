//! pgvector index over a direct Postgres connection

use async_trait::async_trait;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::{Row, Transaction};

use crate::domain::DomainError;
use crate::domain::knowledge_base::{DocumentChunk, EmbeddedChunk, ScoredChunk, VectorIndex};

const BACKEND: &str = "pgvector";

/// Vector index in a Postgres table using the pgvector extension
///
/// Similarity is `1 - (embedding <=> query)`, i.e. cosine similarity.
pub struct PgvectorIndex {
    pool: PgPool,
    table_name: String,
}

impl std::fmt::Debug for PgvectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgvectorIndex")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl PgvectorIndex {
    /// Create an index over `table_name`
    ///
    /// The name is interpolated into SQL, so only `[A-Za-z0-9_]` is accepted.
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Result<Self, DomainError> {
        let table_name = table_name.into();
        if table_name.is_empty()
            || !table_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(DomainError::configuration(format!(
                "Invalid pgvector table name '{}'",
                table_name
            )));
        }

        Ok(Self { pool, table_name })
    }

    fn db_error(context: &str, e: sqlx::Error) -> DomainError {
        tracing::error!(error = %e, context, "pgvector query failed");
        DomainError::vector_store(BACKEND, format!("{}: {}", context, e))
    }

    /// Deletes every row whose id is not in the `$1` array
    fn delete_stale_sql(&self) -> String {
        format!("DELETE FROM {} WHERE NOT (id = ANY($1))", self.table_name)
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| Self::db_error("Failed to begin transaction", e))
    }

    async fn upsert_rows(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        chunks: &[EmbeddedChunk],
    ) -> Result<(), DomainError> {
        let query = format!(
            r#"
            INSERT INTO {} (id, content, source, chunk_index, embedding)
            VALUES ($1, $2, $3, $4, $5::vector)
            ON CONFLICT (id) DO UPDATE SET
                content = EXCLUDED.content,
                source = EXCLUDED.source,
                chunk_index = EXCLUDED.chunk_index,
                embedding = EXCLUDED.embedding
            "#,
            self.table_name
        );

        for entry in chunks {
            sqlx::query(&query)
                .bind(entry.chunk.stable_id())
                .bind(entry.chunk.content())
                .bind(entry.chunk.source())
                .bind(entry.chunk.chunk_index() as i32)
                .bind(to_pgvector_literal(&entry.embedding))
                .execute(&mut **tx)
                .await
                .map_err(|e| Self::db_error("Failed to insert chunk", e))?;
        }

        Ok(())
    }
}

/// Render a vector in pgvector's text input format
fn to_pgvector_literal(embedding: &[f32]) -> String {
    let parts: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(","))
}

#[async_trait]
impl VectorIndex for PgvectorIndex {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to create vector extension", e))?;

        // Dimension left open so any embedding model fits
        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                chunk_index INTEGER NOT NULL DEFAULT 0,
                embedding vector NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table_name
        );

        sqlx::query(&create_table)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to create table", e))?;

        let source_index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{0}_source ON {0} (source)",
            self.table_name
        );

        sqlx::query(&source_index)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to create source index", e))?;

        Ok(())
    }

    async fn add(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize, DomainError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let mut tx = self.begin().await?;
        self.upsert_rows(&mut tx, &chunks).await?;
        tx.commit()
            .await
            .map_err(|e| Self::db_error("Failed to commit chunks", e))?;

        Ok(chunks.len())
    }

    async fn replace(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize, DomainError> {
        let ids: Vec<String> = chunks.iter().map(|c| c.chunk.stable_id()).collect();
        let delete_stale = self.delete_stale_sql();

        // Readers see the old rows until commit; dropping `tx` on error rolls back
        let mut tx = self.begin().await?;
        self.upsert_rows(&mut tx, &chunks).await?;

        let result = sqlx::query(&delete_stale)
            .bind(ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::db_error("Failed to delete stale chunks", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::db_error("Failed to commit replacement", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn remove_source(&self, source: &str) -> Result<usize, DomainError> {
        let query = format!("DELETE FROM {} WHERE source = $1", self.table_name);

        let result = sqlx::query(&query)
            .bind(source)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to delete source", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>, DomainError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT content, source, chunk_index, 1 - (embedding <=> $1::vector) AS similarity
            FROM {}
            ORDER BY embedding <=> $1::vector
            LIMIT $2
            "#,
            self.table_name
        );

        let rows = sqlx::query(&sql)
            .bind(to_pgvector_literal(query))
            .bind(k as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::db_error("Search failed", e))?;

        let results = rows
            .into_iter()
            .map(|row| {
                let content: String = row.get("content");
                let source: String = row.get("source");
                let chunk_index: i32 = row.get("chunk_index");
                let similarity: f64 = row.get("similarity");
                ScoredChunk::new(
                    DocumentChunk::new(content, source, chunk_index.max(0) as usize),
                    similarity as f32,
                )
            })
            .collect();

        Ok(results)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let query = format!("SELECT COUNT(*) AS count FROM {}", self.table_name);

        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to count rows", e))?;

        let count: i64 = row.get("count");
        Ok(count.max(0) as usize)
    }
}

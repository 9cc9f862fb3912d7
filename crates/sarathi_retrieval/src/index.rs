//! The nearest-neighbor index behind the retriever.

use crate::corpus::Corpus;
use crate::embedding::{cosine_similarity, EmbeddingModel};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

/// The black-box vector index: free text in, ranked `(verse_id, distance)`
/// out. Distances follow the cosine-distance convention (0 = identical).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<(String, f32)>>;
}

/// SQLite-backed index: verse embeddings live as bincode BLOBs in a
/// `verse_embeddings` table and queries do a brute-force cosine scan.
/// Fine at corpus scale (~700 verses); an ANN index would slot in behind
/// the same trait.
#[derive(Clone)]
pub struct SqliteVectorIndex {
    pool: Pool<Sqlite>,
    embedder: EmbeddingModel,
}

impl SqliteVectorIndex {
    pub async fn new(pool: Pool<Sqlite>, embedder: EmbeddingModel) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS verse_embeddings (
                verse_id TEXT PRIMARY KEY,
                embedding BLOB NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await
        .context("Failed to create verse_embeddings table")?;

        Ok(Self { pool, embedder })
    }

    /// Embed and store every corpus verse. Skips work if the table is
    /// already populated (idempotent startup).
    pub async fn index_corpus(&self, corpus: &Corpus) -> Result<()> {
        let row = sqlx::query("SELECT COUNT(*) as n FROM verse_embeddings")
            .fetch_one(&self.pool)
            .await?;
        let existing: i64 = row.get("n");
        if existing as usize >= corpus.len() {
            tracing::info!("Index already contains {} verse embeddings", existing);
            return Ok(());
        }

        tracing::info!("Indexing {} verses...", corpus.len());
        for verse in corpus.iter() {
            // Shloka + English meaning together carry both the original
            // wording and the searchable semantics.
            let document = format!("{} {}", verse.shloka, verse.eng_meaning);
            let embedding = self
                .embedder
                .embed(&document)
                .with_context(|| format!("Failed to embed verse {}", verse.id))?;
            let blob = bincode::serialize(&embedding).context("Failed to serialize embedding")?;

            sqlx::query(
                "INSERT OR REPLACE INTO verse_embeddings (verse_id, embedding) VALUES (?, ?)",
            )
            .bind(&verse.id)
            .bind(blob)
            .execute(&self.pool)
            .await
            .context("Failed to insert verse embedding")?;
        }
        tracing::info!("Indexed {} verses", corpus.len());
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<(String, f32)>> {
        let query_embedding = self.embedder.embed(text).context("Failed to embed query")?;

        let rows = sqlx::query("SELECT verse_id, embedding FROM verse_embeddings")
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch verse embeddings")?;

        let mut scored: Vec<(String, f32)> = Vec::with_capacity(rows.len());
        for row in rows {
            let verse_id: String = row.get("verse_id");
            let blob: Vec<u8> = row.get("embedding");
            if let Ok(embedding) = bincode::deserialize::<Vec<f32>>(&blob) {
                let distance = 1.0 - cosine_similarity(&query_embedding, &embedding);
                scored.push((verse_id, distance));
            }
        }

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}

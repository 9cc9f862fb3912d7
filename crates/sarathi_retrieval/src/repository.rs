//! Chained verse lookups: in-memory corpus first, relational
//! `verse_metadata` table second. The relational side also serves the
//! lookups the index cannot answer (random draw, whole chapters).

use anyhow::{Context, Result};
use sarathi_core::Verse;
use sqlx::{Pool, Row, Sqlite};
use std::sync::Arc;

use crate::corpus::Corpus;

#[derive(Clone)]
pub struct VerseRepository {
    corpus: Arc<Corpus>,
    pool: Pool<Sqlite>,
}

impl VerseRepository {
    pub fn new(corpus: Arc<Corpus>, pool: Pool<Sqlite>) -> Self {
        Self { corpus, pool }
    }

    /// Primary: corpus map. Secondary: relational table. Absent in both
    /// is `None`, not an error.
    pub async fn by_id(&self, id: &str) -> Result<Option<Verse>> {
        if let Some(verse) = self.corpus.get(id) {
            return Ok(Some(verse.clone()));
        }

        let row = sqlx::query(
            "SELECT id, chapter, verse, shloka, transliteration, eng_meaning, hin_meaning, word_meaning, themes \
             FROM verse_metadata WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query verse_metadata by id")?;

        Ok(row.map(row_to_verse))
    }

    pub async fn random(&self) -> Result<Option<Verse>> {
        let row = sqlx::query(
            "SELECT id, chapter, verse, shloka, transliteration, eng_meaning, hin_meaning, word_meaning, themes \
             FROM verse_metadata ORDER BY RANDOM() LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query random verse")?;

        Ok(row.map(row_to_verse))
    }

    pub async fn by_chapter(&self, chapter: u32) -> Result<Vec<Verse>> {
        let rows = sqlx::query(
            "SELECT id, chapter, verse, shloka, transliteration, eng_meaning, hin_meaning, word_meaning, themes \
             FROM verse_metadata WHERE chapter = ? ORDER BY verse",
        )
        .bind(chapter as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query verses by chapter")?;

        Ok(rows.into_iter().map(row_to_verse).collect())
    }
}

fn row_to_verse(row: sqlx::sqlite::SqliteRow) -> Verse {
    let themes_json: Option<String> = row.get("themes");
    let themes = themes_json
        .and_then(|j| serde_json::from_str(&j).ok())
        .unwrap_or_default();
    Verse {
        id: row.get("id"),
        chapter: row.get::<i64, _>("chapter") as u32,
        verse: row.get::<i64, _>("verse") as u32,
        shloka: row.get("shloka"),
        transliteration: row.get("transliteration"),
        eng_meaning: row.get("eng_meaning"),
        hin_meaning: row.get("hin_meaning"),
        word_meaning: row.get("word_meaning"),
        themes,
    }
}

use anyhow::{Context, Result};
use sarathi_core::{Error, Verse};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;

/// The single shared mutable resource of the system. Everything else is
/// request-scoped; concurrent requests meet only here.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display());
        let pool = SqlitePoolOptions::new()
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON").execute(conn).await?;
                    Ok(())
                })
            })
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Connectivity probe for health checks.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                external_uid TEXT NOT NULL UNIQUE,
                email TEXT,
                display_name TEXT,
                preferences TEXT NOT NULL DEFAULT '{}',
                created_at INTEGER NOT NULL,
                last_active INTEGER
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create users table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversation_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                started_at INTEGER NOT NULL,
                ended_at INTEGER,
                interaction_mode TEXT NOT NULL DEFAULT 'wisdom'
                    CHECK (interaction_mode IN ('socratic', 'wisdom', 'story')),
                summary TEXT,
                message_count INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create conversation_sessions table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversation_messages (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL REFERENCES conversation_sessions(id) ON DELETE CASCADE,
                role TEXT NOT NULL CHECK (role IN ('user', 'assistant')),
                content TEXT NOT NULL,
                emotion_label TEXT,
                emotion_confidence REAL
                    CHECK (emotion_confidence IS NULL
                           OR (emotion_confidence >= 0.0 AND emotion_confidence <= 1.0)),
                emotion_emoji TEXT,
                emotion_color TEXT,
                verse_id TEXT,
                sequence_number INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                UNIQUE (session_id, sequence_number)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create conversation_messages table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_session_seq \
             ON conversation_messages(session_id, sequence_number)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create message sequence index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS emotion_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                log_date TEXT NOT NULL,
                user_input TEXT NOT NULL,
                dominant_emotion TEXT NOT NULL,
                emotion_confidence REAL NOT NULL
                    CHECK (emotion_confidence >= 0.0 AND emotion_confidence <= 1.0),
                emotion_emoji TEXT NOT NULL,
                emotion_color TEXT NOT NULL,
                all_emotions TEXT NOT NULL DEFAULT '[]',
                verse_ids TEXT NOT NULL DEFAULT '[]',
                session_id TEXT REFERENCES conversation_sessions(id) ON DELETE SET NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create emotion_logs table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_emotion_logs_user_date \
             ON emotion_logs(user_id, log_date)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create emotion log index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS verse_metadata (
                id TEXT PRIMARY KEY,
                chapter INTEGER NOT NULL,
                verse INTEGER NOT NULL,
                shloka TEXT NOT NULL,
                transliteration TEXT,
                eng_meaning TEXT NOT NULL,
                hin_meaning TEXT,
                word_meaning TEXT,
                themes TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create verse_metadata table")?;

        Ok(())
    }

    /// Mirror the corpus into the relational table for the lookups the
    /// vector index cannot answer. Idempotent.
    pub async fn seed_verses<'a, I>(&self, verses: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Verse>,
    {
        let mut count = 0;
        for verse in verses {
            let themes_json = serde_json::to_string(&verse.themes)?;
            sqlx::query(
                "INSERT OR IGNORE INTO verse_metadata \
                 (id, chapter, verse, shloka, transliteration, eng_meaning, hin_meaning, word_meaning, themes) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&verse.id)
            .bind(verse.chapter as i64)
            .bind(verse.verse as i64)
            .bind(&verse.shloka)
            .bind(&verse.transliteration)
            .bind(&verse.eng_meaning)
            .bind(&verse.hin_meaning)
            .bind(&verse.word_meaning)
            .bind(themes_json)
            .execute(&self.pool)
            .await
            .context("Failed to seed verse metadata")?;
            count += 1;
        }
        tracing::info!("Seeded {} verses into verse_metadata", count);
        Ok(count)
    }
}

/// Map a sqlx error into the shared taxonomy, preserving constraint
/// violations as database errors with their message intact.
pub(crate) fn db_err(e: sqlx::Error) -> Error {
    Error::Database(e.to_string())
}

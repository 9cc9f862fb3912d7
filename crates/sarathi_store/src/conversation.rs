//! Conversation sessions and messages.
//!
//! Sequence assignment, the ended-session guard, and the denormalized
//! message counter all commit in one transaction, so ordering cannot
//! corrupt under concurrent appends to the same session.

use crate::sqlite::{db_err, SqliteStore};
use crate::users::ts_to_datetime;
use async_trait::async_trait;
use chrono::Utc;
use sarathi_core::{
    ConversationContext, ConversationStore, Emotion, Error, InteractionMode, Message, MessageRole,
    Result, Session,
};
use sqlx::Row;
use uuid::Uuid;

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn create_session(&self, user_id: Uuid, mode: InteractionMode) -> Result<Session> {
        // Verify the user exists first so the caller gets NotFound rather
        // than a raw foreign-key violation.
        let exists = sqlx::query("SELECT id FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?;
        if exists.is_none() {
            return Err(Error::NotFound("user", user_id.to_string()));
        }

        let id = Uuid::new_v4();
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO conversation_sessions (id, user_id, started_at, interaction_mode, message_count) \
             VALUES (?, ?, ?, ?, 0)",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(now)
        .bind(mode.as_str())
        .execute(self.pool())
        .await
        .map_err(db_err)?;

        tracing::info!("Created conversation session {} for user {}", id, user_id);
        self.get_session(id).await
    }

    async fn get_session(&self, session_id: Uuid) -> Result<Session> {
        let row = sqlx::query(
            "SELECT id, user_id, started_at, ended_at, interaction_mode, summary, message_count \
             FROM conversation_sessions WHERE id = ?",
        )
        .bind(session_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?
        .ok_or_else(|| Error::NotFound("session", session_id.to_string()))?;

        row_to_session(&row)
    }

    async fn add_message(
        &self,
        session_id: Uuid,
        role: MessageRole,
        content: &str,
        emotion: Option<&Emotion>,
        verse_id: Option<&str>,
    ) -> Result<Message> {
        let id = Uuid::new_v4();
        let now = Utc::now().timestamp();
        let mut tx = self.pool().begin().await.map_err(db_err)?;

        // Sequence assignment, the ended-session guard and the insert are
        // one statement. Concurrent appends serialize on SQLite's writer
        // lock, and because this is the transaction's first statement the
        // MAX is never read from a stale snapshot. The UNIQUE constraint
        // on (session_id, sequence_number) backstops the invariant.
        let result = sqlx::query(
            "INSERT INTO conversation_messages \
             (id, session_id, role, content, emotion_label, emotion_confidence, emotion_emoji, emotion_color, verse_id, sequence_number, created_at) \
             SELECT ?, s.id, ?, ?, ?, ?, ?, ?, ?, \
                    (SELECT COALESCE(MAX(m.sequence_number), 0) + 1 \
                     FROM conversation_messages m WHERE m.session_id = s.id), ? \
             FROM conversation_sessions s WHERE s.id = ? AND s.ended_at IS NULL",
        )
        .bind(id.to_string())
        .bind(role.as_str())
        .bind(content)
        .bind(emotion.map(|e| e.label.as_str()))
        .bind(emotion.map(|e| e.confidence as f64))
        .bind(emotion.map(|e| e.emoji.as_str()))
        .bind(emotion.map(|e| e.color.as_str()))
        .bind(verse_id)
        .bind(now)
        .bind(session_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            drop(tx);
            // Nothing inserted: the session is absent or ended.
            let session = self.get_session(session_id).await?;
            if session.ended_at.is_some() {
                return Err(Error::InvalidState(format!(
                    "session {} is ended; no messages may be appended",
                    session_id
                )));
            }
            return Err(Error::Database(format!(
                "failed to append message to session {}",
                session_id
            )));
        }

        let row = sqlx::query(
            "SELECT sequence_number FROM conversation_messages WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;
        let sequence_number: i64 = row.get("sequence_number");

        sqlx::query(
            "UPDATE conversation_sessions SET message_count = message_count + 1 WHERE id = ?",
        )
        .bind(session_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        tracing::debug!(
            "Added message {} (seq {}) to session {}",
            id,
            sequence_number,
            session_id
        );

        Ok(Message {
            id,
            session_id,
            role,
            content: content.to_string(),
            emotion: emotion.cloned(),
            verse_id: verse_id.map(|v| v.to_string()),
            sequence_number,
            created_at: ts_to_datetime(now),
        })
    }

    async fn get_context(&self, session_id: Uuid, window_size: u32) -> Result<ConversationContext> {
        // Existence check so an unknown session is NotFound, not an empty
        // context.
        self.get_session(session_id).await?;

        let rows = sqlx::query(
            "SELECT id, session_id, role, content, emotion_label, emotion_confidence, emotion_emoji, emotion_color, verse_id, sequence_number, created_at \
             FROM conversation_messages WHERE session_id = ? \
             ORDER BY sequence_number DESC LIMIT ?",
        )
        .bind(session_id.to_string())
        .bind(window_size as i64)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        let mut messages: Vec<Message> = rows
            .iter()
            .map(row_to_message)
            .collect::<Result<Vec<_>>>()?;
        // Fetched newest-first; reorder to chronological.
        messages.reverse();

        let total = sqlx::query(
            "SELECT COUNT(*) AS n FROM conversation_messages WHERE session_id = ?",
        )
        .bind(session_id.to_string())
        .fetch_one(self.pool())
        .await
        .map_err(db_err)?;
        let total_messages: i64 = total.get("n");

        Ok(ConversationContext {
            session_id,
            messages,
            total_messages,
        })
    }

    async fn end_session(&self, session_id: Uuid, summary: Option<&str>) -> Result<Session> {
        let now = Utc::now().timestamp();
        // Guarded update: the transition happens at most once even under
        // concurrent end calls.
        let result = sqlx::query(
            "UPDATE conversation_sessions SET ended_at = ?, summary = COALESCE(?, summary) \
             WHERE id = ? AND ended_at IS NULL",
        )
        .bind(now)
        .bind(summary)
        .bind(session_id.to_string())
        .execute(self.pool())
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            // Absent is NotFound; present-but-ended is the terminal error.
            self.get_session(session_id).await?;
            return Err(Error::InvalidState(format!(
                "session {} is already ended",
                session_id
            )));
        }

        tracing::info!("Ended conversation session {}", session_id);
        self.get_session(session_id).await
    }
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let mode: String = row.get("interaction_mode");
    let ended_at: Option<i64> = row.get("ended_at");
    Ok(Session {
        id: Uuid::parse_str(&id).map_err(|e| Error::Database(e.to_string()))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| Error::Database(e.to_string()))?,
        started_at: ts_to_datetime(row.get("started_at")),
        ended_at: ended_at.map(ts_to_datetime),
        interaction_mode: InteractionMode::parse(&mode)?,
        summary: row.get("summary"),
        message_count: row.get("message_count"),
    })
}

fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<Message> {
    let id: String = row.get("id");
    let session_id: String = row.get("session_id");
    let role: String = row.get("role");
    let emotion_label: Option<String> = row.get("emotion_label");

    let emotion = emotion_label.map(|label| Emotion {
        label,
        confidence: row.get::<Option<f64>, _>("emotion_confidence").unwrap_or(0.0) as f32,
        emoji: row
            .get::<Option<String>, _>("emotion_emoji")
            .unwrap_or_default(),
        color: row
            .get::<Option<String>, _>("emotion_color")
            .unwrap_or_default(),
    });

    Ok(Message {
        id: Uuid::parse_str(&id).map_err(|e| Error::Database(e.to_string()))?,
        session_id: Uuid::parse_str(&session_id).map_err(|e| Error::Database(e.to_string()))?,
        role: MessageRole::parse(&role)?,
        content: row.get("content"),
        emotion,
        verse_id: row.get("verse_id"),
        sequence_number: row.get("sequence_number"),
        created_at: ts_to_datetime(row.get("created_at")),
    })
}

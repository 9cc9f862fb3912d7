//! Mood-tracking log entries and the calendar read model.

use crate::sqlite::{db_err, SqliteStore};
use crate::users::ts_to_datetime;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sarathi_core::{Emotion, EmotionLogEntry, Error, MoodLog, NewLogEntry, Result};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::collections::BTreeMap;
use uuid::Uuid;

/// One calendar cell: the day's dominant mood plus everything shown that
/// day. Multiple interactions collapse to one entry — most recent wins,
/// verse ids merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodCalendarEntry {
    pub date: NaiveDate,
    pub emotion: String,
    pub emoji: String,
    pub color: String,
    pub confidence: f32,
    pub verse_ids: Vec<String>,
    pub summary: String,
    pub all_emotions: Vec<Emotion>,
}

#[async_trait]
impl MoodLog for SqliteStore {
    async fn log_interaction(&self, entry: NewLogEntry) -> Result<EmotionLogEntry> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let log_date = now.date_naive();

        let all_emotions = serde_json::to_string(&entry.all_emotions)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        let verse_ids = serde_json::to_string(&entry.verse_ids)
            .map_err(|e| Error::Persistence(e.to_string()))?;

        sqlx::query(
            "INSERT INTO emotion_logs \
             (id, user_id, log_date, user_input, dominant_emotion, emotion_confidence, emotion_emoji, emotion_color, all_emotions, verse_ids, session_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(entry.user_id.to_string())
        .bind(log_date.to_string())
        .bind(&entry.user_input)
        .bind(&entry.dominant.label)
        .bind(entry.dominant.confidence as f64)
        .bind(&entry.dominant.emoji)
        .bind(&entry.dominant.color)
        .bind(&all_emotions)
        .bind(&verse_ids)
        .bind(entry.session_id.map(|s| s.to_string()))
        .bind(now.timestamp())
        .execute(self.pool())
        .await
        .map_err(db_err)?;

        tracing::info!(
            "Logged interaction for user {} with emotion {}",
            entry.user_id,
            entry.dominant.label
        );

        Ok(EmotionLogEntry {
            id,
            user_id: entry.user_id,
            log_date,
            user_input: entry.user_input,
            dominant_emotion: entry.dominant.label,
            emotion_confidence: entry.dominant.confidence,
            emotion_emoji: entry.dominant.emoji,
            emotion_color: entry.dominant.color,
            all_emotions: entry.all_emotions,
            verse_ids: entry.verse_ids,
            session_id: entry.session_id,
            created_at: now,
        })
    }

    async fn entries_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EmotionLogEntry>> {
        let rows = sqlx::query(
            "SELECT id, user_id, log_date, user_input, dominant_emotion, emotion_confidence, emotion_emoji, emotion_color, all_emotions, verse_ids, session_id, created_at \
             FROM emotion_logs \
             WHERE user_id = ? AND log_date >= ? AND log_date <= ? \
             ORDER BY log_date DESC, created_at DESC",
        )
        .bind(user_id.to_string())
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_log_entry).collect()
    }
}

impl SqliteStore {
    /// Mood data for calendar display: one entry per day over the range,
    /// newest first.
    pub async fn mood_calendar(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MoodCalendarEntry>> {
        let logs = self.entries_in_range(user_id, start, end).await?;

        // Logs arrive most-recent-first, so the first sighting of a date
        // fixes that day's emotion; later sightings only contribute verse
        // ids.
        let mut daily: BTreeMap<NaiveDate, MoodCalendarEntry> = BTreeMap::new();
        for log in &logs {
            match daily.get_mut(&log.log_date) {
                None => {
                    daily.insert(
                        log.log_date,
                        MoodCalendarEntry {
                            date: log.log_date,
                            emotion: log.dominant_emotion.clone(),
                            emoji: log.emotion_emoji.clone(),
                            color: log.emotion_color.clone(),
                            confidence: log.emotion_confidence,
                            verse_ids: log.verse_ids.clone(),
                            summary: summarize_input(&log.user_input),
                            all_emotions: log.all_emotions.clone(),
                        },
                    );
                }
                Some(entry) => {
                    for id in &log.verse_ids {
                        if !entry.verse_ids.contains(id) {
                            entry.verse_ids.push(id.clone());
                        }
                    }
                }
            }
        }

        let mut entries: Vec<MoodCalendarEntry> = daily.into_values().collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }
}

/// First 100 characters of the user's input, with an ellipsis when
/// truncated. Counts chars, not bytes, so multi-byte text stays intact.
fn summarize_input(input: &str) -> String {
    let mut chars = input.chars();
    let head: String = chars.by_ref().take(100).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

fn row_to_log_entry(row: &sqlx::sqlite::SqliteRow) -> Result<EmotionLogEntry> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let log_date: String = row.get("log_date");
    let all_emotions: String = row.get("all_emotions");
    let verse_ids: String = row.get("verse_ids");
    let session_id: Option<String> = row.get("session_id");

    Ok(EmotionLogEntry {
        id: Uuid::parse_str(&id).map_err(|e| Error::Database(e.to_string()))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| Error::Database(e.to_string()))?,
        log_date: log_date
            .parse()
            .map_err(|e| Error::Database(format!("bad log_date: {}", e)))?,
        user_input: row.get("user_input"),
        dominant_emotion: row.get("dominant_emotion"),
        emotion_confidence: row.get::<f64, _>("emotion_confidence") as f32,
        emotion_emoji: row.get("emotion_emoji"),
        emotion_color: row.get("emotion_color"),
        all_emotions: serde_json::from_str(&all_emotions).unwrap_or_default(),
        verse_ids: serde_json::from_str(&verse_ids).unwrap_or_default(),
        session_id: session_id.and_then(|s| Uuid::parse_str(&s).ok()),
        created_at: ts_to_datetime(row.get("created_at")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_short_input_unchanged() {
        assert_eq!(summarize_input("hello"), "hello");
    }

    #[test]
    fn test_summarize_long_input_truncates_at_chars() {
        let long = "अ".repeat(150);
        let summary = summarize_input(&long);
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), 103);
    }
}

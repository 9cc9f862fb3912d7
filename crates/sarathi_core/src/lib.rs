pub mod config;
pub mod error;

pub use config::SarathiConfig;
pub use error::{Error, Result};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single detected emotion with display metadata attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emotion {
    pub label: String,
    pub confidence: f32,
    pub emoji: String,
    pub color: String,
}

impl Emotion {
    /// The synthetic neutral entry used whenever detection yields nothing.
    pub fn neutral() -> Self {
        Self {
            label: "neutral".to_string(),
            confidence: 0.5,
            emoji: "😐".to_string(),
            color: "#F3F4F6".to_string(),
        }
    }
}

/// One corpus entry: a verse with its translations and theme tags.
///
/// Immutable reference data — loaded once from the corpus file, never
/// created or mutated by request traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    pub id: String,
    pub chapter: u32,
    pub verse: u32,
    pub shloka: String,
    #[serde(default)]
    pub transliteration: Option<String>,
    pub eng_meaning: String,
    #[serde(default)]
    pub hin_meaning: Option<String>,
    #[serde(default)]
    pub word_meaning: Option<String>,
    #[serde(default)]
    pub themes: Vec<String>,
}

/// A verse paired with its semantic similarity score for a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredVerse {
    #[serde(flatten)]
    pub verse: Verse,
    pub similarity_score: f32,
}

/// The three fixed response styles selectable per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    Socratic,
    Wisdom,
    Story,
}

impl InteractionMode {
    pub const VALID: [&'static str; 3] = ["socratic", "wisdom", "story"];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionMode::Socratic => "socratic",
            InteractionMode::Wisdom => "wisdom",
            InteractionMode::Story => "story",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "socratic" => Ok(InteractionMode::Socratic),
            "wisdom" => Ok(InteractionMode::Wisdom),
            "story" => Ok(InteractionMode::Story),
            other => Err(Error::Validation(format!(
                "Invalid interaction mode '{}'. Must be one of: {:?}",
                other,
                Self::VALID
            ))),
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(Error::Validation(format!(
                "Invalid role '{}'. Must be 'user' or 'assistant'",
                other
            ))),
        }
    }
}

/// A registered user. Created on first successful identity verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Stable identity from the external token verifier.
    pub external_uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub last_active: Option<DateTime<Utc>>,
}

/// One multi-turn dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub interaction_mode: InteractionMode,
    pub summary: Option<String>,
    pub message_count: i64,
}

/// One conversation turn. Sequence numbers are gapless and monotonic
/// per session, starting at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub emotion: Option<Emotion>,
    pub verse_id: Option<String>,
    pub sequence_number: i64,
    pub created_at: DateTime<Utc>,
}

/// The bounded suffix of a conversation used as generation context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    pub session_id: Uuid,
    /// Ordered oldest → newest within the window.
    pub messages: Vec<Message>,
    /// Full message count for the session, regardless of window size.
    pub total_messages: i64,
}

/// One mood-tracking record, written once per orchestrated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionLogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_date: NaiveDate,
    pub user_input: String,
    pub dominant_emotion: String,
    pub emotion_confidence: f32,
    pub emotion_emoji: String,
    pub emotion_color: String,
    pub all_emotions: Vec<Emotion>,
    pub verse_ids: Vec<String>,
    pub session_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for a new mood log entry. The store assigns id, log date and
/// creation timestamp.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub user_id: Uuid,
    pub user_input: String,
    pub dominant: Emotion,
    pub all_emotions: Vec<Emotion>,
    pub verse_ids: Vec<String>,
    pub session_id: Option<Uuid>,
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_session(&self, user_id: Uuid, mode: InteractionMode) -> Result<Session>;

    async fn get_session(&self, session_id: Uuid) -> Result<Session>;

    async fn add_message(
        &self,
        session_id: Uuid,
        role: MessageRole,
        content: &str,
        emotion: Option<&Emotion>,
        verse_id: Option<&str>,
    ) -> Result<Message>;

    async fn get_context(&self, session_id: Uuid, window_size: u32) -> Result<ConversationContext>;

    async fn end_session(&self, session_id: Uuid, summary: Option<&str>) -> Result<Session>;
}

#[async_trait]
pub trait MoodLog: Send + Sync {
    async fn log_interaction(&self, entry: NewLogEntry) -> Result<EmotionLogEntry>;

    /// All entries for a user with `start <= log_date <= end`, most recent
    /// first (by log date, then creation time).
    async fn entries_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EmotionLogEntry>>;
}

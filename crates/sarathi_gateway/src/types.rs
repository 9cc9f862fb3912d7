//! Wire-format request and response bodies.

use chrono::NaiveDate;
use sarathi_core::{Emotion, InteractionMode, MessageRole, ScoredVerse};
use sarathi_pipeline::ChatOutcome;
use sarathi_store::MoodCalendarEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_mode() -> String {
    "wisdom".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequestBody {
    pub user_input: String,
    #[serde(default)]
    pub session_id: Option<Uuid>,
    #[serde(default = "default_mode")]
    pub interaction_mode: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponseBody {
    pub reflection: String,
    pub emotion: Emotion,
    pub verses: Vec<ScoredVerse>,
    pub session_id: Uuid,
    pub interaction_mode: String,
    pub fallback_used: bool,
}

impl From<ChatOutcome> for ChatResponseBody {
    fn from(outcome: ChatOutcome) -> Self {
        Self {
            reflection: outcome.reflection,
            emotion: outcome.emotion,
            verses: outcome.verses,
            session_id: outcome.session_id,
            interaction_mode: outcome.interaction_mode.as_str().to_string(),
            fallback_used: outcome.fallback_used,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default = "default_interaction_mode")]
    pub interaction_mode: InteractionMode,
}

fn default_interaction_mode() -> InteractionMode {
    InteractionMode::Wisdom
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddMessageRequest {
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub emotion: Option<Emotion>,
    #[serde(default)]
    pub verse_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndSessionRequest {
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionIdQuery {
    pub session_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextQuery {
    #[serde(default)]
    pub window_size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoodRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoodMonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoodCalendarResponse {
    pub entries: Vec<MoodCalendarEntry>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeRangeQuery {
    #[serde(default)]
    pub time_range: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

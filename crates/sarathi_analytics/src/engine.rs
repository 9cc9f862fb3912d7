//! The analytics engine: window selection, stats, patterns, and the
//! dashboard summary built on top of them.

use crate::patterns::{identify_patterns, PatternFinding, PatternKind};
use crate::stats::{compute_stats, EmotionStats, TimeRange};
use chrono::{Duration, Utc};
use sarathi_core::{MoodLog, Result};
use sarathi_emotion::detector::emotion_meta;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const POSITIVE_EMOTIONS: [&str; 7] = [
    "joy",
    "gratitude",
    "love",
    "optimism",
    "relief",
    "pride",
    "admiration",
];
const NEGATIVE_EMOTIONS: [&str; 6] = [
    "sadness",
    "anger",
    "fear",
    "nervousness",
    "disappointment",
    "grief",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopEmotion {
    pub emotion: String,
    pub count: u32,
    pub percentage: f32,
    pub emoji: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insights {
    pub overall_mood: String,
    pub trend: String,
    pub recommendations: Vec<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub stats: EmotionStats,
    pub patterns: Vec<PatternFinding>,
    pub insights: Insights,
}

pub struct MoodAnalytics {
    log: Arc<dyn MoodLog>,
}

impl MoodAnalytics {
    pub fn new(log: Arc<dyn MoodLog>) -> Self {
        Self { log }
    }

    pub async fn stats(&self, user_id: Uuid, range: TimeRange) -> Result<EmotionStats> {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(range.days());
        let entries = self.log.entries_in_range(user_id, start, end).await?;
        let stats = compute_stats(&entries, range, start, end);
        tracing::info!(
            "Generated emotion stats for user {}: {} interactions",
            user_id,
            stats.total_interactions
        );
        Ok(stats)
    }

    pub async fn patterns(&self, user_id: Uuid, range: TimeRange) -> Result<Vec<PatternFinding>> {
        let stats = self.stats(user_id, range).await?;
        let patterns = identify_patterns(&stats);
        tracing::info!("Identified {} patterns for user {}", patterns.len(), user_id);
        Ok(patterns)
    }

    /// Top emotions by frequency with display metadata and share of total.
    pub async fn top_emotions(
        &self,
        user_id: Uuid,
        range: TimeRange,
        limit: usize,
    ) -> Result<Vec<TopEmotion>> {
        let stats = self.stats(user_id, range).await?;
        Ok(top_emotions_from(&stats, limit))
    }

    pub async fn summary(&self, user_id: Uuid, range: TimeRange) -> Result<AnalyticsSummary> {
        let stats = self.stats(user_id, range).await?;
        let patterns = identify_patterns(&stats);
        let insights = generate_insights(&stats, &patterns);
        Ok(AnalyticsSummary {
            stats,
            patterns,
            insights,
        })
    }
}

pub fn top_emotions_from(stats: &EmotionStats, limit: usize) -> Vec<TopEmotion> {
    if stats.total_interactions == 0 {
        return Vec::new();
    }

    let mut sorted: Vec<(&String, &u32)> = stats.emotion_counts.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1));

    sorted
        .into_iter()
        .take(limit)
        .map(|(emotion, count)| {
            let (emoji, color) = emotion_meta(emotion);
            TopEmotion {
                emotion: emotion.clone(),
                count: *count,
                percentage: (*count as f32 / stats.total_interactions as f32 * 1000.0).round()
                    / 10.0,
                emoji: emoji.to_string(),
                color: color.to_string(),
            }
        })
        .collect()
}

/// High-level insights derived from stats + patterns.
pub fn generate_insights(stats: &EmotionStats, patterns: &[PatternFinding]) -> Insights {
    let mut insights = Insights {
        overall_mood: "neutral".to_string(),
        trend: "stable".to_string(),
        recommendations: Vec::new(),
        highlights: Vec::new(),
    };

    if stats.total_interactions > 0 {
        let total = stats.total_interactions as f32;
        let positive: u32 = POSITIVE_EMOTIONS
            .iter()
            .map(|e| stats.emotion_counts.get(*e).copied().unwrap_or(0))
            .sum();
        let negative: u32 = NEGATIVE_EMOTIONS
            .iter()
            .map(|e| stats.emotion_counts.get(*e).copied().unwrap_or(0))
            .sum();

        insights.overall_mood = if positive as f32 / total > 0.6 {
            "positive".to_string()
        } else if negative as f32 / total > 0.6 {
            "challenging".to_string()
        } else {
            "balanced".to_string()
        };
    }

    for pattern in patterns.iter().filter(|p| p.kind == PatternKind::Trend) {
        match pattern.trend.as_deref() {
            Some("positive_increase") => insights.trend = "improving".to_string(),
            Some("positive_decrease") => insights.trend = "declining".to_string(),
            _ => {}
        }
    }

    for pattern in patterns.iter().take(3) {
        insights.recommendations.push(pattern.suggestion.clone());
    }

    if let Some((emotion, count)) = stats.emotion_counts.iter().max_by_key(|(_, c)| **c) {
        insights
            .highlights
            .push(format!("Most frequent emotion: {} ({} times)", emotion, count));
    }
    if stats.total_interactions > 0 {
        insights
            .highlights
            .push(format!("Total interactions: {}", stats.total_interactions));
    }
    if let Some(diversity) = patterns.iter().find(|p| p.kind == PatternKind::Diversity) {
        insights.highlights.push(diversity.pattern.clone());
    }

    insights
}

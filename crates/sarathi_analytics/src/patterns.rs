//! Pattern identification over computed stats: four independent detectors,
//! each producing zero or one finding.

use crate::stats::EmotionStats;
use serde::{Deserialize, Serialize};

/// Emotions counted as positive for trend detection.
const POSITIVE_EMOTIONS: [&str; 6] = ["joy", "gratitude", "love", "optimism", "relief", "pride"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Frequency,
    Temporal,
    Trend,
    Diversity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternFinding {
    pub pattern: String,
    #[serde(rename = "type")]
    pub kind: PatternKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diversity_score: Option<f32>,
    pub suggestion: String,
    pub verse_themes: Vec<String>,
}

/// Derive pattern findings purely from stats output. Detector order fixes
/// the relevance ordering of the result.
pub fn identify_patterns(stats: &EmotionStats) -> Vec<PatternFinding> {
    let mut patterns = Vec::new();

    // 1. Frequency — most frequent emotion, only if it occurred ≥ 3 times.
    if let Some((emotion, count)) = stats
        .emotion_counts
        .iter()
        .max_by_key(|(_, c)| **c)
        .map(|(e, c)| (e.clone(), *c))
    {
        if count >= 3 {
            patterns.push(PatternFinding {
                pattern: format!(
                    "Your most frequent emotion is {} ({} times)",
                    emotion, count
                ),
                kind: PatternKind::Frequency,
                emotion: Some(emotion.clone()),
                day: None,
                count: Some(count),
                trend: None,
                diversity_score: None,
                suggestion: emotion_suggestion(&emotion).to_string(),
                verse_themes: verse_themes_for(&emotion),
            });
        }
    }

    // 2. Temporal — weekdays with a repeated (≥ 2) dominant emotion.
    for (day, data) in &stats.daily_averages {
        if data.count >= 2 {
            patterns.push(PatternFinding {
                pattern: format!("You tend to feel {} on {}s", data.most_common_emotion, day),
                kind: PatternKind::Temporal,
                emotion: Some(data.most_common_emotion.clone()),
                day: Some(day.clone()),
                count: Some(data.count),
                trend: None,
                diversity_score: None,
                suggestion: format!(
                    "Consider planning {} activities on {}s",
                    day_suggestion(&data.most_common_emotion),
                    day
                ),
                verse_themes: verse_themes_for(&data.most_common_emotion),
            });
        }
    }

    // 3. Trend — first vs. last 7-day bucket, positive-emotion counts.
    if stats.weekly_trends.len() >= 2 {
        let first = &stats.weekly_trends[0];
        let last = &stats.weekly_trends[stats.weekly_trends.len() - 1];

        if first.total_interactions > 0 && last.total_interactions > 0 {
            let count_positive = |trend: &crate::stats::WeeklyTrend| -> u32 {
                POSITIVE_EMOTIONS
                    .iter()
                    .map(|e| trend.emotions.get(*e).copied().unwrap_or(0))
                    .sum()
            };
            let first_positive = count_positive(first);
            let last_positive = count_positive(last);

            if last_positive > first_positive {
                patterns.push(PatternFinding {
                    pattern: "Your positive emotions have increased over time".to_string(),
                    kind: PatternKind::Trend,
                    emotion: None,
                    day: None,
                    count: None,
                    trend: Some("positive_increase".to_string()),
                    diversity_score: None,
                    suggestion: "Keep up the positive momentum! Continue your spiritual practice"
                        .to_string(),
                    verse_themes: vec!["gratitude".into(), "devotion".into(), "joy".into()],
                });
            } else if first_positive > last_positive && last_positive > 0 {
                patterns.push(PatternFinding {
                    pattern: "You may be experiencing some challenges lately".to_string(),
                    kind: PatternKind::Trend,
                    emotion: None,
                    day: None,
                    count: None,
                    trend: Some("positive_decrease".to_string()),
                    diversity_score: None,
                    suggestion: "Consider focusing on verses about resilience and inner strength"
                        .to_string(),
                    verse_themes: vec!["resilience".into(), "strength".into(), "hope".into()],
                });
            }
        }
    }

    // 4. Diversity — only meaningful with ≥ 5 interactions.
    let unique = stats.emotion_counts.len() as u32;
    if stats.total_interactions >= 5 {
        let score = unique as f32 / stats.total_interactions as f32;
        if unique >= 5 {
            patterns.push(PatternFinding {
                pattern: format!(
                    "You experience a wide range of emotions ({} different emotions)",
                    unique
                ),
                kind: PatternKind::Diversity,
                emotion: None,
                day: None,
                count: None,
                trend: None,
                diversity_score: Some(score),
                suggestion: "Your emotional awareness is developing well. Continue exploring different aspects of your inner life"
                    .to_string(),
                verse_themes: vec!["self_awareness".into(), "emotional_balance".into()],
            });
        } else if unique <= 2 {
            patterns.push(PatternFinding {
                pattern: "You tend to experience similar emotions repeatedly".to_string(),
                kind: PatternKind::Diversity,
                emotion: None,
                day: None,
                count: None,
                trend: None,
                diversity_score: Some(score),
                suggestion: "Consider exploring different situations or perspectives to broaden your emotional experience"
                    .to_string(),
                verse_themes: vec!["growth".into(), "exploration".into(), "balance".into()],
            });
        }
    }

    patterns
}

fn emotion_suggestion(emotion: &str) -> &'static str {
    match emotion {
        "joy" => "Embrace this positive energy and share it with others",
        "gratitude" => "Continue cultivating thankfulness in your daily life",
        "love" => "Let this love guide your actions and relationships",
        "sadness" => "Allow yourself to feel this emotion while seeking wisdom for healing",
        "anger" => "Channel this energy into positive action and self-reflection",
        "fear" => "Face your fears with courage and seek divine guidance",
        "nervousness" => "Practice surrender and trust in the divine plan",
        "confusion" => "Seek clarity through meditation and spiritual study",
        "neutral" => "Use this balanced state to deepen your spiritual practice",
        _ => "Reflect on this emotion and seek wisdom from the Gita",
    }
}

fn day_suggestion(emotion: &str) -> &'static str {
    match emotion {
        "joy" | "gratitude" | "love" | "optimism" => "uplifting and social",
        "sadness" | "fear" | "nervousness" | "grief" => "calming and reflective",
        "anger" | "annoyance" => "physical exercise or creative",
        _ => "mindful and balanced",
    }
}

fn verse_themes_for(emotion: &str) -> Vec<String> {
    let themes: &[&str] = match emotion {
        "joy" => &["gratitude", "devotion", "celebration"],
        "gratitude" => &["thankfulness", "devotion", "appreciation"],
        "love" => &["devotion", "compassion", "unity"],
        "sadness" => &["hope", "resilience", "comfort"],
        "anger" => &["equanimity", "self_control", "forgiveness"],
        "fear" => &["courage", "protection", "faith"],
        "nervousness" => &["surrender", "trust", "peace"],
        "confusion" => &["clarity", "wisdom", "guidance"],
        "neutral" => &["balance", "mindfulness", "awareness"],
        _ => &["wisdom", "guidance"],
    };
    themes.iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{compute_stats, TimeRange};
    use chrono::{Duration, NaiveDate, Utc};
    use sarathi_core::{Emotion, EmotionLogEntry};
    use uuid::Uuid;

    fn log(date: NaiveDate, emotion: &str) -> EmotionLogEntry {
        EmotionLogEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            log_date: date,
            user_input: "input".into(),
            dominant_emotion: emotion.into(),
            emotion_confidence: 0.7,
            emotion_emoji: "😐".into(),
            emotion_color: "#F3F4F6".into(),
            all_emotions: vec![Emotion::neutral()],
            verse_ids: vec![],
            session_id: None,
            created_at: Utc::now(),
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, d).unwrap()
    }

    #[test]
    fn test_two_interactions_suppress_all_patterns() {
        // Frequency needs ≥3 of one emotion, diversity needs ≥5 total,
        // temporal needs a repeated weekday, trend needs two active
        // buckets — none fire here.
        let entries = vec![log(date(1), "joy"), log(date(2), "sadness")];
        let stats = compute_stats(&entries, TimeRange::Month, date(1), date(14));
        let patterns = identify_patterns(&stats);
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_frequency_detector_fires_at_three() {
        let entries = vec![
            log(date(1), "sadness"),
            log(date(2), "sadness"),
            log(date(3), "sadness"),
        ];
        let stats = compute_stats(&entries, TimeRange::Month, date(1), date(7));
        let patterns = identify_patterns(&stats);

        let freq = patterns
            .iter()
            .find(|p| p.kind == PatternKind::Frequency)
            .unwrap();
        assert_eq!(freq.emotion.as_deref(), Some("sadness"));
        assert_eq!(freq.count, Some(3));
        assert!(freq.verse_themes.contains(&"hope".to_string()));
    }

    #[test]
    fn test_temporal_detector_needs_repeat_on_weekday() {
        // July 6 and 13, 2026 are both Mondays.
        let entries = vec![log(date(6), "nervousness"), log(date(13), "nervousness")];
        let stats = compute_stats(&entries, TimeRange::Month, date(1), date(14));
        let patterns = identify_patterns(&stats);

        let temporal = patterns
            .iter()
            .find(|p| p.kind == PatternKind::Temporal)
            .unwrap();
        assert_eq!(temporal.day.as_deref(), Some("Monday"));
        assert!(temporal.pattern.contains("nervousness"));
        assert!(temporal.suggestion.contains("calming and reflective"));
    }

    #[test]
    fn test_trend_improving() {
        // First bucket: one sadness. Last bucket: two joys.
        let entries = vec![
            log(date(1), "sadness"),
            log(date(9), "joy"),
            log(date(10), "joy"),
        ];
        let stats = compute_stats(&entries, TimeRange::Month, date(1), date(14));
        let patterns = identify_patterns(&stats);

        let trend = patterns
            .iter()
            .find(|p| p.kind == PatternKind::Trend)
            .unwrap();
        assert_eq!(trend.trend.as_deref(), Some("positive_increase"));
    }

    #[test]
    fn test_trend_declining_requires_some_positive_remaining() {
        // First bucket: two joys. Last bucket: one joy → declining.
        let entries = vec![
            log(date(1), "joy"),
            log(date(2), "joy"),
            log(date(9), "joy"),
            log(date(10), "sadness"),
        ];
        let stats = compute_stats(&entries, TimeRange::Month, date(1), date(14));
        let patterns = identify_patterns(&stats);

        let trend = patterns
            .iter()
            .find(|p| p.kind == PatternKind::Trend)
            .unwrap();
        assert_eq!(trend.trend.as_deref(), Some("positive_decrease"));
    }

    #[test]
    fn test_diversity_wide_range() {
        let entries = vec![
            log(date(1), "joy"),
            log(date(2), "sadness"),
            log(date(3), "anger"),
            log(date(4), "fear"),
            log(date(5), "gratitude"),
        ];
        let stats = compute_stats(&entries, TimeRange::Month, date(1), date(7));
        let patterns = identify_patterns(&stats);

        let diversity = patterns
            .iter()
            .find(|p| p.kind == PatternKind::Diversity)
            .unwrap();
        assert!(diversity.pattern.contains("wide range"));
        assert!((diversity.diversity_score.unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_diversity_narrow_range() {
        let mut entries = Vec::new();
        for i in 1..=6 {
            entries.push(log(date(i), if i % 2 == 0 { "joy" } else { "sadness" }));
        }
        let stats = compute_stats(&entries, TimeRange::Month, date(1), date(7));
        let patterns = identify_patterns(&stats);

        let diversity = patterns
            .iter()
            .find(|p| p.kind == PatternKind::Diversity)
            .unwrap();
        assert!(diversity.pattern.contains("similar emotions"));
    }

    #[test]
    fn test_weekday_dates_are_real() {
        // Guard for the Monday assumptions above.
        assert_eq!(date(6).format("%A").to_string(), "Monday");
        assert_eq!((date(6) + Duration::days(7)).format("%A").to_string(), "Monday");
    }
}

//! Aggregate mood statistics over rolling time windows.

use chrono::{Duration, NaiveDate};
use sarathi_core::{EmotionLogEntry, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Week,
    Month,
    Quarter,
}

impl TimeRange {
    pub fn days(&self) -> i64 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Quarter => 90,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Quarter => "quarter",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            other => Err(Error::Validation(format!(
                "Invalid time range '{}'. Must be one of: week, month, quarter",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyTrend {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub emotions: BTreeMap<String, u32>,
    pub total_interactions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAverage {
    pub most_common_emotion: String,
    pub count: u32,
    pub total_interactions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionStats {
    pub emotion_counts: BTreeMap<String, u32>,
    pub total_interactions: u32,
    pub time_range: TimeRange,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weekly_trends: Vec<WeeklyTrend>,
    /// Weekday name → most frequent dominant emotion on that weekday.
    pub daily_averages: BTreeMap<String, DailyAverage>,
}

impl EmotionStats {
    pub fn empty(range: TimeRange, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            emotion_counts: BTreeMap::new(),
            total_interactions: 0,
            time_range: range,
            start_date: start,
            end_date: end,
            weekly_trends: Vec::new(),
            daily_averages: BTreeMap::new(),
        }
    }
}

/// Aggregate stats for the entries of one window. A zero-interaction
/// window yields empty structures, not an error.
pub fn compute_stats(
    entries: &[EmotionLogEntry],
    range: TimeRange,
    start: NaiveDate,
    end: NaiveDate,
) -> EmotionStats {
    if entries.is_empty() {
        return EmotionStats::empty(range, start, end);
    }

    let mut emotion_counts: BTreeMap<String, u32> = BTreeMap::new();
    for entry in entries {
        *emotion_counts.entry(entry.dominant_emotion.clone()).or_insert(0) += 1;
    }

    // 7-day buckets walking from start to end, clamped at the window edge.
    let mut weekly_trends = Vec::new();
    let mut current = start;
    while current <= end {
        let week_end = (current + Duration::days(6)).min(end);
        let mut emotions: BTreeMap<String, u32> = BTreeMap::new();
        let mut total = 0u32;
        for entry in entries {
            if entry.log_date >= current && entry.log_date <= week_end {
                *emotions.entry(entry.dominant_emotion.clone()).or_insert(0) += 1;
                total += 1;
            }
        }
        weekly_trends.push(WeeklyTrend {
            week_start: current,
            week_end,
            emotions,
            total_interactions: total,
        });
        current = week_end + Duration::days(1);
    }

    // Per weekday name: the most frequent dominant emotion and its count.
    let mut by_weekday: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for entry in entries {
        let day = entry.log_date.format("%A").to_string();
        by_weekday
            .entry(day)
            .or_default()
            .push(&entry.dominant_emotion);
    }

    let mut daily_averages = BTreeMap::new();
    for (day, emotions) in by_weekday {
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for e in &emotions {
            *counts.entry(e).or_insert(0) += 1;
        }
        if let Some((emotion, count)) = counts.into_iter().max_by_key(|(_, c)| *c) {
            daily_averages.insert(
                day,
                DailyAverage {
                    most_common_emotion: emotion.to_string(),
                    count,
                    total_interactions: emotions.len() as u32,
                },
            );
        }
    }

    EmotionStats {
        emotion_counts,
        total_interactions: entries.len() as u32,
        time_range: range,
        start_date: start,
        end_date: end,
        weekly_trends,
        daily_averages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sarathi_core::Emotion;
    use uuid::Uuid;

    pub(crate) fn log(date: NaiveDate, emotion: &str) -> EmotionLogEntry {
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

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_window_yields_empty_stats() {
        let stats = compute_stats(&[], TimeRange::Week, date(2026, 8, 1), date(2026, 8, 7));
        assert_eq!(stats.total_interactions, 0);
        assert!(stats.emotion_counts.is_empty());
        assert!(stats.weekly_trends.is_empty());
        assert!(stats.daily_averages.is_empty());
    }

    #[test]
    fn test_counts_and_buckets() {
        let entries = vec![
            log(date(2026, 8, 1), "joy"),
            log(date(2026, 8, 2), "joy"),
            log(date(2026, 8, 9), "sadness"),
        ];
        let stats = compute_stats(&entries, TimeRange::Month, date(2026, 8, 1), date(2026, 8, 14));

        assert_eq!(stats.total_interactions, 3);
        assert_eq!(stats.emotion_counts["joy"], 2);
        assert_eq!(stats.emotion_counts["sadness"], 1);

        // Two 7-day buckets: Aug 1-7, Aug 8-14.
        assert_eq!(stats.weekly_trends.len(), 2);
        assert_eq!(stats.weekly_trends[0].total_interactions, 2);
        assert_eq!(stats.weekly_trends[1].total_interactions, 1);
        assert_eq!(stats.weekly_trends[1].emotions["sadness"], 1);
    }

    #[test]
    fn test_last_bucket_clamped_to_window_end() {
        let entries = vec![log(date(2026, 8, 10), "joy")];
        let stats = compute_stats(&entries, TimeRange::Week, date(2026, 8, 5), date(2026, 8, 10));
        assert_eq!(stats.weekly_trends.len(), 1);
        assert_eq!(stats.weekly_trends[0].week_end, date(2026, 8, 10));
    }

    #[test]
    fn test_daily_averages_pick_most_common() {
        // 2026-08-03 and 2026-08-10 are both Mondays.
        let entries = vec![
            log(date(2026, 8, 3), "sadness"),
            log(date(2026, 8, 10), "sadness"),
            log(date(2026, 8, 4), "joy"),
        ];
        let stats = compute_stats(&entries, TimeRange::Month, date(2026, 8, 1), date(2026, 8, 14));

        let monday = &stats.daily_averages["Monday"];
        assert_eq!(monday.most_common_emotion, "sadness");
        assert_eq!(monday.count, 2);
        assert_eq!(monday.total_interactions, 2);
        assert_eq!(stats.daily_averages["Tuesday"].most_common_emotion, "joy");
    }

    #[test]
    fn test_time_range_parse() {
        assert_eq!(TimeRange::parse("week").unwrap(), TimeRange::Week);
        assert_eq!(TimeRange::parse("quarter").unwrap().days(), 90);
        assert!(TimeRange::parse("year").is_err());
    }
}

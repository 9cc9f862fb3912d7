pub mod engine;
pub mod patterns;
pub mod stats;

pub use engine::{AnalyticsSummary, Insights, MoodAnalytics, TopEmotion};
pub use patterns::{identify_patterns, PatternFinding, PatternKind};
pub use stats::{compute_stats, DailyAverage, EmotionStats, TimeRange, WeeklyTrend};

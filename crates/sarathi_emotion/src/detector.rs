//! The emotion detection adapter: thresholding, display metadata, and the
//! neutral fallback that makes detection total.

use crate::model::EmotionModel;
use sarathi_core::Emotion;
use std::sync::Arc;

/// Display metadata for every label the upstream classifier can emit.
/// Unknown labels get the generic neutral glyph.
const EMOTION_META: &[(&str, &str, &str)] = &[
    // Positive
    ("joy", "😊", "#FEF3C7"),
    ("admiration", "🤩", "#FEF3C7"),
    ("approval", "👍", "#D1FAE5"),
    ("gratitude", "🙏", "#FEF3C7"),
    ("love", "❤️", "#FECACA"),
    ("optimism", "😊", "#D1FAE5"),
    ("caring", "🤗", "#D1FAE5"),
    ("excitement", "🎉", "#FEF3C7"),
    ("amusement", "😄", "#FEF3C7"),
    ("pride", "😌", "#FEF3C7"),
    ("relief", "😌", "#D1FAE5"),
    // Ambiguous
    ("desire", "🤔", "#E0E7FF"),
    ("realization", "💡", "#FEF3C7"),
    ("curiosity", "🤔", "#E0E7FF"),
    ("neutral", "😐", "#F3F4F6"),
    // Sadness family
    ("sadness", "😢", "#DBEAFE"),
    ("disappointment", "😞", "#DBEAFE"),
    ("grief", "😭", "#DBEAFE"),
    ("remorse", "😔", "#DBEAFE"),
    ("embarrassment", "😳", "#FEE2E2"),
    // Anger family
    ("anger", "😠", "#FEE2E2"),
    ("annoyance", "😒", "#FEE2E2"),
    ("disapproval", "👎", "#FEE2E2"),
    ("disgust", "🤢", "#FEE2E2"),
    // Fear family
    ("fear", "😰", "#EDE9FE"),
    ("nervousness", "😰", "#E0E7FF"),
    // Confusion
    ("confusion", "😕", "#F3F4F6"),
    ("surprise", "😲", "#E0E7FF"),
];

/// Look up (emoji, color) for a label.
pub fn emotion_meta(label: &str) -> (&'static str, &'static str) {
    EMOTION_META
        .iter()
        .find(|(l, _, _)| *l == label)
        .map(|(_, emoji, color)| (*emoji, *color))
        .unwrap_or(("😐", "#F3F4F6"))
}

/// Wraps a black-box [`EmotionModel`] and guarantees a non-empty,
/// well-formed result for any input. Classifier errors are absorbed into
/// the neutral fallback, not propagated.
#[derive(Clone)]
pub struct EmotionDetector {
    model: Arc<dyn EmotionModel>,
}

impl EmotionDetector {
    pub fn new(model: Arc<dyn EmotionModel>) -> Self {
        Self { model }
    }

    /// Detect emotions above `threshold`, sorted descending by confidence.
    /// Always returns at least one entry.
    pub async fn detect(&self, text: &str, threshold: f32) -> Vec<Emotion> {
        let raw = match self.model.classify(text).await {
            Ok(scores) => scores,
            Err(e) => {
                tracing::warn!("Emotion classification failed, using neutral fallback: {}", e);
                return vec![Emotion::neutral()];
            }
        };

        let mut emotions: Vec<Emotion> = raw
            .into_iter()
            .filter(|(_, score)| *score >= threshold)
            .map(|(label, score)| {
                let (emoji, color) = emotion_meta(&label);
                Emotion {
                    label,
                    confidence: score.clamp(0.0, 1.0),
                    emoji: emoji.to_string(),
                    color: color.to_string(),
                }
            })
            .collect();

        emotions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if emotions.is_empty() {
            emotions.push(Emotion::neutral());
        }
        emotions
    }

    /// The highest-confidence entry, or the synthetic neutral one if the
    /// list is empty.
    pub fn dominant(emotions: &[Emotion]) -> Emotion {
        emotions.first().cloned().unwrap_or_else(Emotion::neutral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedModel(Vec<(String, f32)>);

    #[async_trait]
    impl crate::model::EmotionModel for FixedModel {
        async fn classify(&self, _text: &str) -> anyhow::Result<Vec<(String, f32)>> {
            Ok(self.0.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl crate::model::EmotionModel for FailingModel {
        async fn classify(&self, _text: &str) -> anyhow::Result<Vec<(String, f32)>> {
            anyhow::bail!("classifier offline")
        }
    }

    #[tokio::test]
    async fn test_threshold_and_sort() {
        let model = Arc::new(FixedModel(vec![
            ("joy".into(), 0.45),
            ("gratitude".into(), 0.92),
            ("sadness".into(), 0.1),
        ]));
        let detector = EmotionDetector::new(model);
        let emotions = detector.detect("thanks", 0.3).await;

        assert_eq!(emotions.len(), 2);
        assert_eq!(emotions[0].label, "gratitude");
        assert_eq!(emotions[0].emoji, "🙏");
        assert_eq!(emotions[1].label, "joy");
    }

    #[tokio::test]
    async fn test_nothing_clears_threshold_gives_neutral() {
        let model = Arc::new(FixedModel(vec![("joy".into(), 0.05)]));
        let detector = EmotionDetector::new(model);
        let emotions = detector.detect("meh", 0.3).await;

        assert_eq!(emotions.len(), 1);
        assert_eq!(emotions[0].label, "neutral");
        assert!((emotions[0].confidence - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_classifier_error_gives_neutral() {
        let detector = EmotionDetector::new(Arc::new(FailingModel));
        let emotions = detector.detect("anything", 0.3).await;
        assert_eq!(emotions.len(), 1);
        assert_eq!(emotions[0].label, "neutral");
    }

    #[tokio::test]
    async fn test_unknown_label_gets_neutral_glyph() {
        let model = Arc::new(FixedModel(vec![("serendipity".into(), 0.8)]));
        let detector = EmotionDetector::new(model);
        let emotions = detector.detect("x", 0.3).await;
        assert_eq!(emotions[0].emoji, "😐");
        assert_eq!(emotions[0].color, "#F3F4F6");
    }

    #[tokio::test]
    async fn test_confidence_clamped() {
        let model = Arc::new(FixedModel(vec![("joy".into(), 1.7)]));
        let detector = EmotionDetector::new(model);
        let emotions = detector.detect("x", 0.3).await;
        assert!(emotions[0].confidence <= 1.0);
    }

    #[test]
    fn test_dominant_of_empty_is_neutral() {
        let d = EmotionDetector::dominant(&[]);
        assert_eq!(d.label, "neutral");
    }
}

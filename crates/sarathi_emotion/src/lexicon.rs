//! Keyword-based emotion classifier over the GoEmotions label set.
//!
//! Scores each label by keyword hits in the input text. A proper ML model
//! implements the same [`EmotionModel`] trait; this one keeps the crate
//! self-contained and deterministic.

use crate::model::EmotionModel;
use async_trait::async_trait;

/// Keyword table: label → trigger words. Matching is case-insensitive
/// substring containment.
const LEXICON: &[(&str, &[&str])] = &[
    ("joy", &["happy", "joy", "wonderful", "delighted", "great day"]),
    ("gratitude", &["grateful", "thankful", "thank you", "appreciate"]),
    ("love", &["love", "adore", "cherish", "dear to me"]),
    ("optimism", &["hopeful", "optimistic", "looking forward", "better days"]),
    ("excitement", &["excited", "thrilled", "can't wait", "pumped"]),
    ("amusement", &["funny", "hilarious", "amusing", "laughed"]),
    ("pride", &["proud", "accomplished", "achievement"]),
    ("relief", &["relieved", "relief", "finally over", "weight off"]),
    ("admiration", &["admire", "impressive", "amazing", "inspiring"]),
    ("approval", &["agree", "well done", "good job", "approve"]),
    ("caring", &["care about", "worried for", "looking after", "support them"]),
    ("sadness", &["sad", "unhappy", "down", "crying", "miserable", "lonely"]),
    ("disappointment", &["disappointed", "let down", "expected more"]),
    ("grief", &["grief", "mourning", "passed away", "loss of", "died"]),
    ("remorse", &["regret", "sorry for", "my fault", "shouldn't have"]),
    ("embarrassment", &["embarrassed", "humiliated", "awkward"]),
    ("anger", &["angry", "furious", "rage", "hate", "mad at"]),
    ("annoyance", &["annoyed", "irritated", "bothering", "frustrating"]),
    ("disapproval", &["disapprove", "wrong of", "shouldn't be"]),
    ("disgust", &["disgusted", "gross", "revolting"]),
    ("fear", &["afraid", "scared", "terrified", "frightened", "fear"]),
    ("nervousness", &["anxious", "nervous", "worried", "anxiety", "overwhelmed", "stress"]),
    ("confusion", &["confused", "lost", "don't understand", "unclear", "torn"]),
    ("curiosity", &["curious", "wondering", "what if", "interested in"]),
    ("surprise", &["surprised", "shocked", "unexpected", "can't believe"]),
    ("desire", &["wish", "longing", "crave", "yearn"]),
    ("realization", &["realized", "it dawned", "now i see", "understand now"]),
];

/// Intensity markers bump every matched label's score.
const INTENSIFIERS: &[&str] = &["very", "so ", "really", "extremely", "!"];

#[derive(Debug, Clone, Default)]
pub struct LexiconModel;

impl LexiconModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmotionModel for LexiconModel {
    async fn classify(&self, text: &str) -> anyhow::Result<Vec<(String, f32)>> {
        let lower = text.to_lowercase();
        let intense = INTENSIFIERS.iter().any(|w| lower.contains(w));

        let mut scores = Vec::new();
        for (label, keywords) in LEXICON {
            let hits = keywords.iter().filter(|k| lower.contains(*k)).count() as f32;
            if hits > 0.0 {
                // Saturating score: one hit → 0.5, each further hit closes
                // half the remaining distance to 1.0.
                let mut score = hits / (hits + 1.0);
                if intense {
                    score = (score + 0.1).min(0.95);
                }
                scores.push((label.to_string(), score));
            }
        }
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_anxious_text_scores_nervousness() {
        let model = LexiconModel::new();
        let scores = model
            .classify("I feel anxious about my exam")
            .await
            .unwrap();
        let nervous = scores.iter().find(|(l, _)| l == "nervousness");
        assert!(nervous.is_some());
        assert!(nervous.unwrap().1 >= 0.5);
    }

    #[tokio::test]
    async fn test_no_keywords_yields_empty() {
        let model = LexiconModel::new();
        let scores = model.classify("the sky is blue today").await.unwrap();
        assert!(scores.is_empty());
    }

    #[tokio::test]
    async fn test_intensifier_raises_score() {
        let model = LexiconModel::new();
        let plain = model.classify("I am sad").await.unwrap();
        let strong = model.classify("I am very sad").await.unwrap();
        let p = plain.iter().find(|(l, _)| l == "sadness").unwrap().1;
        let s = strong.iter().find(|(l, _)| l == "sadness").unwrap().1;
        assert!(s > p);
    }

    #[tokio::test]
    async fn test_scores_bounded() {
        let model = LexiconModel::new();
        let scores = model
            .classify("I am very sad, unhappy, down, crying, miserable and lonely!")
            .await
            .unwrap();
        for (_, s) in scores {
            assert!((0.0..=1.0).contains(&s));
        }
    }
}

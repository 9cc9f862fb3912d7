//! The retrieval adapter: query → ranked verses, with a pluggable
//! re-ranking step keyed by the detected emotion.

use crate::corpus::Corpus;
use crate::index::VectorIndex;
use sarathi_core::ScoredVerse;
use std::sync::Arc;

/// Verse themes associated with each emotion, used by theme-aligned
/// re-ranking and the analytics suggestion tables.
pub const EMOTION_THEMES: &[(&str, &[&str])] = &[
    ("nervousness", &["surrender", "faith", "detachment"]),
    ("fear", &["courage", "protection", "divine_support"]),
    ("confusion", &["clarity", "wisdom", "guidance"]),
    ("curiosity", &["knowledge", "learning", "understanding"]),
    ("anger", &["equanimity", "self-control", "forgiveness"]),
    ("annoyance", &["patience", "tolerance", "peace"]),
    ("disapproval", &["acceptance", "understanding", "compassion"]),
    ("disgust", &["purity", "detachment", "equanimity"]),
    ("sadness", &["hope", "resilience", "purpose"]),
    ("grief", &["acceptance", "impermanence", "strength"]),
    ("disappointment", &["detachment", "perseverance", "faith"]),
    ("remorse", &["forgiveness", "learning", "growth"]),
    ("embarrassment", &["self-acceptance", "humility", "growth"]),
    ("joy", &["gratitude", "devotion", "celebration"]),
    ("gratitude", &["devotion", "humility", "appreciation"]),
    ("love", &["devotion", "compassion", "unity"]),
    ("admiration", &["respect", "learning", "inspiration"]),
    ("pride", &["humility", "service", "dharma"]),
    ("excitement", &["enthusiasm", "action", "purpose"]),
    ("amusement", &["joy", "lightness", "balance"]),
    ("relief", &["peace", "surrender", "trust"]),
    ("optimism", &["hope", "faith", "perseverance"]),
    ("caring", &["compassion", "service", "love"]),
    ("approval", &["acceptance", "harmony", "peace"]),
    ("desire", &["detachment", "contentment", "wisdom"]),
    ("realization", &["knowledge", "awakening", "truth"]),
    ("surprise", &["acceptance", "adaptability", "learning"]),
];

pub fn themes_for_emotion(emotion: &str) -> &'static [&'static str] {
    EMOTION_THEMES
        .iter()
        .find(|(e, _)| *e == emotion)
        .map(|(_, themes)| *themes)
        .unwrap_or(&[])
}

/// Strategy applied to the over-fetched candidate set before truncation.
pub trait RerankStrategy: Send + Sync {
    fn rerank(&self, verses: &mut Vec<ScoredVerse>, emotion: &str);
}

/// Reference behavior: order purely by similarity score.
pub struct ScoreOrder;

impl RerankStrategy for ScoreOrder {
    fn rerank(&self, verses: &mut Vec<ScoredVerse>, _emotion: &str) {
        verses.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

/// Boosts verses whose theme tags overlap the themes of the detected
/// emotion, then orders by the adjusted score.
pub struct ThemeAlignment {
    /// Added per query for any theme overlap.
    pub boost: f32,
}

impl Default for ThemeAlignment {
    fn default() -> Self {
        Self { boost: 0.1 }
    }
}

impl RerankStrategy for ThemeAlignment {
    fn rerank(&self, verses: &mut Vec<ScoredVerse>, emotion: &str) {
        let themes = themes_for_emotion(emotion);
        let adjusted = |v: &ScoredVerse| {
            let aligned = v.verse.themes.iter().any(|t| themes.contains(&t.as_str()));
            v.similarity_score + if aligned { self.boost } else { 0.0 }
        };
        verses.sort_by(|a, b| {
            adjusted(b)
                .partial_cmp(&adjusted(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

/// Wraps the black-box [`VectorIndex`]. Backend errors degrade to an empty
/// result; the caller substitutes a fixed default verse so the pipeline
/// never surfaces zero verses.
pub struct VerseRetriever {
    index: Arc<dyn VectorIndex>,
    corpus: Arc<Corpus>,
    strategy: Box<dyn RerankStrategy>,
}

impl VerseRetriever {
    pub fn new(index: Arc<dyn VectorIndex>, corpus: Arc<Corpus>) -> Self {
        Self {
            index,
            corpus,
            strategy: Box::new(ScoreOrder),
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn RerankStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Search for verses semantically close to `query`. When `emotion` is
    /// supplied, fetch twice as many candidates and re-rank before
    /// truncating to `top_k`. Scores are `1 − distance`.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        emotion: Option<&str>,
    ) -> Vec<ScoredVerse> {
        let fetch_k = if emotion.is_some() { top_k * 2 } else { top_k };

        let hits = match self.index.query(query, fetch_k).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("Vector index query failed: {}", e);
                return Vec::new();
            }
        };

        let mut verses: Vec<ScoredVerse> = hits
            .into_iter()
            .filter_map(|(id, distance)| {
                self.corpus.get(&id).map(|verse| ScoredVerse {
                    verse: verse.clone(),
                    similarity_score: 1.0 - distance,
                })
            })
            .collect();

        if let Some(emotion) = emotion {
            self.strategy.rerank(&mut verses, emotion);
        }
        verses.truncate(top_k);
        verses
    }

    /// Lookup by id against the in-memory corpus. Absent ids are `None`,
    /// not an error; callers may chain the relational repository.
    pub fn get_by_id(&self, id: &str) -> Option<sarathi_core::Verse> {
        self.corpus.get(id).cloned()
    }
}

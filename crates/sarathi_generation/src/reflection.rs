//! The generation adapter: prompt building, backend invocation, and the
//! deterministic template fallback.

use crate::llm::{CompletionParams, LlmClient};
use crate::prompts;
use sarathi_core::{Emotion, Error, InteractionMode, Message, Result, ScoredVerse};

pub struct ReflectionGenerator {
    client: Box<dyn LlmClient>,
    params: CompletionParams,
}

impl ReflectionGenerator {
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self {
            client,
            params: CompletionParams::default(),
        }
    }

    pub fn with_params(mut self, params: CompletionParams) -> Self {
        self.params = params;
        self
    }

    /// Generate a reflection for the chosen mode. Requires at least one
    /// candidate verse — that is an input-validation failure, distinct from
    /// a backend failure, which propagates as [`Error::Upstream`] for the
    /// caller to handle with an explicit fallback.
    pub async fn generate(
        &self,
        user_input: &str,
        emotion: &Emotion,
        verses: &[ScoredVerse],
        mode: InteractionMode,
        history: &[Message],
    ) -> Result<String> {
        if verses.is_empty() {
            return Err(Error::Validation(
                "At least one verse is required for reflection generation".to_string(),
            ));
        }

        let prompt = prompts::build_prompt(mode, user_input, emotion, verses, history);
        let text = self
            .client
            .complete(&prompt, self.params.clone())
            .await
            .map_err(|e| Error::Upstream(format!("generation backend: {}", e)))?;

        Ok(text.trim().to_string())
    }

    /// Deterministic template over the top candidate verse. No generative
    /// call; invoked deliberately by the caller when `generate` fails.
    pub fn generate_fallback(
        &self,
        _user_input: &str,
        emotion: &Emotion,
        verses: &[ScoredVerse],
    ) -> String {
        let Some(top) = verses.first() else {
            return "I understand you're seeking guidance. While I'm having \
                    technical difficulties, please know that every challenge \
                    is an opportunity for growth and self-reflection."
                .to_string();
        };

        format!(
            "I sense you're feeling {emotion}, and I want you to know that your feelings are valid.\n\n\
             **Verse {chapter}.{verse}:**\n\n\
             Sanskrit: {shloka}\n\n\
             English: {meaning}\n\n\
             This ancient wisdom reminds us that all emotions are temporary and \
             serve as teachers on our spiritual journey. The Bhagavad Gita \
             teaches us to observe our feelings with compassion while staying \
             connected to our deeper purpose.\n\n\
             Take a moment to breathe deeply and reflect on how this verse \
             might offer guidance for your current situation.",
            emotion = emotion.label,
            chapter = top.verse.chapter,
            verse = top.verse.verse,
            shloka = top.verse.shloka,
            meaning = top.verse.eng_meaning,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;
    use anyhow::Result as AnyResult;
    use async_trait::async_trait;
    use sarathi_core::Verse;

    struct BrokenClient;

    #[async_trait]
    impl LlmClient for BrokenClient {
        async fn complete(&self, _prompt: &str, _params: CompletionParams) -> AnyResult<String> {
            anyhow::bail!("backend unreachable")
        }
    }

    fn scored() -> ScoredVerse {
        ScoredVerse {
            verse: Verse {
                id: "BG2.47".into(),
                chapter: 2,
                verse: 47,
                shloka: "कर्मण्येवाधिकारस्ते".into(),
                transliteration: None,
                eng_meaning: "You have a right to perform your duty".into(),
                hin_meaning: None,
                word_meaning: None,
                themes: vec![],
            },
            similarity_score: 0.9,
        }
    }

    #[tokio::test]
    async fn test_generate_with_mock_provider() {
        let gen = ReflectionGenerator::new(Box::new(MockProvider::new("test")));
        let text = gen
            .generate(
                "I feel lost",
                &Emotion::neutral(),
                &[scored()],
                InteractionMode::Wisdom,
                &[],
            )
            .await
            .unwrap();
        assert!(!text.is_empty());
    }

    #[tokio::test]
    async fn test_empty_verses_is_validation_error() {
        let gen = ReflectionGenerator::new(Box::new(MockProvider::new("test")));
        let err = gen
            .generate(
                "I feel lost",
                &Emotion::neutral(),
                &[],
                InteractionMode::Wisdom,
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates_as_upstream() {
        let gen = ReflectionGenerator::new(Box::new(BrokenClient));
        let err = gen
            .generate(
                "I feel lost",
                &Emotion::neutral(),
                &[scored()],
                InteractionMode::Socratic,
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[test]
    fn test_fallback_reproduces_top_verse_verbatim() {
        let gen = ReflectionGenerator::new(Box::new(MockProvider::new("test")));
        let emotion = Emotion {
            label: "sadness".into(),
            confidence: 0.8,
            emoji: "😢".into(),
            color: "#DBEAFE".into(),
        };
        let text = gen.generate_fallback("I am sad", &emotion, &[scored()]);
        assert!(text.contains("sadness"));
        assert!(text.contains("**Verse 2.47:**"));
        assert!(text.contains("कर्मण्येवाधिकारस्ते"));
        assert!(text.contains("You have a right to perform your duty"));
    }

    #[test]
    fn test_fallback_without_verses_still_replies() {
        let gen = ReflectionGenerator::new(Box::new(MockProvider::new("test")));
        let text = gen.generate_fallback("help", &Emotion::neutral(), &[]);
        assert!(text.contains("seeking guidance"));
    }
}

//! The pipeline controller: strictly sequential stages, each with its own
//! fallback policy. Only input validation rejects a request — every
//! downstream dependency failure degrades and is surfaced via
//! `fallback_used` plus the stage report.

use crate::stage::{PipelineReport, Stage, StageStatus};
use sarathi_core::{
    ConversationStore, Emotion, Error, InteractionMode, Message, MessageRole, MoodLog,
    NewLogEntry, Result, ScoredVerse,
};
use sarathi_emotion::EmotionDetector;
use sarathi_generation::ReflectionGenerator;
use sarathi_retrieval::{default_fallback_verse, VerseRetriever};
use std::sync::Arc;
use uuid::Uuid;

const MAX_INPUT_CHARS: usize = 5000;
const CONTEXT_WINDOW: u32 = 10;

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub user_input: String,
    pub session_id: Option<Uuid>,
    pub interaction_mode: String,
}

#[derive(Debug)]
pub struct ChatOutcome {
    pub reflection: String,
    pub emotion: Emotion,
    pub verses: Vec<ScoredVerse>,
    pub session_id: Uuid,
    pub interaction_mode: InteractionMode,
    pub fallback_used: bool,
    pub report: PipelineReport,
}

/// All collaborators are injected at construction; the pipeline holds no
/// global state.
pub struct ChatPipeline {
    detector: EmotionDetector,
    retriever: Arc<VerseRetriever>,
    generator: Arc<ReflectionGenerator>,
    store: Arc<dyn ConversationStore>,
    mood_log: Arc<dyn MoodLog>,
    emotion_threshold: f32,
    top_k: usize,
}

impl ChatPipeline {
    pub fn new(
        detector: EmotionDetector,
        retriever: Arc<VerseRetriever>,
        generator: Arc<ReflectionGenerator>,
        store: Arc<dyn ConversationStore>,
        mood_log: Arc<dyn MoodLog>,
    ) -> Self {
        Self {
            detector,
            retriever,
            generator,
            store,
            mood_log,
            emotion_threshold: 0.3,
            top_k: 3,
        }
    }

    pub fn with_emotion_threshold(mut self, threshold: f32) -> Self {
        self.emotion_threshold = threshold;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Run the full pipeline for one request. Returns `Err` only for
    /// validation failures; everything else degrades into the outcome.
    pub async fn process(&self, user_id: Uuid, request: &ChatRequest) -> Result<ChatOutcome> {
        // Stage 1: validation — the only request-rejecting stage.
        let mode = InteractionMode::parse(&request.interaction_mode)?;
        let char_count = request.user_input.chars().count();
        if char_count == 0 || char_count > MAX_INPUT_CHARS {
            return Err(Error::Validation(format!(
                "user_input must be between 1 and {} characters, got {}",
                MAX_INPUT_CHARS, char_count
            )));
        }

        let mut report = PipelineReport::default();
        let mut fallback_used = false;

        tracing::info!(
            "Processing chat request for user {}, session {:?}",
            user_id,
            request.session_id
        );

        // Stage 2: emotion — the adapter self-heals to neutral.
        let all_emotions = self
            .detector
            .detect(&request.user_input, self.emotion_threshold)
            .await;
        let emotion = EmotionDetector::dominant(&all_emotions);
        report.record(Stage::Emotion, StageStatus::Ok);
        tracing::info!(
            "Detected emotion: {} (confidence: {:.2})",
            emotion.label,
            emotion.confidence
        );

        // Stage 3: retrieval — empty results substitute the fixed default
        // verse so the user never sees zero verses.
        let mut verses = self
            .retriever
            .search(&request.user_input, self.top_k, Some(&emotion.label))
            .await;
        if verses.is_empty() {
            fallback_used = true;
            report.record(
                Stage::Retrieval,
                StageStatus::Degraded("no verses retrieved; default substituted".into()),
            );
            verses = vec![ScoredVerse {
                verse: default_fallback_verse(),
                similarity_score: 0.5,
            }];
        } else {
            report.record(Stage::Retrieval, StageStatus::Ok);
        }

        // Stage 4: session resolution — reuse with context, or create.
        // Any error yields a throwaway session id and empty history.
        let (session_id, history, session_ok) =
            match self.resolve_session(user_id, request, mode).await {
                Ok((session_id, history)) => {
                    report.record(Stage::Session, StageStatus::Ok);
                    (session_id, history, true)
                }
                Err(e) => {
                    fallback_used = true;
                    report.record(Stage::Session, StageStatus::Degraded(e.to_string()));
                    (Uuid::new_v4(), Vec::new(), false)
                }
            };

        // Stage 5: generation, downgrading to the deterministic template.
        let reflection = match self
            .generator
            .generate(&request.user_input, &emotion, &verses, mode, &history)
            .await
        {
            Ok(text) => {
                report.record(Stage::Generation, StageStatus::Ok);
                text
            }
            Err(e) => {
                fallback_used = true;
                report.record(Stage::Generation, StageStatus::Degraded(e.to_string()));
                self.generator
                    .generate_fallback(&request.user_input, &emotion, &verses)
            }
        };

        // Stages 6-8: secondary writes. Failures are logged and skipped —
        // availability of the response wins over durability here.
        let user_turn = self
            .store
            .add_message(
                session_id,
                MessageRole::User,
                &request.user_input,
                Some(&emotion),
                None,
            )
            .await;
        report.record(
            Stage::PersistUserTurn,
            match user_turn {
                Ok(_) => StageStatus::Ok,
                Err(e) => StageStatus::Failed(e.to_string()),
            },
        );

        let assistant_turn = self
            .store
            .add_message(
                session_id,
                MessageRole::Assistant,
                &reflection,
                None,
                verses.first().map(|v| v.verse.id.as_str()),
            )
            .await;
        report.record(
            Stage::PersistAssistantTurn,
            match assistant_turn {
                Ok(_) => StageStatus::Ok,
                Err(e) => StageStatus::Failed(e.to_string()),
            },
        );

        let logged = self
            .mood_log
            .log_interaction(NewLogEntry {
                user_id,
                user_input: request.user_input.clone(),
                dominant: emotion.clone(),
                all_emotions,
                verse_ids: verses.iter().map(|v| v.verse.id.clone()).collect(),
                // A throwaway session id must not reach the log; the link
                // is optional.
                session_id: session_ok.then_some(session_id),
            })
            .await;
        report.record(
            Stage::MoodLog,
            match logged {
                Ok(_) => StageStatus::Ok,
                Err(e) => StageStatus::Failed(e.to_string()),
            },
        );

        tracing::info!(
            "Chat request completed (fallback_used: {})",
            fallback_used
        );

        Ok(ChatOutcome {
            reflection,
            emotion,
            verses,
            session_id,
            interaction_mode: mode,
            fallback_used,
            report,
        })
    }

    /// Reuse the requested session (loading its context window) or create
    /// a new one. The per-request mode drives generation either way; an
    /// existing session keeps its stored mode as historical record.
    async fn resolve_session(
        &self,
        user_id: Uuid,
        request: &ChatRequest,
        mode: InteractionMode,
    ) -> Result<(Uuid, Vec<Message>)> {
        match request.session_id {
            Some(session_id) => {
                let context = self.store.get_context(session_id, CONTEXT_WINDOW).await?;
                tracing::info!(
                    "Retrieved context: {} messages for session {}",
                    context.messages.len(),
                    session_id
                );
                Ok((session_id, context.messages))
            }
            None => {
                let session = self.store.create_session(user_id, mode).await?;
                tracing::info!("Created new session: {}", session.id);
                Ok((session.id, Vec::new()))
            }
        }
    }

    /// The fixed payload for catastrophic failure, used by the HTTP layer
    /// when even the degraded pipeline cannot produce an outcome.
    pub fn apology_outcome(request_session: Option<Uuid>, mode: InteractionMode) -> ChatOutcome {
        let verse = default_fallback_verse();
        let reflection = format!(
            "I'm here to provide guidance from the Bhagavad Gita. Here's a fundamental teaching:\n\n\
             **Verse {}.{}:**\n\n\
             Sanskrit: {}\n\n\
             English: {}\n\n\
             This verse reminds us to focus on our actions rather than worrying \
             about outcomes. Whatever you're facing, remember that you have the \
             power to choose your response.",
            verse.chapter, verse.verse, verse.shloka, verse.eng_meaning
        );
        ChatOutcome {
            reflection,
            emotion: Emotion::neutral(),
            verses: vec![ScoredVerse {
                verse,
                similarity_score: 0.5,
            }],
            session_id: request_session.unwrap_or_else(Uuid::new_v4),
            interaction_mode: mode,
            fallback_used: true,
            report: PipelineReport::default(),
        }
    }
}

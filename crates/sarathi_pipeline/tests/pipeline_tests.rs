//! Integration tests for the pipeline controller, driving every degrade
//! row of the stage table with substitutable fakes.

use async_trait::async_trait;
use sarathi_core::{
    ConversationContext, ConversationStore, Emotion, EmotionLogEntry, Error, InteractionMode,
    Message, MessageRole, MoodLog, NewLogEntry, Result, Session, Verse,
};
use sarathi_emotion::{EmotionDetector, LexiconModel};
use sarathi_generation::llm::{CompletionParams, LlmClient};
use sarathi_generation::{MockProvider, ReflectionGenerator};
use sarathi_pipeline::{ChatPipeline, ChatRequest, Stage, StageStatus};
use sarathi_retrieval::{Corpus, VectorIndex, VerseRetriever};
use sarathi_store::SqliteStore;
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// Fakes
// ============================================================================

struct FixedIndex(Vec<(String, f32)>);

#[async_trait]
impl VectorIndex for FixedIndex {
    async fn query(&self, _text: &str, k: usize) -> anyhow::Result<Vec<(String, f32)>> {
        Ok(self.0.iter().take(k).cloned().collect())
    }
}

struct BrokenIndex;

#[async_trait]
impl VectorIndex for BrokenIndex {
    async fn query(&self, _text: &str, _k: usize) -> anyhow::Result<Vec<(String, f32)>> {
        anyhow::bail!("index offline")
    }
}

struct BrokenLlm;

#[async_trait]
impl LlmClient for BrokenLlm {
    async fn complete(&self, _prompt: &str, _params: CompletionParams) -> anyhow::Result<String> {
        anyhow::bail!("generation backend down")
    }
}

/// A store where every operation fails, for driving the session and
/// persistence degrade paths.
struct BrokenStore;

#[async_trait]
impl ConversationStore for BrokenStore {
    async fn create_session(&self, _: Uuid, _: InteractionMode) -> Result<Session> {
        Err(Error::Database("store down".into()))
    }
    async fn get_session(&self, id: Uuid) -> Result<Session> {
        Err(Error::NotFound("session", id.to_string()))
    }
    async fn add_message(
        &self,
        _: Uuid,
        _: MessageRole,
        _: &str,
        _: Option<&Emotion>,
        _: Option<&str>,
    ) -> Result<Message> {
        Err(Error::Database("store down".into()))
    }
    async fn get_context(&self, _: Uuid, _: u32) -> Result<ConversationContext> {
        Err(Error::Database("store down".into()))
    }
    async fn end_session(&self, _: Uuid, _: Option<&str>) -> Result<Session> {
        Err(Error::Database("store down".into()))
    }
}

#[async_trait]
impl MoodLog for BrokenStore {
    async fn log_interaction(&self, _: NewLogEntry) -> Result<EmotionLogEntry> {
        Err(Error::Persistence("store down".into()))
    }
    async fn entries_in_range(
        &self,
        _: Uuid,
        _: chrono::NaiveDate,
        _: chrono::NaiveDate,
    ) -> Result<Vec<EmotionLogEntry>> {
        Ok(Vec::new())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn verse(id: &str, chapter: u32, n: u32) -> Verse {
    Verse {
        id: id.to_string(),
        chapter,
        verse: n,
        shloka: format!("श्लोक {}", id),
        transliteration: Some("transliteration".into()),
        eng_meaning: format!("meaning of {}", id),
        hin_meaning: None,
        word_meaning: None,
        themes: vec!["surrender".into()],
    }
}

fn corpus() -> Arc<Corpus> {
    Arc::new(Corpus::from_verses(vec![
        verse("BG2.14", 2, 14),
        verse("BG2.47", 2, 47),
        verse("BG6.35", 6, 35),
    ]))
}

fn working_retriever() -> Arc<VerseRetriever> {
    let index = Arc::new(FixedIndex(vec![
        ("BG2.47".into(), 0.13),
        ("BG6.35".into(), 0.25),
        ("BG2.14".into(), 0.4),
    ]));
    Arc::new(VerseRetriever::new(index, corpus()))
}

fn broken_retriever() -> Arc<VerseRetriever> {
    Arc::new(VerseRetriever::new(Arc::new(BrokenIndex), corpus()))
}

fn detector() -> EmotionDetector {
    EmotionDetector::new(Arc::new(LexiconModel::new()))
}

async fn sqlite_store() -> (Arc<SqliteStore>, Uuid, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("test.db")).await.unwrap();
    let user = store.upsert_user("pipeline-uid", None, None).await.unwrap();
    (Arc::new(store), user.id, dir)
}

fn request(text: &str, mode: &str) -> ChatRequest {
    ChatRequest {
        user_input: text.to_string(),
        session_id: None,
        interaction_mode: mode.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_happy_path_no_fallback() {
    let (store, user_id, _dir) = sqlite_store().await;
    let pipeline = ChatPipeline::new(
        detector(),
        working_retriever(),
        Arc::new(ReflectionGenerator::new(Box::new(MockProvider::new("test")))),
        store.clone(),
        store.clone(),
    );

    let outcome = pipeline
        .process(user_id, &request("I feel anxious about my exam", "wisdom"))
        .await
        .unwrap();

    assert!(!outcome.fallback_used);
    assert!(outcome.report.all_ok());
    assert_eq!(outcome.interaction_mode, InteractionMode::Wisdom);
    assert!(outcome.verses.len() <= 3 && !outcome.verses.is_empty());
    for v in &outcome.verses {
        assert!(v.similarity_score > 0.0);
    }
    // The lexicon maps "anxious" into the known label set.
    assert_eq!(outcome.emotion.label, "nervousness");

    // Exactly two messages persisted, user then assistant, in order.
    let context = store.get_context(outcome.session_id, 10).await.unwrap();
    assert_eq!(context.total_messages, 2);
    assert_eq!(context.messages[0].role, MessageRole::User);
    assert_eq!(context.messages[1].role, MessageRole::Assistant);
    assert_eq!(context.messages[0].sequence_number, 1);
    assert_eq!(context.messages[1].sequence_number, 2);
    assert!(context.messages[1].verse_id.is_some());

    // Mood log written for today.
    let today = chrono::Utc::now().date_naive();
    let entries = store.entries_in_range(user_id, today, today).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].dominant_emotion, "nervousness");
    assert!((0.0..=1.0).contains(&entries[0].emotion_confidence));
}

#[tokio::test]
async fn test_empty_input_rejected_without_side_effects() {
    let (store, user_id, _dir) = sqlite_store().await;
    let pipeline = ChatPipeline::new(
        detector(),
        working_retriever(),
        Arc::new(ReflectionGenerator::new(Box::new(MockProvider::new("test")))),
        store.clone(),
        store.clone(),
    );

    let err = pipeline
        .process(user_id, &request("", "wisdom"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // No session, no log.
    let today = chrono::Utc::now().date_naive();
    assert!(store
        .entries_in_range(user_id, today, today)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_oversized_input_rejected() {
    let (store, user_id, _dir) = sqlite_store().await;
    let pipeline = ChatPipeline::new(
        detector(),
        working_retriever(),
        Arc::new(ReflectionGenerator::new(Box::new(MockProvider::new("test")))),
        store.clone(),
        store.clone(),
    );

    let long = "a".repeat(5001);
    let err = pipeline
        .process(user_id, &request(&long, "wisdom"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_invalid_mode_rejected_naming_valid_modes() {
    let (store, user_id, _dir) = sqlite_store().await;
    let pipeline = ChatPipeline::new(
        detector(),
        working_retriever(),
        Arc::new(ReflectionGenerator::new(Box::new(MockProvider::new("test")))),
        store.clone(),
        store.clone(),
    );

    let err = pipeline
        .process(user_id, &request("hello", "invalid"))
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("socratic") && msg.contains("wisdom") && msg.contains("story"));
}

#[tokio::test]
async fn test_retrieval_failure_substitutes_default_verse() {
    let (store, user_id, _dir) = sqlite_store().await;
    let pipeline = ChatPipeline::new(
        detector(),
        broken_retriever(),
        Arc::new(ReflectionGenerator::new(Box::new(MockProvider::new("test")))),
        store.clone(),
        store.clone(),
    );

    let outcome = pipeline
        .process(user_id, &request("I feel lost", "story"))
        .await
        .unwrap();

    assert!(outcome.fallback_used);
    assert_eq!(outcome.verses.len(), 1);
    assert_eq!(outcome.verses[0].verse.id, "BG2.47");
    assert!(matches!(
        outcome.report.status_of(Stage::Retrieval),
        Some(StageStatus::Degraded(_))
    ));
    // The rest of the pipeline still completes.
    assert!(!outcome.reflection.is_empty());
}

#[tokio::test]
async fn test_generation_failure_uses_deterministic_fallback() {
    let (store, user_id, _dir) = sqlite_store().await;
    let pipeline = ChatPipeline::new(
        detector(),
        working_retriever(),
        Arc::new(ReflectionGenerator::new(Box::new(BrokenLlm))),
        store.clone(),
        store.clone(),
    );

    let outcome = pipeline
        .process(user_id, &request("I am very sad today", "socratic"))
        .await
        .unwrap();

    assert!(outcome.fallback_used);
    assert!(matches!(
        outcome.report.status_of(Stage::Generation),
        Some(StageStatus::Degraded(_))
    ));
    // The template reproduces the top verse verbatim.
    let top = &outcome.verses[0];
    assert!(outcome.reflection.contains(&top.verse.shloka));
    assert!(outcome.reflection.contains(&top.verse.eng_meaning));
    assert!(outcome.reflection.contains("sadness"));
}

#[tokio::test]
async fn test_store_failure_synthesizes_session_and_still_responds() {
    let broken = Arc::new(BrokenStore);
    let pipeline = ChatPipeline::new(
        detector(),
        working_retriever(),
        Arc::new(ReflectionGenerator::new(Box::new(MockProvider::new("test")))),
        broken.clone(),
        broken,
    );

    let outcome = pipeline
        .process(Uuid::new_v4(), &request("hello there", "wisdom"))
        .await
        .unwrap();

    assert!(outcome.fallback_used);
    assert!(matches!(
        outcome.report.status_of(Stage::Session),
        Some(StageStatus::Degraded(_))
    ));
    assert!(matches!(
        outcome.report.status_of(Stage::PersistUserTurn),
        Some(StageStatus::Failed(_))
    ));
    assert!(matches!(
        outcome.report.status_of(Stage::MoodLog),
        Some(StageStatus::Failed(_))
    ));
    // A usable response nonetheless.
    assert!(!outcome.reflection.is_empty());
    assert!(!outcome.verses.is_empty());
}

#[tokio::test]
async fn test_existing_session_reused_with_context() {
    let (store, user_id, _dir) = sqlite_store().await;
    let pipeline = ChatPipeline::new(
        detector(),
        working_retriever(),
        Arc::new(ReflectionGenerator::new(Box::new(MockProvider::new("test")))),
        store.clone(),
        store.clone(),
    );

    let first = pipeline
        .process(user_id, &request("I feel anxious", "wisdom"))
        .await
        .unwrap();

    let second = pipeline
        .process(
            user_id,
            &ChatRequest {
                user_input: "tell me more".into(),
                session_id: Some(first.session_id),
                interaction_mode: "wisdom".into(),
            },
        )
        .await
        .unwrap();

    assert_eq!(second.session_id, first.session_id);
    let context = store.get_context(first.session_id, 10).await.unwrap();
    assert_eq!(context.total_messages, 4);
    let seqs: Vec<i64> = context.messages.iter().map(|m| m.sequence_number).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_unknown_session_id_degrades_to_throwaway() {
    let (store, user_id, _dir) = sqlite_store().await;
    let pipeline = ChatPipeline::new(
        detector(),
        working_retriever(),
        Arc::new(ReflectionGenerator::new(Box::new(MockProvider::new("test")))),
        store.clone(),
        store.clone(),
    );

    let ghost = Uuid::new_v4();
    let outcome = pipeline
        .process(
            user_id,
            &ChatRequest {
                user_input: "hello".into(),
                session_id: Some(ghost),
                interaction_mode: "wisdom".into(),
            },
        )
        .await
        .unwrap();

    assert!(outcome.fallback_used);
    assert_ne!(outcome.session_id, ghost);
    assert!(matches!(
        outcome.report.status_of(Stage::Session),
        Some(StageStatus::Degraded(_))
    ));
}

#[tokio::test]
async fn test_apology_outcome_shape() {
    let outcome = ChatPipeline::apology_outcome(None, InteractionMode::Wisdom);
    assert!(outcome.fallback_used);
    assert_eq!(outcome.verses.len(), 1);
    assert_eq!(outcome.emotion.label, "neutral");
    assert!(outcome.reflection.contains("Verse 2.47"));
}

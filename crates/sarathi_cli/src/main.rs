use anyhow::Result;
use clap::Parser;
use sarathi_analytics::MoodAnalytics;
use sarathi_core::SarathiConfig;
use sarathi_emotion::{EmotionDetector, LexiconModel};
use sarathi_gateway::{serve, AppState, StaticTokenVerifier};
use sarathi_generation::{GeminiClient, MockProvider, ReflectionGenerator};
use sarathi_generation::llm::{CompletionParams, LlmClient};
use sarathi_pipeline::ChatPipeline;
use sarathi_retrieval::{
    Corpus, EmbeddingModel, SqliteVectorIndex, VerseRepository, VerseRetriever,
};
use sarathi_store::SqliteStore;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "sarathi.toml")]
    config: String,

    /// Override the database path
    #[arg(long)]
    db: Option<String>,

    /// Override the corpus file path
    #[arg(long)]
    corpus: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = SarathiConfig::load_or_default(&args.config);
    if let Some(db) = args.db {
        config.database.path = db;
    }
    if let Some(corpus) = args.corpus {
        config.retrieval.corpus_path = corpus;
    }

    let filter =
        EnvFilter::try_new(&config.server.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Initializing Sarathi...");

    // 1. Storage
    info!("Connecting to database at {}...", config.database.path);
    let store = Arc::new(SqliteStore::new(&config.database.path).await?);

    // 2. Corpus + retrieval
    info!("Loading corpus from {}...", config.retrieval.corpus_path);
    let corpus = Arc::new(Corpus::load(&config.retrieval.corpus_path)?);
    store.seed_verses(corpus.iter()).await?;

    info!("Initializing embedding model...");
    let embedder = EmbeddingModel::new()?;
    let index = SqliteVectorIndex::new(store.pool().clone(), embedder).await?;
    index.index_corpus(&corpus).await?;
    let retriever = Arc::new(VerseRetriever::new(Arc::new(index), corpus.clone()));
    let repository = Arc::new(VerseRepository::new(corpus.clone(), store.pool().clone()));

    // 3. Emotion
    let detector = EmotionDetector::new(Arc::new(LexiconModel::new()));

    // 4. Generation
    info!(
        "Starting generation backend '{}' with model {}...",
        config.llm.provider, config.llm.model
    );
    let client: Box<dyn LlmClient> = match config.llm.provider.as_str() {
        "gemini" => Box::new(
            GeminiClient::new(&config.llm.model)?.with_base_url(config.llm.base_url.clone()),
        ),
        "mock" => Box::new(MockProvider::new(&config.llm.model)),
        other => anyhow::bail!("Unknown LLM provider '{}'", other),
    };
    let generator = Arc::new(ReflectionGenerator::new(client).with_params(CompletionParams {
        max_tokens: config.llm.max_tokens,
        temperature: config.llm.temperature,
    }));

    // 5. Pipeline + analytics
    let pipeline = Arc::new(
        ChatPipeline::new(
            detector.clone(),
            retriever.clone(),
            generator.clone(),
            store.clone(),
            store.clone(),
        )
        .with_emotion_threshold(config.emotion.threshold)
        .with_top_k(config.retrieval.top_k),
    );
    let analytics = Arc::new(MoodAnalytics::new(store.clone()));

    // 6. Gateway
    let verifier = Arc::new(StaticTokenVerifier::from_config(&config.auth));
    let state = AppState {
        store,
        pipeline,
        analytics,
        verifier,
        detector,
        retriever,
        generator,
        repository,
    };

    serve(state, &config.server.host, config.server.port).await
}

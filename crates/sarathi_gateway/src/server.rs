use crate::auth::IdentityVerifier;
use crate::routes;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sarathi_analytics::MoodAnalytics;
use sarathi_core::Error;
use sarathi_emotion::EmotionDetector;
use sarathi_generation::ReflectionGenerator;
use sarathi_pipeline::ChatPipeline;
use sarathi_retrieval::{VerseRepository, VerseRetriever};
use sarathi_store::SqliteStore;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state for all route handlers. Every service is an explicitly
/// constructed object injected at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub pipeline: Arc<ChatPipeline>,
    pub analytics: Arc<MoodAnalytics>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub detector: EmotionDetector,
    pub retriever: Arc<VerseRetriever>,
    pub generator: Arc<ReflectionGenerator>,
    pub repository: Arc<VerseRepository>,
}

/// Error wrapper mapping the shared taxonomy onto HTTP statuses.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::InvalidState(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::NotFound(kind, id) => {
                (StatusCode::NOT_FOUND, format!("{} not found: {}", kind, id))
            }
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Error::Upstream(_) | Error::Persistence(_) | Error::Database(_) => {
                tracing::error!("internal error: {}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::liveness))
        .route("/chat", post(routes::chat::chat))
        .route("/chat/health", get(routes::chat::chat_health))
        .route(
            "/conversations/sessions",
            post(routes::conversations::create_session),
        )
        .route(
            "/conversations/messages",
            post(routes::conversations::add_message),
        )
        .route(
            "/conversations/:id/context",
            get(routes::conversations::get_context),
        )
        .route(
            "/conversations/:id/end",
            post(routes::conversations::end_session),
        )
        .route("/logs/mood", get(routes::logs::mood_calendar))
        .route("/logs/mood/month", get(routes::logs::mood_month))
        .route("/logs/health", get(routes::logs::logs_health))
        .route("/analytics/health", get(routes::analytics::analytics_health))
        .route("/analytics/stats", get(routes::analytics::stats))
        .route("/analytics/patterns", get(routes::analytics::patterns))
        .route("/analytics/summary", get(routes::analytics::summary))
        .route(
            "/analytics/emotions/top",
            get(routes::analytics::top_emotions),
        )
        .route("/verses/random", get(routes::verses::random))
        .route("/verses/chapter/:chapter", get(routes::verses::by_chapter))
        .route("/verses/:id", get(routes::verses::by_id))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Gateway failed to bind {}: {}", addr, e))?;
    tracing::info!("Gateway listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

//! Session and message endpoints with ownership enforcement.

use crate::auth::authenticate;
use crate::server::{ApiError, ApiResult, AppState};
use crate::types::{AddMessageRequest, ContextQuery, CreateSessionRequest, EndSessionRequest, SessionIdQuery};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use sarathi_core::{ConversationContext, ConversationStore, Error, Message, Session, User};
use uuid::Uuid;

const DEFAULT_WINDOW: u32 = 10;

/// 404 if the session is absent, 403 if the caller does not own it.
async fn verify_ownership(state: &AppState, session_id: Uuid, user: &User) -> ApiResult<Session> {
    let session = state.store.get_session(session_id).await?;
    if session.user_id != user.id {
        return Err(ApiError(Error::Forbidden(
            "You don't have permission to access this session".to_string(),
        )));
    }
    Ok(session)
}

pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let user = authenticate(state.verifier.as_ref(), &state.store, &headers).await?;
    let session = state
        .store
        .create_session(user.id, body.interaction_mode)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn add_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SessionIdQuery>,
    Json(body): Json<AddMessageRequest>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let user = authenticate(state.verifier.as_ref(), &state.store, &headers).await?;
    verify_ownership(&state, query.session_id, &user).await?;

    let message = state
        .store
        .add_message(
            query.session_id,
            body.role,
            &body.content,
            body.emotion.as_ref(),
            body.verse_id.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn get_context(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<Uuid>,
    Query(query): Query<ContextQuery>,
) -> ApiResult<Json<ConversationContext>> {
    let user = authenticate(state.verifier.as_ref(), &state.store, &headers).await?;
    verify_ownership(&state, session_id, &user).await?;

    let window = query.window_size.unwrap_or(DEFAULT_WINDOW);
    let context = state.store.get_context(session_id, window).await?;
    Ok(Json(context))
}

pub async fn end_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<Uuid>,
    Json(body): Json<EndSessionRequest>,
) -> ApiResult<Json<Session>> {
    let user = authenticate(state.verifier.as_ref(), &state.store, &headers).await?;
    verify_ownership(&state, session_id, &user).await?;

    let session = state
        .store
        .end_session(session_id, body.summary.as_deref())
        .await?;
    Ok(Json(session))
}

//! Direct verse lookups against the chained repository. Reference data,
//! so no caller identity required.

use crate::server::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use sarathi_core::{Error, Verse};

pub async fn by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Verse>> {
    let verse = state
        .repository
        .by_id(&id)
        .await
        .map_err(|e| ApiError(Error::Database(e.to_string())))?
        .ok_or_else(|| ApiError(Error::NotFound("verse", id)))?;
    Ok(Json(verse))
}

pub async fn random(State(state): State<AppState>) -> ApiResult<Json<Verse>> {
    let verse = state
        .repository
        .random()
        .await
        .map_err(|e| ApiError(Error::Database(e.to_string())))?
        .ok_or_else(|| ApiError(Error::NotFound("verse", "random".to_string())))?;
    Ok(Json(verse))
}

pub async fn by_chapter(
    State(state): State<AppState>,
    Path(chapter): Path<u32>,
) -> ApiResult<Json<Vec<Verse>>> {
    if !(1..=18).contains(&chapter) {
        return Err(ApiError(Error::Validation(
            "chapter must be between 1 and 18".to_string(),
        )));
    }
    let verses = state
        .repository
        .by_chapter(chapter)
        .await
        .map_err(|e| ApiError(Error::Database(e.to_string())))?;
    Ok(Json(verses))
}

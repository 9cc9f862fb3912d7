//! Mood calendar endpoints.

use crate::auth::authenticate;
use crate::server::{ApiError, ApiResult, AppState};
use crate::types::{MoodCalendarResponse, MoodMonthQuery, MoodRangeQuery};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{Months, NaiveDate};
use sarathi_core::Error;

const MAX_RANGE_DAYS: i64 = 365;

pub async fn mood_calendar(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MoodRangeQuery>,
) -> ApiResult<Json<MoodCalendarResponse>> {
    let user = authenticate(state.verifier.as_ref(), &state.store, &headers).await?;

    if query.start_date > query.end_date {
        return Err(ApiError(Error::Validation(
            "start_date must be before or equal to end_date".to_string(),
        )));
    }
    if (query.end_date - query.start_date).num_days() > MAX_RANGE_DAYS {
        return Err(ApiError(Error::Validation(format!(
            "Date range cannot exceed {} days",
            MAX_RANGE_DAYS
        ))));
    }

    let entries = state
        .store
        .mood_calendar(user.id, query.start_date, query.end_date)
        .await?;
    Ok(Json(MoodCalendarResponse {
        entries,
        start_date: query.start_date,
        end_date: query.end_date,
    }))
}

pub async fn logs_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.store.ping().await {
        Ok(()) => Json(serde_json::json!({
            "status": "healthy",
            "database_connected": true,
            "message": "Logging service is operational",
        })),
        Err(e) => Json(serde_json::json!({
            "status": "unhealthy",
            "database_connected": false,
            "error": e.to_string(),
            "message": "Logging service is not operational",
        })),
    }
}

pub async fn mood_month(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MoodMonthQuery>,
) -> ApiResult<Json<MoodCalendarResponse>> {
    let user = authenticate(state.verifier.as_ref(), &state.store, &headers).await?;

    let start = NaiveDate::from_ymd_opt(query.year, query.month, 1).ok_or_else(|| {
        ApiError(Error::Validation(format!(
            "Invalid date: year {} month {}",
            query.year, query.month
        )))
    })?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| ApiError(Error::Validation("Invalid date".to_string())))?;

    let entries = state.store.mood_calendar(user.id, start, end).await?;
    Ok(Json(MoodCalendarResponse {
        entries,
        start_date: start,
        end_date: end,
    }))
}

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::error::AppError;
use crate::leaderboard::list_matches;
use crate::schema::{LeaderboardQuery, SubmitMatchResponse, SubmitMatchSchema};
use crate::submission::submit_match;
use crate::AppState;

pub async fn get_leaderboard_handler(
    opts: Option<Query<LeaderboardQuery>>,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let Query(opts) = opts.unwrap_or_default();
    let session_id = opts.session_id.filter(|s| !s.trim().is_empty());

    if data.config.require_session_id && session_id.is_none() {
        return Err(AppError::Validation("sessionId is required".to_string()));
    }

    let matches = list_matches(data.store.as_ref(), session_id).await?;
    Ok(Json(matches))
}

pub async fn submit_match_handler(
    State(data): State<Arc<AppState>>,
    payload: Result<Json<SubmitMatchSchema>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(candidate) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let id = submit_match(
        data.store.as_ref(),
        candidate,
        data.config.duplicate_session_guard,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitMatchResponse {
            message: "Match saved".to_string(),
            id,
        }),
    ))
}

/// Plain `OPTIONS` acknowledgement. Browser preflights are answered by the
/// CORS layer before they get here.
pub async fn options_handler() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed_handler() -> AppError {
    AppError::MethodNotSupported
}

pub async fn not_found_handler() -> AppError {
    AppError::NotFound
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use super::{
    models::Match,
    types::{AdjustCountRequest, AdjustCountResponse, EndMatchRequest, EndMatchResponse},
};
use crate::queue::models::QueueEntry;
use crate::shared::{AppError, AppState, CourtId};

/// GET /courts/:court_id/match
///
/// `null` when the court is idle
#[instrument(name = "get_match", skip(state))]
pub async fn get_match(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
) -> Result<Json<Option<Match>>, AppError> {
    Ok(Json(state.court_service.get_active_match(court_id).await?))
}

/// POST /courts/:court_id/match/start
#[instrument(name = "start_match", skip(state))]
pub async fn start_match(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
) -> Result<Json<Match>, AppError> {
    Ok(Json(state.court_service.start_match(court_id).await?))
}

/// POST /courts/:court_id/match/end
///
/// Body `{"winner": "A"}`; a missing winner is rejected by the service.
#[instrument(name = "end_match", skip(state, body))]
pub async fn end_match(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
    body: Option<Json<EndMatchRequest>>,
) -> Result<Json<EndMatchResponse>, AppError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let response = state
        .court_service
        .end_match(court_id, request.winner)
        .await?;
    Ok(Json(response))
}

/// POST /courts/:court_id/match/reset
///
/// Returns the entries that went back to the queue
#[instrument(name = "reset_match", skip(state))]
pub async fn reset_match(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
) -> Result<Json<Vec<QueueEntry>>, AppError> {
    Ok(Json(state.court_service.reset_match(court_id).await?))
}

/// POST /courts/:court_id/match/adjust
#[instrument(name = "adjust_match", skip(state))]
pub async fn adjust_match(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
    Json(request): Json<AdjustCountRequest>,
) -> Result<Json<AdjustCountResponse>, AppError> {
    let response = state
        .court_service
        .adjust_match_count(court_id, request.side, request.adjustment)
        .await?;
    Ok(Json(response))
}

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::instrument;

use super::{models::HistoryRecord, types::HistoryQuery};
use crate::court::types::ClearedResponse;
use crate::shared::{AppError, AppState, CourtId};

fn limit_or_default(state: &AppState, query: &HistoryQuery) -> usize {
    query.limit.unwrap_or(state.config.server.history_limit)
}

/// GET /history
///
/// Newest first across every court
#[instrument(name = "get_all_history", skip(state))]
pub async fn get_all_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryRecord>>, AppError> {
    let limit = limit_or_default(&state, &query);
    Ok(Json(state.court_service.get_history(None, limit).await?))
}

/// GET /courts/:court_id/history
#[instrument(name = "get_court_history", skip(state))]
pub async fn get_court_history(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryRecord>>, AppError> {
    let limit = limit_or_default(&state, &query);
    Ok(Json(
        state.court_service.get_history(Some(court_id), limit).await?,
    ))
}

/// DELETE /history
#[instrument(name = "clear_all_history", skip(state))]
pub async fn clear_all_history(
    State(state): State<AppState>,
) -> Result<Json<ClearedResponse>, AppError> {
    let removed = state.court_service.clear_history(None).await?;
    Ok(Json(ClearedResponse { removed }))
}

/// DELETE /courts/:court_id/history
#[instrument(name = "clear_court_history", skip(state))]
pub async fn clear_court_history(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
) -> Result<Json<ClearedResponse>, AppError> {
    let removed = state.court_service.clear_history(Some(court_id)).await?;
    Ok(Json(ClearedResponse { removed }))
}

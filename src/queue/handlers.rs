use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use super::{
    models::QueueEntry,
    types::{JoinOutcome, JoinQueueRequest, MoveEntryRequest, RenameEntryRequest, ReorderRequest},
};
use crate::court::types::ClearedResponse;
use crate::estimator::EstimatedEntry;
use crate::shared::{AppError, AppState, CourtId};

/// GET /courts/:court_id/queue
///
/// Queue in position order with projected start times
#[instrument(name = "get_queue", skip(state))]
pub async fn get_queue(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
) -> Result<Json<Vec<EstimatedEntry>>, AppError> {
    let queue = state.court_service.get_queue_with_estimates(court_id).await?;
    Ok(Json(queue))
}

/// POST /courts/:court_id/queue
#[instrument(name = "join_queue", skip(state))]
pub async fn join_queue(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
    Json(request): Json<JoinQueueRequest>,
) -> Result<(StatusCode, Json<JoinOutcome>), AppError> {
    let outcome = state
        .court_service
        .join_queue(court_id, &request.name)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// DELETE /courts/:court_id/queue
#[instrument(name = "clear_queue", skip(state))]
pub async fn clear_queue(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
) -> Result<Json<ClearedResponse>, AppError> {
    let removed = state.court_service.clear_queue(court_id).await?;
    Ok(Json(ClearedResponse {
        removed: removed as u64,
    }))
}

/// PUT /courts/:court_id/queue/order
#[instrument(name = "reorder_queue", skip(state, request))]
pub async fn reorder_queue(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Vec<QueueEntry>>, AppError> {
    let queue = state
        .court_service
        .reorder_queue(court_id, &request.placements)
        .await?;
    info!(court_id, entries = queue.len(), "Queue reordered");
    Ok(Json(queue))
}

/// PATCH /courts/:court_id/queue/:entry_id
#[instrument(name = "rename_entry", skip(state))]
pub async fn rename_entry(
    State(state): State<AppState>,
    Path((court_id, entry_id)): Path<(CourtId, i64)>,
    Json(request): Json<RenameEntryRequest>,
) -> Result<Json<QueueEntry>, AppError> {
    let entry = state
        .court_service
        .rename_queue_entry(court_id, entry_id, &request.name)
        .await?;
    Ok(Json(entry))
}

/// DELETE /courts/:court_id/queue/:entry_id
#[instrument(name = "remove_entry", skip(state))]
pub async fn remove_entry(
    State(state): State<AppState>,
    Path((court_id, entry_id)): Path<(CourtId, i64)>,
) -> Result<StatusCode, AppError> {
    state
        .court_service
        .remove_from_queue(court_id, &[entry_id])
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /courts/:court_id/queue/:entry_id/move
#[instrument(name = "move_entry", skip(state))]
pub async fn move_entry(
    State(state): State<AppState>,
    Path((court_id, entry_id)): Path<(CourtId, i64)>,
    Json(request): Json<MoveEntryRequest>,
) -> Result<Json<Vec<QueueEntry>>, AppError> {
    let queue = state
        .court_service
        .move_queue(court_id, entry_id, request.direction)
        .await?;
    Ok(Json(queue))
}

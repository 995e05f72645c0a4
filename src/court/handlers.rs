use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use super::{models::Court, types::CreateCourtRequest};
use crate::event::CourtStateSnapshot;
use crate::shared::{AppError, AppState, CourtId};

/// GET /courts
#[instrument(name = "list_courts", skip(state))]
pub async fn list_courts(State(state): State<AppState>) -> Result<Json<Vec<Court>>, AppError> {
    let courts = state.court_service.list_courts().await?;
    Ok(Json(courts))
}

/// POST /courts
///
/// The body is optional; a missing or blank name becomes "Court".
#[instrument(name = "create_court", skip(state, body))]
pub async fn create_court(
    State(state): State<AppState>,
    body: Option<Json<CreateCourtRequest>>,
) -> Result<(StatusCode, Json<Court>), AppError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let court = state
        .court_service
        .add_court(request.name.as_deref())
        .await?;

    info!(court_id = court.id, name = %court.name, "Court created");
    Ok((StatusCode::CREATED, Json(court)))
}

/// GET /courts/:court_id
///
/// Queue with estimates, active match and average match duration
#[instrument(name = "get_court_state", skip(state))]
pub async fn get_court_state(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
) -> Result<Json<CourtStateSnapshot>, AppError> {
    Ok(Json(state.court_service.court_state(court_id).await?))
}

/// DELETE /courts/:court_id
#[instrument(name = "delete_court", skip(state))]
pub async fn delete_court(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
) -> Result<StatusCode, AppError> {
    state.court_service.delete_court(court_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /courts/:court_id/undo
#[instrument(name = "undo", skip(state))]
pub async fn undo(
    State(state): State<AppState>,
    Path(court_id): Path<CourtId>,
) -> Result<Json<CourtStateSnapshot>, AppError> {
    let restored = state.court_service.undo(court_id).await?;
    info!(court_id, "Undo applied");
    Ok(Json(restored))
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::court::CourtService;
use crate::event::EventBus;
use crate::queue::models::Direction;
use crate::rotation::models::Side;

/// Identifier of a court (a reused positive slot number)
pub type CourtId = i64;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub court_service: Arc<CourtService>,
    pub event_bus: EventBus,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(court_service: Arc<CourtService>, event_bus: EventBus, config: AppConfig) -> Self {
        Self {
            court_service,
            event_bus,
            config: Arc::new(config),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Court {0} already has an active match")]
    MatchAlreadyActive(CourtId),

    #[error("Court {court_id} needs at least 2 queued entries to start, found {available}")]
    InsufficientQueue { court_id: CourtId, available: usize },

    #[error("Court {0} has no active match")]
    NoActiveMatch(CourtId),

    #[error("No winner specified")]
    NoWinnerSpecified,

    #[error("Court {0} is waiting for a player to fill an empty side")]
    IncompleteMatch(CourtId),

    #[error("Queue entry {entry_id} cannot move {direction}")]
    BoundaryError {
        entry_id: i64,
        direction: Direction,
    },

    #[error("Side {side} count is already 0")]
    InvalidDecrement { side: Side },

    #[error("Nothing to undo on court {0}")]
    NothingToUndo(CourtId),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AppError {
    pub fn court_not_found(court_id: CourtId) -> Self {
        AppError::NotFound(format!("Court {} not found", court_id))
    }

    pub fn entry_not_found(court_id: CourtId, entry_id: i64) -> Self {
        AppError::NotFound(format!(
            "Queue entry {} not found on court {}",
            entry_id, court_id
        ))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::NoWinnerSpecified => StatusCode::BAD_REQUEST,
            AppError::MatchAlreadyActive(_)
            | AppError::InsufficientQueue { .. }
            | AppError::NoActiveMatch(_)
            | AppError::IncompleteMatch(_)
            | AppError::BoundaryError { .. }
            | AppError::InvalidDecrement { .. }
            | AppError::NothingToUndo(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::StorageError(format!("Snapshot encoding failed: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            AppError::StorageError(_) => "Storage error".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

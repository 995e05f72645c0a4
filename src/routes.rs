use axum::{
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::shared::AppState;
use crate::{court, history, queue, rotation};

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the HTTP API over the shared application state
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courts", get(court::list_courts).post(court::create_court))
        .route(
            "/courts/:court_id",
            get(court::get_court_state).delete(court::delete_court),
        )
        .route(
            "/courts/:court_id/queue",
            get(queue::get_queue)
                .post(queue::join_queue)
                .delete(queue::clear_queue),
        )
        .route("/courts/:court_id/queue/order", put(queue::reorder_queue))
        .route(
            "/courts/:court_id/queue/:entry_id",
            patch(queue::rename_entry).delete(queue::remove_entry),
        )
        .route(
            "/courts/:court_id/queue/:entry_id/move",
            post(queue::move_entry),
        )
        .route("/courts/:court_id/match", get(rotation::get_match))
        .route("/courts/:court_id/match/start", post(rotation::start_match))
        .route("/courts/:court_id/match/end", post(rotation::end_match))
        .route("/courts/:court_id/match/reset", post(rotation::reset_match))
        .route("/courts/:court_id/match/adjust", post(rotation::adjust_match))
        .route("/courts/:court_id/undo", post(court::undo))
        .route(
            "/courts/:court_id/history",
            get(history::get_court_history).delete(history::clear_court_history),
        )
        .route(
            "/history",
            get(history::get_all_history).delete(history::clear_all_history),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

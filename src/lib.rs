// Library crate for the court rotation service
// This file exposes the public API for the binary and integration tests

pub mod config;
pub mod court;
pub mod estimator;
pub mod event;
pub mod history;
pub mod queue;
pub mod rotation;
pub mod routes;
pub mod shared;
pub mod store;
pub mod undo;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use court::CourtService;
pub use event::{CourtEvent, CourtStateListener, CourtStateSnapshot, EventBus};
pub use routes::create_router;
pub use shared::{AppError, AppState, CourtId};
pub use store::{CourtRepository, InMemoryCourtRepository, PostgresCourtRepository};

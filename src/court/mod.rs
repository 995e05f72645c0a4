// Public API - what other modules can use
pub use handlers::{create_court, delete_court, get_court_state, list_courts, undo};
pub use service::CourtService;

// Internal modules
mod handlers;
mod locks;
pub mod models;
mod service;
pub mod types;

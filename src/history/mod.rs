// Public API - what other modules can use
pub use handlers::{clear_all_history, clear_court_history, get_all_history, get_court_history};

// Internal modules
mod handlers;
pub mod models;
pub mod types;

// Public API - what other modules can use
pub use handlers::{adjust_match, end_match, get_match, reset_match, start_match};

// Internal modules
pub mod engine;
mod handlers;
pub mod models;
pub mod types;

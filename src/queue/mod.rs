// Public API - what other modules can use
pub use handlers::{
    clear_queue, get_queue, join_queue, move_entry, remove_entry, rename_entry, reorder_queue,
};

// Internal modules
mod handlers;
pub mod models;
pub mod ops;
pub mod types;

// Single-slot undo per court

pub use models::UndoSnapshot;
pub use store::SnapshotStore;

pub mod models;
mod store;

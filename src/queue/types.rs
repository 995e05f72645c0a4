use serde::{Deserialize, Serialize};

use super::models::{Direction, Placement, QueueEntry};

#[derive(Debug, Deserialize)]
pub struct JoinQueueRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameEntryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveEntryRequest {
    pub direction: Direction,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub placements: Vec<Placement>,
}

/// Result of joining a court's queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinOutcome {
    pub entry: QueueEntry,
    /// The entry went straight onto an empty side of the active match
    pub seated: bool,
}

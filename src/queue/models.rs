use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::CourtId;

/// A team or player waiting for a match on a court
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    pub name: String,
    /// Win streak carried while queued or playing
    pub matches_played: u32,
    /// Dense 1-based rank within the court's queue
    pub position: u32,
    pub court_id: CourtId,
    pub joined_at: DateTime<Utc>,
}

/// Direction of a single-step queue move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Position of the neighbour this direction swaps with, if any
    pub fn neighbour_of(&self, position: u32) -> Option<u32> {
        match self {
            Direction::Up => position.checked_sub(1).filter(|p| *p >= 1),
            Direction::Down => position.checked_add(1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Explicit position assignment used by drag-and-drop reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub id: i64,
    pub position: u32,
}

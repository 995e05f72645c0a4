use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::court::models::CourtState;
use crate::history::models::HistoryRecord;
use crate::queue::models::QueueEntry;
use crate::rotation::models::Match;
use crate::shared::CourtId;

/// Pre-mutation copy of a court, restorable once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoSnapshot {
    pub court_id: CourtId,
    pub queue: Vec<QueueEntry>,
    pub active_match: Option<Match>,
    /// Tail of the court's history at save time, oldest first
    pub recent_history: Vec<HistoryRecord>,
    pub saved_at: DateTime<Utc>,
}

impl UndoSnapshot {
    /// Captures the state a transition is about to change
    pub fn capture(state: &CourtState, history_depth: usize, saved_at: DateTime<Utc>) -> Self {
        let skip = state.recent_history.len().saturating_sub(history_depth);
        Self {
            court_id: state.court_id(),
            queue: state.queue.entries().to_vec(),
            active_match: state.active_match.clone(),
            recent_history: state.recent_history[skip..].to_vec(),
            saved_at,
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::estimator::EstimatedEntry;
use crate::rotation::models::Match;
use crate::shared::CourtId;

/// Fresh view of a court, sent after every committed mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtStateSnapshot {
    pub court_id: CourtId,
    pub queue: Vec<EstimatedEntry>,
    pub active_match: Option<Match>,
    pub average_duration_ms: i64,
}

/// Events published on the bus
///
/// Events represent facts that have already been committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CourtEvent {
    StateChanged(CourtStateSnapshot),
    CourtDeleted { court_id: CourtId },
}

impl CourtEvent {
    pub fn court_id(&self) -> CourtId {
        match self {
            CourtEvent::StateChanged(snapshot) => snapshot.court_id,
            CourtEvent::CourtDeleted { court_id } => *court_id,
        }
    }

    /// Short name of the event kind for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            CourtEvent::StateChanged(_) => "state_changed",
            CourtEvent::CourtDeleted { .. } => "court_deleted",
        }
    }
}

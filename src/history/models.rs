use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::CourtId;

/// A completed match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub court_id: CourtId,
    pub team_a: String,
    pub team_b: String,
    pub winner: String,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: i64,
}

/// A history record that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryRecord {
    pub court_id: CourtId,
    pub team_a: String,
    pub team_b: String,
    pub winner: String,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: i64,
}

impl NewHistoryRecord {
    pub fn with_id(self, id: i64) -> HistoryRecord {
        HistoryRecord {
            id,
            court_id: self.court_id,
            team_a: self.team_a,
            team_b: self.team_b,
            winner: self.winner,
            timestamp: self.timestamp,
            duration_ms: self.duration_ms,
        }
    }
}

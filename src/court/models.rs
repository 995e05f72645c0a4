use serde::{Deserialize, Serialize};

use crate::history::models::HistoryRecord;
use crate::queue::ops::CourtQueue;
use crate::rotation::models::Match;
use crate::shared::CourtId;

/// Name given to courts created without one
pub const DEFAULT_COURT_NAME: &str = "Court";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub name: String,
}

impl Court {
    /// Normalizes a requested court name, defaulting blank names
    pub fn display_name(raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            DEFAULT_COURT_NAME.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Smallest positive id not used by any existing court
pub fn smallest_free_slot(used: &[CourtId]) -> CourtId {
    let mut sorted: Vec<CourtId> = used.iter().copied().filter(|id| *id > 0).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut candidate = 1;
    for id in sorted {
        if id != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}

/// Everything a transition needs to read from one court
#[derive(Debug, Clone, PartialEq)]
pub struct CourtState {
    pub court: Court,
    pub queue: CourtQueue,
    pub active_match: Option<Match>,
    /// Most recent history records, oldest first
    pub recent_history: Vec<HistoryRecord>,
}

impl CourtState {
    pub fn court_id(&self) -> CourtId {
        self.court.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![], 1)]
    #[case(vec![1, 2, 3], 4)]
    #[case(vec![2, 3], 1)]
    #[case(vec![1, 3, 4], 2)]
    #[case(vec![4, 1, 2], 3)]
    fn reuses_smallest_missing_slot(#[case] used: Vec<CourtId>, #[case] expected: CourtId) {
        assert_eq!(smallest_free_slot(&used), expected);
    }

    #[test]
    fn blank_names_fall_back_to_default() {
        assert_eq!(Court::display_name("   "), "Court");
        assert_eq!(Court::display_name(" Centre "), "Centre");
    }
}

mod memory;
mod postgres;
mod repository;

pub use memory::InMemoryCourtRepository;
pub use postgres::PostgresCourtRepository;
pub use repository::{
    CourtCommit, CourtRepository, HistoryChange, IdSequence, ReservedIds, SnapshotChange,
};

use crate::queue::models::QueueEntry;
use crate::shared::{AppError, CourtId};

/// Rejects a queue whose positions are not exactly 1..=n for this court
pub(crate) fn ensure_contiguous(court_id: CourtId, queue: &[QueueEntry]) -> Result<(), AppError> {
    let mut positions: Vec<u32> = Vec::with_capacity(queue.len());
    for entry in queue {
        if entry.court_id != court_id {
            return Err(AppError::StorageError(format!(
                "Queue entry {} belongs to court {}, not {}",
                entry.id, entry.court_id, court_id
            )));
        }
        positions.push(entry.position);
    }
    positions.sort_unstable();

    let contiguous = positions
        .iter()
        .enumerate()
        .all(|(idx, position)| *position as usize == idx + 1);
    if !contiguous {
        return Err(AppError::StorageError(format!(
            "Queue positions for court {} are not contiguous",
            court_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn at(court_id: CourtId, positions: &[u32]) -> Vec<QueueEntry> {
        positions
            .iter()
            .enumerate()
            .map(|(i, position)| QueueEntry {
                id: i as i64 + 1,
                name: format!("team-{}", i + 1),
                matches_played: 0,
                position: *position,
                court_id,
                joined_at: Utc::now(),
            })
            .collect()
    }

    #[rstest]
    #[case(&[], true)]
    #[case(&[1, 2, 3], true)]
    #[case(&[2, 1, 3], true)]
    #[case(&[1, 3], false)]
    #[case(&[0, 1], false)]
    #[case(&[1, 1], false)]
    fn contiguity(#[case] positions: &[u32], #[case] ok: bool) {
        assert_eq!(ensure_contiguous(1, &at(1, positions)).is_ok(), ok);
    }

    #[test]
    fn foreign_entries_are_rejected() {
        assert!(ensure_contiguous(1, &at(2, &[1])).is_err());
    }
}

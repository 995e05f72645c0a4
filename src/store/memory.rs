use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use super::repository::{
    CourtCommit, CourtRepository, HistoryChange, IdSequence, ReservedIds, SnapshotChange,
};
use super::ensure_contiguous;
use crate::court::models::{smallest_free_slot, Court, CourtState};
use crate::history::models::HistoryRecord;
use crate::queue::models::QueueEntry;
use crate::queue::ops::CourtQueue;
use crate::rotation::models::Match;
use crate::shared::{AppError, CourtId};
use crate::undo::{SnapshotStore, UndoSnapshot};

#[derive(Debug, Default)]
struct MemoryTables {
    courts: BTreeMap<CourtId, Court>,
    queues: HashMap<CourtId, Vec<QueueEntry>>,
    matches: HashMap<CourtId, Match>,
    /// All courts, ascending by id
    history: Vec<HistoryRecord>,
    snapshots: SnapshotStore,
    next_history_id: i64,
}

impl MemoryTables {
    fn court_history(&self, court_id: CourtId) -> impl DoubleEndedIterator<Item = &HistoryRecord> {
        self.history.iter().filter(move |r| r.court_id == court_id)
    }
}

/// In-memory implementation of CourtRepository for development and testing
///
/// All tables live behind one mutex, so every commit is applied in a single
/// critical section. Data is lost when the process exits.
pub struct InMemoryCourtRepository {
    tables: Mutex<MemoryTables>,
    next_entry_id: AtomicI64,
    next_match_id: AtomicI64,
}

impl Default for InMemoryCourtRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCourtRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(MemoryTables {
                next_history_id: 1,
                ..MemoryTables::default()
            }),
            next_entry_id: AtomicI64::new(1),
            next_match_id: AtomicI64::new(1),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, MemoryTables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::StorageError("In-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CourtRepository for InMemoryCourtRepository {
    #[instrument(skip(self))]
    async fn create_court(&self, name: &str) -> Result<Court, AppError> {
        let mut tables = self.tables()?;
        let used: Vec<CourtId> = tables.courts.keys().copied().collect();
        let court = Court {
            id: smallest_free_slot(&used),
            name: name.to_string(),
        };
        tables.courts.insert(court.id, court.clone());

        debug!(court_id = court.id, name = %court.name, "Court created in memory");
        Ok(court)
    }

    #[instrument(skip(self))]
    async fn get_court(&self, court_id: CourtId) -> Result<Option<Court>, AppError> {
        Ok(self.tables()?.courts.get(&court_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_courts(&self) -> Result<Vec<Court>, AppError> {
        Ok(self.tables()?.courts.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn delete_court(&self, court_id: CourtId) -> Result<bool, AppError> {
        let mut tables = self.tables()?;
        if tables.courts.remove(&court_id).is_none() {
            debug!(court_id, "Court not found for deletion in memory");
            return Ok(false);
        }

        tables.queues.remove(&court_id);
        tables.matches.remove(&court_id);
        tables.history.retain(|r| r.court_id != court_id);
        tables.snapshots.clear(court_id);

        info!(court_id, "Court and its data deleted from memory");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn load_state(
        &self,
        court_id: CourtId,
        history_depth: usize,
    ) -> Result<Option<CourtState>, AppError> {
        let tables = self.tables()?;
        let Some(court) = tables.courts.get(&court_id).cloned() else {
            return Ok(None);
        };

        let queue = tables.queues.get(&court_id).cloned().unwrap_or_default();
        let mut recent_history: Vec<HistoryRecord> = tables
            .court_history(court_id)
            .rev()
            .take(history_depth)
            .cloned()
            .collect();
        recent_history.reverse();

        Ok(Some(CourtState {
            court,
            queue: CourtQueue::new(court_id, queue),
            active_match: tables.matches.get(&court_id).cloned(),
            recent_history,
        }))
    }

    #[instrument(skip(self, commit))]
    async fn commit(&self, court_id: CourtId, commit: CourtCommit) -> Result<(), AppError> {
        ensure_contiguous(court_id, &commit.queue)?;

        let mut tables = self.tables()?;
        if !tables.courts.contains_key(&court_id) {
            warn!(court_id, "Commit rejected for unknown court");
            return Err(AppError::court_not_found(court_id));
        }

        // Nothing below can fail, so the commit lands as a whole
        tables.queues.insert(court_id, commit.queue);
        match commit.active_match {
            Some(active) => {
                tables.matches.insert(court_id, active);
            }
            None => {
                tables.matches.remove(&court_id);
            }
        }

        match commit.history {
            HistoryChange::Unchanged => {}
            HistoryChange::Append(record) => {
                let id = tables.next_history_id;
                tables.next_history_id += 1;
                tables.history.push(record.with_id(id));
            }
            HistoryChange::RestoreTail(tail) => {
                let cutoff = tail.first().map(|r| r.id);
                tables.history.retain(|r| {
                    r.court_id != court_id || cutoff.map(|c| r.id < c).unwrap_or(false)
                });
                tables.history.extend(tail);
                tables.history.sort_by_key(|r| r.id);
            }
        }

        match commit.snapshot {
            SnapshotChange::Save(snapshot) => tables.snapshots.save(snapshot),
            SnapshotChange::Discard => tables.snapshots.clear(court_id),
        }

        debug!(court_id, "Commit applied in memory");
        Ok(())
    }

    async fn reserve_ids(&self, sequence: IdSequence, count: usize) -> Result<ReservedIds, AppError> {
        let counter = match sequence {
            IdSequence::QueueEntry => &self.next_entry_id,
            IdSequence::Match => &self.next_match_id,
        };
        let first = counter.fetch_add(count as i64, Ordering::SeqCst);
        Ok(ReservedIds::new((first..first + count as i64).collect()))
    }

    #[instrument(skip(self))]
    async fn get_snapshot(&self, court_id: CourtId) -> Result<Option<UndoSnapshot>, AppError> {
        Ok(self.tables()?.snapshots.peek(court_id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_history(
        &self,
        court_id: Option<CourtId>,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, AppError> {
        let tables = self.tables()?;
        Ok(tables
            .history
            .iter()
            .rev()
            .filter(|r| court_id.map(|id| r.court_id == id).unwrap_or(true))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn recent_match_timestamps(
        &self,
        court_id: CourtId,
        limit: usize,
    ) -> Result<Vec<DateTime<Utc>>, AppError> {
        let tables = self.tables()?;
        Ok(tables
            .court_history(court_id)
            .rev()
            .take(limit)
            .map(|r| r.timestamp)
            .collect())
    }

    #[instrument(skip(self))]
    async fn clear_history(&self, court_id: Option<CourtId>) -> Result<u64, AppError> {
        let mut tables = self.tables()?;
        let before = tables.history.len();
        match court_id {
            Some(id) => tables.history.retain(|r| r.court_id != id),
            None => tables.history.clear(),
        }
        tables.snapshots.forget_history(court_id);
        let removed = (before - tables.history.len()) as u64;

        info!(?court_id, removed, "History cleared in memory");
        Ok(removed)
    }
}

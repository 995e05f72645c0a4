use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::court::models::{Court, CourtState};
use crate::history::models::{HistoryRecord, NewHistoryRecord};
use crate::queue::models::QueueEntry;
use crate::rotation::models::Match;
use crate::shared::{AppError, CourtId};
use crate::undo::UndoSnapshot;

/// Id sequences handed out ahead of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSequence {
    QueueEntry,
    Match,
}

/// Ids reserved from a sequence for one transition
#[derive(Debug, Clone, Default)]
pub struct ReservedIds {
    ids: VecDeque<i64>,
}

impl ReservedIds {
    pub fn new(ids: Vec<i64>) -> Self {
        Self { ids: ids.into() }
    }

    pub fn take_next(&mut self) -> Result<i64, AppError> {
        self.ids
            .pop_front()
            .ok_or_else(|| AppError::StorageError("Reserved id pool exhausted".to_string()))
    }
}

/// History side of a commit
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryChange {
    Unchanged,
    Append(NewHistoryRecord),
    /// Replace the court's history from the first record of the tail onward
    RestoreTail(Vec<HistoryRecord>),
}

/// Undo side of a commit
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotChange {
    Save(UndoSnapshot),
    Discard,
}

/// The complete new state of one court, applied all-or-nothing
#[derive(Debug, Clone, PartialEq)]
pub struct CourtCommit {
    pub queue: Vec<QueueEntry>,
    pub active_match: Option<Match>,
    pub history: HistoryChange,
    pub snapshot: SnapshotChange,
}

/// Durable storage for courts and everything that hangs off them
#[async_trait]
pub trait CourtRepository: Send + Sync {
    /// Creates a court in the smallest free id slot
    async fn create_court(&self, name: &str) -> Result<Court, AppError>;
    async fn get_court(&self, court_id: CourtId) -> Result<Option<Court>, AppError>;
    async fn list_courts(&self) -> Result<Vec<Court>, AppError>;
    /// Deletes a court with its queue, match, history and snapshot
    async fn delete_court(&self, court_id: CourtId) -> Result<bool, AppError>;

    /// Loads queue, match and the last `history_depth` records of a court
    async fn load_state(
        &self,
        court_id: CourtId,
        history_depth: usize,
    ) -> Result<Option<CourtState>, AppError>;

    /// Applies a commit atomically; nothing is written if any part fails
    async fn commit(&self, court_id: CourtId, commit: CourtCommit) -> Result<(), AppError>;

    async fn reserve_ids(&self, sequence: IdSequence, count: usize) -> Result<ReservedIds, AppError>;

    async fn get_snapshot(&self, court_id: CourtId) -> Result<Option<UndoSnapshot>, AppError>;

    /// Newest first, across all courts when `court_id` is `None`
    async fn get_history(
        &self,
        court_id: Option<CourtId>,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, AppError>;

    /// Timestamps of the most recent finished matches of a court
    async fn recent_match_timestamps(
        &self,
        court_id: CourtId,
        limit: usize,
    ) -> Result<Vec<DateTime<Utc>>, AppError>;

    /// Deletes history and empties the history tail of the matching undo snapshots
    async fn clear_history(&self, court_id: Option<CourtId>) -> Result<u64, AppError>;
}

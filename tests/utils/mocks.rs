#![allow(dead_code)] // Test utilities may not all be used in every test

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use courtqueue::{
    court::models::{Court, CourtState},
    event::NotifyError,
    history::models::HistoryRecord,
    store::{CourtCommit, IdSequence, ReservedIds},
    undo::UndoSnapshot,
    AppError, CourtId, CourtRepository, CourtStateListener, CourtStateSnapshot,
    InMemoryCourtRepository,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Listener that keeps every notification for later inspection
#[derive(Clone, Default)]
pub struct RecordingListener {
    snapshots: Arc<RwLock<Vec<CourtStateSnapshot>>>,
    deleted: Arc<RwLock<Vec<CourtId>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshots(&self) -> Vec<CourtStateSnapshot> {
        self.snapshots.read().await.clone()
    }

    pub async fn snapshots_for(&self, court_id: CourtId) -> Vec<CourtStateSnapshot> {
        self.snapshots
            .read()
            .await
            .iter()
            .filter(|s| s.court_id == court_id)
            .cloned()
            .collect()
    }

    pub async fn last_for(&self, court_id: CourtId) -> Option<CourtStateSnapshot> {
        self.snapshots_for(court_id).await.pop()
    }

    pub async fn deleted(&self) -> Vec<CourtId> {
        self.deleted.read().await.clone()
    }

    pub async fn clear(&self) {
        self.snapshots.write().await.clear();
        self.deleted.write().await.clear();
    }
}

#[async_trait]
impl CourtStateListener for RecordingListener {
    async fn on_state_changed(&self, snapshot: &CourtStateSnapshot) -> Result<(), NotifyError> {
        self.snapshots.write().await.push(snapshot.clone());
        Ok(())
    }

    async fn on_court_deleted(&self, court_id: CourtId) -> Result<(), NotifyError> {
        self.deleted.write().await.push(court_id);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "RecordingListener"
    }
}

/// In-memory repository whose commits can be made to fail on demand
#[derive(Clone, Default)]
pub struct FlakyRepository {
    inner: Arc<InMemoryCourtRepository>,
    fail_commits: Arc<AtomicBool>,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CourtRepository for FlakyRepository {
    async fn create_court(&self, name: &str) -> Result<Court, AppError> {
        self.inner.create_court(name).await
    }

    async fn get_court(&self, court_id: CourtId) -> Result<Option<Court>, AppError> {
        self.inner.get_court(court_id).await
    }

    async fn list_courts(&self) -> Result<Vec<Court>, AppError> {
        self.inner.list_courts().await
    }

    async fn delete_court(&self, court_id: CourtId) -> Result<bool, AppError> {
        self.inner.delete_court(court_id).await
    }

    async fn load_state(
        &self,
        court_id: CourtId,
        history_depth: usize,
    ) -> Result<Option<CourtState>, AppError> {
        self.inner.load_state(court_id, history_depth).await
    }

    async fn commit(&self, court_id: CourtId, commit: CourtCommit) -> Result<(), AppError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(AppError::StorageError("connection reset".to_string()));
        }
        self.inner.commit(court_id, commit).await
    }

    async fn reserve_ids(&self, sequence: IdSequence, count: usize) -> Result<ReservedIds, AppError> {
        self.inner.reserve_ids(sequence, count).await
    }

    async fn get_snapshot(&self, court_id: CourtId) -> Result<Option<UndoSnapshot>, AppError> {
        self.inner.get_snapshot(court_id).await
    }

    async fn get_history(
        &self,
        court_id: Option<CourtId>,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, AppError> {
        self.inner.get_history(court_id, limit).await
    }

    async fn recent_match_timestamps(
        &self,
        court_id: CourtId,
        limit: usize,
    ) -> Result<Vec<DateTime<Utc>>, AppError> {
        self.inner.recent_match_timestamps(court_id, limit).await
    }

    async fn clear_history(&self, court_id: Option<CourtId>) -> Result<u64, AppError> {
        self.inner.clear_history(court_id).await
    }
}

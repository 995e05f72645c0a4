use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::locks::CourtLocks;
use super::models::{Court, CourtState};
use crate::config::{EstimatorConfig, RotationConfig};
use crate::estimator::{average_match_duration, estimate_queue, EstimatedEntry};
use crate::event::{CourtStateListener, CourtStateSnapshot};
use crate::history::models::HistoryRecord;
use crate::queue::models::{Direction, Placement, QueueEntry};
use crate::queue::ops::validate_name;
use crate::queue::types::JoinOutcome;
use crate::rotation::engine::RotationEngine;
use crate::rotation::models::{CountAdjustment, Match, Side};
use crate::rotation::types::{AdjustCountResponse, EndMatchResponse};
use crate::shared::{AppError, CourtId};
use crate::store::{
    CourtCommit, CourtRepository, HistoryChange, IdSequence, ReservedIds, SnapshotChange,
};
use crate::undo::UndoSnapshot;

/// Ids a mutation needs from the store before it runs
type Reservation = Option<(IdSequence, usize)>;

/// Orchestrates every court operation
///
/// A mutation holds the court lock while it loads state, saves the undo
/// snapshot, runs the transition and commits, all as one repository commit.
/// Listeners hear about it only after the lock is released.
pub struct CourtService {
    repository: Arc<dyn CourtRepository>,
    listeners: Vec<Arc<dyn CourtStateListener>>,
    engine: RotationEngine,
    estimator: EstimatorConfig,
    locks: CourtLocks,
}

impl CourtService {
    pub fn new(
        repository: Arc<dyn CourtRepository>,
        listeners: Vec<Arc<dyn CourtStateListener>>,
        rotation: RotationConfig,
        estimator: EstimatorConfig,
    ) -> Self {
        Self {
            repository,
            listeners,
            engine: RotationEngine::new(rotation),
            estimator,
            locks: CourtLocks::new(),
        }
    }

    fn history_depth(&self) -> usize {
        self.engine.config().undo_history_depth
    }

    async fn load(&self, court_id: CourtId) -> Result<CourtState, AppError> {
        self.repository
            .load_state(court_id, self.history_depth())
            .await?
            .ok_or(AppError::court_not_found(court_id))
    }

    /// Runs one snapshotting transition on a court and commits it
    async fn mutate<T, F>(
        &self,
        court_id: CourtId,
        reservation: Reservation,
        transition: F,
    ) -> Result<T, AppError>
    where
        T: Send,
        F: FnOnce(
                &mut CourtState,
                &mut ReservedIds,
                DateTime<Utc>,
            ) -> Result<(T, HistoryChange), AppError>
            + Send,
    {
        let guard = self.locks.acquire(court_id).await;

        let mut state = self.load(court_id).await?;
        let now = Utc::now();
        let snapshot = UndoSnapshot::capture(&state, self.history_depth(), now);
        let mut ids = match reservation {
            Some((sequence, count)) => self.repository.reserve_ids(sequence, count).await?,
            None => ReservedIds::default(),
        };

        let (value, history) = transition(&mut state, &mut ids, now)?;

        let commit = CourtCommit {
            queue: state.queue.into_entries(),
            active_match: state.active_match,
            history,
            snapshot: SnapshotChange::Save(snapshot),
        };
        self.repository.commit(court_id, commit).await?;
        drop(guard);

        self.notify_state(court_id).await;
        Ok(value)
    }

    /// Sends the fresh court view to every listener; failures are only logged
    async fn notify_state(&self, court_id: CourtId) {
        let snapshot = match self.court_state(court_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(court_id, error = %e, "Could not build court snapshot for listeners");
                return;
            }
        };

        let snapshot = &snapshot;
        let results = join_all(self.listeners.iter().map(|listener| async move {
            (listener.name(), listener.on_state_changed(snapshot).await)
        }))
        .await;

        for (listener, result) in results {
            if let Err(e) = result {
                warn!(court_id, listener, error = %e, "Court state listener failed");
            }
        }
    }

    async fn notify_deleted(&self, court_id: CourtId) {
        let results = join_all(self.listeners.iter().map(|listener| async move {
            (listener.name(), listener.on_court_deleted(court_id).await)
        }))
        .await;

        for (listener, result) in results {
            if let Err(e) = result {
                warn!(court_id, listener, error = %e, "Court deletion listener failed");
            }
        }
    }

    // Court registry

    #[instrument(skip(self))]
    pub async fn add_court(&self, name: Option<&str>) -> Result<Court, AppError> {
        let name = Court::display_name(name.unwrap_or_default());
        let court = self.repository.create_court(&name).await?;

        info!(court_id = court.id, name = %court.name, "Court added");
        self.notify_state(court.id).await;
        Ok(court)
    }

    #[instrument(skip(self))]
    pub async fn delete_court(&self, court_id: CourtId) -> Result<(), AppError> {
        let guard = self.locks.acquire(court_id).await;
        let deleted = self.repository.delete_court(court_id).await?;
        drop(guard);

        if !deleted {
            return Err(AppError::court_not_found(court_id));
        }

        info!(court_id, "Court deleted");
        self.notify_deleted(court_id).await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_courts(&self) -> Result<Vec<Court>, AppError> {
        let courts = self.repository.list_courts().await?;
        debug!(court_count = courts.len(), "Courts listed");
        Ok(courts)
    }

    #[instrument(skip(self))]
    pub async fn get_court(&self, court_id: CourtId) -> Result<Court, AppError> {
        self.repository
            .get_court(court_id)
            .await?
            .ok_or(AppError::court_not_found(court_id))
    }

    // Queue

    #[instrument(skip(self))]
    pub async fn join_queue(&self, court_id: CourtId, name: &str) -> Result<JoinOutcome, AppError> {
        let name = validate_name(name)?;
        let engine = &self.engine;

        let outcome = self
            .mutate(
                court_id,
                Some((IdSequence::QueueEntry, 1)),
                move |state, ids, now| {
                    let entry = state.queue.enqueue(ids.take_next()?, &name, 0, now)?;
                    let filled = engine.backfill(state, now);
                    let seated = filled > 0 && state.queue.get(entry.id).is_none();
                    Ok((JoinOutcome { entry, seated }, HistoryChange::Unchanged))
                },
            )
            .await?;

        info!(
            court_id,
            entry_id = outcome.entry.id,
            seated = outcome.seated,
            "Joined queue"
        );
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub async fn remove_from_queue(
        &self,
        court_id: CourtId,
        entry_ids: &[i64],
    ) -> Result<Vec<QueueEntry>, AppError> {
        let removed = self
            .mutate(court_id, None, |state, _, _| {
                Ok((state.queue.dequeue(entry_ids)?, HistoryChange::Unchanged))
            })
            .await?;

        info!(court_id, removed = removed.len(), "Removed queue entries");
        Ok(removed)
    }

    #[instrument(skip(self))]
    pub async fn move_queue(
        &self,
        court_id: CourtId,
        entry_id: i64,
        direction: Direction,
    ) -> Result<Vec<QueueEntry>, AppError> {
        self.mutate(court_id, None, |state, _, _| {
            state.queue.swap(entry_id, direction)?;
            Ok((state.queue.entries().to_vec(), HistoryChange::Unchanged))
        })
        .await
    }

    #[instrument(skip(self, placements))]
    pub async fn reorder_queue(
        &self,
        court_id: CourtId,
        placements: &[Placement],
    ) -> Result<Vec<QueueEntry>, AppError> {
        debug!(court_id, placements = placements.len(), "Reordering queue");
        self.mutate(court_id, None, |state, _, _| {
            state.queue.reorder(placements)?;
            Ok((state.queue.entries().to_vec(), HistoryChange::Unchanged))
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn rename_queue_entry(
        &self,
        court_id: CourtId,
        entry_id: i64,
        name: &str,
    ) -> Result<QueueEntry, AppError> {
        self.mutate(court_id, None, |state, _, _| {
            Ok((state.queue.rename(entry_id, name)?, HistoryChange::Unchanged))
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn clear_queue(&self, court_id: CourtId) -> Result<usize, AppError> {
        let removed = self
            .mutate(court_id, None, |state, _, _| {
                Ok((state.queue.clear(), HistoryChange::Unchanged))
            })
            .await?;

        info!(court_id, removed, "Queue cleared");
        Ok(removed)
    }

    // Rotation

    #[instrument(skip(self))]
    pub async fn get_active_match(&self, court_id: CourtId) -> Result<Option<Match>, AppError> {
        Ok(self.load(court_id).await?.active_match)
    }

    #[instrument(skip(self))]
    pub async fn start_match(&self, court_id: CourtId) -> Result<Match, AppError> {
        let engine = &self.engine;
        let started = self
            .mutate(
                court_id,
                Some((IdSequence::Match, 1)),
                move |state, ids, now| {
                    let started = engine.start(state, ids.take_next()?, now)?;
                    Ok((started, HistoryChange::Unchanged))
                },
            )
            .await?;

        info!(court_id, match_id = started.id, "Match started");
        Ok(started)
    }

    #[instrument(skip(self))]
    pub async fn end_match(
        &self,
        court_id: CourtId,
        winner: Option<Side>,
    ) -> Result<EndMatchResponse, AppError> {
        let engine = &self.engine;
        let response = self
            .mutate(
                court_id,
                Some((IdSequence::QueueEntry, 2)),
                move |state, ids, now| {
                    let outcome = engine.end(state, winner, ids, now)?;
                    let response = EndMatchResponse {
                        winner: outcome.winner,
                        loser: outcome.loser,
                        winner_left: outcome.winner_left,
                        active_match: state.active_match.clone(),
                    };
                    Ok((response, HistoryChange::Append(outcome.record)))
                },
            )
            .await?;

        info!(
            court_id,
            winner = %response.winner,
            loser = %response.loser,
            winner_left = response.winner_left,
            "Match ended"
        );
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn reset_match(&self, court_id: CourtId) -> Result<Vec<QueueEntry>, AppError> {
        let engine = &self.engine;
        let requeued = self
            .mutate(
                court_id,
                Some((IdSequence::QueueEntry, 2)),
                move |state, ids, now| Ok((engine.reset(state, ids, now)?, HistoryChange::Unchanged)),
            )
            .await?;

        info!(court_id, requeued = requeued.len(), "Match reset");
        Ok(requeued)
    }

    #[instrument(skip(self))]
    pub async fn adjust_match_count(
        &self,
        court_id: CourtId,
        side: Side,
        adjustment: CountAdjustment,
    ) -> Result<AdjustCountResponse, AppError> {
        let engine = &self.engine;
        let matches_played = self
            .mutate(court_id, None, move |state, _, _| {
                Ok((engine.adjust(state, side, adjustment)?, HistoryChange::Unchanged))
            })
            .await?;

        debug!(court_id, %side, matches_played, "Adjusted side count");
        Ok(AdjustCountResponse {
            side,
            matches_played,
        })
    }

    // Undo

    /// Restores the court to the state before its last mutation
    #[instrument(skip(self))]
    pub async fn undo(&self, court_id: CourtId) -> Result<CourtStateSnapshot, AppError> {
        let guard = self.locks.acquire(court_id).await;

        self.get_court(court_id).await?;
        let snapshot = self
            .repository
            .get_snapshot(court_id)
            .await?
            .ok_or(AppError::NothingToUndo(court_id))?;
        let saved_at = snapshot.saved_at;

        let commit = CourtCommit {
            queue: snapshot.queue,
            active_match: snapshot.active_match,
            history: HistoryChange::RestoreTail(snapshot.recent_history),
            snapshot: SnapshotChange::Discard,
        };
        self.repository.commit(court_id, commit).await?;
        drop(guard);

        info!(court_id, %saved_at, "Court restored from undo snapshot");
        self.notify_state(court_id).await;
        self.court_state(court_id).await
    }

    // History

    #[instrument(skip(self))]
    pub async fn get_history(
        &self,
        court_id: Option<CourtId>,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, AppError> {
        if let Some(court_id) = court_id {
            self.get_court(court_id).await?;
        }
        self.repository.get_history(court_id, limit).await
    }

    /// Deletes match history for one court, or for every court
    ///
    /// Undo snapshots stay, minus their saved history tail, so a later undo
    /// restores queue and match without bringing cleared records back.
    #[instrument(skip(self))]
    pub async fn clear_history(&self, court_id: Option<CourtId>) -> Result<u64, AppError> {
        let affected: Vec<CourtId> = match court_id {
            Some(court_id) => vec![self.get_court(court_id).await?.id],
            None => self
                .repository
                .list_courts()
                .await?
                .iter()
                .map(|c| c.id)
                .collect(),
        };

        let guards = self.locks.acquire_all(&affected).await;
        let removed = self.repository.clear_history(court_id).await?;
        drop(guards);

        info!(?court_id, removed, "History cleared");
        for court_id in affected {
            self.notify_state(court_id).await;
        }
        Ok(removed)
    }

    // Estimates

    async fn average_duration(&self, court_id: CourtId) -> Result<i64, AppError> {
        let timestamps = self
            .repository
            .recent_match_timestamps(court_id, self.estimator.duration_window + 1)
            .await?;
        Ok(average_match_duration(&timestamps, &self.estimator))
    }

    #[instrument(skip(self))]
    pub async fn get_queue_with_estimates(
        &self,
        court_id: CourtId,
    ) -> Result<Vec<EstimatedEntry>, AppError> {
        Ok(self.court_state(court_id).await?.queue)
    }

    /// Queue with estimates, active match and average duration of a court
    #[instrument(skip(self))]
    pub async fn court_state(&self, court_id: CourtId) -> Result<CourtStateSnapshot, AppError> {
        let state = self.load(court_id).await?;
        let average_duration_ms = self.average_duration(court_id).await?;
        let queue = estimate_queue(
            state.queue.entries(),
            state.active_match.as_ref(),
            average_duration_ms,
            Utc::now(),
        );

        Ok(CourtStateSnapshot {
            court_id,
            queue,
            active_match: state.active_match,
            average_duration_ms,
        })
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, info, instrument, warn};

use super::ensure_contiguous;
use super::repository::{
    CourtCommit, CourtRepository, HistoryChange, IdSequence, ReservedIds, SnapshotChange,
};
use crate::court::models::{smallest_free_slot, Court, CourtState};
use crate::history::models::HistoryRecord;
use crate::queue::models::QueueEntry;
use crate::queue::ops::CourtQueue;
use crate::rotation::models::{Match, SideState};
use crate::shared::{AppError, CourtId};
use crate::undo::UndoSnapshot;

const SCHEMA_SQL: &str = include_str!("schema.sql");

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, "{}", context);
        AppError::StorageError(e.to_string())
    }
}

fn entry_from_row(row: &PgRow) -> QueueEntry {
    QueueEntry {
        id: row.get("id"),
        name: row.get("name"),
        matches_played: row.get::<i32, _>("matches_played") as u32,
        position: row.get::<i32, _>("position") as u32,
        court_id: row.get("court_id"),
        joined_at: row.get("joined_at"),
    }
}

fn side_from_row(row: &PgRow, name_col: &str, count_col: &str) -> SideState {
    SideState {
        name: row.get(name_col),
        matches_played: row.get::<i32, _>(count_col) as u32,
    }
}

fn match_from_row(row: &PgRow) -> Match {
    Match {
        id: row.get("id"),
        court_id: row.get("court_id"),
        team_a: side_from_row(row, "team_a_name", "team_a_matches"),
        team_b: side_from_row(row, "team_b_name", "team_b_matches"),
        started_at: row.get("started_at"),
    }
}

fn record_from_row(row: &PgRow) -> HistoryRecord {
    HistoryRecord {
        id: row.get("id"),
        court_id: row.get("court_id"),
        team_a: row.get("team_a"),
        team_b: row.get("team_b"),
        winner: row.get("winner"),
        timestamp: row.get("finished_at"),
        duration_ms: row.get("duration_ms"),
    }
}

/// PostgreSQL implementation of the court repository
pub struct PostgresCourtRepository {
    pool: PgPool,
}

impl PostgresCourtRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates any missing tables and sequences
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        let statements = SCHEMA_SQL
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty());

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to apply schema statement"))?;
        }

        info!("Database schema ensured");
        Ok(())
    }

    async fn replace_queue(
        tx: &mut Transaction<'_, Postgres>,
        court_id: CourtId,
        queue: &[QueueEntry],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM queue_entries WHERE court_id = $1")
            .bind(court_id)
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to clear queue rows"))?;

        for entry in queue {
            sqlx::query(
                "INSERT INTO queue_entries (id, court_id, name, matches_played, position, joined_at) VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(entry.id)
            .bind(court_id)
            .bind(&entry.name)
            .bind(entry.matches_played as i32)
            .bind(entry.position as i32)
            .bind(entry.joined_at)
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to insert queue row"))?;
        }
        Ok(())
    }

    async fn replace_match(
        tx: &mut Transaction<'_, Postgres>,
        court_id: CourtId,
        active_match: Option<&Match>,
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM matches WHERE court_id = $1")
            .bind(court_id)
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to clear match row"))?;

        if let Some(active) = active_match {
            sqlx::query(
                "INSERT INTO matches (id, court_id, team_a_name, team_a_matches, team_b_name, team_b_matches, started_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(active.id)
            .bind(court_id)
            .bind(&active.team_a.name)
            .bind(active.team_a.matches_played as i32)
            .bind(&active.team_b.name)
            .bind(active.team_b.matches_played as i32)
            .bind(active.started_at)
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to insert match row"))?;
        }
        Ok(())
    }

    async fn insert_record(
        tx: &mut Transaction<'_, Postgres>,
        id: Option<i64>,
        record: &HistoryRecord,
    ) -> Result<(), AppError> {
        // A restored record keeps its original id; a new one takes the next serial
        let query = match id {
            Some(_) => "INSERT INTO match_history (id, court_id, team_a, team_b, winner, finished_at, duration_ms) VALUES ($7, $1, $2, $3, $4, $5, $6)",
            None => "INSERT INTO match_history (court_id, team_a, team_b, winner, finished_at, duration_ms) VALUES ($1, $2, $3, $4, $5, $6)",
        };

        let mut statement = sqlx::query(query)
            .bind(record.court_id)
            .bind(&record.team_a)
            .bind(&record.team_b)
            .bind(&record.winner)
            .bind(record.timestamp)
            .bind(record.duration_ms);
        if let Some(id) = id {
            statement = statement.bind(id);
        }

        statement
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to insert history row"))?;
        Ok(())
    }

    async fn apply_history(
        tx: &mut Transaction<'_, Postgres>,
        court_id: CourtId,
        change: HistoryChange,
    ) -> Result<(), AppError> {
        match change {
            HistoryChange::Unchanged => {}
            HistoryChange::Append(record) => {
                Self::insert_record(tx, None, &record.with_id(0)).await?;
            }
            HistoryChange::RestoreTail(tail) => {
                match tail.first() {
                    Some(first) => {
                        sqlx::query("DELETE FROM match_history WHERE court_id = $1 AND id >= $2")
                            .bind(court_id)
                            .bind(first.id)
                            .execute(&mut **tx)
                            .await
                            .map_err(db_error("Failed to trim history rows"))?;
                    }
                    None => {
                        sqlx::query("DELETE FROM match_history WHERE court_id = $1")
                            .bind(court_id)
                            .execute(&mut **tx)
                            .await
                            .map_err(db_error("Failed to trim history rows"))?;
                    }
                }

                for record in &tail {
                    Self::insert_record(tx, Some(record.id), record).await?;
                }
            }
        }
        Ok(())
    }

    async fn apply_snapshot(
        tx: &mut Transaction<'_, Postgres>,
        court_id: CourtId,
        change: SnapshotChange,
    ) -> Result<(), AppError> {
        match change {
            SnapshotChange::Save(snapshot) => {
                let payload = serde_json::to_string(&snapshot)?;
                sqlx::query(
                    "INSERT INTO undo_snapshots (court_id, payload, saved_at) VALUES ($1, $2, $3) \
                     ON CONFLICT (court_id) DO UPDATE SET payload = EXCLUDED.payload, saved_at = EXCLUDED.saved_at",
                )
                .bind(court_id)
                .bind(payload)
                .bind(snapshot.saved_at)
                .execute(&mut **tx)
                .await
                .map_err(db_error("Failed to save undo snapshot"))?;
            }
            SnapshotChange::Discard => {
                sqlx::query("DELETE FROM undo_snapshots WHERE court_id = $1")
                    .bind(court_id)
                    .execute(&mut **tx)
                    .await
                    .map_err(db_error("Failed to discard undo snapshot"))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CourtRepository for PostgresCourtRepository {
    #[instrument(skip(self))]
    async fn create_court(&self, name: &str) -> Result<Court, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Serializes slot selection between concurrent creators
        sqlx::query("LOCK TABLE courts IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to lock courts table"))?;

        let used: Vec<CourtId> = sqlx::query("SELECT id FROM courts")
            .fetch_all(&mut *tx)
            .await
            .map_err(db_error("Failed to read court ids"))?
            .iter()
            .map(|row| row.get("id"))
            .collect();

        let court = Court {
            id: smallest_free_slot(&used),
            name: name.to_string(),
        };
        sqlx::query("INSERT INTO courts (id, name) VALUES ($1, $2)")
            .bind(court.id)
            .bind(&court.name)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to insert court"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit court creation"))?;

        debug!(court_id = court.id, name = %court.name, "Court created in database");
        Ok(court)
    }

    #[instrument(skip(self))]
    async fn get_court(&self, court_id: CourtId) -> Result<Option<Court>, AppError> {
        let row = sqlx::query("SELECT id, name FROM courts WHERE id = $1")
            .bind(court_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch court"))?;

        Ok(row.map(|row| Court {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }

    #[instrument(skip(self))]
    async fn list_courts(&self) -> Result<Vec<Court>, AppError> {
        let rows = sqlx::query("SELECT id, name FROM courts ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list courts"))?;

        Ok(rows
            .iter()
            .map(|row| Court {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_court(&self, court_id: CourtId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM courts WHERE id = $1")
            .bind(court_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete court"))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(court_id, "Court and its data deleted from database");
        } else {
            debug!(court_id, "Court not found for deletion");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn load_state(
        &self,
        court_id: CourtId,
        history_depth: usize,
    ) -> Result<Option<CourtState>, AppError> {
        let Some(court) = self.get_court(court_id).await? else {
            return Ok(None);
        };

        let queue = sqlx::query(
            "SELECT id, court_id, name, matches_played, position, joined_at FROM queue_entries WHERE court_id = $1 ORDER BY position",
        )
        .bind(court_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load queue"))?
        .iter()
        .map(entry_from_row)
        .collect();

        let active_match = sqlx::query(
            "SELECT id, court_id, team_a_name, team_a_matches, team_b_name, team_b_matches, started_at FROM matches WHERE court_id = $1",
        )
        .bind(court_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load match"))?
        .as_ref()
        .map(match_from_row);

        let mut recent_history: Vec<HistoryRecord> = sqlx::query(
            "SELECT id, court_id, team_a, team_b, winner, finished_at, duration_ms FROM match_history WHERE court_id = $1 ORDER BY id DESC LIMIT $2",
        )
        .bind(court_id)
        .bind(history_depth as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load recent history"))?
        .iter()
        .map(record_from_row)
        .collect();
        recent_history.reverse();

        Ok(Some(CourtState {
            court,
            queue: CourtQueue::new(court_id, queue),
            active_match,
            recent_history,
        }))
    }

    #[instrument(skip(self, commit))]
    async fn commit(&self, court_id: CourtId, commit: CourtCommit) -> Result<(), AppError> {
        ensure_contiguous(court_id, &commit.queue)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let exists = sqlx::query("SELECT id FROM courts WHERE id = $1 FOR UPDATE")
            .bind(court_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock court row"))?;
        if exists.is_none() {
            warn!(court_id, "Commit rejected for unknown court");
            return Err(AppError::court_not_found(court_id));
        }

        Self::replace_queue(&mut tx, court_id, &commit.queue).await?;
        Self::replace_match(&mut tx, court_id, commit.active_match.as_ref()).await?;
        Self::apply_history(&mut tx, court_id, commit.history).await?;
        Self::apply_snapshot(&mut tx, court_id, commit.snapshot).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit court transaction"))?;

        debug!(court_id, "Commit applied in database");
        Ok(())
    }

    async fn reserve_ids(&self, sequence: IdSequence, count: usize) -> Result<ReservedIds, AppError> {
        if count == 0 {
            return Ok(ReservedIds::default());
        }

        let query = match sequence {
            IdSequence::QueueEntry => {
                "SELECT nextval('queue_entry_ids') AS id FROM generate_series(1, $1)"
            }
            IdSequence::Match => "SELECT nextval('match_ids') AS id FROM generate_series(1, $1)",
        };
        let ids = sqlx::query(query)
            .bind(count as i32)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to reserve ids"))?
            .iter()
            .map(|row| row.get("id"))
            .collect();

        Ok(ReservedIds::new(ids))
    }

    #[instrument(skip(self))]
    async fn get_snapshot(&self, court_id: CourtId) -> Result<Option<UndoSnapshot>, AppError> {
        let row = sqlx::query("SELECT payload FROM undo_snapshots WHERE court_id = $1")
            .bind(court_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch undo snapshot"))?;

        match row {
            Some(row) => {
                let payload: String = row.get("payload");
                Ok(Some(serde_json::from_str(&payload)?))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn get_history(
        &self,
        court_id: Option<CourtId>,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, AppError> {
        let rows = sqlx::query(
            "SELECT id, court_id, team_a, team_b, winner, finished_at, duration_ms FROM match_history \
             WHERE ($1::BIGINT IS NULL OR court_id = $1) ORDER BY id DESC LIMIT $2",
        )
        .bind(court_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch history"))?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn recent_match_timestamps(
        &self,
        court_id: CourtId,
        limit: usize,
    ) -> Result<Vec<DateTime<Utc>>, AppError> {
        let rows = sqlx::query(
            "SELECT finished_at FROM match_history WHERE court_id = $1 ORDER BY id DESC LIMIT $2",
        )
        .bind(court_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch match timestamps"))?;

        Ok(rows.iter().map(|row| row.get("finished_at")).collect())
    }

    #[instrument(skip(self))]
    async fn clear_history(&self, court_id: Option<CourtId>) -> Result<u64, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let result = sqlx::query("DELETE FROM match_history WHERE ($1::BIGINT IS NULL OR court_id = $1)")
            .bind(court_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear history"))?;

        // Saved snapshots keep their queue and match but lose the history tail
        sqlx::query(
            "UPDATE undo_snapshots \
             SET payload = jsonb_set(payload::jsonb, '{recent_history}', '[]'::jsonb)::text \
             WHERE ($1::BIGINT IS NULL OR court_id = $1)",
        )
        .bind(court_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to drop history from undo snapshots"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        let removed = result.rows_affected();
        info!(?court_id, removed, "History cleared in database");
        Ok(removed)
    }
}

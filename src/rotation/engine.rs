use chrono::{DateTime, Utc};
use strum::IntoEnumIterator;
use tracing::debug;

use super::models::{CountAdjustment, Match, Side, SideState};
use crate::config::RotationConfig;
use crate::court::models::CourtState;
use crate::history::models::NewHistoryRecord;
use crate::queue::models::QueueEntry;
use crate::shared::AppError;
use crate::store::ReservedIds;

/// What happened when a match ended
#[derive(Debug, Clone, PartialEq)]
pub struct EndOutcome {
    pub record: NewHistoryRecord,
    pub winner: String,
    pub loser: String,
    /// The winner reached the win-out threshold and went back to the queue
    pub winner_left: bool,
}

/// Pure state transitions between queue, match slot and history
///
/// Every method works on an in-memory `CourtState`; persisting the result is
/// the caller's job, so a failed transition never leaves partial writes.
#[derive(Debug, Clone, Default)]
pub struct RotationEngine {
    config: RotationConfig,
}

impl RotationEngine {
    pub fn new(config: RotationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// Pulls the first two queue entries onto the court
    pub fn start(
        &self,
        state: &mut CourtState,
        match_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Match, AppError> {
        let court_id = state.court_id();
        if state.active_match.is_some() {
            return Err(AppError::MatchAlreadyActive(court_id));
        }
        if state.queue.len() < 2 {
            return Err(AppError::InsufficientQueue {
                court_id,
                available: state.queue.len(),
            });
        }

        let mut pulled = state.queue.take_front(2).into_iter();
        let (first, second) = match (pulled.next(), pulled.next()) {
            (Some(first), Some(second)) => (first, second),
            _ => {
                return Err(AppError::InsufficientQueue {
                    court_id,
                    available: 0,
                })
            }
        };

        let new_match = Match {
            id: match_id,
            court_id,
            team_a: SideState::occupied(first.name, first.matches_played),
            team_b: SideState::occupied(second.name, second.matches_played),
            started_at: now,
        };
        state.active_match = Some(new_match.clone());
        Ok(new_match)
    }

    /// Records the result and rotates players according to the win-out rule
    pub fn end(
        &self,
        state: &mut CourtState,
        winner_side: Option<Side>,
        ids: &mut ReservedIds,
        now: DateTime<Utc>,
    ) -> Result<EndOutcome, AppError> {
        let court_id = state.court_id();
        let current = state
            .active_match
            .clone()
            .ok_or(AppError::NoActiveMatch(court_id))?;
        let winner_side = winner_side.ok_or(AppError::NoWinnerSpecified)?;

        let (team_a, team_b) = match (&current.team_a.name, &current.team_b.name) {
            (Some(a), Some(b)) => (a.clone(), b.clone()),
            _ => return Err(AppError::IncompleteMatch(court_id)),
        };

        let winner_state = current.side(winner_side);
        let winner = winner_state.name.clone().unwrap_or_default();
        let loser = current
            .side(winner_side.opponent())
            .name
            .clone()
            .unwrap_or_default();
        let winner_streak = winner_state.matches_played + 1;
        let duration_ms = (now - current.started_at).num_milliseconds().max(0);

        let record = NewHistoryRecord {
            court_id,
            team_a,
            team_b,
            winner: winner.clone(),
            timestamp: now,
            duration_ms,
        };

        // Replacements come from entries that were already waiting; the
        // rotated-out teams queue up behind them.
        let winner_left = winner_streak >= self.config.win_out_threshold;
        let need = if winner_left { 2 } else { 1 };
        let mut pulled = state
            .queue
            .take_front(need)
            .into_iter()
            .map(|entry| SideState::occupied(entry.name, entry.matches_played));

        state.queue.enqueue(ids.take_next()?, &loser, 0, now)?;
        if winner_left {
            state.queue.enqueue(ids.take_next()?, &winner, 0, now)?;
        }

        let (team_a, team_b) = if winner_left {
            (
                pulled.next().unwrap_or_default(),
                pulled.next().unwrap_or_default(),
            )
        } else {
            let staying = SideState::occupied(winner.clone(), winner_streak);
            let challenger = pulled.next().unwrap_or_default();
            match winner_side {
                Side::A => (staying, challenger),
                Side::B => (challenger, staying),
            }
        };

        debug!(
            court_id,
            winner = %winner,
            loser = %loser,
            winner_streak,
            winner_left,
            "Rotated court after match end"
        );

        state.active_match = Some(Match {
            id: current.id,
            court_id,
            team_a,
            team_b,
            started_at: now,
        });

        Ok(EndOutcome {
            record,
            winner,
            loser,
            winner_left,
        })
    }

    /// Sends both occupants back to the queue and clears the match slot
    pub fn reset(
        &self,
        state: &mut CourtState,
        ids: &mut ReservedIds,
        now: DateTime<Utc>,
    ) -> Result<Vec<QueueEntry>, AppError> {
        let court_id = state.court_id();
        let current = state
            .active_match
            .take()
            .ok_or(AppError::NoActiveMatch(court_id))?;

        let mut requeued = Vec::new();
        for side in Side::iter() {
            if let Some(name) = current.side(side).name.as_deref() {
                if name.trim().is_empty() {
                    continue;
                }
                requeued.push(state.queue.enqueue(ids.take_next()?, name, 0, now)?);
            }
        }
        Ok(requeued)
    }

    /// Adds or removes one win from a side's streak counter
    pub fn adjust(
        &self,
        state: &mut CourtState,
        side: Side,
        adjustment: CountAdjustment,
    ) -> Result<u32, AppError> {
        let court_id = state.court_id();
        let current = state
            .active_match
            .as_mut()
            .ok_or(AppError::NoActiveMatch(court_id))?;

        let side_state = current.side_mut(side);
        let updated = i64::from(side_state.matches_played) + adjustment.delta();
        if updated < 0 {
            return Err(AppError::InvalidDecrement { side });
        }
        side_state.matches_played = u32::try_from(updated)
            .map_err(|_| AppError::InvalidInput(format!("Side {} count is at its maximum", side)))?;
        Ok(side_state.matches_played)
    }

    /// Fills empty sides of the active match from the front of the queue
    ///
    /// Returns how many sides were filled. The match clock restarts once the
    /// court is complete again.
    pub fn backfill(&self, state: &mut CourtState, now: DateTime<Utc>) -> usize {
        let Some(current) = state.active_match.as_mut() else {
            return 0;
        };

        let mut filled = 0;
        for side in Side::iter() {
            if !current.side(side).is_empty() {
                continue;
            }
            let Some(entry) = state.queue.take_front(1).into_iter().next() else {
                break;
            };
            *current.side_mut(side) = SideState::occupied(entry.name, entry.matches_played);
            filled += 1;
        }

        if filled > 0 && current.is_complete() {
            current.started_at = now;
        }
        filled
    }
}

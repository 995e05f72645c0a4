use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use super::models::{Direction, Placement, QueueEntry};
use crate::shared::{AppError, CourtId};

/// Trims a display name and rejects it when nothing is left
pub fn validate_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

/// Ordered waiting list of a single court
///
/// Entries are always held sorted by position, and every mutating method
/// leaves positions as the dense sequence `1..=len`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CourtQueue {
    court_id: CourtId,
    entries: Vec<QueueEntry>,
}

impl CourtQueue {
    /// Builds a queue from stored rows; rows may arrive in any order
    pub fn new(court_id: CourtId, mut entries: Vec<QueueEntry>) -> Self {
        entries.sort_by_key(|e| e.position);
        Self { court_id, entries }
    }

    pub fn court_id(&self) -> CourtId {
        self.court_id
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<QueueEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, entry_id: i64) -> Option<&QueueEntry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    fn next_position(&self) -> u32 {
        self.entries.iter().map(|e| e.position).max().unwrap_or(0) + 1
    }

    /// Appends an entry at the back of the queue
    pub fn enqueue(
        &mut self,
        id: i64,
        name: &str,
        matches_played: u32,
        joined_at: DateTime<Utc>,
    ) -> Result<QueueEntry, AppError> {
        let name = validate_name(name)?;
        let entry = QueueEntry {
            id,
            name,
            matches_played,
            position: self.next_position(),
            court_id: self.court_id,
            joined_at,
        };
        self.entries.push(entry.clone());
        self.renormalize();
        Ok(entry)
    }

    /// Removes entries by id; nothing is removed if any id is unknown
    pub fn dequeue(&mut self, ids: &[i64]) -> Result<Vec<QueueEntry>, AppError> {
        if let Some(missing) = ids.iter().find(|id| self.get(**id).is_none()) {
            return Err(AppError::entry_not_found(self.court_id, *missing));
        }

        let wanted: HashSet<i64> = ids.iter().copied().collect();
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| wanted.contains(&e.id));
        self.entries = kept;
        self.renormalize();
        Ok(removed)
    }

    /// Reassigns positions `1..=len` keeping the current relative order
    pub fn renormalize(&mut self) {
        // Stable sort: entries sharing a position keep their stored order
        self.entries.sort_by_key(|e| e.position);
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            entry.position = idx as u32 + 1;
        }
    }

    /// Applies caller-supplied positions, then renormalizes
    pub fn reorder(&mut self, placements: &[Placement]) -> Result<(), AppError> {
        if let Some(missing) = placements.iter().find(|p| self.get(p.id).is_none()) {
            return Err(AppError::entry_not_found(self.court_id, missing.id));
        }

        let assigned: HashMap<i64, u32> = placements.iter().map(|p| (p.id, p.position)).collect();
        for entry in self.entries.iter_mut() {
            if let Some(position) = assigned.get(&entry.id) {
                entry.position = *position;
            }
        }
        self.renormalize();
        Ok(())
    }

    /// Swaps an entry with its neighbour above or below
    pub fn swap(&mut self, entry_id: i64, direction: Direction) -> Result<(), AppError> {
        let current = self
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| AppError::entry_not_found(self.court_id, entry_id))?;

        let current_position = self.entries[current].position;
        let neighbour = direction
            .neighbour_of(current_position)
            .and_then(|pos| self.entries.iter().position(|e| e.position == pos))
            .ok_or(AppError::BoundaryError {
                entry_id,
                direction,
            })?;

        let neighbour_position = self.entries[neighbour].position;
        self.entries[current].position = neighbour_position;
        self.entries[neighbour].position = current_position;
        self.renormalize();
        Ok(())
    }

    pub fn rename(&mut self, entry_id: i64, name: &str) -> Result<QueueEntry, AppError> {
        let name = validate_name(name)?;
        let court_id = self.court_id;
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| AppError::entry_not_found(court_id, entry_id))?;
        entry.name = name;
        Ok(entry.clone())
    }

    /// Empties the queue, returning how many entries were dropped
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// Pops up to `count` entries from the front in FIFO order
    pub fn take_front(&mut self, count: usize) -> Vec<QueueEntry> {
        let count = count.min(self.entries.len());
        let taken: Vec<QueueEntry> = self.entries.drain(..count).collect();
        self.renormalize();
        taken
    }
}

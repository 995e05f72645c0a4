use std::collections::HashMap;

use super::models::UndoSnapshot;
use crate::shared::CourtId;

/// One overwrite-on-save undo slot per court
#[derive(Debug, Default, Clone)]
pub struct SnapshotStore {
    slots: HashMap<CourtId, UndoSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever the court's slot held
    pub fn save(&mut self, snapshot: UndoSnapshot) {
        self.slots.insert(snapshot.court_id, snapshot);
    }

    pub fn peek(&self, court_id: CourtId) -> Option<&UndoSnapshot> {
        self.slots.get(&court_id)
    }

    /// Empties the saved history tail of one court's slot, or of every slot
    ///
    /// Queue and match stay restorable; undo then leaves history empty.
    pub fn forget_history(&mut self, court_id: Option<CourtId>) {
        for (id, snapshot) in self.slots.iter_mut() {
            if court_id.map_or(true, |court_id| court_id == *id) {
                snapshot.recent_history.clear();
            }
        }
    }

    pub fn clear(&mut self, court_id: CourtId) {
        self.slots.remove(&court_id);
    }
}

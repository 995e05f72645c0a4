use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::shared::CourtId;

/// One writer lock per court
///
/// Mutations on the same court run one after another; different courts never
/// contend. Entries are kept after a court is deleted because ids are reused.
#[derive(Debug, Default)]
pub struct CourtLocks {
    locks: Mutex<HashMap<CourtId, Arc<Mutex<()>>>>,
}

impl CourtLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock_for(&self, court_id: CourtId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(court_id).or_default().clone()
    }

    /// Waits until this court has no other writer
    pub async fn acquire(&self, court_id: CourtId) -> OwnedMutexGuard<()> {
        self.lock_for(court_id).await.lock_owned().await
    }

    /// Takes the locks of several courts in ascending id order
    pub async fn acquire_all(&self, court_ids: &[CourtId]) -> Vec<OwnedMutexGuard<()>> {
        let mut ordered = court_ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut guards = Vec::with_capacity(ordered.len());
        for court_id in ordered {
            guards.push(self.acquire(court_id).await);
        }
        guards
    }
}

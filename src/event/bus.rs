use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::{CourtEvent, CourtStateSnapshot};
use super::listener::{CourtStateListener, NotifyError};
use crate::shared::CourtId;

/// Broadcasts court events to in-process subscribers
///
/// Each court gets its own channel, created on first use. A separate channel
/// carries every event for subscribers that watch all courts.
#[derive(Debug, Clone)]
pub struct EventBus {
    capacity: usize,
    court_channels: Arc<RwLock<HashMap<CourtId, broadcast::Sender<CourtEvent>>>>,
    all_courts: broadcast::Sender<CourtEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (all_courts, _) = broadcast::channel(capacity);
        Self {
            capacity,
            court_channels: Arc::new(RwLock::new(HashMap::new())),
            all_courts,
        }
    }

    /// Emits an event to the subscribers of its court and of all courts
    pub async fn emit(&self, event: CourtEvent) {
        let court_id = event.court_id();
        let event_type = event.event_type();

        if self.all_courts.send(event.clone()).is_err() {
            debug!(court_id, event_type, "No subscribers for all courts");
        }

        let court_channels = self.court_channels.read().await;
        match court_channels.get(&court_id) {
            Some(sender) => match sender.send(event) {
                Ok(receivers) => {
                    debug!(court_id, event_type, receivers, "Court event emitted");
                }
                Err(_) => {
                    debug!(court_id, event_type, "Court event emitted with no receivers");
                }
            },
            None => debug!(court_id, event_type, "No court channel yet, event dropped"),
        }
    }

    /// Subscribe to events for a specific court
    pub async fn subscribe(&self, court_id: CourtId) -> broadcast::Receiver<CourtEvent> {
        let court_channels = self.court_channels.read().await;
        if let Some(sender) = court_channels.get(&court_id) {
            return sender.subscribe();
        }
        drop(court_channels);

        debug!(court_id, "Creating new court channel for subscription");
        let mut court_channels = self.court_channels.write().await;
        court_channels
            .entry(court_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Subscribe to events of every court
    pub fn subscribe_all(&self) -> broadcast::Receiver<CourtEvent> {
        self.all_courts.subscribe()
    }

    /// Drops the channel of a deleted court; its receivers see the stream close
    async fn close_court(&self, court_id: CourtId) {
        if self.court_channels.write().await.remove(&court_id).is_some() {
            debug!(court_id, "Court channel closed");
        }
    }
}

#[async_trait]
impl CourtStateListener for EventBus {
    async fn on_state_changed(&self, snapshot: &CourtStateSnapshot) -> Result<(), NotifyError> {
        self.emit(CourtEvent::StateChanged(snapshot.clone())).await;
        Ok(())
    }

    async fn on_court_deleted(&self, court_id: CourtId) -> Result<(), NotifyError> {
        self.emit(CourtEvent::CourtDeleted { court_id }).await;
        self.close_court(court_id).await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "EventBus"
    }
}

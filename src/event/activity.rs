use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::bus::EventBus;
use super::events::CourtEvent;

/// Spawns a background task that logs every court event on the bus
pub fn spawn_activity_log(event_bus: &EventBus) -> JoinHandle<()> {
    let mut receiver = event_bus.subscribe_all();

    tokio::spawn(async move {
        info!("Court activity log started");

        loop {
            match receiver.recv().await {
                Ok(CourtEvent::StateChanged(snapshot)) => {
                    info!(
                        court_id = snapshot.court_id,
                        queued = snapshot.queue.len(),
                        playing = snapshot.active_match.is_some(),
                        average_duration_ms = snapshot.average_duration_ms,
                        "Court state changed"
                    );
                }
                Ok(CourtEvent::CourtDeleted { court_id }) => {
                    info!(court_id, "Court deleted");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Court activity log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }

        warn!("Court activity log ended - no more events");
    })
}

use async_trait::async_trait;
use thiserror::Error;

use super::events::CourtStateSnapshot;
use crate::shared::CourtId;

/// Errors a listener may report; they are logged, never propagated
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Listener unavailable: {0}")]
    Unavailable(String),

    #[error("Listener rejected notification: {0}")]
    Rejected(String),
}

/// Observer of committed court state
///
/// Called after the mutation is durable and the court lock is released, so a
/// slow or failing listener never affects the outcome of the operation.
#[async_trait]
pub trait CourtStateListener: Send + Sync {
    async fn on_state_changed(&self, snapshot: &CourtStateSnapshot) -> Result<(), NotifyError>;

    async fn on_court_deleted(&self, _court_id: CourtId) -> Result<(), NotifyError> {
        Ok(())
    }

    /// Name used in log fields
    fn name(&self) -> &'static str;
}

/// Listener that ignores every notification
pub struct NoOpListener;

#[async_trait]
impl CourtStateListener for NoOpListener {
    async fn on_state_changed(&self, _snapshot: &CourtStateSnapshot) -> Result<(), NotifyError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "NoOpListener"
    }
}

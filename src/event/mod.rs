// Post-commit notification of court state changes
//
// The court service calls every registered `CourtStateListener` after a
// mutation commits. `EventBus` is the in-process listener that fans events out
// to per-court broadcast channels.

pub use activity::spawn_activity_log;
pub use bus::EventBus;
pub use events::{CourtEvent, CourtStateSnapshot};
pub use listener::{CourtStateListener, NoOpListener, NotifyError};

mod activity;
mod bus;
mod events;
mod listener;

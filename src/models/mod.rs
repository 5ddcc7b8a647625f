// Declare modules
pub mod event;
pub mod reminder;
pub mod sync;

// Flatten so callers can `use crate::models::EventLite`.
pub use event::EventLite;
pub use reminder::{notification_id, ReminderInstance, ReminderState};
pub use sync::{EventSyncOutcome, ReminderSyncResult};

// Reminder engine
// Computes reminder instances, schedules them through the platform and tracks them in the index

pub mod format;
pub mod index;
pub mod instances;
pub mod manager;
pub mod platform;
pub mod refresh;

pub use format::{EnglishReminderFormatter, ReminderFormatter};
pub use index::ReminderIndex;
pub use instances::{anchor_instant, compute_instances, MAX_LEAD_MINUTES};
pub use manager::{sync_reminders_for_event, ReminderManager, SyncContext};
pub use platform::{InMemoryScheduler, LoggingScheduler, ReminderPermissions, ReminderScheduler, StaticPermissions};
pub use refresh::{run_rolling_refresh, RefreshEvent, RollingRefresh};

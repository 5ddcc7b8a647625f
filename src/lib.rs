// remindsync library
// Local reminder synchronization for calendar events

pub mod calendar;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod reminders;
pub mod utils;

// Re-export commonly used types
pub use calendar::{CalendarDefaults, EventSource, StaticEventSource};
pub use config::AppConfig;
pub use database::{Database, KeyValueStore, MemoryKeyValueStore};
pub use error::{AppError, AppResult};
pub use models::*;
pub use reminders::{ReminderIndex, ReminderManager};

// file: src/models/sync.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of syncing one event against the platform and the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventSyncOutcome {
    /// Instances the platform accepted.
    pub scheduled: usize,
    /// Instances the platform rejected. They stay indexed and are retried on the next sync.
    pub rejected: usize,
    /// An existing index entry was dropped because no instances are desired anymore.
    pub cleared: bool,
}

/// Outcome of one multi-event reminder sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSyncResult {
    pub events_synced: usize,
    /// Registrations the platform accepted.
    pub instances_scheduled: usize,
    pub instances_rejected: usize,
    /// Index entries removed because their event no longer wants reminders.
    pub entries_cleared: usize,
    pub events_failed: usize,
    /// Set when reminders were disabled and nothing was touched.
    pub skipped: bool,
    pub sync_time: DateTime<Utc>,
}

impl ReminderSyncResult {
    pub fn empty() -> Self {
        Self {
            events_synced: 0,
            instances_scheduled: 0,
            instances_rejected: 0,
            entries_cleared: 0,
            events_failed: 0,
            skipped: false,
            sync_time: Utc::now(),
        }
    }

    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::empty()
        }
    }

    /// Folds one event's outcome in; `None` marks an event whose sync failed.
    pub fn record(&mut self, outcome: Option<EventSyncOutcome>) {
        match outcome {
            Some(outcome) => {
                self.events_synced += 1;
                self.instances_scheduled += outcome.scheduled;
                self.instances_rejected += outcome.rejected;
                if outcome.cleared {
                    self.entries_cleared += 1;
                }
            }
            None => self.events_failed += 1,
        }
    }
}

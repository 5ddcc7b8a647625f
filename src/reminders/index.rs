//! Persisted record of which reminder instances are believed scheduled.
//!
//! Layout in the key-value store:
//! - `reminders.index.event.<event_id>`: JSON array of [`ReminderInstance`]
//! - `reminders.index.events`: JSON array of tracked event ids
//!
//! Only events with at least one instance are tracked. Unreadable stored data
//! is logged and treated as empty rather than surfaced to callers. Bulk
//! clearing also scans for per-event keys, so a damaged id list cannot leave
//! entries behind.

use crate::database::KeyValueStore;
use crate::error::AppResult;
use crate::models::ReminderInstance;
use crate::utils::logging;
use log::warn;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;

const EVENT_KEY_PREFIX: &str = "reminders.index.event.";
const TRACKED_EVENTS_KEY: &str = "reminders.index.events";

pub struct ReminderIndex {
    store: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write of the tracked id list across events.
    tracked_lock: Mutex<()>,
}

impl ReminderIndex {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            tracked_lock: Mutex::new(()),
        }
    }

    /// Instances recorded for `event_id`; empty when untracked or unreadable.
    pub async fn get_by_event(&self, event_id: &str) -> Vec<ReminderInstance> {
        self.read_list(&event_key(event_id)).await
    }

    /// Replaces the entry for `event_id`. An empty list removes it.
    pub async fn put(&self, event_id: &str, instances: &[ReminderInstance]) -> AppResult<()> {
        if instances.is_empty() {
            return self.remove(event_id).await;
        }

        let encoded = serde_json::to_string(instances)?;
        self.store.set(&event_key(event_id), &encoded).await?;

        let _guard = self.tracked_lock.lock().await;
        let mut tracked = self.tracked_ids().await;
        if !tracked.iter().any(|id| id == event_id) {
            tracked.push(event_id.to_string());
            self.write_tracked(&tracked).await?;
        }

        logging::log_index_operation("put", event_id, instances.len());
        Ok(())
    }

    pub async fn remove(&self, event_id: &str) -> AppResult<()> {
        self.store.remove(&event_key(event_id)).await?;

        let _guard = self.tracked_lock.lock().await;
        let mut tracked = self.tracked_ids().await;
        let before = tracked.len();
        tracked.retain(|id| id != event_id);
        if tracked.len() != before {
            self.write_tracked(&tracked).await?;
        }

        logging::log_index_operation("remove", event_id, 0);
        Ok(())
    }

    /// Every event id currently holding at least one instance.
    pub async fn get_all_events(&self) -> Vec<String> {
        self.tracked_ids().await
    }

    /// Tracked ids plus any id that still has a stored entry without being tracked.
    pub async fn stored_event_ids(&self) -> Vec<String> {
        let mut ids = self.tracked_ids().await;
        match self.store.keys_with_prefix(EVENT_KEY_PREFIX).await {
            Ok(keys) => {
                for id in keys.iter().filter_map(|key| key.strip_prefix(EVENT_KEY_PREFIX)) {
                    if !ids.iter().any(|known| known == id) {
                        warn!("Reminder index entry for {} is not tracked", id);
                        ids.push(id.to_string());
                    }
                }
            }
            Err(e) => warn!("Reminder index key scan failed, using tracked ids only: {}", e),
        }
        ids
    }

    pub async fn clear(&self) -> AppResult<()> {
        let _guard = self.tracked_lock.lock().await;
        for event_id in self.stored_event_ids().await {
            self.store.remove(&event_key(&event_id)).await?;
        }
        self.store.remove(TRACKED_EVENTS_KEY).await?;

        logging::log_index_operation("clear", "*", 0);
        Ok(())
    }

    async fn tracked_ids(&self) -> Vec<String> {
        self.read_list(TRACKED_EVENTS_KEY).await
    }

    async fn write_tracked(&self, tracked: &[String]) -> AppResult<()> {
        if tracked.is_empty() {
            self.store.remove(TRACKED_EVENTS_KEY).await
        } else {
            self.store
                .set(TRACKED_EVENTS_KEY, &serde_json::to_string(tracked)?)
                .await
        }
    }

    async fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Reminder index read of '{}' failed, treating as empty: {}", key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!("Malformed reminder index data under '{}', treating as empty: {}", key, e);
                Vec::new()
            }
        }
    }
}

fn event_key(event_id: &str) -> String {
    format!("{}{}", EVENT_KEY_PREFIX, event_id)
}

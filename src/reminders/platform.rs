// Platform notification boundary
// One capability trait per concern; a concrete implementation is chosen at startup

use crate::error::{AppError, AppResult};
use crate::models::ReminderInstance;
use async_trait::async_trait;
use log::info;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[cfg(test)]
use mockall::automock;

/// Registers and removes timed local notifications.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReminderScheduler: Send + Sync {
    /// Registers one notification whose platform id is `instance.notification_id`.
    async fn schedule(&self, instance: &ReminderInstance) -> AppResult<()>;

    /// Removes pending and already-delivered notifications for the given instances.
    async fn cancel_by_event(&self, event_id: &str, instances: &[ReminderInstance]) -> AppResult<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReminderPermissions: Send + Sync {
    async fn has_permissions(&self) -> bool;
    async fn request_permissions(&self) -> bool;
    async fn open_permission_settings(&self) -> AppResult<()>;
}

/// Headless scheduler that only logs what it would register.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingScheduler;

#[async_trait]
impl ReminderScheduler for LoggingScheduler {
    async fn schedule(&self, instance: &ReminderInstance) -> AppResult<()> {
        info!(
            "[Scheduler] #{} '{}' at {} ({})",
            instance.notification_id, instance.title, instance.fire_at, instance.body
        );
        Ok(())
    }

    async fn cancel_by_event(&self, event_id: &str, instances: &[ReminderInstance]) -> AppResult<()> {
        info!("[Scheduler] cancel {} reminder(s) for event {}", instances.len(), event_id);
        Ok(())
    }
}

/// Keeps pending notifications in memory, keyed by notification id.
///
/// Ids listed through `fail_on` are rejected by `schedule`, mimicking a
/// platform that refuses individual registrations.
#[derive(Debug, Default)]
pub struct InMemoryScheduler {
    pending: Mutex<BTreeMap<i32, ReminderInstance>>,
    failing: Mutex<HashSet<i32>>,
    schedule_calls: Mutex<usize>,
    cancel_calls: Mutex<Vec<String>>,
}

impl InMemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, notification_id: i32) {
        lock(&self.failing).insert(notification_id);
    }

    pub fn pending(&self) -> Vec<ReminderInstance> {
        lock(&self.pending).values().cloned().collect()
    }

    pub fn pending_for(&self, event_id: &str) -> Vec<ReminderInstance> {
        lock(&self.pending)
            .values()
            .filter(|instance| instance.event_id == event_id)
            .cloned()
            .collect()
    }

    pub fn schedule_calls(&self) -> usize {
        *lock(&self.schedule_calls)
    }

    /// Event ids passed to `cancel_by_event`, in call order.
    pub fn cancel_calls(&self) -> Vec<String> {
        lock(&self.cancel_calls).clone()
    }
}

// A poisoned lock only means another test thread panicked; the data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ReminderScheduler for InMemoryScheduler {
    async fn schedule(&self, instance: &ReminderInstance) -> AppResult<()> {
        *lock(&self.schedule_calls) += 1;
        if lock(&self.failing).contains(&instance.notification_id) {
            return Err(AppError::scheduler(format!(
                "platform rejected notification {}",
                instance.notification_id
            )));
        }
        lock(&self.pending).insert(instance.notification_id, instance.clone());
        Ok(())
    }

    async fn cancel_by_event(&self, event_id: &str, instances: &[ReminderInstance]) -> AppResult<()> {
        lock(&self.cancel_calls).push(event_id.to_string());
        let mut pending = lock(&self.pending);
        for instance in instances {
            pending.remove(&instance.notification_id);
        }
        Ok(())
    }
}

/// Permissions fixed at construction; `request_permissions` grants only if `grant_on_request`.
#[derive(Debug)]
pub struct StaticPermissions {
    granted: AtomicBool,
    grant_on_request: bool,
}

impl StaticPermissions {
    pub fn new(granted: bool, grant_on_request: bool) -> Self {
        Self {
            granted: AtomicBool::new(granted),
            grant_on_request,
        }
    }

    pub fn granted() -> Self {
        Self::new(true, true)
    }

    pub fn denied() -> Self {
        Self::new(false, false)
    }
}

#[async_trait]
impl ReminderPermissions for StaticPermissions {
    async fn has_permissions(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    async fn request_permissions(&self) -> bool {
        if self.grant_on_request {
            self.granted.store(true, Ordering::SeqCst);
        }
        self.granted.load(Ordering::SeqCst)
    }

    async fn open_permission_settings(&self) -> AppResult<()> {
        info!("No system settings screen available for static permissions");
        Ok(())
    }
}

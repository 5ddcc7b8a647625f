use crate::calendar::{CalendarDefaults, EventSource};
use crate::config::DEFAULT_ALL_DAY_ANCHOR_HOUR;
use crate::error::{AppError, AppResult};
use crate::models::{EventLite, EventSyncOutcome, ReminderState, ReminderSyncResult};
use crate::reminders::format::{EnglishReminderFormatter, ReminderFormatter};
use crate::reminders::index::ReminderIndex;
use crate::reminders::instances::compute_instances;
use crate::reminders::platform::{ReminderPermissions, ReminderScheduler};
use crate::utils::logging;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Collaborators and policy for a single-event sync.
pub struct SyncContext<'a> {
    pub scheduler: &'a dyn ReminderScheduler,
    pub index: &'a ReminderIndex,
    pub formatter: &'a dyn ReminderFormatter,
    pub all_day_anchor_hour: u32,
    pub now: DateTime<Utc>,
}

/// Brings one event's scheduled reminders in line with its current data.
///
/// Every previously indexed instance is cancelled and every desired instance
/// scheduled, then the index entry is replaced (or removed when nothing is
/// desired). Individual scheduler failures are logged and counted as
/// rejected without stopping the sync; only index write failures are returned.
pub async fn sync_reminders_for_event(
    event: &EventLite,
    defaults_by_calendar: &CalendarDefaults,
    ctx: &SyncContext<'_>,
) -> AppResult<EventSyncOutcome> {
    let defaults = defaults_by_calendar
        .get(&event.calendar_id)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let desired = compute_instances(event, defaults, ctx.all_day_anchor_hour, ctx.now, ctx.formatter);
    let previous = ctx.index.get_by_event(&event.event_id).await;

    if !previous.is_empty() {
        if let Err(e) = ctx.scheduler.cancel_by_event(&event.event_id, &previous).await {
            warn!(
                "Failed to cancel {} previous reminder(s) for event {}: {}",
                previous.len(),
                event.event_id,
                e
            );
        }
    }

    let mut outcome = EventSyncOutcome::default();
    for instance in &desired {
        match ctx.scheduler.schedule(instance).await {
            Ok(()) => outcome.scheduled += 1,
            Err(e) => {
                warn!(
                    "Failed to schedule reminder #{} for event {}: {}",
                    instance.notification_id, event.event_id, e
                );
                outcome.rejected += 1;
            }
        }
    }

    if desired.is_empty() {
        ctx.index.remove(&event.event_id).await?;
        outcome.cleared = !previous.is_empty();
    } else {
        ctx.index.put(&event.event_id, &desired).await?;
    }

    debug!(
        "Event {} synced: {} previous, {} scheduled, {} rejected",
        event.event_id,
        previous.len(),
        outcome.scheduled,
        outcome.rejected
    );
    Ok(outcome)
}

/// Orchestrates reminder syncs and owns the permission/enable state.
///
/// Sync entry points are no-ops while reminders are disabled. Cancellation and
/// clearing always run so logout can clean up regardless of state.
pub struct ReminderManager {
    scheduler: Arc<dyn ReminderScheduler>,
    permissions: Arc<dyn ReminderPermissions>,
    index: Arc<ReminderIndex>,
    formatter: Arc<dyn ReminderFormatter>,
    all_day_anchor_hour: u32,
    state: watch::Sender<ReminderState>,
}

impl ReminderManager {
    pub fn new(
        scheduler: Arc<dyn ReminderScheduler>,
        permissions: Arc<dyn ReminderPermissions>,
        index: Arc<ReminderIndex>,
    ) -> Self {
        let (state, _) = watch::channel(ReminderState::default());
        Self {
            scheduler,
            permissions,
            index,
            formatter: Arc::new(EnglishReminderFormatter),
            all_day_anchor_hour: DEFAULT_ALL_DAY_ANCHOR_HOUR,
            state,
        }
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn ReminderFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_all_day_anchor_hour(mut self, hour: u32) -> Self {
        self.all_day_anchor_hour = hour;
        self
    }

    pub fn index(&self) -> &ReminderIndex {
        &self.index
    }

    pub fn state(&self) -> ReminderState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReminderState> {
        self.state.subscribe()
    }

    pub fn is_enabled(&self) -> bool {
        self.state().is_enabled
    }

    pub fn has_permissions(&self) -> bool {
        self.state().has_permissions
    }

    /// Reads the current platform permission status into both flags.
    pub async fn initialize(&self) -> ReminderState {
        let granted = self.permissions.has_permissions().await;
        info!("Reminder permissions at startup: {}", if granted { "granted" } else { "not granted" });
        self.publish(granted, granted)
    }

    /// Shows the platform prompt and updates both flags from its answer.
    pub async fn request_permissions(&self) -> bool {
        let granted = self.permissions.request_permissions().await;
        info!("Reminder permission request {}", if granted { "granted" } else { "denied" });
        self.publish(granted, granted);
        granted
    }

    pub async fn open_permission_settings(&self) -> AppResult<()> {
        self.permissions.open_permission_settings().await
    }

    /// User toggle. Enabling without permissions leaves reminders disabled.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        let current = self.state();
        let effective = enabled && current.has_permissions;
        if enabled && !effective {
            warn!("Cannot enable reminders without notification permissions");
        }
        self.publish(current.has_permissions, effective).is_enabled
    }

    fn publish(&self, has_permissions: bool, is_enabled: bool) -> ReminderState {
        let state = ReminderState {
            has_permissions,
            is_enabled,
        };
        self.state.send_replace(state);
        state
    }

    fn context(&self, now: DateTime<Utc>) -> SyncContext<'_> {
        SyncContext {
            scheduler: self.scheduler.as_ref(),
            index: self.index.as_ref(),
            formatter: self.formatter.as_ref(),
            all_day_anchor_hour: self.all_day_anchor_hour,
            now,
        }
    }

    /// Syncs a single event. A disabled manager reports an empty outcome.
    pub async fn sync_event(
        &self,
        event: &EventLite,
        defaults_by_calendar: &CalendarDefaults,
    ) -> AppResult<EventSyncOutcome> {
        if !self.is_enabled() {
            debug!("Reminders disabled, skipping sync of event {}", event.event_id);
            return Ok(EventSyncOutcome::default());
        }
        sync_reminders_for_event(event, defaults_by_calendar, &self.context(Utc::now())).await
    }

    /// Syncs each event independently; one event's failure does not affect the others.
    pub async fn sync_events(&self, events: &[EventLite], defaults_by_calendar: &CalendarDefaults) -> ReminderSyncResult {
        if !self.is_enabled() {
            debug!("Reminders disabled, skipping sync of {} events", events.len());
            return ReminderSyncResult::skipped();
        }

        let started = Instant::now();
        let ctx = self.context(Utc::now());
        let mut result = ReminderSyncResult::empty();

        for event in events {
            match sync_reminders_for_event(event, defaults_by_calendar, &ctx).await {
                Ok(outcome) => result.record(Some(outcome)),
                Err(e) => {
                    warn!("Reminder sync failed for event {}: {}", event.event_id, e);
                    result.record(None);
                }
            }
        }

        logging::log_reminder_sync(
            result.events_synced,
            result.instances_scheduled,
            started.elapsed().as_millis() as u64,
        );
        result
    }

    /// Fetches `[now, now + weeks]` from `source` and syncs every returned event.
    ///
    /// Indexed events the source no longer returns are left untouched. Fetch
    /// errors are returned unchanged; a window past the representable calendar
    /// range is rejected as invalid input before anything is fetched.
    pub async fn sync_rolling_events(
        &self,
        source: &dyn EventSource,
        defaults_by_calendar: &CalendarDefaults,
        weeks: u32,
    ) -> AppResult<ReminderSyncResult> {
        if !self.is_enabled() {
            debug!("Reminders disabled, skipping rolling sync");
            return Ok(ReminderSyncResult::skipped());
        }

        let from = Utc::now();
        let to = rolling_window_end(from, weeks)?;
        let events = source.fetch_events(from, to).await?;
        info!("Rolling reminder sync: {} events between {} and {}", events.len(), from, to);

        Ok(self.sync_events(&events, defaults_by_calendar).await)
    }

    /// Cancels and forgets the reminders of one event. No-op when untracked.
    pub async fn cancel_event_reminders(&self, event_id: &str) -> AppResult<()> {
        let previous = self.index.get_by_event(event_id).await;
        if previous.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.scheduler.cancel_by_event(event_id, &previous).await {
            warn!("Failed to cancel reminders for event {}: {}", event_id, e);
        }
        self.index.remove(event_id).await
    }

    /// Cancels every indexed reminder and empties the index. Used on logout.
    pub async fn clear_all_reminders(&self) -> AppResult<()> {
        let event_ids = self.index.stored_event_ids().await;
        info!("Clearing reminders for {} event(s)", event_ids.len());

        for event_id in &event_ids {
            let instances = self.index.get_by_event(event_id).await;
            if instances.is_empty() {
                continue;
            }
            if let Err(e) = self.scheduler.cancel_by_event(event_id, &instances).await {
                warn!("Failed to cancel reminders for event {}: {}", event_id, e);
            }
        }

        self.index.clear().await
    }
}

fn rolling_window_end(from: DateTime<Utc>, weeks: u32) -> AppResult<DateTime<Utc>> {
    Duration::try_weeks(i64::from(weeks))
        .and_then(|span| from.checked_add_signed(span))
        .ok_or_else(|| AppError::invalid_input(format!("rolling window of {} weeks is out of range", weeks)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::StaticEventSource;
    use crate::database::{KeyValueStore, MemoryKeyValueStore};
    use crate::error::AppError;
    use crate::models::notification_id;
    use crate::reminders::platform::{
        InMemoryScheduler, MockReminderPermissions, MockReminderScheduler, StaticPermissions,
    };
    use async_trait::async_trait;
    use chrono::Duration;

    fn new_index() -> Arc<ReminderIndex> {
        Arc::new(ReminderIndex::new(Arc::new(MemoryKeyValueStore::new())))
    }

    async fn enabled_manager() -> (ReminderManager, Arc<InMemoryScheduler>) {
        let scheduler = Arc::new(InMemoryScheduler::new());
        let manager = ReminderManager::new(
            scheduler.clone(),
            Arc::new(StaticPermissions::granted()),
            new_index(),
        );
        manager.initialize().await;
        (manager, scheduler)
    }

    fn event_in(id: &str, starts_in: Duration, overrides: Vec<u32>) -> EventLite {
        EventLite::timed(id, "primary", "Planning", Utc::now() + starts_in).with_overrides(overrides)
    }

    #[tokio::test]
    async fn test_sync_event_schedules_and_indexes() {
        let (manager, scheduler) = enabled_manager().await;
        let event = event_in("e1", Duration::hours(3), vec![10, 30]);

        let outcome = manager.sync_event(&event, &CalendarDefaults::new()).await.unwrap();

        assert_eq!(outcome.scheduled, 2);
        assert_eq!(outcome.rejected, 0);
        assert!(!outcome.cleared);
        assert_eq!(scheduler.pending_for("e1").len(), 2);
        assert_eq!(manager.index().get_by_event("e1").await.len(), 2);
        assert_eq!(manager.index().get_all_events().await, vec!["e1".to_string()]);
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let (manager, scheduler) = enabled_manager().await;
        let event = event_in("e1", Duration::hours(3), vec![10, 30]);
        let defaults = CalendarDefaults::new();

        manager.sync_event(&event, &defaults).await.unwrap();
        let first = manager.index().get_by_event("e1").await;
        manager.sync_event(&event, &defaults).await.unwrap();
        let second = manager.index().get_by_event("e1").await;

        let key = |list: &[crate::models::ReminderInstance]| -> Vec<(i32, DateTime<Utc>)> {
            list.iter().map(|i| (i.notification_id, i.fire_at)).collect()
        };
        assert_eq!(key(&first), key(&second));
        assert_eq!(scheduler.pending_for("e1").len(), 2);
        assert_eq!(scheduler.cancel_calls(), vec!["e1".to_string()]);
    }

    #[tokio::test]
    async fn test_changed_leads_replace_previous() {
        let (manager, scheduler) = enabled_manager().await;
        let defaults = CalendarDefaults::new();
        let mut event = event_in("e1", Duration::hours(3), vec![10, 30]);
        manager.sync_event(&event, &defaults).await.unwrap();

        event.overrides_minutes = vec![5];
        manager.sync_event(&event, &defaults).await.unwrap();

        let pending = scheduler.pending_for("e1");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].notification_id, notification_id("e1", 5));
        assert_eq!(manager.index().get_by_event("e1").await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_desired_removes_entry() {
        let (manager, scheduler) = enabled_manager().await;
        let defaults = CalendarDefaults::new();
        let event = event_in("e1", Duration::hours(3), vec![10]);
        manager.sync_event(&event, &defaults).await.unwrap();

        let switched = event.clone().with_default_reminders();
        let outcome = manager.sync_event(&switched, &defaults).await.unwrap();

        assert_eq!(outcome.scheduled, 0);
        assert!(outcome.cleared);
        assert!(manager.index().get_by_event("e1").await.is_empty());
        assert!(manager.index().get_all_events().await.is_empty());
        assert!(scheduler.pending().is_empty());
    }

    #[tokio::test]
    async fn test_scheduler_failure_does_not_abort_sync() {
        let (manager, scheduler) = enabled_manager().await;
        scheduler.fail_on(notification_id("e1", 10));

        let events = vec![
            event_in("e1", Duration::hours(3), vec![10, 30]),
            event_in("e2", Duration::hours(4), vec![15]),
        ];
        let result = manager.sync_events(&events, &CalendarDefaults::new()).await;

        assert_eq!(result.events_synced, 2);
        assert_eq!(result.events_failed, 0);
        assert_eq!(result.instances_scheduled, 2);
        assert_eq!(result.instances_rejected, 1);
        assert_eq!(result.entries_cleared, 0);
        assert_eq!(scheduler.pending_for("e1").len(), 1);
        assert_eq!(scheduler.pending_for("e2").len(), 1);
        // The index records what was desired, including the rejected instance
        assert_eq!(manager.index().get_by_event("e1").await.len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_manager_skips_sync() {
        let scheduler = Arc::new(InMemoryScheduler::new());
        let manager = ReminderManager::new(
            scheduler.clone(),
            Arc::new(StaticPermissions::denied()),
            new_index(),
        );
        manager.initialize().await;
        assert!(!manager.is_enabled());

        let event = event_in("e1", Duration::hours(3), vec![10]);
        assert_eq!(
            manager.sync_event(&event, &CalendarDefaults::new()).await.unwrap(),
            EventSyncOutcome::default()
        );
        assert!(manager.sync_events(&[event], &CalendarDefaults::new()).await.skipped);
        assert_eq!(scheduler.schedule_calls(), 0);
        assert!(manager.index().get_all_events().await.is_empty());
    }

    #[tokio::test]
    async fn test_rolling_sync_skipped_while_disabled_does_not_fetch() {
        struct PanickingSource;

        #[async_trait]
        impl EventSource for PanickingSource {
            async fn fetch_events(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> AppResult<Vec<EventLite>> {
                panic!("fetch must not run while disabled");
            }
        }

        let manager = ReminderManager::new(
            Arc::new(InMemoryScheduler::new()),
            Arc::new(StaticPermissions::denied()),
            new_index(),
        );
        let result = manager
            .sync_rolling_events(&PanickingSource, &CalendarDefaults::new(), 2)
            .await
            .unwrap();
        assert!(result.skipped);
    }

    #[tokio::test]
    async fn test_rolling_sync_window_and_drift() {
        let (manager, scheduler) = enabled_manager().await;
        let defaults = CalendarDefaults::new();

        // Indexed earlier, now outside the fetch window
        let far = event_in("far", Duration::days(20), vec![10]);
        manager.sync_event(&far, &defaults).await.unwrap();

        let source = StaticEventSource::new(vec![
            event_in("soon", Duration::hours(5), vec![10]),
            far.clone(),
        ]);
        let result = manager.sync_rolling_events(&source, &defaults, 2).await.unwrap();

        assert_eq!(result.events_synced, 1);
        assert_eq!(scheduler.pending_for("soon").len(), 1);
        // Left alone, not reconciled away
        assert_eq!(manager.index().get_by_event("far").await.len(), 1);
        assert_eq!(scheduler.pending_for("far").len(), 1);
    }

    #[tokio::test]
    async fn test_rolling_sync_propagates_fetch_error() {
        struct FailingSource;

        #[async_trait]
        impl EventSource for FailingSource {
            async fn fetch_events(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> AppResult<Vec<EventLite>> {
                Err(AppError::calendar("upstream unavailable"))
            }
        }

        let (manager, _) = enabled_manager().await;
        let err = manager
            .sync_rolling_events(&FailingSource, &CalendarDefaults::new(), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Calendar(_)));
    }

    #[tokio::test]
    async fn test_cancel_event_reminders() {
        let (manager, scheduler) = enabled_manager().await;
        let defaults = CalendarDefaults::new();
        manager.sync_event(&event_in("e1", Duration::hours(3), vec![10]), &defaults).await.unwrap();
        manager.sync_event(&event_in("e2", Duration::hours(3), vec![10]), &defaults).await.unwrap();

        manager.cancel_event_reminders("e1").await.unwrap();
        manager.cancel_event_reminders("never-indexed").await.unwrap();

        assert!(scheduler.pending_for("e1").is_empty());
        assert_eq!(scheduler.pending_for("e2").len(), 1);
        assert_eq!(manager.index().get_all_events().await, vec!["e2".to_string()]);
        assert_eq!(scheduler.cancel_calls(), vec!["e1".to_string()]);
    }

    #[tokio::test]
    async fn test_clear_all_cancels_once_per_event() {
        let index = new_index();
        {
            let seeding = ReminderManager::new(
                Arc::new(InMemoryScheduler::new()),
                Arc::new(StaticPermissions::granted()),
                index.clone(),
            );
            seeding.initialize().await;
            for id in ["e1", "e2", "e3"] {
                seeding
                    .sync_event(&event_in(id, Duration::hours(2), vec![10, 20]), &CalendarDefaults::new())
                    .await
                    .unwrap();
            }
        }

        let mut scheduler = MockReminderScheduler::new();
        scheduler
            .expect_cancel_by_event()
            .times(3)
            .returning(|_, instances| {
                assert_eq!(instances.len(), 2);
                Ok(())
            });
        scheduler.expect_schedule().never();

        let manager = ReminderManager::new(Arc::new(scheduler), Arc::new(StaticPermissions::granted()), index);
        manager.clear_all_reminders().await.unwrap();

        assert!(manager.index().get_all_events().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_survives_corrupt_tracked_list() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let index = Arc::new(ReminderIndex::new(store.clone()));
        let scheduler = Arc::new(InMemoryScheduler::new());
        let manager = ReminderManager::new(scheduler.clone(), Arc::new(StaticPermissions::granted()), index);
        manager.initialize().await;

        let defaults = CalendarDefaults::new();
        manager.sync_event(&event_in("e1", Duration::hours(2), vec![10]), &defaults).await.unwrap();
        manager.sync_event(&event_in("e2", Duration::hours(2), vec![10, 20]), &defaults).await.unwrap();
        store.set("reminders.index.events", "{broken").await.unwrap();

        manager.clear_all_reminders().await.unwrap();

        assert!(scheduler.pending().is_empty());
        assert!(manager.index().get_by_event("e1").await.is_empty());
        assert!(manager.index().get_by_event("e2").await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cancel_failure_still_clears_index() {
        let index = new_index();
        let seeding = ReminderManager::new(
            Arc::new(InMemoryScheduler::new()),
            Arc::new(StaticPermissions::granted()),
            index.clone(),
        );
        seeding.initialize().await;
        seeding
            .sync_event(&event_in("e1", Duration::hours(2), vec![10]), &CalendarDefaults::new())
            .await
            .unwrap();

        let mut scheduler = MockReminderScheduler::new();
        scheduler
            .expect_cancel_by_event()
            .times(1)
            .returning(|_, _| Err(AppError::scheduler("platform unavailable")));

        let manager = ReminderManager::new(Arc::new(scheduler), Arc::new(StaticPermissions::granted()), index);
        manager.cancel_event_reminders("e1").await.unwrap();
        assert!(manager.index().get_all_events().await.is_empty());
    }

    #[tokio::test]
    async fn test_permission_flow_updates_state() {
        let mut permissions = MockReminderPermissions::new();
        permissions.expect_has_permissions().times(1).returning(|| false);
        permissions.expect_request_permissions().times(1).returning(|| true);
        permissions.expect_open_permission_settings().times(1).returning(|| Ok(()));

        let manager = ReminderManager::new(
            Arc::new(InMemoryScheduler::new()),
            Arc::new(permissions),
            new_index(),
        );
        let mut updates = manager.subscribe();

        let initial = manager.initialize().await;
        assert!(!initial.has_permissions);
        assert!(!initial.is_enabled);

        assert!(manager.request_permissions().await);
        assert!(updates.has_changed().unwrap());
        let latest = *updates.borrow_and_update();
        assert!(latest.has_permissions);
        assert!(latest.is_enabled);

        manager.open_permission_settings().await.unwrap();
    }

    #[tokio::test]
    async fn test_set_enabled_requires_permissions() {
        let (manager, _) = enabled_manager().await;
        assert!(!manager.set_enabled(false));
        assert!(!manager.is_enabled());
        assert!(manager.set_enabled(true));

        let denied = ReminderManager::new(
            Arc::new(InMemoryScheduler::new()),
            Arc::new(StaticPermissions::denied()),
            new_index(),
        );
        denied.initialize().await;
        assert!(!denied.set_enabled(true));
        assert!(!denied.is_enabled());
    }

    #[tokio::test]
    async fn test_calendar_defaults_do_not_create_reminders() {
        let (manager, scheduler) = enabled_manager().await;
        let mut defaults = CalendarDefaults::new();
        defaults.insert("primary".to_string(), vec![10, 60]);

        let event = event_in("e1", Duration::hours(3), vec![]).with_default_reminders();
        let outcome = manager.sync_event(&event, &defaults).await.unwrap();

        // Never indexed, so nothing counts as cleared
        assert_eq!(outcome, EventSyncOutcome::default());
        assert!(scheduler.pending().is_empty());
    }

    #[tokio::test]
    async fn test_sync_result_counts_clears_only_for_indexed_events() {
        let (manager, _) = enabled_manager().await;
        let defaults = CalendarDefaults::new();
        manager.sync_event(&event_in("e1", Duration::hours(3), vec![10]), &defaults).await.unwrap();

        let events = vec![
            event_in("e1", Duration::hours(3), vec![]).with_default_reminders(),
            event_in("fresh", Duration::hours(3), vec![]).with_default_reminders(),
        ];
        let result = manager.sync_events(&events, &defaults).await;

        assert_eq!(result.events_synced, 2);
        assert_eq!(result.entries_cleared, 1);
        assert_eq!(result.instances_scheduled, 0);
    }

    #[tokio::test]
    async fn test_rolling_sync_rejects_window_beyond_calendar_range() {
        let (manager, _) = enabled_manager().await;
        let source = StaticEventSource::new(vec![event_in("e1", Duration::hours(3), vec![10])]);

        for weeks in [100_000_000, u32::MAX] {
            let err = manager
                .sync_rolling_events(&source, &CalendarDefaults::new(), weeks)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
        assert!(manager.index().get_all_events().await.is_empty());

        let result = manager
            .sync_rolling_events(&source, &CalendarDefaults::new(), crate::config::MAX_ROLLING_WEEKS)
            .await
            .unwrap();
        assert_eq!(result.instances_scheduled, 1);
    }

    #[tokio::test]
    async fn test_custom_formatter_and_anchor() {
        struct Terse;
        impl ReminderFormatter for Terse {
            fn format_reminder_message(&self, lead_minutes: u32) -> String {
                format!("T-{}", lead_minutes)
            }
        }

        let scheduler = Arc::new(InMemoryScheduler::new());
        let manager = ReminderManager::new(scheduler.clone(), Arc::new(StaticPermissions::granted()), new_index())
            .with_formatter(Arc::new(Terse))
            .with_all_day_anchor_hour(10);
        manager.initialize().await;

        let day = (Utc::now() + Duration::days(3)).date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();
        let event = EventLite::all_day("h1", "primary", "Trip", day, "UTC").with_overrides(vec![30]);
        manager.sync_event(&event, &CalendarDefaults::new()).await.unwrap();

        let pending = scheduler.pending_for("h1");
        assert_eq!(pending[0].body, "T-30");
        assert_eq!(pending[0].fire_at, day + Duration::hours(10) - Duration::minutes(30));
    }
}

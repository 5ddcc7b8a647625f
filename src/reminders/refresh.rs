use crate::calendar::{CalendarDefaults, EventSource};
use crate::models::ReminderSyncResult;
use crate::reminders::manager::ReminderManager;
use crate::utils::logging;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio::sync::Notify;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub enum RefreshEvent {
    SyncCompleted(ReminderSyncResult),
    Error(String),
}

/// Everything the background refresh loop needs besides the manager.
pub struct RollingRefresh {
    pub source: Arc<dyn EventSource>,
    pub defaults: CalendarDefaults,
    pub weeks: u32,
    pub interval: Duration,
    /// Notified on app foreground or calendar change to sync right away.
    pub trigger: Arc<Notify>,
    pub shutdown: CancellationToken,
}

/// Keeps the rolling window synced until `shutdown` is cancelled.
///
/// Runs one sync immediately, then again after every `interval` or whenever
/// `trigger` is notified, whichever comes first.
pub async fn run_rolling_refresh(
    manager: Arc<ReminderManager>,
    refresh: RollingRefresh,
    sender: Option<Sender<RefreshEvent>>,
) {
    info!(
        "Starting reminder refresh loop ({} week window, every {}s)",
        refresh.weeks,
        refresh.interval.as_secs()
    );

    loop {
        if refresh.shutdown.is_cancelled() {
            info!("Shutdown signal received, stopping reminder refresh loop");
            break;
        }

        match manager
            .sync_rolling_events(refresh.source.as_ref(), &refresh.defaults, refresh.weeks)
            .await
        {
            Ok(result) => {
                debug!(
                    "Refresh cycle: {} synced, {} failed, skipped={}",
                    result.events_synced, result.events_failed, result.skipped
                );
                if let Some(tx) = &sender {
                    let _ = tx.send(RefreshEvent::SyncCompleted(result)).await;
                }
            }
            Err(e) => {
                logging::log_error_with_context(&e, "Reminder refresh");
                if let Some(tx) = &sender {
                    let _ = tx.send(RefreshEvent::Error(e.to_safe_string())).await;
                }
            }
        }

        tokio::select! {
            _ = sleep(refresh.interval) => {}
            _ = refresh.trigger.notified() => {
                debug!("Reminder refresh triggered early");
            }
            _ = refresh.shutdown.cancelled() => {
                info!("Shutdown signal received during wait, stopping reminder refresh loop");
                break;
            }
        }
    }

    info!("Reminder refresh loop stopped gracefully");
}

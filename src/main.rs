// remindsync - headless reminder sync
// Keeps local reminders for a Google Calendar snapshot in sync until interrupted

use anyhow::{Context, Result};
use log::{error, info};
use remindsync::calendar::google::GoogleCalendarSnapshot;
use remindsync::config::{validate_config, AppConfig};
use remindsync::reminders::{
    run_rolling_refresh, LoggingScheduler, RefreshEvent, ReminderIndex, ReminderManager, RollingRefresh,
    StaticPermissions,
};
use remindsync::utils::logging::init_logging;
use remindsync::Database;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    validate_config(&config).context("Invalid configuration")?;

    let snapshot_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("Usage: remindsync <google-calendar-snapshot.json>")?;
    let snapshot = GoogleCalendarSnapshot::load(&snapshot_path)?;
    info!(
        "Loaded snapshot with {} calendar(s) from {}",
        snapshot.calendars.len(),
        snapshot_path.display()
    );

    let db = Database::open(&config.database_url)
        .await
        .context("Failed to open reminder database")?;
    let index = Arc::new(ReminderIndex::new(Arc::new(db)));

    let manager = Arc::new(
        ReminderManager::new(Arc::new(LoggingScheduler), Arc::new(StaticPermissions::granted()), index)
            .with_all_day_anchor_hour(config.all_day_anchor_hour),
    );
    let state = manager.initialize().await;
    info!(
        "Reminders {} (permissions {})",
        if state.is_enabled { "enabled" } else { "disabled" },
        if state.has_permissions { "granted" } else { "missing" }
    );

    let shutdown = CancellationToken::new();
    let (tx, mut rx) = mpsc::channel(16);
    let refresh = RollingRefresh {
        source: Arc::new(snapshot.to_source()),
        defaults: snapshot.defaults(),
        weeks: config.rolling_weeks,
        interval: Duration::from_secs(config.refresh_interval_secs),
        trigger: Arc::new(Notify::new()),
        shutdown: shutdown.clone(),
    };
    let worker = tokio::spawn(run_rolling_refresh(manager.clone(), refresh, Some(tx)));

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(RefreshEvent::SyncCompleted(result)) => info!(
                    "Sync finished: {} events, {} reminders scheduled, {} rejected, {} failed",
                    result.events_synced, result.instances_scheduled, result.instances_rejected, result.events_failed
                ),
                Some(RefreshEvent::Error(message)) => error!("Sync error: {}", message),
                None => break,
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                info!("Interrupted, shutting down");
                shutdown.cancel();
                break;
            }
        }
    }

    drop(rx);
    worker.await.context("Refresh loop panicked")?;
    info!("{} event(s) tracked in the reminder index", manager.index().get_all_events().await.len());
    Ok(())
}

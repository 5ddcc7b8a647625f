use env_logger::{Builder, Target};
use log::{Level, LevelFilter};
use std::env;
use std::io::Write;

fn parse_level(value: &str) -> LevelFilter {
    match value.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Installs the global logger. Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let env = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let log_level = parse_level(&env);

    let mut builder = Builder::from_default_env();

    builder.format(|buf, record| {
        let timestamp = buf.timestamp();
        let target = record.target();
        let file = record.file().unwrap_or("unknown");
        let line = record.line().unwrap_or(0);

        match record.level() {
            Level::Info => writeln!(buf, "{} [INFO] [{}]: {}", timestamp, target, record.args()),
            level => writeln!(
                buf,
                "{} [{}] [{}:{}] {}: {}",
                timestamp,
                level,
                file,
                line,
                target,
                record.args()
            ),
        }
    });

    // Filter out noisy modules in production
    if env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()) == "production" {
        builder.filter_module("sqlx", LevelFilter::Warn);
        builder.filter_module("tokio", LevelFilter::Info);
    }

    if builder.filter_level(log_level).target(Target::Stdout).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

pub fn log_error_with_context(error: &dyn std::error::Error, context: &str) {
    log::error!("[{}] {}", context, error);

    // Log chain of causes for better debugging
    let mut source = error.source();
    while let Some(err) = source {
        log::error!("  Caused by: {}", err);
        source = err.source();
    }
}

pub fn log_reminder_sync(events_count: usize, instances_count: usize, duration_ms: u64) {
    log::info!(
        "[Reminders] Synced {} events, {} reminders scheduled in {}ms",
        events_count,
        instances_count,
        duration_ms
    );
}

pub fn log_index_operation(operation: &str, event_id: &str, instances_count: usize) {
    log::debug!(
        "[Index] {} for event {} ({} reminders)",
        operation,
        event_id,
        instances_count
    );
}

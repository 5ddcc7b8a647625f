//! Configuration loading and validation
//!
//! Values come from `REMINDERS_*` environment variables with defaults
//! suitable for a single-user desktop or headless run.

use crate::error::{AppError, AppResult};
use log::info;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_ALL_DAY_ANCHOR_HOUR: u32 = 9;
pub const DEFAULT_ROLLING_WEEKS: u32 = 2;
pub const MAX_ROLLING_WEEKS: u32 = 52;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 900;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub all_day_anchor_hour: u32,
    pub rolling_weeks: u32,
    pub refresh_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            all_day_anchor_hour: DEFAULT_ALL_DAY_ANCHOR_HOUR,
            rolling_weeks: DEFAULT_ROLLING_WEEKS,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("REMINDERS_DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(raw) = lookup("REMINDERS_ALL_DAY_ANCHOR_HOUR") {
            config.all_day_anchor_hour = parse_number("REMINDERS_ALL_DAY_ANCHOR_HOUR", &raw)?;
        }
        if let Some(raw) = lookup("REMINDERS_ROLLING_WEEKS") {
            config.rolling_weeks = parse_number("REMINDERS_ROLLING_WEEKS", &raw)?;
        }
        if let Some(raw) = lookup("REMINDERS_REFRESH_INTERVAL_SECS") {
            config.refresh_interval_secs = parse_number("REMINDERS_REFRESH_INTERVAL_SECS", &raw)?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::config(format!("{} must be a non-negative integer, got '{}'", key, raw)))
}

pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("remindsync")
        .join("reminders.db")
}

fn default_database_url() -> String {
    format!("sqlite:{}?mode=rwc", default_database_path().display())
}

/// Validates application configuration
///
/// # Returns
///
/// * `Ok(())` - every value is within range
/// * `Err(AppError::Config)` - naming the first offending setting
///
pub fn validate_config(config: &AppConfig) -> AppResult<()> {
    if config.database_url.trim().is_empty() {
        return Err(AppError::config("REMINDERS_DATABASE_URL cannot be empty"));
    }
    if config.all_day_anchor_hour > 23 {
        return Err(AppError::config(format!(
            "REMINDERS_ALL_DAY_ANCHOR_HOUR must be between 0 and 23, got {}",
            config.all_day_anchor_hour
        )));
    }
    if config.rolling_weeks == 0 || config.rolling_weeks > MAX_ROLLING_WEEKS {
        return Err(AppError::config(format!(
            "REMINDERS_ROLLING_WEEKS must be between 1 and {}, got {}",
            MAX_ROLLING_WEEKS, config.rolling_weeks
        )));
    }
    if config.refresh_interval_secs == 0 {
        return Err(AppError::config("REMINDERS_REFRESH_INTERVAL_SECS must be greater than 0"));
    }

    info!(
        "Configuration valid: anchor hour {}, rolling window {} week(s), refresh every {}s",
        config.all_day_anchor_hour, config.rolling_weeks, config.refresh_interval_secs
    );
    Ok(())
}

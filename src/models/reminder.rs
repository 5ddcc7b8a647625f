// file: src/models/reminder.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One concrete local notification. This is the shape persisted in the reminder index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderInstance {
    pub event_id: String,
    pub notification_id: i32,
    #[serde(default)]
    pub lead_minutes: u32,
    #[serde(rename = "fireAtUtcMillis", with = "chrono::serde::ts_milliseconds")]
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub deeplink: Option<String>,
    #[serde(rename = "eventStartUtcMillis", with = "chrono::serde::ts_milliseconds")]
    pub event_start: DateTime<Utc>,
    #[serde(
        rename = "eventEndUtcMillis",
        with = "chrono::serde::ts_milliseconds_option",
        default
    )]
    pub event_end: Option<DateTime<Utc>>,
    pub event_time_zone: String,
    pub is_all_day: bool,
}

/// Stable notification id for `(event_id, lead_minutes)`.
///
/// 32-bit FNV-1a over `"<event_id>:<lead_minutes>"`, masked to a non-negative
/// `i32` because platform notification ids are signed 32-bit.
pub fn notification_id(event_id: &str, lead_minutes: u32) -> i32 {
    const FNV_OFFSET: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;

    let key = format!("{}:{}", event_id, lead_minutes);
    let hash = key.bytes().fold(FNV_OFFSET, |acc, byte| {
        (acc ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    });
    (hash & 0x7fff_ffff) as i32
}

/// Observable permission/enable flags of the reminder manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReminderState {
    pub has_permissions: bool,
    pub is_enabled: bool,
}

//! Reminder instance calculation
//!
//! Pure: the same event, policy and `now` always give the same instances in
//! the same order. No storage or platform calls happen here.

use crate::models::{notification_id, EventLite, ReminderInstance};
use crate::reminders::format::ReminderFormatter;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use log::{debug, warn};
use std::collections::HashSet;
use std::str::FromStr;

/// Longest accepted gap between a reminder and its anchor: 7 days.
pub const MAX_LEAD_MINUTES: u32 = 7 * 24 * 60;

/// Instant lead times are measured back from.
///
/// Timed events anchor on their start. All-day events take the calendar date
/// of their stored UTC start-of-day and anchor at `all_day_anchor_hour:00`
/// local time in the event's zone, so the reminder fires at a sensible wall
/// clock time instead of midnight UTC.
pub fn anchor_instant(event: &EventLite, all_day_anchor_hour: u32) -> DateTime<Utc> {
    if !event.is_all_day {
        return event.starts_at;
    }

    let date = event.starts_at.date_naive();
    let Some(local_anchor) = date.and_hms_opt(all_day_anchor_hour.min(23), 0, 0) else {
        return event.starts_at;
    };

    match chrono_tz::Tz::from_str(&event.time_zone) {
        Ok(tz) => resolve_local(&tz, local_anchor),
        Err(_) => {
            warn!(
                "Unrecognized timezone '{}' on event {}, anchoring in UTC",
                event.time_zone, event.event_id
            );
            local_anchor.and_utc()
        }
    }
}

// Ambiguous wall times take the earlier instant; times inside a DST gap move one hour later.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|zoned| zoned.with_timezone(&Utc))
        .unwrap_or_else(|| local.and_utc())
}

/// Computes the reminder instances that should currently be scheduled for `event`.
///
/// Events relying on provider-default reminders yield nothing: their lead time
/// is unknown to us and may be extreme, so it is never surfaced locally.
/// `calendar_default_lead_minutes` is accepted for that policy decision only.
pub fn compute_instances(
    event: &EventLite,
    calendar_default_lead_minutes: &[u32],
    all_day_anchor_hour: u32,
    now: DateTime<Utc>,
    formatter: &dyn ReminderFormatter,
) -> Vec<ReminderInstance> {
    if event.use_default_reminders {
        debug!(
            "Event {} uses provider defaults ({} configured), no local reminders",
            event.event_id,
            calendar_default_lead_minutes.len()
        );
        return Vec::new();
    }

    if event.overrides_minutes.is_empty() {
        return Vec::new();
    }

    let anchor = anchor_instant(event, all_day_anchor_hour);
    let mut seen = HashSet::new();

    event
        .overrides_minutes
        .iter()
        .copied()
        .filter(|minutes| seen.insert(*minutes))
        .filter(|minutes| *minutes <= MAX_LEAD_MINUTES)
        .filter_map(|minutes| {
            let fire_at = anchor - Duration::minutes(i64::from(minutes));
            if fire_at <= now {
                return None;
            }
            Some(ReminderInstance {
                event_id: event.event_id.clone(),
                notification_id: notification_id(&event.event_id, minutes),
                lead_minutes: minutes,
                fire_at,
                title: event.title.clone(),
                body: formatter.format_reminder_message(minutes),
                deeplink: event.meet_deeplink.clone(),
                event_start: event.starts_at,
                event_end: event.ends_at,
                event_time_zone: event.time_zone.clone(),
                is_all_day: event.is_all_day,
            })
        })
        .collect()
}

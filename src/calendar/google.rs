// Google Calendar integration
// Maps Calendar v3 event and calendar-list payloads onto `EventLite`

use crate::calendar::{CalendarDefaults, StaticEventSource};
use crate::error::{AppError, AppResult};
use crate::models::EventLite;
use crate::utils;
use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoogleReminderOverride {
    pub method: Option<String>,
    pub minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoogleReminders {
    #[serde(default)]
    pub use_default: bool,
    #[serde(default)]
    pub overrides: Vec<GoogleReminderOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEntryPoint {
    pub entry_point_type: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoogleConferenceData {
    #[serde(default)]
    pub entry_points: Vec<GoogleEntryPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCalendarEvent {
    pub id: String,
    pub status: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<GoogleEventTime>,
    pub end: Option<GoogleEventTime>,
    pub hangout_link: Option<String>,
    pub conference_data: Option<GoogleConferenceData>,
    pub reminders: Option<GoogleReminders>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCalendarListEntry {
    pub id: String,
    pub summary: Option<String>,
    pub time_zone: Option<String>,
    #[serde(default)]
    pub default_reminders: Vec<GoogleReminderOverride>,
}

/// Converts one Google event into its lite form.
///
/// Returns `Ok(None)` for cancelled events. Time zone resolution prefers the
/// event's own zone, then the owning calendar's, then UTC.
pub fn normalize_google_event(
    calendar_id: &str,
    calendar_time_zone: Option<&str>,
    event: &GoogleCalendarEvent,
) -> AppResult<Option<EventLite>> {
    if event.status.as_deref() == Some("cancelled") {
        log::debug!("Skipping cancelled event {}", event.id);
        return Ok(None);
    }

    let start = event
        .start
        .as_ref()
        .ok_or_else(|| AppError::calendar(format!("event {} has no start", event.id)))?;

    let time_zone = start
        .time_zone
        .as_deref()
        .or(calendar_time_zone)
        .unwrap_or("UTC")
        .to_string();

    let (starts_at, is_all_day) = parse_event_time(start, &time_zone)
        .map_err(|e| AppError::calendar(format!("event {}: start {}", event.id, e)))?;

    let ends_at = match event.end.as_ref() {
        Some(end) => match parse_event_time(end, &time_zone) {
            Ok((instant, _)) => Some(instant),
            Err(e) => {
                log::warn!("Ignoring unparseable end of event {}: {}", event.id, e);
                None
            }
        },
        None => None,
    };

    // An absent reminders block means the calendar defaults apply
    let reminders = event.reminders.clone().unwrap_or(GoogleReminders {
        use_default: true,
        overrides: Vec::new(),
    });
    let overrides_minutes = if reminders.use_default {
        Vec::new()
    } else {
        popup_minutes(&event.id, &reminders.overrides)
    };

    Ok(Some(EventLite {
        event_id: event.id.clone(),
        calendar_id: calendar_id.to_string(),
        title: utils::normalize_title(event.summary.as_deref()),
        starts_at,
        ends_at,
        time_zone,
        is_all_day,
        meet_deeplink: meeting_link(event),
        use_default_reminders: reminders.use_default,
        overrides_minutes,
    }))
}

/// Builds the per-calendar default lead minutes from calendar-list entries.
pub fn calendar_defaults(entries: &[GoogleCalendarListEntry]) -> CalendarDefaults {
    entries
        .iter()
        .map(|entry| (entry.id.clone(), popup_minutes(&entry.id, &entry.default_reminders)))
        .collect()
}

fn popup_minutes(owner_id: &str, overrides: &[GoogleReminderOverride]) -> Vec<u32> {
    overrides
        .iter()
        .filter(|o| matches!(o.method.as_deref(), None | Some("popup")))
        .filter_map(|o| match u32::try_from(o.minutes) {
            Ok(minutes) => Some(minutes),
            Err(_) => {
                log::warn!("Dropping invalid reminder of {} minutes on {}", o.minutes, owner_id);
                None
            }
        })
        .collect()
}

fn meeting_link(event: &GoogleCalendarEvent) -> Option<String> {
    event
        .hangout_link
        .clone()
        .or_else(|| {
            event.conference_data.as_ref().and_then(|data| {
                data.entry_points
                    .iter()
                    .find(|ep| ep.entry_point_type.as_deref() == Some("video"))
                    .and_then(|ep| ep.uri.clone())
            })
        })
        .or_else(|| utils::extract_meeting_link(event.location.as_deref(), event.description.as_deref()))
}

/// Returns the UTC instant and whether the value was date-only.
///
/// Date-only values become midnight UTC of that calendar date.
fn parse_event_time(time: &GoogleEventTime, fallback_zone: &str) -> Result<(DateTime<Utc>, bool), String> {
    if let Some(raw) = time.date_time.as_deref() {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Ok((with_offset.with_timezone(&Utc), false));
        }

        // No offset: wall-clock time in the event's zone
        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
            .map_err(|e| format!("invalid dateTime '{}': {}", raw, e))?;
        let zone_name = time.time_zone.as_deref().unwrap_or(fallback_zone);
        let tz = chrono_tz::Tz::from_str(zone_name)
            .map_err(|_| format!("unknown time zone '{}'", zone_name))?;
        let local = tz
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| format!("'{}' does not exist in {}", raw, zone_name))?;
        return Ok((local.with_timezone(&Utc), false));
    }

    if let Some(raw) = time.date.as_deref() {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{}': {}", raw, e))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| format!("invalid date '{}'", raw))?;
        return Ok((midnight.and_utc(), true));
    }

    Err("neither dateTime nor date present".to_string())
}

/// A JSON export of calendar-list entries and their events, keyed by calendar id.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GoogleCalendarSnapshot {
    #[serde(default)]
    pub calendars: Vec<GoogleCalendarListEntry>,
    #[serde(default)]
    pub events: HashMap<String, Vec<GoogleCalendarEvent>>,
}

impl GoogleCalendarSnapshot {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read calendar snapshot {}", path.display()))?;
        let snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse calendar snapshot {}", path.display()))?;
        Ok(snapshot)
    }

    pub fn defaults(&self) -> CalendarDefaults {
        calendar_defaults(&self.calendars)
    }

    /// Normalizes every event; events that fail to normalize are logged and skipped.
    pub fn normalize(&self) -> Vec<EventLite> {
        let zones: HashMap<&str, &str> = self
            .calendars
            .iter()
            .filter_map(|c| c.time_zone.as_deref().map(|tz| (c.id.as_str(), tz)))
            .collect();

        let mut normalized = Vec::new();
        for (calendar_id, events) in &self.events {
            let calendar_zone = zones.get(calendar_id.as_str()).copied();
            for event in events {
                match normalize_google_event(calendar_id, calendar_zone, event) {
                    Ok(Some(lite)) => normalized.push(lite),
                    Ok(None) => {}
                    Err(e) => log::warn!("Skipping event: {}", e),
                }
            }
        }
        normalized.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then_with(|| a.event_id.cmp(&b.event_id)));
        normalized
    }

    pub fn to_source(&self) -> StaticEventSource {
        StaticEventSource::new(self.normalize())
    }
}

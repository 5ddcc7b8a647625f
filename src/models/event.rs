// file: src/models/event.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical, timezone-resolved view of a calendar event.
///
/// Built fresh on every sync from upstream provider data and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLite {
    pub event_id: String,
    pub calendar_id: String,
    pub title: String,
    #[serde(rename = "startsAtUtcMillis", with = "chrono::serde::ts_milliseconds")]
    pub starts_at: DateTime<Utc>,
    #[serde(
        rename = "endsAtUtcMillis",
        with = "chrono::serde::ts_milliseconds_option",
        default
    )]
    pub ends_at: Option<DateTime<Utc>>,
    /// IANA zone id. Only consulted to anchor all-day reminders.
    pub time_zone: String,
    pub is_all_day: bool,
    pub meet_deeplink: Option<String>,
    pub use_default_reminders: bool,
    #[serde(default)]
    pub overrides_minutes: Vec<u32>,
}

impl EventLite {
    pub fn timed(
        event_id: impl Into<String>,
        calendar_id: impl Into<String>,
        title: impl Into<String>,
        starts_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            calendar_id: calendar_id.into(),
            title: title.into(),
            starts_at,
            ends_at: None,
            time_zone: "UTC".to_string(),
            is_all_day: false,
            meet_deeplink: None,
            use_default_reminders: false,
            overrides_minutes: Vec::new(),
        }
    }

    /// `start_of_day_utc` is midnight UTC of the event's calendar date.
    pub fn all_day(
        event_id: impl Into<String>,
        calendar_id: impl Into<String>,
        title: impl Into<String>,
        start_of_day_utc: DateTime<Utc>,
        time_zone: impl Into<String>,
    ) -> Self {
        Self {
            is_all_day: true,
            time_zone: time_zone.into(),
            ..Self::timed(event_id, calendar_id, title, start_of_day_utc)
        }
    }

    pub fn with_overrides(mut self, minutes: Vec<u32>) -> Self {
        self.use_default_reminders = false;
        self.overrides_minutes = minutes;
        self
    }

    /// Provider-default timing wins; explicit overrides are dropped.
    pub fn with_default_reminders(mut self) -> Self {
        self.use_default_reminders = true;
        self.overrides_minutes.clear();
        self
    }

    pub fn with_end(mut self, ends_at: DateTime<Utc>) -> Self {
        self.ends_at = Some(ends_at);
        self
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }

    pub fn with_deeplink(mut self, link: impl Into<String>) -> Self {
        self.meet_deeplink = Some(link.into());
        self
    }

    /// True when any part of the event falls inside `[from, to]`.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        let end = self.ends_at.unwrap_or(self.starts_at);
        self.starts_at <= to && end >= from
    }
}

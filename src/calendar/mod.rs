// Calendar integration module
// Normalizes provider events into `EventLite` and exposes them to the reminder engine

use crate::error::AppResult;
use crate::models::EventLite;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub mod google;

/// Default lead minutes per calendar id, as configured on the provider.
pub type CalendarDefaults = HashMap<String, Vec<u32>>;

/// Supplies normalized events for a time window. Owns all provider access.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<Vec<EventLite>>;
}

/// Fixed set of already-normalized events.
#[derive(Debug, Clone, Default)]
pub struct StaticEventSource {
    events: Vec<EventLite>,
}

impl StaticEventSource {
    pub fn new(events: Vec<EventLite>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[async_trait]
impl EventSource for StaticEventSource {
    async fn fetch_events(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<Vec<EventLite>> {
        let events: Vec<EventLite> = self
            .events
            .iter()
            .filter(|event| event.overlaps(from, to))
            .cloned()
            .collect();

        log::debug!(
            "Static source returned {} of {} events for {} .. {}",
            events.len(),
            self.events.len(),
            from,
            to
        );
        Ok(events)
    }
}

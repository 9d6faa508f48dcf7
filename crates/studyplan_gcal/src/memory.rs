// --- File: crates/studyplan_gcal/src/memory.rs ---
//! Calendar provider kept entirely in process memory.
//!
//! Selected with `gcal.provider = "memory"`. It paginates like the remote
//! provider, counts requests and can be told to fail free/busy queries, which
//! makes it the provider of choice for tests.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use studyplan_common::models::{
    BusyInterval, CalendarPayload, EventDateTimePayload, EventPayload, Page,
};
use studyplan_common::{BoxFuture, CalendarProvider, ProviderError};
use tracing::debug;
use uuid::Uuid;

use crate::normalize::parse_date_time;

pub const PRIMARY_CALENDAR_ID: &str = "primary";

#[derive(Debug, Default)]
struct MemoryState {
    calendars: Vec<CalendarPayload>,
    events: HashMap<String, Vec<EventPayload>>,
}

#[derive(Debug)]
pub struct InMemoryCalendarProvider {
    state: Mutex<MemoryState>,
    page_size: u32,
    requests: AtomicUsize,
    fail_free_busy: AtomicBool,
}

impl Default for InMemoryCalendarProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCalendarProvider {
    /// Provider holding a single empty `primary` calendar, 250 items per page.
    pub fn new() -> Self {
        let provider = Self {
            state: Mutex::new(MemoryState::default()),
            page_size: 250,
            requests: AtomicUsize::new(0),
            fail_free_busy: AtomicBool::new(false),
        };
        provider.add_calendar(PRIMARY_CALENDAR_ID, "Primary");
        provider
    }

    /// Caps every page at `page_size` items, whatever the caller asks for.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn add_calendar(&self, id: &str, summary: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.calendars.push(CalendarPayload {
                id: id.to_string(),
                summary: Some(summary.to_string()),
                description: None,
            });
            state.events.entry(id.to_string()).or_default();
        }
    }

    /// Stores events as-is, without the summary check `insert_event` applies.
    pub fn seed_events(&self, calendar_id: &str, events: Vec<EventPayload>) {
        if let Ok(mut state) = self.state.lock() {
            state
                .events
                .entry(calendar_id.to_string())
                .or_default()
                .extend(events);
        }
    }

    /// Number of provider operations served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn reset_request_count(&self) {
        self.requests.store(0, Ordering::SeqCst);
    }

    /// Makes every following free/busy query fail (or succeed again).
    pub fn set_fail_free_busy(&self, fail: bool) {
        self.fail_free_busy.store(fail, Ordering::SeqCst);
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, ProviderError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .map_err(|_| ProviderError::Transport("in-memory calendar state is poisoned".to_string()))
    }

    fn page<T: Clone>(
        &self,
        items: &[T],
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<Page<T>, ProviderError> {
        let offset = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ProviderError::Rejected(format!("invalid page token '{}'", token)))?,
            None => 0,
        };
        let size = page_size.clamp(1, self.page_size) as usize;
        let end = offset.saturating_add(size).min(items.len());
        let slice = items.get(offset..end).unwrap_or_default().to_vec();
        let next_page_token = (end < items.len()).then(|| end.to_string());
        Ok(Page {
            items: slice,
            next_page_token,
        })
    }
}

fn require_summary(body: &EventPayload) -> Result<(), ProviderError> {
    match body.summary.as_deref() {
        Some(summary) if !summary.trim().is_empty() => Ok(()),
        _ => Err(ProviderError::Rejected("Missing summary.".to_string())),
    }
}

/// Instant a payload stands for. A `dateTime` without offset is read in its
/// `timeZone`, or in UTC when that is missing or unknown.
fn instant_of(time: &EventDateTimePayload) -> Option<DateTime<Utc>> {
    if let Some(text) = time.date_time.as_deref() {
        let zone = time
            .time_zone
            .as_deref()
            .and_then(|name| Tz::from_str(name).ok())
            .unwrap_or(Tz::UTC);
        return parse_date_time(text, zone).map(|instant| instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(time.date.as_deref()?, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Busy range an event occupies. All-day events cover whole days; an all-day
/// event whose end equals its start still covers that one day.
fn busy_range(event: &EventPayload) -> Option<BusyInterval> {
    let start_payload = event.start.as_ref()?;
    let start = instant_of(start_payload)?;
    let mut end = event.end.as_ref().and_then(instant_of).unwrap_or(start);
    if start_payload.date.is_some() && end <= start {
        end = start + Duration::days(1);
    }
    (end > start).then(|| BusyInterval::new(start, end))
}

fn merge(mut intervals: Vec<BusyInterval>) -> Vec<BusyInterval> {
    intervals.sort();
    let mut merged: Vec<BusyInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

impl CalendarProvider for InMemoryCalendarProvider {
    fn list_calendars(
        &self,
        page_size: u32,
        page_token: Option<String>,
    ) -> BoxFuture<'_, Page<CalendarPayload>, ProviderError> {
        Box::pin(async move {
            let state = self.state()?;
            self.page(&state.calendars, page_size, page_token)
        })
    }

    fn list_events(
        &self,
        calendar_id: &str,
        page_size: u32,
        page_token: Option<String>,
    ) -> BoxFuture<'_, Page<EventPayload>, ProviderError> {
        let calendar_id = calendar_id.to_string();
        Box::pin(async move {
            let state = self.state()?;
            let events = state
                .events
                .get(&calendar_id)
                .ok_or_else(|| ProviderError::NotFound(format!("calendar {}", calendar_id)))?;
            self.page(events, page_size, page_token)
        })
    }

    fn get_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, EventPayload, ProviderError> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        Box::pin(async move {
            let state = self.state()?;
            state
                .events
                .get(&calendar_id)
                .and_then(|events| events.iter().find(|e| e.id.as_deref() == Some(event_id.as_str())))
                .cloned()
                .ok_or_else(|| ProviderError::NotFound(format!("event {} in {}", event_id, calendar_id)))
        })
    }

    fn insert_event(&self, calendar_id: &str, body: EventPayload) -> BoxFuture<'_, EventPayload, ProviderError> {
        let calendar_id = calendar_id.to_string();
        Box::pin(async move {
            let mut state = self.state()?;
            require_summary(&body)?;
            let events = state
                .events
                .get_mut(&calendar_id)
                .ok_or_else(|| ProviderError::NotFound(format!("calendar {}", calendar_id)))?;

            let mut event = body;
            event.id = Some(Uuid::new_v4().simple().to_string());
            events.push(event.clone());
            debug!("Stored event {:?} in {}", event.id, calendar_id);
            Ok(event)
        })
    }

    fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        body: EventPayload,
    ) -> BoxFuture<'_, EventPayload, ProviderError> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        Box::pin(async move {
            let mut state = self.state()?;
            require_summary(&body)?;
            let stored = state
                .events
                .get_mut(&calendar_id)
                .and_then(|events| events.iter_mut().find(|e| e.id.as_deref() == Some(event_id.as_str())))
                .ok_or_else(|| ProviderError::NotFound(format!("event {} in {}", event_id, calendar_id)))?;

            let mut event = body;
            event.id = Some(event_id);
            *stored = event.clone();
            Ok(event)
        })
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), ProviderError> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        Box::pin(async move {
            let mut state = self.state()?;
            let events = state
                .events
                .get_mut(&calendar_id)
                .ok_or_else(|| ProviderError::NotFound(format!("calendar {}", calendar_id)))?;
            let before = events.len();
            events.retain(|e| e.id.as_deref() != Some(event_id.as_str()));
            if events.len() == before {
                return Err(ProviderError::NotFound(format!("event {} in {}", event_id, calendar_id)));
            }
            Ok(())
        })
    }

    fn query_free_busy(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusyInterval>, ProviderError> {
        let calendar_id = calendar_id.to_string();
        Box::pin(async move {
            let state = self.state()?;
            if self.fail_free_busy.load(Ordering::SeqCst) {
                return Err(ProviderError::Transport("free/busy backend unavailable".to_string()));
            }
            let events = state
                .events
                .get(&calendar_id)
                .ok_or_else(|| ProviderError::NotFound(format!("calendar {}", calendar_id)))?;

            let clipped = events
                .iter()
                .filter_map(busy_range)
                .filter(|busy| busy.overlaps(time_min, time_max))
                .map(|busy| BusyInterval::new(busy.start.max(time_min), busy.end.min(time_max)))
                .collect();
            Ok(merge(clipped))
        })
    }

    fn insert_calendar(&self, summary: &str) -> BoxFuture<'_, CalendarPayload, ProviderError> {
        let summary = summary.to_string();
        Box::pin(async move {
            let mut state = self.state()?;
            if summary.trim().is_empty() {
                return Err(ProviderError::Rejected("Missing summary.".to_string()));
            }
            let calendar = CalendarPayload {
                id: format!("{}@studyplan.local", Uuid::new_v4().simple()),
                summary: Some(summary),
                description: None,
            };
            state.calendars.push(calendar.clone());
            state.events.entry(calendar.id.clone()).or_default();
            Ok(calendar)
        })
    }
}

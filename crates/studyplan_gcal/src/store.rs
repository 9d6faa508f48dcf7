// --- File: crates/studyplan_gcal/src/store.rs ---
//! Create/read/update/delete operations on calendars and events.
//!
//! Reads go through [`PageFetcher`] and the [`DateNormalizer`]; writes are
//! single provider calls. Nothing is cached: every call reaches the provider.

use std::sync::Arc;
use studyplan_common::models::EventPayload;
use studyplan_common::{invalid_argument, remote_error, CalendarProvider, StudyplanError};
use studyplan_config::{DeleteFailurePolicy, StoreConfig};
use tracing::{debug, error, info, warn};

use crate::models::{CalendarEvent, CalendarRef, EventDraft, EventPatch, EventTime};
use crate::normalize::DateNormalizer;
use crate::pagination::{Capacity, PageFetcher};

const RECURRENCE_PREFIXES: [&str; 4] = ["RRULE:", "EXRULE:", "RDATE:", "EXDATE:"];

#[derive(Clone)]
pub struct EventStore {
    provider: Arc<dyn CalendarProvider>,
    normalizer: DateNormalizer,
    calendar_pages: PageFetcher,
    event_pages: PageFetcher,
    /// How many calendars `create_calendar` inspects for an existing match.
    lookup_capacity: Capacity,
    on_delete_failure: DeleteFailurePolicy,
}

impl EventStore {
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        normalizer: DateNormalizer,
        config: &StoreConfig,
    ) -> Self {
        Self {
            provider,
            normalizer,
            calendar_pages: PageFetcher::new(config.calendar_page_size),
            event_pages: PageFetcher::new(config.event_page_size),
            lookup_capacity: Capacity::new(config.calendar_capacity),
            on_delete_failure: config.on_delete_failure,
        }
    }

    pub async fn list_calendars(&self, capacity: Capacity) -> Result<Vec<CalendarRef>, StudyplanError> {
        let provider = self.provider.clone();
        let calendars = self
            .calendar_pages
            .fetch(capacity, |page_size, page_token| {
                let provider = provider.clone();
                async move { provider.list_calendars(page_size, page_token).await }
            })
            .await?;
        Ok(calendars.into_iter().map(CalendarRef::from).collect())
    }

    /// First calendar whose name equals `name` exactly.
    pub async fn find_calendar_by_name(&self, name: &str) -> Result<Option<CalendarRef>, StudyplanError> {
        let calendars = self.list_calendars(self.lookup_capacity).await?;
        Ok(calendars.into_iter().find(|calendar| calendar.name == name))
    }

    /// Events of a calendar in provider order. Entries without an id are skipped.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        capacity: Capacity,
    ) -> Result<Vec<CalendarEvent>, StudyplanError> {
        let provider = self.provider.clone();
        let calendar = calendar_id.to_string();
        let payloads = self
            .event_pages
            .fetch(capacity, |page_size, page_token| {
                let provider = provider.clone();
                let calendar = calendar.clone();
                async move { provider.list_events(&calendar, page_size, page_token).await }
            })
            .await?;

        Ok(payloads
            .into_iter()
            .filter_map(|payload| self.to_calendar_event(payload))
            .collect())
    }

    pub async fn get_event(&self, calendar_id: &str, event_id: &str) -> Result<CalendarEvent, StudyplanError> {
        let payload = self.provider.get_event(calendar_id, event_id).await?;
        self.to_calendar_event(payload)
            .ok_or_else(|| remote_error(format!("event {} came back without an id", event_id)))
    }

    /// Normalizes the draft's start/end and submits it.
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        draft: EventDraft,
    ) -> Result<CalendarEvent, StudyplanError> {
        let summary = draft.summary.clone().unwrap_or_default();
        let (start, end) = self
            .normalizer
            .normalize(draft.start.as_ref(), draft.end.as_ref(), &summary);
        ensure_ordered(&start, &end)?;

        let body = draft.into_payload(start, end);
        let created = self
            .provider
            .insert_event(calendar_id, body)
            .await
            .map_err(|e| {
                error!("Inserting event '{}' into {} failed: {}", summary, calendar_id, e);
                StudyplanError::from(e)
            })?;

        let event = self
            .to_calendar_event(created)
            .ok_or_else(|| remote_error("provider returned the created event without an id"))?;
        info!("Created event {} ('{}') in {}", event.id, event.summary, calendar_id);
        Ok(event)
    }

    /// Like [`insert_event`](Self::insert_event), for drafts that carry
    /// recurrence rules.
    pub async fn create_recurring_event(
        &self,
        calendar_id: &str,
        draft: EventDraft,
    ) -> Result<CalendarEvent, StudyplanError> {
        validate_recurrence(&draft.recurrence)?;
        self.insert_event(calendar_id, draft).await
    }

    /// Read-merge-write: fetches the stored event, overlays the patch and
    /// writes the whole event back. Concurrent writers can lose updates.
    pub async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: EventPatch,
    ) -> Result<CalendarEvent, StudyplanError> {
        let mut stored = self.provider.get_event(calendar_id, event_id).await?;
        patch.apply_to(&mut stored);

        let summary = stored.summary.clone().unwrap_or_default();
        let (start, end) = self
            .normalizer
            .normalize(stored.start.as_ref(), stored.end.as_ref(), &summary);
        ensure_ordered(&start, &end)?;
        stored.start = Some(start.to_payload());
        stored.end = Some(end.to_payload());

        let updated = self
            .provider
            .update_event(calendar_id, event_id, stored)
            .await
            .map_err(|e| {
                error!("Updating event {} in {} failed: {}", event_id, calendar_id, e);
                StudyplanError::from(e)
            })?;

        let event = self
            .to_calendar_event(updated)
            .ok_or_else(|| remote_error(format!("event {} came back without an id", event_id)))?;
        info!("Updated event {} in {}", event.id, calendar_id);
        Ok(event)
    }

    /// `Ok(true)` when the provider deleted the event. A failed delete is
    /// `Ok(false)` under [`DeleteFailurePolicy::ReportBoolean`].
    pub async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<bool, StudyplanError> {
        match self.provider.delete_event(calendar_id, event_id).await {
            Ok(()) => {
                info!("Deleted event {} from {}", event_id, calendar_id);
                Ok(true)
            }
            Err(e) => match self.on_delete_failure {
                DeleteFailurePolicy::ReportBoolean => {
                    warn!("Deleting event {} from {} failed: {}", event_id, calendar_id, e);
                    Ok(false)
                }
                DeleteFailurePolicy::Propagate => {
                    error!("Deleting event {} from {} failed: {}", event_id, calendar_id, e);
                    Err(e.into())
                }
            },
        }
    }

    /// Returns the calendar whose name matches `name` ignoring case, creating
    /// it when there is none. Check-then-insert, not atomic.
    pub async fn create_calendar(&self, name: &str) -> Result<CalendarRef, StudyplanError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid_argument("calendar name must not be blank"));
        }

        let wanted = name.to_lowercase();
        let existing = self.list_calendars(self.lookup_capacity).await?;
        if let Some(calendar) = existing
            .into_iter()
            .find(|calendar| calendar.name.to_lowercase() == wanted)
        {
            debug!("Calendar '{}' already exists as {}", name, calendar.id);
            return Ok(calendar);
        }

        let created = self.provider.insert_calendar(name).await.map_err(|e| {
            error!("Creating calendar '{}' failed: {}", name, e);
            StudyplanError::from(e)
        })?;
        info!("Created calendar '{}' as {}", name, created.id);
        Ok(CalendarRef::from(created))
    }

    fn to_calendar_event(&self, payload: EventPayload) -> Option<CalendarEvent> {
        let Some(id) = payload.id.clone() else {
            warn!("Skipping event without id: {:?}", payload.summary);
            return None;
        };
        let summary = payload.summary.clone().unwrap_or_default();
        let (start, mut end) = self
            .normalizer
            .normalize(payload.start.as_ref(), payload.end.as_ref(), &summary);
        if end.is_before(&start) {
            debug!("Event {} ends before it starts, clamping end to start", id);
            end = start;
        }

        let category = payload.category();
        Some(CalendarEvent {
            id,
            summary,
            description: payload.description.unwrap_or_default(),
            location: payload.location,
            start,
            end,
            category,
            reminders: payload.reminders,
            recurrence: payload.recurrence.unwrap_or_default(),
        })
    }
}

fn ensure_ordered(start: &EventTime, end: &EventTime) -> Result<(), StudyplanError> {
    if end.is_before(start) {
        return Err(invalid_argument(format!(
            "event ends ({:?}) before it starts ({:?})",
            end, start
        )));
    }
    Ok(())
}

/// At least one line, each starting with a known iCalendar property.
pub fn validate_recurrence(lines: &[String]) -> Result<(), StudyplanError> {
    if lines.is_empty() {
        return Err(invalid_argument("a recurring event needs at least one recurrence rule"));
    }
    for line in lines {
        let trimmed = line.trim();
        if !RECURRENCE_PREFIXES
            .iter()
            .any(|prefix| trimmed.starts_with(prefix))
        {
            return Err(invalid_argument(format!(
                "recurrence line '{}' must start with one of {}",
                line,
                RECURRENCE_PREFIXES.join(", ")
            )));
        }
    }
    Ok(())
}

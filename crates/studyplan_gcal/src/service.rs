// --- File: crates/studyplan_gcal/src/service.rs ---
//! Google Calendar implementation of [`CalendarProvider`].
//!
//! Event bodies are converted to and from the hub's `Event` type through
//! serde, so fields this crate does not model pass through untouched.

use chrono::{DateTime, Utc};
use google_calendar3::api::{Calendar, Event, FreeBusyRequest, FreeBusyRequestItem};
use serde_json::Value;
use std::sync::Arc;
use studyplan_common::models::{BusyInterval, CalendarPayload, EventPayload, Page};
use studyplan_common::{BoxFuture, CalendarProvider, ProviderError, StudyplanError};
use studyplan_config::{GcalConfig, ProviderKind};
use tracing::{debug, info, warn};

use crate::auth::{create_calendar_hub, HubType};
use crate::memory::InMemoryCalendarProvider;

/// Builds the provider selected by `gcal.provider`.
pub async fn create_provider(config: &GcalConfig) -> Result<Arc<dyn CalendarProvider>, StudyplanError> {
    match config.provider {
        ProviderKind::Google => {
            let hub = create_calendar_hub(config).await?;
            Ok(Arc::new(GoogleCalendarProvider::new(Arc::new(hub))))
        }
        ProviderKind::Memory => {
            info!("Using the in-memory calendar provider");
            Ok(Arc::new(InMemoryCalendarProvider::new()))
        }
    }
}

pub struct GoogleCalendarProvider {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarProvider {
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

/// Sorts a hub error into the provider error taxonomy by its HTTP status.
fn classify(err: google_calendar3::Error) -> ProviderError {
    use google_calendar3::Error;

    let status = match &err {
        // error body as sent by the API: {"error": {"code": 404, ...}}
        Error::BadRequest(body) => body
            .get("error")
            .and_then(|error| error.get("code"))
            .and_then(Value::as_u64),
        Error::Failure(response) => Some(u64::from(response.status().as_u16())),
        _ => None,
    };
    let message = err.to_string();
    match status {
        Some(404) | Some(410) => ProviderError::NotFound(message),
        Some(400) | Some(403) | Some(409) => ProviderError::Rejected(message),
        _ => ProviderError::Transport(message),
    }
}

fn to_google_event(body: EventPayload) -> Result<Event, ProviderError> {
    serde_json::to_value(body)
        .and_then(serde_json::from_value::<Event>)
        .map_err(|e| ProviderError::Rejected(format!("event body cannot be encoded: {}", e)))
}

fn from_google_event(event: Event) -> Result<EventPayload, ProviderError> {
    let mut value = serde_json::to_value(event)
        .map_err(|e| ProviderError::Transport(format!("unexpected event body: {}", e)))?;
    // absent hub fields serialize as null and would otherwise land in `extra`
    strip_nulls(&mut value);
    serde_json::from_value(value)
        .map_err(|e| ProviderError::Transport(format!("unexpected event body: {}", e)))
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(fields) => {
            fields.retain(|_, field| !field.is_null());
            fields.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

fn page_size_param(page_size: u32) -> i32 {
    page_size.min(i32::MAX as u32) as i32
}

impl CalendarProvider for GoogleCalendarProvider {
    fn list_calendars(
        &self,
        page_size: u32,
        page_token: Option<String>,
    ) -> BoxFuture<'_, Page<CalendarPayload>, ProviderError> {
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let mut request = calendar_hub
                .calendar_list()
                .list()
                .max_results(page_size_param(page_size));
            if let Some(token) = page_token.as_deref() {
                request = request.page_token(token);
            }
            let (_response, list) = request.doit().await.map_err(classify)?;

            let items = list
                .items
                .unwrap_or_default()
                .into_iter()
                .filter_map(|entry| {
                    let Some(id) = entry.id else {
                        warn!("Skipping calendar list entry without id");
                        return None;
                    };
                    Some(CalendarPayload {
                        id,
                        summary: entry.summary,
                        description: entry.description,
                    })
                })
                .collect();
            Ok(Page {
                items,
                next_page_token: list.next_page_token,
            })
        })
    }

    fn list_events(
        &self,
        calendar_id: &str,
        page_size: u32,
        page_token: Option<String>,
    ) -> BoxFuture<'_, Page<EventPayload>, ProviderError> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let mut request = calendar_hub
                .events()
                .list(&calendar_id)
                .max_results(page_size_param(page_size));
            if let Some(token) = page_token.as_deref() {
                request = request.page_token(token);
            }
            let (_response, events) = request.doit().await.map_err(classify)?;

            let items = events
                .items
                .unwrap_or_default()
                .into_iter()
                .map(from_google_event)
                .collect::<Result<Vec<_>, _>>()?;
            debug!("Fetched {} events from {}", items.len(), calendar_id);
            Ok(Page {
                items,
                next_page_token: events.next_page_token,
            })
        })
    }

    fn get_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, EventPayload, ProviderError> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let (_response, event) = calendar_hub
                .events()
                .get(&calendar_id, &event_id)
                .doit()
                .await
                .map_err(classify)?;
            from_google_event(event)
        })
    }

    fn insert_event(&self, calendar_id: &str, body: EventPayload) -> BoxFuture<'_, EventPayload, ProviderError> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let event = to_google_event(body)?;
            let (_response, created) = calendar_hub
                .events()
                .insert(event, &calendar_id)
                .doit()
                .await
                .map_err(classify)?;
            from_google_event(created)
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
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let event = to_google_event(body)?;
            let (_response, updated) = calendar_hub
                .events()
                .update(event, &calendar_id, &event_id)
                .doit()
                .await
                .map_err(classify)?;
            from_google_event(updated)
        })
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), ProviderError> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            calendar_hub
                .events()
                .delete(&calendar_id, &event_id)
                .doit()
                .await
                .map_err(classify)?;
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
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let req = FreeBusyRequest {
                time_min: Some(time_min),
                time_max: Some(time_max),
                time_zone: Some("UTC".to_string()),
                items: Some(vec![FreeBusyRequestItem {
                    id: Some(calendar_id.clone()),
                    ..Default::default()
                }]),
                ..Default::default()
            };
            let (_response, freebusy) = calendar_hub.freebusy().query(req).doit().await.map_err(classify)?;

            let Some(cal_info) = freebusy
                .calendars
                .and_then(|mut calendars| calendars.remove(&calendar_id))
            else {
                return Ok(Vec::new());
            };

            // per-calendar failures come back inside a 200 response
            if let Some(errors) = cal_info.errors.filter(|errors| !errors.is_empty()) {
                let reasons: Vec<String> = errors.into_iter().filter_map(|e| e.reason).collect();
                return Err(if reasons.iter().any(|r| r == "notFound") {
                    ProviderError::NotFound(format!("calendar {}", calendar_id))
                } else {
                    ProviderError::Transport(format!("free/busy for {} failed: {}", calendar_id, reasons.join(", ")))
                });
            }

            let mut busy_periods = Vec::new();
            for period in cal_info.busy.unwrap_or_default() {
                match (period.start, period.end) {
                    (Some(start), Some(end)) => busy_periods.push(BusyInterval::new(start, end)),
                    _ => warn!("Skipping busy period with missing start/end: {:?}", period),
                }
            }
            busy_periods.sort();
            Ok(busy_periods)
        })
    }

    fn insert_calendar(&self, summary: &str) -> BoxFuture<'_, CalendarPayload, ProviderError> {
        let summary = summary.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let calendar = Calendar {
                summary: Some(summary),
                ..Default::default()
            };
            let (_response, created) = calendar_hub
                .calendars()
                .insert(calendar)
                .doit()
                .await
                .map_err(classify)?;
            let id = created
                .id
                .ok_or_else(|| ProviderError::Transport("created calendar has no id".to_string()))?;
            Ok(CalendarPayload {
                id,
                summary: created.summary,
                description: created.description,
            })
        })
    }
}

// --- File: crates/studyplan_gcal/src/handlers.rs ---
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studyplan_common::models::BusyInterval;
use studyplan_common::{handle_json_result, invalid_argument, CalendarProvider, StudyplanError};
use studyplan_config::AppConfig;
use tracing::info;

use crate::busy::BusyIntervalIndex;
use crate::models::{CalendarEvent, CalendarRef, EventDraft, EventPatch, StudySlot};
use crate::normalize::DateNormalizer;
use crate::pagination::Capacity;
use crate::service::create_provider;
use crate::slots::{parse_instant, SlotAllocator, SlotPolicy, StudyDemand};
use crate::store::EventStore;

/// Shared state of the calendar routes. Every component talks to the same
/// injected provider.
#[derive(Clone)]
pub struct GcalState {
    pub config: Arc<AppConfig>,
    pub store: EventStore,
    pub busy: BusyIntervalIndex,
    pub allocator: SlotAllocator,
}

impl GcalState {
    pub fn new(config: Arc<AppConfig>, provider: Arc<dyn CalendarProvider>) -> Result<Self, StudyplanError> {
        let normalizer = DateNormalizer::from_config(&config.scheduling)?;
        let policy = SlotPolicy::from_config(&config.scheduling)?;
        let store = EventStore::new(provider.clone(), normalizer, &config.store);
        let busy = BusyIntervalIndex::new(provider, config.scheduling.on_busy_query_failure);
        let allocator = SlotAllocator::new(busy.clone(), policy);
        Ok(Self {
            config,
            store,
            busy,
            allocator,
        })
    }

    /// State over the provider `gcal.provider` selects.
    pub async fn from_config(config: Arc<AppConfig>) -> Result<Self, StudyplanError> {
        let provider = create_provider(&config.gcal).await?;
        Self::new(config, provider)
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Deserialize)]
pub struct CapacityQuery {
    /// Maximum number of items; the configured default when absent.
    pub capacity: Option<String>,
}

impl CapacityQuery {
    fn resolve(&self, default: u32) -> Result<Capacity, StudyplanError> {
        match self.capacity.as_deref() {
            Some(text) => text.parse(),
            None => Ok(Capacity::new(default)),
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateCalendarRequest {
    pub name: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct DeleteEventResponse {
    pub deleted: bool,
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Deserialize)]
pub struct BusyQuery {
    /// RFC3339 or YYYY-MM-DD
    pub start: String,
    pub end: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Deserialize)]
pub struct StudySlotsQuery {
    /// Exam date/time: RFC3339 or YYYY-MM-DD (midnight in the slot time zone)
    pub deadline: String,
    pub hours_needed: f64,
    /// Defaults to `scheduling.days_before`
    pub days_before: Option<i64>,
    pub slot_hours: Option<i64>,
    pub business_start: Option<u32>,
    pub business_end: Option<u32>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize)]
pub struct StudySlotsResponse {
    pub slots: Vec<StudySlot>,
    pub requested_hours: f64,
    pub scheduled_hours: f64,
    /// False when the window ran out before the requested hours were covered.
    pub complete: bool,
}

/// Lists the calendars visible to the service account.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/calendars",
    params(CapacityQuery),
    responses(
        (status = 200, description = "Calendars", body = Vec<CalendarRef>),
        (status = 400, description = "Invalid capacity"),
        (status = 502, description = "Provider failure")
    ),
    tag = "Calendars"
))]
pub async fn list_calendars_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<CapacityQuery>,
) -> Result<Json<Vec<CalendarRef>>, Response> {
    let result = async {
        let capacity = query.resolve(state.config.store.calendar_capacity)?;
        state.store.list_calendars(capacity).await
    }
    .await;
    handle_json_result(result)
}

/// Returns the calendar with this name (ignoring case), creating it if needed.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/calendars",
    request_body = CreateCalendarRequest,
    responses(
        (status = 200, description = "Existing or created calendar", body = CalendarRef),
        (status = 400, description = "Blank name")
    ),
    tag = "Calendars"
))]
pub async fn create_calendar_handler(
    State(state): State<Arc<GcalState>>,
    Json(request): Json<CreateCalendarRequest>,
) -> Result<Json<CalendarRef>, Response> {
    handle_json_result(state.store.create_calendar(&request.name).await)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/calendars/{calendar_id}/events",
    params(("calendar_id" = String, Path, description = "Calendar id"), CapacityQuery),
    responses(
        (status = 200, description = "Events with normalized start/end", body = Vec<CalendarEvent>),
        (status = 404, description = "Unknown calendar")
    ),
    tag = "Events"
))]
pub async fn list_events_handler(
    State(state): State<Arc<GcalState>>,
    Path(calendar_id): Path<String>,
    Query(query): Query<CapacityQuery>,
) -> Result<Json<Vec<CalendarEvent>>, Response> {
    let result = async {
        let capacity = query.resolve(state.config.store.event_capacity)?;
        state.store.list_events(&calendar_id, capacity).await
    }
    .await;
    handle_json_result(result)
}

/// Creates an event from a draft. The body is parsed here so that malformed
/// JSON is reported like any other invalid argument.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/calendars/{calendar_id}/events",
    params(("calendar_id" = String, Path, description = "Calendar id")),
    request_body = EventDraft,
    responses(
        (status = 201, description = "Created event", body = CalendarEvent),
        (status = 400, description = "Malformed draft or end before start"),
        (status = 502, description = "Provider rejected the event")
    ),
    tag = "Events"
))]
pub async fn insert_event_handler(
    State(state): State<Arc<GcalState>>,
    Path(calendar_id): Path<String>,
    body: String,
) -> Response {
    let result = match EventDraft::from_json_str(&body) {
        Ok(draft) => state.store.insert_event(&calendar_id, draft).await,
        Err(e) => Err(e),
    };
    created(result)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/calendars/{calendar_id}/events/recurring",
    params(("calendar_id" = String, Path, description = "Calendar id")),
    request_body = EventDraft,
    responses(
        (status = 201, description = "Created recurring event", body = CalendarEvent),
        (status = 400, description = "Missing or malformed recurrence rules")
    ),
    tag = "Events"
))]
pub async fn create_recurring_event_handler(
    State(state): State<Arc<GcalState>>,
    Path(calendar_id): Path<String>,
    body: String,
) -> Response {
    let result = match EventDraft::from_json_str(&body) {
        Ok(draft) => state.store.create_recurring_event(&calendar_id, draft).await,
        Err(e) => Err(e),
    };
    created(result)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/calendars/{calendar_id}/events/{event_id}",
    params(
        ("calendar_id" = String, Path, description = "Calendar id"),
        ("event_id" = String, Path, description = "Event id")
    ),
    request_body = EventPatch,
    responses(
        (status = 200, description = "Updated event", body = CalendarEvent),
        (status = 404, description = "Unknown event")
    ),
    tag = "Events"
))]
pub async fn update_event_handler(
    State(state): State<Arc<GcalState>>,
    Path((calendar_id, event_id)): Path<(String, String)>,
    body: String,
) -> Result<Json<CalendarEvent>, Response> {
    let result = match EventPatch::from_json_str(&body) {
        Ok(patch) => state.store.update_event(&calendar_id, &event_id, patch).await,
        Err(e) => Err(e),
    };
    handle_json_result(result)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/calendars/{calendar_id}/events/{event_id}",
    params(
        ("calendar_id" = String, Path, description = "Calendar id"),
        ("event_id" = String, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Whether the event was deleted", body = DeleteEventResponse)
    ),
    tag = "Events"
))]
pub async fn delete_event_handler(
    State(state): State<Arc<GcalState>>,
    Path((calendar_id, event_id)): Path<(String, String)>,
) -> Result<Json<DeleteEventResponse>, Response> {
    let result = state
        .store
        .delete_event(&calendar_id, &event_id)
        .await
        .map(|deleted| DeleteEventResponse { deleted });
    handle_json_result(result)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/calendars/{calendar_id}/busy",
    params(("calendar_id" = String, Path, description = "Calendar id"), BusyQuery),
    responses(
        (status = 200, description = "Busy intervals ordered by start", body = Vec<BusyInterval>),
        (status = 400, description = "Unparsable window bounds")
    ),
    tag = "Scheduling"
))]
pub async fn busy_intervals_handler(
    State(state): State<Arc<GcalState>>,
    Path(calendar_id): Path<String>,
    Query(query): Query<BusyQuery>,
) -> Result<Json<Vec<BusyInterval>>, Response> {
    let result = async {
        let zone = state.allocator.policy().time_zone;
        let start = parse_instant(&query.start, zone)?;
        let end = parse_instant(&query.end, zone)?;
        state.busy.query(&calendar_id, start, end).await
    }
    .await;
    handle_json_result(result)
}

/// Proposes study slots ahead of a deadline.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/calendars/{calendar_id}/study-slots",
    params(("calendar_id" = String, Path, description = "Calendar id"), StudySlotsQuery),
    responses(
        (status = 200, description = "Suggested slots", body = StudySlotsResponse),
        (status = 400, description = "Invalid deadline, hours or window")
    ),
    tag = "Scheduling"
))]
pub async fn study_slots_handler(
    State(state): State<Arc<GcalState>>,
    Path(calendar_id): Path<String>,
    Query(query): Query<StudySlotsQuery>,
) -> Result<Json<StudySlotsResponse>, Response> {
    let result = async {
        let deadline = parse_instant(&query.deadline, state.allocator.policy().time_zone)?;
        let days_before = query.days_before.unwrap_or(state.config.scheduling.days_before);
        let mut demand = StudyDemand::new(deadline, query.hours_needed, days_before);
        demand.slot_duration = query
            .slot_hours
            .map(|hours| {
                Duration::try_hours(hours)
                    .ok_or_else(|| invalid_argument(format!("slot_hours {} is out of range", hours)))
            })
            .transpose()?;
        if query.business_start.is_some() || query.business_end.is_some() {
            let (first, last) = state.allocator.policy().business_hours;
            demand.business_hours = Some((
                query.business_start.unwrap_or(first),
                query.business_end.unwrap_or(last),
            ));
        }

        let slots = state.allocator.suggest_slots(&calendar_id, &demand).await?;
        let scheduled_hours: f64 = slots.iter().map(StudySlot::hours).sum();
        info!(
            "Suggested {:.1}h of {:.1}h for {} before {}",
            scheduled_hours, query.hours_needed, calendar_id, deadline
        );
        Ok::<_, StudyplanError>(StudySlotsResponse {
            complete: scheduled_hours >= query.hours_needed,
            requested_hours: query.hours_needed,
            scheduled_hours,
            slots,
        })
    }
    .await;
    handle_json_result(result)
}

fn created(result: Result<CalendarEvent, StudyplanError>) -> Response {
    match result {
        Ok(event) => (StatusCode::CREATED, Json(event)).into_response(),
        Err(e) => e.into_response(),
    }
}

// --- File: crates/studyplan_gcal/src/routes.rs ---
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    busy_intervals_handler, create_calendar_handler, create_recurring_event_handler,
    delete_event_handler, insert_event_handler, list_calendars_handler, list_events_handler,
    study_slots_handler, update_event_handler, GcalState,
};

/// Router for the calendar and scheduling endpoints, meant to be nested
/// under `/api`.
pub fn routes(state: Arc<GcalState>) -> Router {
    Router::new()
        .route(
            "/calendars",
            get(list_calendars_handler).post(create_calendar_handler),
        )
        .route(
            "/calendars/{calendar_id}/events",
            get(list_events_handler).post(insert_event_handler),
        )
        .route(
            "/calendars/{calendar_id}/events/recurring",
            post(create_recurring_event_handler),
        )
        .route(
            "/calendars/{calendar_id}/events/{event_id}",
            put(update_event_handler).delete(delete_event_handler),
        )
        .route("/calendars/{calendar_id}/busy", get(busy_intervals_handler))
        .route(
            "/calendars/{calendar_id}/study-slots",
            get(study_slots_handler),
        )
        .with_state(state)
}

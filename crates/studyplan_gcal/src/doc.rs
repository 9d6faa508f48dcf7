// --- File: crates/studyplan_gcal/src/doc.rs ---
#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::handlers::{
    CreateCalendarRequest, DeleteEventResponse, StudySlotsResponse,
    __path_busy_intervals_handler, __path_create_calendar_handler,
    __path_create_recurring_event_handler, __path_delete_event_handler,
    __path_insert_event_handler, __path_list_calendars_handler, __path_list_events_handler,
    __path_study_slots_handler, __path_update_event_handler,
};
use crate::models::{CalendarEvent, CalendarRef, EventDraft, EventPatch, StudySlot};
use studyplan_common::models::{BusyInterval, ReminderOverride, Reminders};

#[derive(OpenApi)]
#[openapi(
    paths(
        list_calendars_handler,
        create_calendar_handler,
        list_events_handler,
        insert_event_handler,
        create_recurring_event_handler,
        update_event_handler,
        delete_event_handler,
        busy_intervals_handler,
        study_slots_handler,
    ),
    components(schemas(
        CalendarRef,
        CalendarEvent,
        EventDraft,
        EventPatch,
        Reminders,
        ReminderOverride,
        BusyInterval,
        StudySlot,
        CreateCalendarRequest,
        DeleteEventResponse,
        StudySlotsResponse,
    )),
    tags(
        (name = "Calendars", description = "Calendar listing and creation"),
        (name = "Events", description = "Event create/read/update/delete"),
        (name = "Scheduling", description = "Busy time and study-slot suggestions")
    )
)]
pub struct GcalApiDoc;

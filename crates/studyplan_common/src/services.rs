// --- File: crates/studyplan_common/src/services.rs ---
//! Calendar provider abstraction.
//!
//! The scheduling subsystem talks to a calendar provider only through this
//! trait. Implementations are injected (usually as `Arc<dyn CalendarProvider>`)
//! into the components that need them; nothing holds a global client.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

use crate::error::ProviderError;
use crate::models::{BusyInterval, CalendarPayload, EventPayload, Page};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// The remote operations a calendar provider has to offer.
///
/// Every call is a single request/response exchange. Callers await each call
/// before issuing the next, so one caller's operations reach the provider in
/// order.
pub trait CalendarProvider: Send + Sync {
    /// One page of the calendars visible to the authenticated principal.
    fn list_calendars(
        &self,
        page_size: u32,
        page_token: Option<String>,
    ) -> BoxFuture<'_, Page<CalendarPayload>, ProviderError>;

    /// One page of events of a calendar, in provider order.
    fn list_events(
        &self,
        calendar_id: &str,
        page_size: u32,
        page_token: Option<String>,
    ) -> BoxFuture<'_, Page<EventPayload>, ProviderError>;

    fn get_event(&self, calendar_id: &str, event_id: &str)
        -> BoxFuture<'_, EventPayload, ProviderError>;

    fn insert_event(
        &self,
        calendar_id: &str,
        body: EventPayload,
    ) -> BoxFuture<'_, EventPayload, ProviderError>;

    /// Replaces the whole stored event with `body`.
    fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        body: EventPayload,
    ) -> BoxFuture<'_, EventPayload, ProviderError>;

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), ProviderError>;

    /// Busy ranges of one calendar inside `[time_min, time_max)`.
    fn query_free_busy(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusyInterval>, ProviderError>;

    /// Creates a secondary calendar named `summary`.
    fn insert_calendar(&self, summary: &str) -> BoxFuture<'_, CalendarPayload, ProviderError>;
}

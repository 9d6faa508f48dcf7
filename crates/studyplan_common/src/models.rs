// --- File: crates/studyplan_common/src/models.rs ---
//! Provider-neutral wire payloads.
//!
//! These mirror the event/calendar bodies a calendar provider accepts and
//! returns. Field names follow the provider's camelCase JSON so that a body can
//! round-trip through serde without losing anything: fields this crate does not
//! model are kept in `extra`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation token; `None` on the last page.
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }
}

/// Calendar list entry as the provider returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CalendarPayload {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `start` / `end` of an event: exactly one of `date` or `dateTime` is
/// expected, but nothing enforces it on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTimePayload {
    /// `YYYY-MM-DD` for all-day events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// RFC3339, or a local `YYYY-MM-DDTHH:MM:SS` interpreted in `time_zone`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// IANA zone name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTimePayload {
    pub fn all_day(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Default::default()
        }
    }

    pub fn timed(date_time: impl Into<String>, time_zone: Option<&str>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            time_zone: time_zone.map(str::to_string),
            ..Default::default()
        }
    }

    /// True when neither `date` nor `dateTime` is present.
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.date_time.is_none()
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderOverride {
    /// `email` or `popup`
    pub method: String,
    pub minutes: i32,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    #[serde(default)]
    pub use_default: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<ReminderOverride>,
}

/// Event body exchanged with the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTimePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTimePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<String>>,
    /// Provider fields not modelled above (attendees, colorId, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const EXTENDED_PROPERTIES: &str = "extendedProperties";
const CATEGORY_KEY: &str = "category";

impl EventPayload {
    /// Category stored in the private extended properties.
    pub fn category(&self) -> Option<String> {
        self.extra
            .get(EXTENDED_PROPERTIES)?
            .get("private")?
            .get(CATEGORY_KEY)?
            .as_str()
            .map(str::to_string)
    }

    pub fn set_category(&mut self, category: &str) {
        let extended = self
            .extra
            .entry(EXTENDED_PROPERTIES)
            .or_insert_with(|| Value::Object(Map::new()));
        if !extended.is_object() {
            *extended = Value::Object(Map::new());
        }
        if let Value::Object(extended) = extended {
            let private = extended
                .entry("private")
                .or_insert_with(|| Value::Object(Map::new()));
            if !private.is_object() {
                *private = Value::Object(Map::new());
            }
            if let Value::Object(private) = private {
                private.insert(CATEGORY_KEY.to_string(), Value::String(category.to_string()));
            }
        }
    }
}

/// Busy time range, half-open `[start, end)`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// `start <= instant < end`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// True when `[start, end)` intersects this interval.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

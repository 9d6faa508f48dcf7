// --- File: crates/studyplan_gcal/src/models.rs ---
//! Plain data structures handed to the UI/agent layer.
//!
//! Nothing in here depends on a provider's own types; events arrive as
//! `EventPayload`s and leave as `CalendarEvent`s.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use studyplan_common::models::{CalendarPayload, EventDateTimePayload, EventPayload, Reminders};
use studyplan_common::{invalid_argument, StudyplanError};

/// A calendar as the facade exposes it. Identity is `id`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarRef {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<CalendarPayload> for CalendarRef {
    fn from(payload: CalendarPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.summary.unwrap_or_default(),
            description: payload.description.unwrap_or_default(),
        }
    }
}

/// Start or end of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "EventDateTimePayload")]
pub enum EventTime {
    /// Calendar date only, no clock time or zone.
    AllDay { date: NaiveDate },
    /// Zoned instant; the zone is carried by the `DateTime`.
    Timed { instant: DateTime<Tz> },
}

impl EventTime {
    pub fn all_day(date: NaiveDate) -> Self {
        EventTime::AllDay { date }
    }

    pub fn timed(instant: DateTime<Tz>) -> Self {
        EventTime::Timed { instant }
    }

    pub fn zone(&self) -> Option<Tz> {
        match self {
            EventTime::AllDay { .. } => None,
            EventTime::Timed { instant } => Some(instant.timezone()),
        }
    }

    /// The calendar date, local to the event's zone for timed events.
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::AllDay { date } => *date,
            EventTime::Timed { instant } => instant.date_naive(),
        }
    }

    /// Ordering used for the `end >= start` check. Mixed variants compare by date.
    pub fn is_before(&self, other: &EventTime) -> bool {
        match (self, other) {
            (EventTime::Timed { instant: a }, EventTime::Timed { instant: b }) => {
                a.with_timezone(&Utc) < b.with_timezone(&Utc)
            }
            _ => self.date() < other.date(),
        }
    }

    pub fn to_payload(&self) -> EventDateTimePayload {
        match self {
            EventTime::AllDay { date } => EventDateTimePayload::all_day(date.format("%Y-%m-%d").to_string()),
            EventTime::Timed { instant } => EventDateTimePayload::timed(
                instant.to_rfc3339_opts(SecondsFormat::Secs, true),
                Some(instant.timezone().name()),
            ),
        }
    }
}

impl From<EventTime> for EventDateTimePayload {
    fn from(time: EventTime) -> Self {
        time.to_payload()
    }
}

/// An event with normalized start and end.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub start: EventTime,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub end: EventTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
}

/// Event to be created. `start`/`end` may be missing or incomplete; they are
/// normalized before anything is sent to the provider.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub start: Option<EventDateTimePayload>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub end: Option<EventDateTimePayload>,
    pub reminders: Option<Reminders>,
    #[serde(default)]
    pub recurrence: Vec<String>,
    pub category: Option<String>,
}

impl EventDraft {
    /// Parses a JSON text payload, e.g. one produced by the agent layer.
    pub fn from_json_str(text: &str) -> Result<Self, StudyplanError> {
        serde_json::from_str(text)
            .map_err(|e| invalid_argument(format!("event draft is not valid JSON: {}", e)))
    }

    pub(crate) fn into_payload(self, start: EventTime, end: EventTime) -> EventPayload {
        let mut payload = EventPayload {
            summary: self.summary,
            description: self.description,
            location: self.location,
            start: Some(start.to_payload()),
            end: Some(end.to_payload()),
            reminders: self.reminders,
            recurrence: (!self.recurrence.is_empty()).then_some(self.recurrence),
            ..Default::default()
        };
        if let Some(category) = self.category.as_deref() {
            payload.set_category(category);
        }
        payload
    }
}

/// Field-level overwrite for `update_event`. Every field that is present
/// replaces the stored value; keys the struct does not name go to `extra` and
/// overwrite the provider field of the same name.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub start: Option<EventDateTimePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub end: Option<EventDateTimePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: Map<String, Value>,
}

impl EventPatch {
    pub fn from_json_str(text: &str) -> Result<Self, StudyplanError> {
        serde_json::from_str(text)
            .map_err(|e| invalid_argument(format!("event patch is not valid JSON: {}", e)))
    }

    /// Overlays every present field onto `event`.
    pub fn apply_to(self, event: &mut EventPayload) {
        if let Some(summary) = self.summary {
            event.summary = Some(summary);
        }
        if let Some(description) = self.description {
            event.description = Some(description);
        }
        if let Some(location) = self.location {
            event.location = Some(location);
        }
        if let Some(start) = self.start {
            event.start = Some(start);
        }
        if let Some(end) = self.end {
            event.end = Some(end);
        }
        if let Some(reminders) = self.reminders {
            event.reminders = Some(reminders);
        }
        if let Some(recurrence) = self.recurrence {
            event.recurrence = Some(recurrence);
        }
        for (key, value) in self.extra {
            event.extra.insert(key, value);
        }
        if let Some(category) = self.category.as_deref() {
            event.set_category(category);
        }
    }
}

/// A proposed block of study time, half-open `[start, end)`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudySlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl StudySlot {
    pub fn hours(&self) -> f64 {
        (self.end - self.start).num_minutes() as f64 / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn timed_event_time_renders_offset_and_zone() {
        let instant = chrono_tz::Asia::Jakarta
            .with_ymd_and_hms(2025, 6, 9, 10, 0, 0)
            .unwrap();
        let payload = EventTime::timed(instant).to_payload();

        assert_eq!(payload.date_time.as_deref(), Some("2025-06-09T10:00:00+07:00"));
        assert_eq!(payload.time_zone.as_deref(), Some("Asia/Jakarta"));
        assert_eq!(payload.date, None);
    }

    #[test]
    fn all_day_event_time_serializes_as_date() {
        let time = EventTime::all_day(NaiveDate::from_ymd_opt(2025, 6, 9).unwrap());
        assert_eq!(serde_json::to_value(time).unwrap(), json!({"date": "2025-06-09"}));
    }

    #[test]
    fn mixed_variants_compare_by_date() {
        let day = EventTime::all_day(NaiveDate::from_ymd_opt(2025, 6, 9).unwrap());
        let same_day_timed = EventTime::timed(
            chrono_tz::UTC.with_ymd_and_hms(2025, 6, 9, 23, 0, 0).unwrap(),
        );
        let next_day = EventTime::all_day(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());

        assert!(!same_day_timed.is_before(&day));
        assert!(!day.is_before(&same_day_timed));
        assert!(day.is_before(&next_day));
    }

    #[test]
    fn draft_parsing_rejects_garbage() {
        let err = EventDraft::from_json_str("{summary: oops").unwrap_err();
        assert!(matches!(err, StudyplanError::InvalidArgument(_)));

        let draft = EventDraft::from_json_str(
            r#"{"summary": "Exam", "start": {"dateTime": "2025-06-09T10:00:00"}}"#,
        )
        .expect("valid draft");
        assert_eq!(draft.summary.as_deref(), Some("Exam"));
        assert_eq!(
            draft.start.and_then(|s| s.date_time).as_deref(),
            Some("2025-06-09T10:00:00")
        );
    }

    #[test]
    fn patch_overwrites_present_keys_only() {
        let mut event = EventPayload {
            id: Some("evt-1".into()),
            summary: Some("Old".into()),
            description: Some("keep me".into()),
            ..Default::default()
        };
        let patch = EventPatch::from_json_str(r#"{"summary": "New", "colorId": "7"}"#).unwrap();

        patch.apply_to(&mut event);

        assert_eq!(event.summary.as_deref(), Some("New"));
        assert_eq!(event.description.as_deref(), Some("keep me"));
        assert_eq!(event.extra.get("colorId"), Some(&json!("7")));
        assert_eq!(event.id.as_deref(), Some("evt-1"));
    }
}

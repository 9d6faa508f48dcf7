// --- File: crates/services/studyplan_backend/src/exam_week.rs ---
//! Rebuilds the exam calendar from a list of `Summary=YYYY-MM-DD` entries.

use chrono::{Duration, NaiveDate};
use std::str::FromStr;
use studyplan_common::models::EventDateTimePayload;
use studyplan_common::{invalid_argument, not_found, StudyplanError};
use studyplan_gcal::{Capacity, EventDraft, EventStore};
use tracing::{info, warn};

pub const DEFAULT_CALENDAR_NAME: &str = "Exam Week";

/// One all-day exam, parsed from `Summary=YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamEntry {
    pub summary: String,
    pub date: NaiveDate,
}

impl ExamEntry {
    /// All-day event on `date`; the provider expects an exclusive end date.
    pub fn to_draft(&self) -> EventDraft {
        let end = self.date + Duration::days(1);
        EventDraft {
            summary: Some(self.summary.clone()),
            start: Some(EventDateTimePayload::all_day(self.date.format("%Y-%m-%d").to_string())),
            end: Some(EventDateTimePayload::all_day(end.format("%Y-%m-%d").to_string())),
            category: Some("exam".to_string()),
            ..Default::default()
        }
    }
}

impl FromStr for ExamEntry {
    type Err = StudyplanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // split on the last '=' so summaries may contain one
        let (summary, date) = s
            .rsplit_once('=')
            .ok_or_else(|| invalid_argument(format!("expected Summary=YYYY-MM-DD, got '{}'", s)))?;
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(invalid_argument(format!("exam '{}' has no summary", s)));
        }
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|e| invalid_argument(format!("exam '{}' has an invalid date: {}", s, e)))?;
        Ok(Self {
            summary: summary.to_string(),
            date,
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResetReport {
    pub calendar_id: String,
    pub deleted: usize,
    /// Events that were listed but could not be deleted.
    pub not_deleted: usize,
    pub created: Vec<String>,
}

/// Clears the calendar named exactly `calendar_name` and recreates `exams`
/// in it. Deletes run one after another, then inserts in argument order.
pub async fn reset_exam_week(
    store: &EventStore,
    calendar_name: &str,
    exams: &[ExamEntry],
    capacity: Capacity,
) -> Result<ResetReport, StudyplanError> {
    let calendar = store
        .find_calendar_by_name(calendar_name)
        .await?
        .ok_or_else(|| not_found(format!("calendar '{}' not found", calendar_name)))?;
    info!("Resetting calendar '{}' ({})", calendar.name, calendar.id);

    let mut report = ResetReport {
        calendar_id: calendar.id.clone(),
        ..Default::default()
    };

    for event in store.list_events(&calendar.id, capacity).await? {
        if store.delete_event(&calendar.id, &event.id).await? {
            info!("Deleted '{}' ({})", event.summary, event.id);
            report.deleted += 1;
        } else {
            warn!("Could not delete '{}' ({})", event.summary, event.id);
            report.not_deleted += 1;
        }
    }

    for exam in exams {
        let created = store.insert_event(&calendar.id, exam.to_draft()).await?;
        info!("Created '{}' on {}", created.summary, exam.date);
        report.created.push(created.id);
    }

    Ok(report)
}

// --- File: crates/studyplan_gcal/src/normalize.rs ---
//! Turns the loosely-shaped `start`/`end` of incoming events into `EventTime`s.
//!
//! Three inputs are understood: an all-day `date`, a `dateTime` with or without
//! a zone, and nothing at all, in which case a date is inferred from the event
//! summary ("Exam on 9th of June 2025"). Normalization never fails; the worst
//! case is an all-day event on today's date in the configured default year.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;
use std::sync::Arc;
use studyplan_common::models::EventDateTimePayload;
use studyplan_common::{config_error, StudyplanError};
use studyplan_config::SchedulingConfig;
use tracing::{debug, info, warn};

use crate::models::EventTime;

/// Finds a calendar date mentioned in free text.
#[cfg_attr(test, mockall::automock)]
pub trait DateInferenceStrategy: Send + Sync {
    /// Returns the first date mentioned in `text`, using `default_year` when the
    /// text names no year. `None` when nothing usable is found, including
    /// mentions that do not form a real date ("31st of June").
    fn infer_date(&self, text: &str, default_year: i32) -> Option<NaiveDate>;
}

// "9th of June 2025", "9 June", "21st of december, 2024"
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?([a-z]+)(?:,?\s+(\d{4}))?")
        .expect("day-month pattern is valid")
});

// "June 9", "June 9th, 2025"
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([a-z]+)\s+(\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(\d{4}))?")
        .expect("month-day pattern is valid")
});

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_ascii_lowercase().as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Regex-based inference: an ordinal day, a month name and an optional year,
/// in either order. Words that are not month names are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexDateInference;

impl RegexDateInference {
    fn scan(
        pattern: &Regex,
        text: &str,
        day_group: usize,
        month_group: usize,
        default_year: i32,
    ) -> Option<Option<NaiveDate>> {
        for caps in pattern.captures_iter(text) {
            let Some(month) = caps.get(month_group).and_then(|m| month_number(m.as_str())) else {
                continue;
            };
            let day = caps.get(day_group).and_then(|d| d.as_str().parse::<u32>().ok());
            let year = caps
                .get(3)
                .and_then(|y| y.as_str().parse::<i32>().ok())
                .unwrap_or(default_year);
            // a recognised month settles the match, even if the day is invalid
            return Some(day.and_then(|day| NaiveDate::from_ymd_opt(year, month, day)));
        }
        None
    }
}

impl DateInferenceStrategy for RegexDateInference {
    fn infer_date(&self, text: &str, default_year: i32) -> Option<NaiveDate> {
        Self::scan(&DAY_MONTH, text, 1, 2, default_year)
            .or_else(|| Self::scan(&MONTH_DAY, text, 2, 1, default_year))
            .flatten()
    }
}

/// Converts raw event times into `EventTime`s.
#[derive(Clone)]
pub struct DateNormalizer {
    default_zone: Tz,
    default_year: i32,
    strategy: Arc<dyn DateInferenceStrategy>,
}

impl DateNormalizer {
    /// Normalizer with the regex inference strategy.
    pub fn new(default_zone: Tz, default_year: i32) -> Self {
        Self {
            default_zone,
            default_year,
            strategy: Arc::new(RegexDateInference),
        }
    }

    pub fn from_config(config: &SchedulingConfig) -> Result<Self, StudyplanError> {
        let zone = Tz::from_str(&config.default_time_zone).map_err(|e| {
            config_error(format!(
                "default_time_zone '{}' is not an IANA zone: {}",
                config.default_time_zone, e
            ))
        })?;
        Ok(Self::new(zone, config.default_year))
    }

    /// Replaces the date inference strategy.
    pub fn with_strategy(mut self, strategy: Arc<dyn DateInferenceStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn default_zone(&self) -> Tz {
        self.default_zone
    }

    pub fn default_year(&self) -> i32 {
        self.default_year
    }

    /// Normalizes a start/end pair, inferring from `fallback_summary` when the
    /// start carries neither `date` nor `dateTime`. "Today" is taken in the
    /// default zone.
    pub fn normalize(
        &self,
        raw_start: Option<&EventDateTimePayload>,
        raw_end: Option<&EventDateTimePayload>,
        fallback_summary: &str,
    ) -> (EventTime, EventTime) {
        let today = Utc::now().with_timezone(&self.default_zone).date_naive();
        self.normalize_on(raw_start, raw_end, fallback_summary, today)
    }

    /// Same as [`normalize`](Self::normalize) with an explicit "today".
    pub fn normalize_on(
        &self,
        raw_start: Option<&EventDateTimePayload>,
        raw_end: Option<&EventDateTimePayload>,
        fallback_summary: &str,
        today: NaiveDate,
    ) -> (EventTime, EventTime) {
        if let Some(start) = raw_start.and_then(|raw| self.normalize_one(raw)) {
            // a missing or unusable end collapses onto the start
            let end = raw_end
                .and_then(|raw| self.normalize_one(raw))
                .unwrap_or(start);
            return (start, end);
        }

        let date = match self.strategy.infer_date(fallback_summary, self.default_year) {
            Some(date) => {
                info!("Inferred date {} from summary '{}'", date, fallback_summary);
                date
            }
            None => {
                let date = self.today_in_default_year(today);
                info!(
                    "No usable date in summary '{}', using fallback {}",
                    fallback_summary, date
                );
                date
            }
        };
        (EventTime::all_day(date), EventTime::all_day(date))
    }

    /// Normalizes a single time. `None` when it has neither a parsable `date`
    /// nor a parsable `dateTime`.
    pub fn normalize_one(&self, raw: &EventDateTimePayload) -> Option<EventTime> {
        if let Some(text) = raw.date_time.as_deref() {
            let zone = self.zone_for(raw.time_zone.as_deref());
            return match parse_date_time(text, zone) {
                Some(instant) => Some(EventTime::timed(instant)),
                None => {
                    warn!("Unparsable dateTime '{}'", text);
                    None
                }
            };
        }
        if let Some(text) = raw.date.as_deref() {
            return match NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
                Ok(date) => Some(EventTime::all_day(date)),
                Err(e) => {
                    warn!("Unparsable date '{}': {}", text, e);
                    None
                }
            };
        }
        None
    }

    fn zone_for(&self, name: Option<&str>) -> Tz {
        match name {
            Some(name) => Tz::from_str(name).unwrap_or_else(|_| {
                warn!(
                    "Unknown time zone '{}', using {}",
                    name,
                    self.default_zone.name()
                );
                self.default_zone
            }),
            None => self.default_zone,
        }
    }

    fn today_in_default_year(&self, today: NaiveDate) -> NaiveDate {
        today
            .with_year(self.default_year)
            // 29 February in a non-leap default year
            .or_else(|| NaiveDate::from_ymd_opt(self.default_year, today.month(), 28))
            .unwrap_or(today)
    }
}

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// RFC3339 text is converted into `zone`; offset-less text is read as wall
/// clock time in `zone`.
pub(crate) fn parse_date_time(text: &str, zone: Tz) -> Option<DateTime<Tz>> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&zone));
    }
    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())?;
    match zone.from_local_datetime(&naive).earliest() {
        Some(instant) => Some(instant),
        None => {
            // inside a DST gap: the wall clock time does not exist
            debug!("Local time {} does not exist in {}, reading it as UTC", naive, zone.name());
            Some(zone.from_utc_datetime(&naive))
        }
    }
}

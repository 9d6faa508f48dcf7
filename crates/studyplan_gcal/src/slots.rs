// --- File: crates/studyplan_gcal/src/slots.rs ---
//! Greedy study-slot allocation ahead of a deadline.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use studyplan_common::models::BusyInterval;
use studyplan_common::{config_error, invalid_argument, StudyplanError};
use studyplan_config::{OverlapCheck, SchedulingConfig};
use tracing::debug;

use crate::busy::BusyIntervalIndex;
use crate::models::StudySlot;

/// Longest look-back window a demand may ask for.
pub const MAX_DAYS_BEFORE: i64 = 366;

/// Longest slot, and longest step between candidates.
pub const MAX_SLOT_HOURS: i64 = 24;

/// Shape of the slots the allocator proposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotPolicy {
    pub slot_duration: Duration,
    /// Distance between consecutive candidate starts.
    pub step: Duration,
    /// Inclusive range of hours (in `time_zone`) a slot may start in.
    pub business_hours: (u32, u32),
    pub time_zone: Tz,
    pub overlap_check: OverlapCheck,
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self {
            slot_duration: Duration::hours(2),
            step: Duration::hours(1),
            business_hours: (9, 17),
            time_zone: Tz::UTC,
            overlap_check: OverlapCheck::StartOnly,
        }
    }
}

impl SlotPolicy {
    pub fn from_config(config: &SchedulingConfig) -> Result<Self, StudyplanError> {
        let time_zone = Tz::from_str(&config.slot_time_zone).map_err(|e| {
            config_error(format!(
                "slot_time_zone '{}' is not an IANA zone: {}",
                config.slot_time_zone, e
            ))
        })?;
        let slot_duration = Duration::try_hours(config.slot_duration_hours).ok_or_else(|| {
            config_error(format!(
                "slot_duration_hours {} is out of range",
                config.slot_duration_hours
            ))
        })?;
        let step = Duration::try_minutes(config.step_minutes).ok_or_else(|| {
            config_error(format!("step_minutes {} is out of range", config.step_minutes))
        })?;
        let policy = Self {
            slot_duration,
            step,
            business_hours: (config.business_hours[0], config.business_hours[1]),
            time_zone,
            overlap_check: config.overlap_check,
        };
        policy.validate().map_err(|e| config_error(e.to_string()))?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), StudyplanError> {
        let longest = Duration::hours(MAX_SLOT_HOURS);
        if self.slot_duration <= Duration::zero() || self.slot_duration > longest {
            return Err(invalid_argument(format!(
                "slot duration must be positive and at most {} hours",
                MAX_SLOT_HOURS
            )));
        }
        if self.step <= Duration::zero() || self.step > longest {
            return Err(invalid_argument(format!(
                "slot step must be positive and at most {} hours",
                MAX_SLOT_HOURS
            )));
        }
        let (first, last) = self.business_hours;
        if first > last || last > 23 {
            return Err(invalid_argument(format!(
                "business hours [{}, {}] are not a valid range of hours",
                first, last
            )));
        }
        Ok(())
    }

    fn within_business_hours(&self, candidate: DateTime<Utc>) -> bool {
        let hour = candidate.with_timezone(&self.time_zone).hour();
        let (first, last) = self.business_hours;
        first <= hour && hour <= last
    }

    fn is_busy(&self, candidate: DateTime<Utc>, busy: &[BusyInterval]) -> bool {
        match self.overlap_check {
            OverlapCheck::StartOnly => busy.iter().any(|interval| interval.contains(candidate)),
            OverlapCheck::FullSpan => {
                let end = candidate + self.slot_duration;
                busy.iter().any(|interval| interval.overlaps(candidate, end))
            }
        }
    }
}

/// Parses a deadline or window bound: RFC3339, or a plain `YYYY-MM-DD` read as
/// midnight in `zone`.
pub fn parse_instant(text: &str, zone: Tz) -> Result<DateTime<Utc>, StudyplanError> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
        invalid_argument(format!(
            "'{}' is neither an RFC3339 timestamp nor a YYYY-MM-DD date",
            text
        ))
    })?;
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    let local = zone
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| zone.from_utc_datetime(&midnight));
    Ok(local.with_timezone(&Utc))
}

/// How much study time is wanted, and by when.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudyDemand {
    pub deadline: DateTime<Utc>,
    pub hours_needed: f64,
    /// Length of the look-back window ending at the deadline.
    pub days_before: i64,
    /// Overrides the policy's slot duration for this request.
    pub slot_duration: Option<Duration>,
    /// Overrides the policy's business hours for this request.
    pub business_hours: Option<(u32, u32)>,
}

impl StudyDemand {
    pub fn new(deadline: DateTime<Utc>, hours_needed: f64, days_before: i64) -> Self {
        Self {
            deadline,
            hours_needed,
            days_before,
            slot_duration: None,
            business_hours: None,
        }
    }

    /// `deadline - days_before`. `days_before` must lie in `0..=MAX_DAYS_BEFORE`.
    pub fn window_start(&self) -> Result<DateTime<Utc>, StudyplanError> {
        if !(0..=MAX_DAYS_BEFORE).contains(&self.days_before) {
            return Err(invalid_argument(format!(
                "days_before must be between 0 and {}, got {}",
                MAX_DAYS_BEFORE, self.days_before
            )));
        }
        Duration::try_days(self.days_before)
            .and_then(|lead| self.deadline.checked_sub_signed(lead))
            .ok_or_else(|| invalid_argument(format!("window before {} is out of range", self.deadline)))
    }

    fn needed(&self) -> Result<Duration, StudyplanError> {
        if !self.hours_needed.is_finite() || self.hours_needed < 0.0 {
            return Err(invalid_argument(format!(
                "hours_needed must be a non-negative number, got {}",
                self.hours_needed
            )));
        }
        let seconds = (self.hours_needed * 3600.0).round();
        // TimeDelta holds at most i64::MAX milliseconds
        if seconds > (i64::MAX / 1000) as f64 {
            return Err(invalid_argument(format!(
                "hours_needed {} is out of range",
                self.hours_needed
            )));
        }
        Duration::try_seconds(seconds as i64)
            .ok_or_else(|| invalid_argument(format!("hours_needed {} is out of range", self.hours_needed)))
    }
}

/// Lazy walk over candidate slot starts.
///
/// Starting at the window start, candidates advance by `policy.step`. A
/// candidate is skipped when it is busy (see [`OverlapCheck`]) or its hour lies
/// outside business hours; otherwise a slot is emitted and the walk resumes at
/// the slot's end, so emitted slots never overlap each other. The walk stops
/// once the emitted time covers the demand or the candidate reaches the
/// deadline. A slot that starts before the deadline may end after it.
#[derive(Debug, Clone)]
pub struct SlotWalk {
    busy: Vec<BusyInterval>,
    policy: SlotPolicy,
    cursor: DateTime<Utc>,
    deadline: DateTime<Utc>,
    needed: Duration,
    accumulated: Duration,
}

impl SlotWalk {
    pub fn new(
        window_start: DateTime<Utc>,
        deadline: DateTime<Utc>,
        needed: Duration,
        busy: Vec<BusyInterval>,
        policy: SlotPolicy,
    ) -> Self {
        Self {
            busy,
            policy,
            cursor: window_start,
            deadline,
            needed,
            accumulated: Duration::zero(),
        }
    }

    /// Study time emitted so far.
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }
}

impl Iterator for SlotWalk {
    type Item = StudySlot;

    fn next(&mut self) -> Option<StudySlot> {
        while self.accumulated < self.needed && self.cursor < self.deadline {
            let candidate = self.cursor;
            if self.policy.is_busy(candidate, &self.busy)
                || !self.policy.within_business_hours(candidate)
            {
                self.cursor = candidate + self.policy.step;
                continue;
            }

            let slot = StudySlot {
                start: candidate,
                end: candidate + self.policy.slot_duration,
            };
            self.accumulated = self.accumulated + self.policy.slot_duration;
            self.cursor = slot.end;
            return Some(slot);
        }
        None
    }
}

/// Proposes study slots for a calendar from its busy time.
#[derive(Clone)]
pub struct SlotAllocator {
    busy_index: BusyIntervalIndex,
    policy: SlotPolicy,
}

impl SlotAllocator {
    pub fn new(busy_index: BusyIntervalIndex, policy: SlotPolicy) -> Self {
        Self { busy_index, policy }
    }

    pub fn policy(&self) -> &SlotPolicy {
        &self.policy
    }

    /// Queries the busy index once for `[deadline - days_before, deadline)` and
    /// returns the lazy slot walk over that window.
    pub async fn walk(
        &self,
        calendar_id: &str,
        demand: &StudyDemand,
    ) -> Result<SlotWalk, StudyplanError> {
        let window_start = demand.window_start()?;
        let needed = demand.needed()?;

        let mut policy = self.policy;
        if let Some(duration) = demand.slot_duration {
            policy.slot_duration = duration;
        }
        if let Some(hours) = demand.business_hours {
            policy.business_hours = hours;
        }
        policy.validate()?;

        let busy = self
            .busy_index
            .query(calendar_id, window_start, demand.deadline)
            .await?;

        debug!(
            "Walking study slots for {} from {} to {} ({} busy intervals, {:?} needed)",
            calendar_id,
            window_start,
            demand.deadline,
            busy.len(),
            needed
        );
        Ok(SlotWalk::new(window_start, demand.deadline, needed, busy, policy))
    }

    /// Collects the walk. The result may cover less than `hours_needed` when
    /// the window runs out; that is reported by the shorter list, not an error.
    pub async fn suggest_slots(
        &self,
        calendar_id: &str,
        demand: &StudyDemand,
    ) -> Result<Vec<StudySlot>, StudyplanError> {
        let slots: Vec<StudySlot> = self.walk(calendar_id, demand).await?.collect();
        debug!("Suggested {} study slots for {}", slots.len(), calendar_id);
        Ok(slots)
    }
}

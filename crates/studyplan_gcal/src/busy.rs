// --- File: crates/studyplan_gcal/src/busy.rs ---
use chrono::{DateTime, Utc};
use std::sync::Arc;
use studyplan_common::models::BusyInterval;
use studyplan_common::{CalendarProvider, StudyplanError};
use studyplan_config::BusyQueryFailurePolicy;
use tracing::{debug, warn};

/// Busy time of a calendar over a query window, one free/busy round trip per
/// query.
///
/// With [`BusyQueryFailurePolicy::TreatAsFree`] a failed query yields an empty
/// busy set. That keeps the scheduler answering when the provider is down, at
/// the price of possibly proposing slots that collide with real events.
#[derive(Clone)]
pub struct BusyIntervalIndex {
    provider: Arc<dyn CalendarProvider>,
    on_failure: BusyQueryFailurePolicy,
}

impl BusyIntervalIndex {
    pub fn new(provider: Arc<dyn CalendarProvider>, on_failure: BusyQueryFailurePolicy) -> Self {
        Self {
            provider,
            on_failure,
        }
    }

    pub fn failure_policy(&self) -> BusyQueryFailurePolicy {
        self.on_failure
    }

    /// Busy intervals inside `[window_start, window_end)`, ordered by start.
    ///
    /// Intervals are returned as the provider reports them, apart from
    /// sorting and dropping empty ranges; overlapping input stays overlapping.
    pub async fn query(
        &self,
        calendar_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, StudyplanError> {
        if window_end <= window_start {
            debug!(
                "Empty busy window {} - {} for {}, skipping query",
                window_start, window_end, calendar_id
            );
            return Ok(Vec::new());
        }

        match self
            .provider
            .query_free_busy(calendar_id, window_start, window_end)
            .await
        {
            Ok(mut busy) => {
                busy.retain(|interval| interval.end > interval.start);
                busy.sort();
                debug!("{} busy intervals for {}", busy.len(), calendar_id);
                Ok(busy)
            }
            Err(e) => match self.on_failure {
                BusyQueryFailurePolicy::TreatAsFree => {
                    warn!(
                        "Free/busy query for {} failed, treating window as free: {}",
                        calendar_id, e
                    );
                    Ok(Vec::new())
                }
                BusyQueryFailurePolicy::Propagate => Err(e.into()),
            },
        }
    }
}

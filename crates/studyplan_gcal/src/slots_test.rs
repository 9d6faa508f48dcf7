#[cfg(test)]
mod tests {
    use crate::busy::BusyIntervalIndex;
    use crate::memory::{InMemoryCalendarProvider, PRIMARY_CALENDAR_ID};
    use crate::models::StudySlot;
    use crate::slots::{parse_instant, SlotAllocator, SlotPolicy, SlotWalk, StudyDemand, MAX_DAYS_BEFORE};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use chrono_tz::Tz;
    use std::sync::Arc;
    use studyplan_common::models::{BusyInterval, EventDateTimePayload, EventPayload};
    use studyplan_common::StudyplanError;
    use studyplan_config::{BusyQueryFailurePolicy, OverlapCheck, SchedulingConfig};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn walk(window_start: DateTime<Utc>, deadline: DateTime<Utc>, hours: i64, busy: Vec<BusyInterval>, policy: SlotPolicy) -> Vec<StudySlot> {
        SlotWalk::new(window_start, deadline, Duration::hours(hours), busy, policy).collect()
    }

    fn slot(start: DateTime<Utc>, end: DateTime<Utc>) -> StudySlot {
        StudySlot { start, end }
    }

    #[test]
    fn empty_calendar_gives_back_to_back_slots() {
        let slots = walk(at(2, 9), at(9, 0), 4, Vec::new(), SlotPolicy::default());
        assert_eq!(slots, vec![slot(at(2, 9), at(2, 11)), slot(at(2, 11), at(2, 13))]);
    }

    #[test]
    fn busy_start_is_skipped() {
        let busy = vec![BusyInterval::new(at(2, 9), at(2, 11))];
        let slots = walk(at(2, 9), at(9, 0), 4, busy, SlotPolicy::default());

        // 09:00 and 10:00 both start inside [09:00, 11:00)
        assert_eq!(slots, vec![slot(at(2, 11), at(2, 13)), slot(at(2, 13), at(2, 15))]);
    }

    #[test]
    fn start_only_check_lets_a_slot_run_into_busy_time() {
        let busy = vec![BusyInterval::new(at(2, 10), at(2, 12))];
        let slots = walk(at(2, 9), at(9, 0), 2, busy, SlotPolicy::default());

        assert_eq!(slots, vec![slot(at(2, 9), at(2, 11))]);
    }

    #[test]
    fn full_span_check_avoids_any_overlap() {
        let busy = vec![BusyInterval::new(at(2, 10), at(2, 12))];
        let policy = SlotPolicy {
            overlap_check: OverlapCheck::FullSpan,
            ..SlotPolicy::default()
        };
        let slots = walk(at(2, 9), at(9, 0), 2, busy, policy);

        assert_eq!(slots, vec![slot(at(2, 12), at(2, 14))]);
    }

    #[test]
    fn business_hours_are_inclusive() {
        // window opens at 16:00; 16:00 and 17:00 qualify, 18:00 does not
        let slots = walk(at(2, 16), at(9, 0), 6, Vec::new(), SlotPolicy::default());
        assert_eq!(
            slots,
            vec![
                slot(at(2, 16), at(2, 18)),
                slot(at(3, 9), at(3, 11)),
                slot(at(3, 11), at(3, 13)),
            ]
        );
    }

    #[test]
    fn business_hours_follow_the_slot_time_zone() {
        let policy = SlotPolicy {
            time_zone: Tz::Asia__Jakarta,
            ..SlotPolicy::default()
        };
        // 00:00 UTC is 07:00 in Jakarta, so the first slot is 02:00 UTC (09:00 local)
        let slots = walk(at(2, 0), at(9, 0), 2, Vec::new(), policy);
        assert_eq!(slots, vec![slot(at(2, 2), at(2, 4))]);
    }

    #[test]
    fn short_window_returns_a_short_result() {
        let slots = walk(at(2, 9), at(2, 12), 10, Vec::new(), SlotPolicy::default());
        // candidates at 09:00 and 11:00 lie before the deadline; the second ends past it
        assert_eq!(slots, vec![slot(at(2, 9), at(2, 11)), slot(at(2, 11), at(2, 13))]);
    }

    #[test]
    fn walk_is_lazy() {
        let mut walk = SlotWalk::new(at(2, 9), at(30, 0), Duration::hours(100), Vec::new(), SlotPolicy::default());
        assert_eq!(walk.next(), Some(slot(at(2, 9), at(2, 11))));
        assert_eq!(walk.accumulated(), Duration::hours(2));
    }

    #[test]
    fn policy_validation() {
        let bad_hours = SlotPolicy {
            business_hours: (18, 9),
            ..SlotPolicy::default()
        };
        assert!(matches!(bad_hours.validate(), Err(StudyplanError::InvalidArgument(_))));

        let bad_duration = SlotPolicy {
            slot_duration: Duration::zero(),
            ..SlotPolicy::default()
        };
        assert!(bad_duration.validate().is_err());

        let too_long = SlotPolicy {
            slot_duration: Duration::hours(25),
            ..SlotPolicy::default()
        };
        assert!(too_long.validate().is_err());

        let from_config = SlotPolicy::from_config(&SchedulingConfig::default()).unwrap();
        assert_eq!(from_config, SlotPolicy::default());
    }

    #[test]
    fn out_of_range_config_is_a_config_error() {
        let huge_slot = SchedulingConfig {
            slot_duration_hours: i64::MAX / 2,
            ..SchedulingConfig::default()
        };
        assert!(matches!(SlotPolicy::from_config(&huge_slot), Err(StudyplanError::ConfigError(_))));

        let huge_step = SchedulingConfig {
            step_minutes: i64::MAX,
            ..SchedulingConfig::default()
        };
        assert!(matches!(SlotPolicy::from_config(&huge_step), Err(StudyplanError::ConfigError(_))));
    }

    #[test]
    fn window_start_rejects_out_of_range_lead_days() {
        assert_eq!(StudyDemand::new(at(9, 9), 2.0, 7).window_start().unwrap(), at(2, 9));
        assert!(StudyDemand::new(at(9, 9), 2.0, MAX_DAYS_BEFORE).window_start().is_ok());

        for days in [-1, MAX_DAYS_BEFORE + 1, 100_000_000, i64::MAX] {
            assert!(
                matches!(
                    StudyDemand::new(at(9, 9), 2.0, days).window_start(),
                    Err(StudyplanError::InvalidArgument(_))
                ),
                "{}",
                days
            );
        }
    }

    #[tokio::test]
    async fn huge_hours_needed_is_invalid() {
        let provider = Arc::new(InMemoryCalendarProvider::new());
        let allocator = allocator(provider.clone(), BusyQueryFailurePolicy::TreatAsFree);

        for hours in [1e300, f64::MAX, f64::INFINITY, f64::NAN] {
            let demand = StudyDemand::new(at(9, 9), hours, 7);
            let err = allocator.suggest_slots(PRIMARY_CALENDAR_ID, &demand).await.unwrap_err();
            assert!(matches!(err, StudyplanError::InvalidArgument(_)), "{}", hours);
        }
        assert_eq!(provider.request_count(), 0);
    }

    #[test]
    fn instants_parse_from_rfc3339_or_date() {
        assert_eq!(parse_instant("2025-06-09T10:00:00+07:00", Tz::UTC).unwrap(), at(9, 3));
        assert_eq!(parse_instant("2025-06-09", Tz::UTC).unwrap(), at(9, 0));
        assert_eq!(parse_instant("2025-06-09", Tz::Asia__Jakarta).unwrap(), at(8, 17));
        assert!(matches!(parse_instant("next friday", Tz::UTC), Err(StudyplanError::InvalidArgument(_))));
    }

    fn allocator(provider: Arc<InMemoryCalendarProvider>, on_failure: BusyQueryFailurePolicy) -> SlotAllocator {
        SlotAllocator::new(BusyIntervalIndex::new(provider, on_failure), SlotPolicy::default())
    }

    fn timed_event(summary: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> EventPayload {
        EventPayload {
            id: Some(format!("evt-{}", summary)),
            summary: Some(summary.to_string()),
            start: Some(EventDateTimePayload::timed(start.to_rfc3339(), Some("UTC"))),
            end: Some(EventDateTimePayload::timed(end.to_rfc3339(), Some("UTC"))),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn suggest_slots_queries_busy_time_once() {
        let provider = Arc::new(InMemoryCalendarProvider::new());
        provider.seed_events(PRIMARY_CALENDAR_ID, vec![timed_event("lecture", at(2, 9), at(2, 11))]);
        let allocator = allocator(provider.clone(), BusyQueryFailurePolicy::TreatAsFree);

        // deadline 9 June 09:00, seven days back is 2 June 09:00
        let demand = StudyDemand::new(at(9, 9), 4.0, 7);
        let slots = allocator.suggest_slots(PRIMARY_CALENDAR_ID, &demand).await.unwrap();

        assert_eq!(slots, vec![slot(at(2, 11), at(2, 13)), slot(at(2, 13), at(2, 15))]);
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn failed_busy_query_is_treated_as_free() {
        let provider = Arc::new(InMemoryCalendarProvider::new());
        provider.seed_events(PRIMARY_CALENDAR_ID, vec![timed_event("lecture", at(2, 9), at(2, 11))]);
        provider.set_fail_free_busy(true);

        let demand = StudyDemand::new(at(9, 9), 2.0, 7);
        let slots = allocator(provider.clone(), BusyQueryFailurePolicy::TreatAsFree)
            .suggest_slots(PRIMARY_CALENDAR_ID, &demand)
            .await
            .unwrap();
        assert_eq!(slots, vec![slot(at(2, 9), at(2, 11))]);

        let err = allocator(provider, BusyQueryFailurePolicy::Propagate)
            .suggest_slots(PRIMARY_CALENDAR_ID, &demand)
            .await
            .unwrap_err();
        assert!(matches!(err, StudyplanError::RemoteError(_)));
    }

    #[tokio::test]
    async fn demand_overrides_and_validation() {
        let provider = Arc::new(InMemoryCalendarProvider::new());
        let allocator = allocator(provider.clone(), BusyQueryFailurePolicy::TreatAsFree);

        let mut demand = StudyDemand::new(at(9, 9), 3.0, 7);
        demand.slot_duration = Some(Duration::hours(1));
        demand.business_hours = Some((14, 15));
        let slots = allocator.suggest_slots(PRIMARY_CALENDAR_ID, &demand).await.unwrap();
        assert_eq!(
            slots,
            vec![slot(at(2, 14), at(2, 15)), slot(at(2, 15), at(2, 16)), slot(at(3, 14), at(3, 15))]
        );

        let negative_hours = StudyDemand::new(at(9, 9), -1.0, 7);
        assert!(allocator.suggest_slots(PRIMARY_CALENDAR_ID, &negative_hours).await.is_err());

        let negative_days = StudyDemand::new(at(9, 9), 2.0, -1);
        assert!(allocator.suggest_slots(PRIMARY_CALENDAR_ID, &negative_days).await.is_err());

        provider.reset_request_count();
        let empty_window = StudyDemand::new(at(9, 9), 2.0, 0);
        let slots = allocator.suggest_slots(PRIMARY_CALENDAR_ID, &empty_window).await.unwrap();
        assert!(slots.is_empty());
        assert_eq!(provider.request_count(), 0);
    }
}

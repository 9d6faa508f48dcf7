#[cfg(test)]
mod tests {
    use crate::slots::{SlotPolicy, SlotWalk};
    use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
    use proptest::prelude::*;
    use studyplan_common::models::BusyInterval;
    use studyplan_config::OverlapCheck;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()
    }

    // (offset hours from base, length hours)
    fn busy_intervals(raw: &[(i64, i64)]) -> Vec<BusyInterval> {
        let mut busy: Vec<BusyInterval> = raw
            .iter()
            .map(|(offset, length)| {
                let start = base() + Duration::hours(*offset);
                BusyInterval::new(start, start + Duration::hours(*length))
            })
            .collect();
        busy.sort();
        busy
    }

    proptest! {
        #[test]
        fn slots_respect_busy_time_and_business_hours(
            start_offset in 0..48i64,
            days_before in 1..10i64,
            hours_needed in 1..40i64,
            slot_hours in 1..4i64,
            first_hour in 0..12u32,
            last_hour in 12..24u32,
            full_span in any::<bool>(),
            raw_busy in prop::collection::vec((0..240i64, 1..6i64), 0..12),
        ) {
            let window_start = base() + Duration::hours(start_offset);
            let deadline = window_start + Duration::days(days_before);
            let busy = busy_intervals(&raw_busy);
            let policy = SlotPolicy {
                slot_duration: Duration::hours(slot_hours),
                business_hours: (first_hour, last_hour.min(23)),
                overlap_check: if full_span { OverlapCheck::FullSpan } else { OverlapCheck::StartOnly },
                ..SlotPolicy::default()
            };

            let slots: Vec<_> = SlotWalk::new(
                window_start,
                deadline,
                Duration::hours(hours_needed),
                busy.clone(),
                policy,
            )
            .collect();

            for slot in &slots {
                prop_assert!(slot.start >= window_start && slot.start < deadline);
                prop_assert_eq!(slot.end - slot.start, Duration::hours(slot_hours));
                let hour = slot.start.hour();
                prop_assert!(first_hour <= hour && hour <= last_hour.min(23));
                prop_assert!(busy.iter().all(|b| !b.contains(slot.start)));
                if full_span {
                    prop_assert!(busy.iter().all(|b| !b.overlaps(slot.start, slot.end)));
                }
            }

            // pairwise disjoint, in order
            for pair in slots.windows(2) {
                prop_assert!(pair[0].end <= pair[1].start);
            }

            // stops as soon as the demand is covered
            let emitted = Duration::hours(slot_hours) * slots.len() as i32;
            if emitted >= Duration::hours(hours_needed) {
                prop_assert!(emitted - Duration::hours(slot_hours) < Duration::hours(hours_needed));
            }
        }
    }
}

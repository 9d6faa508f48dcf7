use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use studyplan_common::models::{BusyInterval, EventDateTimePayload, EventPayload};
use studyplan_config::{BusyQueryFailurePolicy, OverlapCheck};
use studyplan_gcal::memory::PRIMARY_CALENDAR_ID;
use studyplan_gcal::{
    BusyIntervalIndex, InMemoryCalendarProvider, SlotAllocator, SlotPolicy, SlotWalk, StudyDemand,
};

fn window_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()
}

// One busy block of `length_hours` every `every_hours`, starting an hour in.
fn busy_blocks(count: usize, every_hours: i64, length_hours: i64) -> Vec<BusyInterval> {
    (0..count as i64)
        .map(|n| {
            let start = window_start() + Duration::hours(1 + n * every_hours);
            BusyInterval::new(start, start + Duration::hours(length_hours))
        })
        .collect()
}

fn benchmark_slot_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_walk");
    let deadline = window_start() + Duration::days(30);

    group.bench_function("empty_calendar", |b| {
        b.iter(|| {
            SlotWalk::new(
                black_box(window_start()),
                deadline,
                Duration::hours(120),
                Vec::new(),
                SlotPolicy::default(),
            )
            .count()
        })
    });

    let busy = busy_blocks(200, 3, 2);
    group.bench_function("dense_busy_start_only", |b| {
        b.iter(|| {
            SlotWalk::new(
                black_box(window_start()),
                deadline,
                Duration::hours(120),
                busy.clone(),
                SlotPolicy::default(),
            )
            .count()
        })
    });

    let full_span = SlotPolicy {
        overlap_check: OverlapCheck::FullSpan,
        ..SlotPolicy::default()
    };
    group.bench_function("dense_busy_full_span", |b| {
        b.iter(|| {
            SlotWalk::new(
                black_box(window_start()),
                deadline,
                Duration::hours(120),
                busy.clone(),
                full_span,
            )
            .count()
        })
    });

    group.finish();
}

fn benchmark_suggest_slots(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let provider = Arc::new(InMemoryCalendarProvider::new());
    provider.seed_events(
        PRIMARY_CALENDAR_ID,
        busy_blocks(100, 5, 2)
            .into_iter()
            .enumerate()
            .map(|(n, busy)| EventPayload {
                id: Some(format!("busy-{}", n)),
                summary: Some("Lecture".to_string()),
                start: Some(EventDateTimePayload::timed(busy.start.to_rfc3339(), None)),
                end: Some(EventDateTimePayload::timed(busy.end.to_rfc3339(), None)),
                ..Default::default()
            })
            .collect(),
    );
    let allocator = SlotAllocator::new(
        BusyIntervalIndex::new(provider, BusyQueryFailurePolicy::TreatAsFree),
        SlotPolicy::default(),
    );
    let demand = StudyDemand::new(window_start() + Duration::days(21), 40.0, 21);

    c.bench_function("suggest_slots_in_memory", |b| {
        b.to_async(&runtime).iter(|| async {
            allocator
                .suggest_slots(PRIMARY_CALENDAR_ID, black_box(&demand))
                .await
                .unwrap()
        })
    });
}

criterion_group!(benches, benchmark_slot_walk, benchmark_suggest_slots);
criterion_main!(benches);

use bookify_common::services::{BusySlot, BusyStatus};
use bookify_config::SchedulingConfig;
use bookify_outlook::logic::{filter_available, slot_grid, BusinessHoursPolicy};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn make_policy() -> BusinessHoursPolicy {
    BusinessHoursPolicy::from_config(&SchedulingConfig {
        start_time: "09:00".to_string(),
        end_time: "17:00".to_string(),
        slot_duration_minutes: 30,
        timezone: "Europe/Paris".to_string(),
        excluded_weekdays: vec!["Sat".to_string(), "Sun".to_string()],
    })
    .unwrap()
}

fn make_range(days: u64) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
    let end = start
        .checked_add_days(chrono::Days::new(days))
        .unwrap();
    (start, end)
}

// Busy intervals spread across the range, one per working hour block
fn make_busy(count: usize) -> Vec<BusySlot> {
    let mut busy = Vec::new();
    let mut current = Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap();
    for _ in 0..count {
        busy.push(BusySlot {
            start: current,
            end: current + Duration::minutes(30),
            status: BusyStatus::Busy,
            subject: None,
        });
        current += Duration::hours(3);
    }
    busy
}

fn benchmark_availability(c: &mut Criterion) {
    let mut group = c.benchmark_group("availability");

    group.bench_function("grid_one_week", |b| {
        let policy = make_policy();
        let (start, end) = make_range(6);
        b.iter(|| {
            slot_grid(black_box(&policy), black_box(start), black_box(end)).count()
        })
    });

    group.bench_function("grid_one_month", |b| {
        let policy = make_policy();
        let (start, end) = make_range(29);
        b.iter(|| {
            slot_grid(black_box(&policy), black_box(start), black_box(end)).count()
        })
    });

    group.bench_function("filter_no_busy_periods", |b| {
        let policy = make_policy();
        let (start, end) = make_range(6);
        let busy = Vec::new();
        b.iter(|| {
            filter_available(
                slot_grid(black_box(&policy), black_box(start), black_box(end)),
                black_box(&busy),
                black_box(&policy),
            )
        })
    });

    group.bench_function("filter_few_busy_periods", |b| {
        let policy = make_policy();
        let (start, end) = make_range(6);
        let busy = make_busy(5);
        b.iter(|| {
            filter_available(
                slot_grid(black_box(&policy), black_box(start), black_box(end)),
                black_box(&busy),
                black_box(&policy),
            )
        })
    });

    group.bench_function("filter_many_busy_periods", |b| {
        let policy = make_policy();
        let (start, end) = make_range(29);
        let busy = make_busy(50);
        b.iter(|| {
            filter_available(
                slot_grid(black_box(&policy), black_box(start), black_box(end)),
                black_box(&busy),
                black_box(&policy),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_availability);
criterion_main!(benches);

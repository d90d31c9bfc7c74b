use apicontrol::{
    aggregation::{Aggregator, TrendMetric},
    chart::merge_histories,
    mock_data::{USER_COUNT, mock_services, mock_users},
};
use chrono::{NaiveDate, TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

fn benchmark_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("mock_generation");
    let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();

    group.bench_function("services_30_days", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| mock_services(black_box(30), today(), &mut rng).unwrap());
    });

    group.bench_function("services_365_days", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| mock_services(black_box(365), today(), &mut rng).unwrap());
    });

    group.bench_function("users", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| mock_users(black_box(USER_COUNT), now, &mut rng));
    });

    group.finish();
}

fn benchmark_totals(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard_totals");
    let mut rng = StdRng::seed_from_u64(7);
    let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
    let users = mock_users(USER_COUNT, now, &mut rng);

    for days in [30u32, 365] {
        let services = mock_services(days, today(), &mut rng).unwrap();
        group.bench_function(format!("totals_{days}_days"), |b| {
            b.iter(|| Aggregator::dashboard_totals(black_box(&services), black_box(&users)));
        });
        group.bench_function(format!("week_over_week_{days}_days"), |b| {
            b.iter(|| Aggregator::week_over_week(black_box(&services), TrendMetric::Cost));
        });
    }

    group.finish();
}

fn benchmark_chart(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart_merge");
    let mut rng = StdRng::seed_from_u64(3);

    // Uneven history lengths force the date-keyed join to fill gaps
    let mut services = mock_services(365, today(), &mut rng).unwrap();
    services.extend(mock_services(90, today(), &mut rng).unwrap());

    group.bench_function("merge_6_services", |b| {
        b.iter(|| merge_histories(black_box(&services)));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_generation,
    benchmark_totals,
    benchmark_chart
);
criterion_main!(benches);

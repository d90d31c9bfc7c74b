//! Chart data shaping
//!
//! Merges per-service daily histories into one record per date. The merge
//! is keyed on the date itself, so services with different history lengths
//! or gaps never have values shifted onto the wrong day.

use apicontrol_core::aggregation_types::ChartPoint;
use apicontrol_core::types::{DailyDate, ServiceData, ServiceId};
use std::collections::BTreeMap;

/// One [`ChartPoint`] per date present in any history, ascending by date
///
/// A service without an entry for a date has no value for that date.
///
/// # Examples
/// ```
/// use apicontrol::chart::merge_histories;
///
/// assert!(merge_histories(&[]).is_empty());
/// ```
pub fn merge_histories(services: &[ServiceData]) -> Vec<ChartPoint> {
    let mut by_date: BTreeMap<DailyDate, BTreeMap<ServiceId, f64>> = BTreeMap::new();

    for service in services {
        for day in service.daily_history() {
            *by_date
                .entry(day.date)
                .or_default()
                .entry(service.id().clone())
                .or_insert(0.0) += day.cost;
        }
    }

    by_date
        .into_iter()
        .map(|(date, values)| ChartPoint { date, values })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use apicontrol_core::types::{DailyUsage, Provider, ServiceStatus};
    use chrono::NaiveDate;

    fn day(d: u32, cost: f64) -> DailyUsage {
        DailyUsage {
            date: DailyDate::new(NaiveDate::from_ymd_opt(2024, 5, d).unwrap()),
            requests: 10,
            cost,
            errors: 0,
        }
    }

    fn service(id: &str, days: Vec<DailyUsage>) -> ServiceData {
        ServiceData::new(
            ServiceId::new(id),
            id,
            Provider::Other,
            ServiceStatus::Healthy,
            days,
            "#fff",
        )
    }

    #[test]
    fn test_shared_dates_merge() {
        let a = service("a", (1..=5).map(|d| day(d, 1.0)).collect());
        let b = service("b", (1..=5).map(|d| day(d, 2.0)).collect());
        let points = merge_histories(&[a, b]);

        assert_eq!(points.len(), 5);
        for point in &points {
            assert_eq!(point.value_for(&ServiceId::new("a")), Some(1.0));
            assert_eq!(point.value_for(&ServiceId::new("b")), Some(2.0));
        }
    }

    #[test]
    fn test_shorter_history_is_not_shifted() {
        let long = service("long", (1..=4).map(|d| day(d, 1.0)).collect());
        let short = service("short", vec![day(3, 9.0), day(4, 8.0)]);
        let points = merge_histories(&[long, short]);

        let short_id = ServiceId::new("short");
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].value_for(&short_id), None);
        assert_eq!(points[1].value_for(&short_id), None);
        assert_eq!(points[2].value_for(&short_id), Some(9.0));
        assert_eq!(points[3].value_for(&short_id), Some(8.0));
    }

    #[test]
    fn test_output_sorted_by_date() {
        let a = service("a", vec![day(9, 1.0), day(2, 1.0)]);
        let b = service("b", vec![day(5, 1.0)]);
        let dates: Vec<String> = merge_histories(&[a, b])
            .iter()
            .map(|p| p.date.to_string())
            .collect();
        assert_eq!(dates, ["2024-05-02", "2024-05-05", "2024-05-09"]);
    }
}

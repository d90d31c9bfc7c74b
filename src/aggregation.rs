//! Aggregation over the tracked services
//!
//! Everything here is a pure function of its inputs: totals, projections,
//! ratios, per-service breakdowns and week-over-week trends. Ratios whose
//! denominator is zero come back as [`Metric::Unavailable`].
//!
//! # Examples
//!
//! ```
//! use apicontrol::aggregation::Aggregator;
//! use apicontrol::mock_data::mock_services;
//! use chrono::NaiveDate;
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
//! let services = mock_services(30, today, &mut StdRng::seed_from_u64(1))?;
//!
//! let total = Aggregator::total_cost(&services);
//! assert!((Aggregator::projected_cost(&services) - total * 1.2).abs() < 1e-9);
//! assert_eq!(Aggregator::active_count(&services), 2);
//! # Ok::<(), apicontrol_core::error::ApiControlError>(())
//! ```

use apicontrol_core::aggregation_types::{
    BudgetStatus, CostShare, DashboardTotals, Metric, PerformanceRow,
};
use apicontrol_core::settings::SettingsForm;
use apicontrol_core::types::{DailyDate, ServiceData, ServiceStatus, UserMetric};
use std::collections::BTreeMap;

/// Markup applied to the current total to project the monthly bill
pub const PROJECTION_FACTOR: f64 = 1.2;

/// Days in each window of the week-over-week comparison
pub const TREND_WINDOW_DAYS: usize = 7;

/// Number of users listed as top spenders
pub const TOP_SPENDER_COUNT: usize = 4;

/// Which daily figure a trend is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendMetric {
    Cost,
    Requests,
}

/// Stateless aggregation functions
pub struct Aggregator;

impl Aggregator {
    pub fn total_cost(services: &[ServiceData]) -> f64 {
        services.iter().map(|s| s.total_cost_month()).sum()
    }

    pub fn total_requests(services: &[ServiceData]) -> u64 {
        services.iter().map(|s| s.total_requests_month()).sum()
    }

    pub fn total_errors(services: &[ServiceData]) -> u64 {
        services.iter().map(|s| s.total_errors_month()).sum()
    }

    /// Services whose status is healthy
    pub fn active_count(services: &[ServiceData]) -> usize {
        services
            .iter()
            .filter(|s| s.status() == ServiceStatus::Healthy)
            .count()
    }

    pub fn projected_cost(services: &[ServiceData]) -> f64 {
        Self::total_cost(services) * PROJECTION_FACTOR
    }

    pub fn avg_cost_per_request(services: &[ServiceData]) -> Metric {
        Metric::ratio(
            Self::total_cost(services),
            Self::total_requests(services) as f64,
        )
    }

    /// Errors as a percentage of the service's monthly requests
    pub fn error_rate(service: &ServiceData) -> Metric {
        Metric::ratio(
            service.total_errors_month() as f64,
            service.total_requests_month() as f64,
        )
        .scale(100.0)
    }

    pub fn cost_distribution(services: &[ServiceData]) -> Vec<CostShare> {
        let total = Self::total_cost(services);
        services
            .iter()
            .map(|s| CostShare {
                id: s.id().clone(),
                name: s.name().to_string(),
                cost: s.total_cost_month(),
                share_percent: Metric::ratio(s.total_cost_month(), total).scale(100.0),
                color: s.color().to_string(),
            })
            .collect()
    }

    pub fn performance_rows(services: &[ServiceData]) -> Vec<PerformanceRow> {
        services
            .iter()
            .map(|s| PerformanceRow {
                id: s.id().clone(),
                short_name: s.short_name().to_string(),
                status: s.status(),
                requests: s.total_requests_month(),
                errors: s.total_errors_month(),
                error_rate: Self::error_rate(s),
                cost: s.total_cost_month(),
            })
            .collect()
    }

    /// The first `n` users; the list is already sorted by spend
    pub fn top_spenders(users: &[UserMetric], n: usize) -> Vec<UserMetric> {
        users.iter().take(n).cloned().collect()
    }

    pub fn budget_status(spend: f64, settings: &SettingsForm) -> BudgetStatus {
        let alert_threshold = settings.alert_threshold();
        BudgetStatus {
            budget_cap: settings.budget_cap,
            spend,
            used_percent: Metric::ratio(spend, settings.budget_cap).scale(100.0),
            alert_threshold,
            alert_triggered: spend >= alert_threshold,
        }
    }

    /// Percentage change of the last week against the week before it
    ///
    /// Daily values are summed across services by date. Unavailable when
    /// fewer than two full windows exist or the earlier window sums to zero.
    pub fn week_over_week(services: &[ServiceData], metric: TrendMetric) -> Metric {
        let mut by_date: BTreeMap<DailyDate, f64> = BTreeMap::new();
        for service in services {
            for day in service.daily_history() {
                let value = match metric {
                    TrendMetric::Cost => day.cost,
                    TrendMetric::Requests => day.requests as f64,
                };
                *by_date.entry(day.date).or_insert(0.0) += value;
            }
        }

        let values: Vec<f64> = by_date.into_values().collect();
        if values.len() < TREND_WINDOW_DAYS * 2 {
            return Metric::Unavailable;
        }
        let split = values.len() - TREND_WINDOW_DAYS;
        let recent: f64 = values[split..].iter().sum();
        let prior: f64 = values[split - TREND_WINDOW_DAYS..split].iter().sum();
        Metric::ratio(recent - prior, prior).scale(100.0)
    }

    /// Headline numbers for one render
    pub fn dashboard_totals(services: &[ServiceData], users: &[UserMetric]) -> DashboardTotals {
        DashboardTotals {
            total_cost: Self::total_cost(services),
            total_requests: Self::total_requests(services),
            total_errors: Self::total_errors(services),
            active_services: Self::active_count(services),
            service_count: services.len(),
            user_count: users.len(),
            projected_cost: Self::projected_cost(services),
            avg_cost_per_request: Self::avg_cost_per_request(services),
            cost_trend_percent: Self::week_over_week(services, TrendMetric::Cost),
            requests_trend_percent: Self::week_over_week(services, TrendMetric::Requests),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apicontrol_core::types::{DailyUsage, Provider, ServiceId};
    use chrono::NaiveDate;

    fn history(costs: &[f64], requests: u64, errors: u64) -> Vec<DailyUsage> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        costs
            .iter()
            .enumerate()
            .map(|(i, &cost)| DailyUsage {
                date: DailyDate::new(start + chrono::Duration::days(i as i64)),
                requests,
                cost,
                errors,
            })
            .collect()
    }

    fn service(id: &str, status: ServiceStatus, days: Vec<DailyUsage>) -> ServiceData {
        ServiceData::new(
            ServiceId::new(id),
            format!("{id} service"),
            Provider::Other,
            status,
            days,
            "#000",
        )
    }

    #[test]
    fn test_totals() {
        let services = vec![
            service("a", ServiceStatus::Healthy, history(&[1.0, 2.0], 100, 1)),
            service("b", ServiceStatus::Degraded, history(&[3.0], 50, 5)),
        ];
        assert_eq!(Aggregator::total_cost(&services), 6.0);
        assert_eq!(Aggregator::total_requests(&services), 250);
        assert_eq!(Aggregator::total_errors(&services), 7);
        assert_eq!(Aggregator::active_count(&services), 1);
        assert!((Aggregator::projected_cost(&services) - 7.2).abs() < 1e-9);
        assert_eq!(
            Aggregator::avg_cost_per_request(&services),
            Metric::Available(6.0 / 250.0)
        );
    }

    #[test]
    fn test_zero_requests_unavailable() {
        let services = vec![service("a", ServiceStatus::Down, history(&[0.0, 0.0], 0, 0))];
        assert_eq!(
            Aggregator::avg_cost_per_request(&services),
            Metric::Unavailable
        );
        assert_eq!(Aggregator::error_rate(&services[0]), Metric::Unavailable);
        assert_eq!(
            Aggregator::cost_distribution(&services)[0].share_percent,
            Metric::Unavailable
        );
    }

    #[test]
    fn test_empty_services() {
        assert_eq!(Aggregator::total_cost(&[]), 0.0);
        assert_eq!(Aggregator::avg_cost_per_request(&[]), Metric::Unavailable);
        let totals = Aggregator::dashboard_totals(&[], &[]);
        assert_eq!(totals.service_count, 0);
        assert_eq!(totals.cost_trend_percent, Metric::Unavailable);
    }

    #[test]
    fn test_error_rate_percentage() {
        let s = service("a", ServiceStatus::Healthy, history(&[1.0, 1.0], 200, 4));
        assert_eq!(Aggregator::error_rate(&s), Metric::Available(2.0));
    }

    #[test]
    fn test_cost_distribution_shares() {
        let services = vec![
            service("a", ServiceStatus::Healthy, history(&[3.0], 10, 0)),
            service("b", ServiceStatus::Healthy, history(&[1.0], 10, 0)),
        ];
        let shares = Aggregator::cost_distribution(&services);
        assert_eq!(shares[0].share_percent, Metric::Available(75.0));
        assert_eq!(shares[1].share_percent, Metric::Available(25.0));
    }

    #[test]
    fn test_performance_rows_short_names() {
        let services = vec![service("alpha", ServiceStatus::Healthy, history(&[1.0], 10, 1))];
        let rows = Aggregator::performance_rows(&services);
        assert_eq!(rows[0].short_name, "alpha");
        assert_eq!(rows[0].errors, 1);
        assert_eq!(rows[0].id.as_str(), "alpha");
    }

    #[test]
    fn test_week_over_week() {
        let mut costs = vec![1.0; 7];
        costs.extend(vec![2.0; 7]);
        let services = vec![service("a", ServiceStatus::Healthy, history(&costs, 10, 0))];
        assert_eq!(
            Aggregator::week_over_week(&services, TrendMetric::Cost),
            Metric::Available(100.0)
        );
        assert_eq!(
            Aggregator::week_over_week(&services, TrendMetric::Requests),
            Metric::Available(0.0)
        );
    }

    #[test]
    fn test_week_over_week_needs_two_windows() {
        let services = vec![service("a", ServiceStatus::Healthy, history(&[1.0; 13], 10, 0))];
        assert_eq!(
            Aggregator::week_over_week(&services, TrendMetric::Cost),
            Metric::Unavailable
        );
    }

    #[test]
    fn test_budget_status() {
        let settings = SettingsForm::default();
        let status = Aggregator::budget_status(85.0, &settings);
        assert_eq!(status.used_percent, Metric::Available(85.0));
        assert!(status.alert_triggered);

        let status = Aggregator::budget_status(10.0, &settings);
        assert!(!status.alert_triggered);

        let mut zero_cap = SettingsForm::default();
        zero_cap.budget_cap = 0.0;
        assert_eq!(
            Aggregator::budget_status(10.0, &zero_cap).used_percent,
            Metric::Unavailable
        );
    }

    #[test]
    fn test_top_spenders_takes_prefix() {
        assert!(Aggregator::top_spenders(&[], TOP_SPENDER_COUNT).is_empty());
    }
}
